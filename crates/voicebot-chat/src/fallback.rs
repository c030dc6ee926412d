//! Deterministic local responder used whenever the chat service fails.
//!
//! Rules are checked in declared order against the lowercased utterance and
//! the first match wins. Keywords match at the start of a word, so "book"
//! also matches "booking" but "emi" does not match "premium".

use regex::Regex;

use crate::error::ChatError;

/// A locally synthesized reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackReply {
    pub intent_label: &'static str,
    pub text: &'static str,
}

struct FallbackRule {
    pattern: Regex,
    reply: FallbackReply,
    /// Alternative reply when the budget pattern also matches.
    budget_reply: Option<FallbackReply>,
}

const TEST_RIDE_RESPONSE: &str = "Test Ride Booking Made Easy!\n\
Available slots: Monday to Saturday 10:00 AM - 6:00 PM, Sunday 10:00 AM - 4:00 PM.\n\
To book, share your full name, contact number, preferred date and time, and the bike model you'd like to ride.\n\
Every test ride includes a consultation, an EMI estimate, an insurance quote and an accessories demo.";

const FINANCE_RESPONSE: &str = "Flexible finance options are available through HDFC, ICICI, SBI, Bajaj Finserv and Tata Capital.\n\
Typical EMIs over 36 months: Rs 70,000 bike about Rs 2,500/month, Rs 1,00,000 about Rs 3,400/month, Rs 1,50,000 about Rs 5,100/month.\n\
Interest starts at 9.99%, tenures go up to 5 years and approval takes about 30 minutes.\n\
Tell me the model and I'll estimate the exact EMI.";

const SERVICE_RESPONSE: &str = "Service packages:\n\
Basic (Rs 800): oil change, air filter cleaning, inspection.\n\
Complete (Rs 1,500): basic items plus brake, chain and tyre checks.\n\
Premium Care (Rs 2,500): complete service, genuine parts, 20-point check, free pickup and delivery.\n\
Your first service is free. Which package would you like to book?";

const INSURANCE_RESPONSE: &str = "Insurance options: third-party (mandatory), comprehensive, zero depreciation and personal accident cover.\n\
Third-party premiums run Rs 1,500 - 2,500 per year, comprehensive Rs 3,500 - 8,000.\n\
Policies are issued instantly with cashless claims at 4000+ garages and 24x7 roadside assistance.\n\
Share your bike details for a quote.";

const LOCATION_RESPONSE: &str = "Our main showroom is on MG Road, City Center, open 9:00 AM - 8:00 PM every day (+91-9876543210).\n\
Branches in Whitefield, Electronic City and Koramangala are open 10:00 AM - 7:00 PM.\n\
Home test rides and free service pickup are available. Shall I book a visit?";

const SPECS_RESPONSE: &str = "Engine guide: 100-125cc for city commuting (60-70 kmpl), 150-200cc for highway and city (45-55 kmpl), 200cc+ for performance riding (35-45 kmpl).\n\
Most current models offer digital consoles, LED lights, smartphone connectivity, USB charging and ABS.\n\
Name a model for its detailed specifications.";

const SUPPORT_RESPONSE: &str = "Sorry to hear that. Our support team is on the toll-free helpline, WhatsApp +91-9876543210 and support@voicebotmotors.com.\n\
Log a complaint to get a ticket number, an expert callback within 2 hours and resolution within 24-48 hours.\n\
Tell me what's wrong and I'll help right away.";

const RECOMMENDATION_RESPONSE: &str = "Our range:\n\
Budget (Rs 50K - 80K): Honda Shine, TVS Sport, Bajaj CT.\n\
Performance (Rs 80K - 1.5L): Pulsar and Apache series.\n\
Premium (Rs 1.5L+): KTM Duke, Royal Enfield, Yamaha R15.\n\
What's your budget? I'll recommend the right bike.";

const BUDGET_RECOMMENDATION_RESPONSE: &str = "Top bikes under Rs 1 lakh:\n\
1. Honda CB Shine (Rs 72,000): 65 kmpl, 124cc, great for daily commuting.\n\
2. Bajaj Pulsar 125 (Rs 94,000): 50 kmpl, 124cc, style and performance, EMI from Rs 3,200/month.\n\
3. TVS Raider 125 (Rs 85,000): 67 kmpl, 124cc, modern features and two years of free service.\n\
Which one interests you? I can arrange a test ride.";

const PRICING_RESPONSE: &str = "Current price ranges: entry level Rs 55,000 - 75,000, mid range Rs 75,000 - 1,20,000, premium Rs 1,20,000 - 2,50,000.\n\
We offer a best price guarantee, exchange bonus up to Rs 15,000 and festive offers.\n\
Prices include road tax, insurance, registration and accessories worth Rs 3,000. Which model should I price?";

const GREETING_RESPONSE: &str = "Welcome to VoiceBot! I'm your sales assistant for two-wheelers.\n\
I can help you choose a bike, explain pricing and EMI, book a test ride, schedule a service or compare insurance.\n\
Try \"Show me bikes under 1 lakh\" or \"Book a test ride\". How can I help today?";

const DEFAULT_RESPONSE: &str = "I'm not sure I understood that. I can help with bike recommendations, prices and EMI, test ride bookings, service appointments, insurance and showroom locations.\n\
Could you tell me a little more about what you're looking for?";

const RULES: &[(&str, &[&str], &str)] = &[
    (
        "test_ride",
        &["test ride", "test drive", "book", "appointment"],
        TEST_RIDE_RESPONSE,
    ),
    (
        "finance",
        &["emi", "finance", "loan", "installment", "down payment"],
        FINANCE_RESPONSE,
    ),
    (
        "service",
        &["service", "servicing", "maintenance", "repair"],
        SERVICE_RESPONSE,
    ),
    (
        "insurance",
        &["insurance", "insure", "policy", "claim", "cover"],
        INSURANCE_RESPONSE,
    ),
    (
        "location",
        &["location", "address", "showroom", "where", "visit", "direction"],
        LOCATION_RESPONSE,
    ),
    (
        "specifications",
        &["specs", "specification", "engine", "mileage", "power", "features"],
        SPECS_RESPONSE,
    ),
    (
        "support",
        &["problem", "issue", "complaint", "not working", "defect"],
        SUPPORT_RESPONSE,
    ),
    (
        "recommendation",
        &["bike", "motorcycle", "scooter", "recommend", "suggest", "show me"],
        RECOMMENDATION_RESPONSE,
    ),
    (
        "pricing",
        &["price", "pricing", "cost", "expensive", "cheap", "discount", "offer"],
        PRICING_RESPONSE,
    ),
    (
        "greeting",
        &["hello", "hey", "namaste", "vanakkam", "good morning", "good afternoon", "good evening"],
        GREETING_RESPONSE,
    ),
];

const BUDGET_KEYWORDS: &[&str] = &["under", "below", "lakh", "budget", "cheap", "affordable"];

fn keyword_pattern(keywords: &[&str]) -> Result<Regex, regex::Error> {
    let alternatives: Vec<String> = keywords.iter().map(|k| regex::escape(k)).collect();
    Regex::new(&format!(r"(?i)\b(?:{})", alternatives.join("|")))
}

/// Ordered keyword rule table with a clarifying default.
pub struct FallbackResponder {
    rules: Vec<FallbackRule>,
    budget: Regex,
}

impl std::fmt::Debug for FallbackResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackResponder")
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl FallbackResponder {
    pub fn new() -> Result<Self, ChatError> {
        let budget = keyword_pattern(BUDGET_KEYWORDS)?;
        let mut rules = Vec::with_capacity(RULES.len());
        for (intent_label, keywords, text) in RULES {
            let budget_reply = (*intent_label == "recommendation").then_some(FallbackReply {
                intent_label: "recommendation_budget",
                text: BUDGET_RECOMMENDATION_RESPONSE,
            });
            rules.push(FallbackRule {
                pattern: keyword_pattern(keywords)?,
                reply: FallbackReply { intent_label, text },
                budget_reply,
            });
        }
        Ok(Self { rules, budget })
    }

    /// Reply for `text`. Pure: the same input always yields the same reply.
    pub fn respond(&self, text: &str) -> FallbackReply {
        for rule in &self.rules {
            if rule.pattern.is_match(text) {
                return match &rule.budget_reply {
                    Some(budget) if self.budget.is_match(text) => budget.clone(),
                    _ => rule.reply.clone(),
                };
            }
        }
        FallbackReply {
            intent_label: "general",
            text: DEFAULT_RESPONSE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responder() -> FallbackResponder {
        FallbackResponder::new().unwrap()
    }

    #[test]
    fn test_test_ride_and_book_share_response() {
        let r = responder();
        let a = r.respond("I want a test ride");
        let b = r.respond("Can I book one for Saturday?");
        assert_eq!(a.intent_label, "test_ride");
        assert_eq!(a, b);
        assert!(a.text.starts_with("Test Ride Booking Made Easy!"));
    }

    #[test]
    fn test_response_is_identical_on_retry() {
        let r = responder();
        let first = r.respond("BOOKING a TEST RIDE please");
        for _ in 0..5 {
            assert_eq!(r.respond("BOOKING a TEST RIDE please"), first);
        }
    }

    #[test]
    fn test_test_ride_beats_later_rules() {
        let r = responder();
        // Mentions bike and price too, but booking is declared first.
        let reply = r.respond("book a test ride for the cheapest bike");
        assert_eq!(reply.intent_label, "test_ride");
    }

    #[test]
    fn test_keyword_matches_word_start_only() {
        let r = responder();
        assert_eq!(r.respond("what EMI options do you have").intent_label, "finance");
        assert_ne!(r.respond("premium models").intent_label, "finance");
    }

    #[test]
    fn test_budget_variant() {
        let r = responder();
        assert_eq!(r.respond("suggest a bike").intent_label, "recommendation");
        let budget = r.respond("show me bikes under 1 lakh");
        assert_eq!(budget.intent_label, "recommendation_budget");
        assert!(budget.text.contains("Honda CB Shine"));
    }

    #[test]
    fn test_rule_labels() {
        let r = responder();
        let cases = [
            ("my bike needs servicing", "service"),
            ("does it include insurance?", "insurance"),
            ("where is your showroom", "location"),
            ("what is the mileage", "specifications"),
            ("I have a complaint", "support"),
            ("what's the price", "pricing"),
            ("Hello there", "greeting"),
            ("Namaste", "greeting"),
        ];
        for (input, label) in cases {
            assert_eq!(r.respond(input).intent_label, label, "input: {}", input);
        }
    }

    #[test]
    fn test_default_response() {
        let r = responder();
        let reply = r.respond("qwerty zxcv");
        assert_eq!(reply.intent_label, "general");
        assert_eq!(reply.text, DEFAULT_RESPONSE);
        // "hi" inside another word never triggers the greeting
        assert_eq!(r.respond("this thing").intent_label, "general");
    }
}
