//! Static two-wheeler catalogue and current offers.

use serde::Serialize;

/// A model in the showroom catalogue. Prices in rupees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BikeModel {
    pub id: &'static str,
    pub name: &'static str,
    pub price: u64,
    /// Fuel economy for petrol models, range for electric ones.
    pub efficiency: &'static str,
    /// Engine displacement or battery capacity.
    pub power_unit: &'static str,
    pub category: &'static str,
    pub electric: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Offer {
    pub title: &'static str,
    pub description: &'static str,
    pub validity: &'static str,
    pub models: &'static [&'static str],
}

pub const CATALOGUE: &[BikeModel] = &[
    BikeModel { id: "honda_cb_shine", name: "Honda CB Shine", price: 72_000, efficiency: "65 kmpl", power_unit: "125cc", category: "Commuter", electric: false },
    BikeModel { id: "bajaj_pulsar_125", name: "Bajaj Pulsar 125", price: 94_000, efficiency: "52 kmpl", power_unit: "125cc", category: "Sports", electric: false },
    BikeModel { id: "tvs_raider_125", name: "TVS Raider 125", price: 85_000, efficiency: "67 kmpl", power_unit: "125cc", category: "Sporty Commuter", electric: false },
    BikeModel { id: "hero_hf_deluxe", name: "Hero HF Deluxe", price: 65_000, efficiency: "70 kmpl", power_unit: "100cc", category: "Economy", electric: false },
    BikeModel { id: "yamaha_fzs", name: "Yamaha FZS V3", price: 110_000, efficiency: "49 kmpl", power_unit: "149cc", category: "Sports", electric: false },
    BikeModel { id: "royal_enfield_classic", name: "Royal Enfield Classic 350", price: 195_000, efficiency: "41 kmpl", power_unit: "349cc", category: "Cruiser", electric: false },
    BikeModel { id: "ather_450x", name: "Ather 450X", price: 145_000, efficiency: "85 km", power_unit: "2.9 kWh", category: "Performance Scooter", electric: true },
    BikeModel { id: "tvs_iqube", name: "TVS iQube Electric", price: 112_000, efficiency: "75 km", power_unit: "2.25 kWh", category: "Smart Scooter", electric: true },
    BikeModel { id: "bajaj_chetak", name: "Bajaj Chetak Electric", price: 125_000, efficiency: "95 km", power_unit: "2.9 kWh", category: "Classic Scooter", electric: true },
    BikeModel { id: "hero_vida_v1", name: "Hero Vida V1", price: 115_000, efficiency: "110 km", power_unit: "3.44 kWh", category: "Modern Scooter", electric: true },
    BikeModel { id: "ola_s1_pro", name: "Ola S1 Pro", price: 135_000, efficiency: "181 km", power_unit: "3.97 kWh", category: "High-tech Scooter", electric: true },
    BikeModel { id: "simple_one", name: "Simple One", price: 110_000, efficiency: "203 km", power_unit: "4.8 kWh", category: "Long Range Scooter", electric: true },
];

pub const OFFERS: &[Offer] = &[
    Offer {
        title: "Festive Bonanza",
        description: "Up to Rs 15,000 off on select models",
        validity: "Limited period",
        models: &["Honda CB Shine", "Bajaj Pulsar 125"],
    },
    Offer {
        title: "Zero Down Payment",
        description: "Take your bike home with zero down payment",
        validity: "Limited time offer",
        models: &["All models"],
    },
    Offer {
        title: "Exchange Bonus",
        description: "Extra Rs 5,000 on old bike exchange",
        validity: "Ongoing",
        models: &["All models"],
    },
];

pub fn find_model(id: &str) -> Option<&'static BikeModel> {
    CATALOGUE.iter().find(|m| m.id == id)
}
