//! Append-only conversation transcript and the one-shot quick-reply set.

use std::sync::Mutex;

use serde::Serialize;
use voicebot_core::{EventBus, SessionEvent, Speaker, TranscriptEntry, TurnId};

/// Suggested replies offered after an assistant entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickReplies {
    pub turn: TurnId,
    pub replies: Vec<String>,
}

#[derive(Default)]
struct TranscriptInner {
    entries: Vec<TranscriptEntry>,
    quick_replies: Option<QuickReplies>,
    latest_user_turn: Option<TurnId>,
}

/// Ordered log of transcript entries. Entries are never changed or removed.
pub struct Transcript {
    inner: Mutex<TranscriptInner>,
    events: EventBus,
}

impl Transcript {
    pub fn new(events: EventBus) -> Self {
        Self {
            inner: Mutex::new(TranscriptInner::default()),
            events,
        }
    }

    /// Append an entry. A user entry clears any active quick replies.
    pub fn append(&self, entry: TranscriptEntry) {
        let cleared = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            let cleared = if entry.speaker == Speaker::User {
                inner.latest_user_turn = entry.turn;
                inner.quick_replies.take().is_some()
            } else {
                false
            };
            inner.entries.push(entry.clone());
            cleared
        };

        if cleared {
            self.events.publish(SessionEvent::QuickRepliesCleared);
        }
        self.events.publish(SessionEvent::TranscriptAppended { entry });
    }

    /// Offer `replies` for `turn`.
    ///
    /// Ignored when `replies` is empty or when a newer user turn has already
    /// been appended, so suggestions never outlive the turn they answer.
    /// Returns whether the set was offered.
    pub fn offer_quick_replies(&self, turn: TurnId, replies: Vec<String>) -> bool {
        if replies.is_empty() {
            return false;
        }
        {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            if inner.latest_user_turn != Some(turn) {
                tracing::debug!(turn = %turn, "Stale quick replies dropped");
                return false;
            }
            inner.quick_replies = Some(QuickReplies {
                turn,
                replies: replies.clone(),
            });
        }
        self.events
            .publish(SessionEvent::QuickRepliesOffered { turn, replies });
        true
    }

    pub fn quick_replies(&self) -> Option<QuickReplies> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .quick_replies
            .clone()
    }

    /// Consume the active set and return the reply at `index`.
    ///
    /// An out-of-range index leaves the set in place and returns `None`.
    pub fn take_quick_reply(&self, index: usize) -> Option<String> {
        let chosen = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            let reply = inner.quick_replies.as_ref()?.replies.get(index)?.clone();
            inner.quick_replies = None;
            reply
        };
        self.events.publish(SessionEvent::QuickRepliesCleared);
        Some(chosen)
    }

    pub fn entries(&self) -> Vec<TranscriptEntry> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count_by_speaker(&self, speaker: Speaker) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .iter()
            .filter(|e| e.speaker == speaker)
            .count()
    }

    /// The assistant entry answering `turn`, if it has been appended.
    pub fn reply_for(&self, turn: TurnId) -> Option<TranscriptEntry> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .iter()
            .find(|e| e.speaker == Speaker::Assistant && e.turn == Some(turn))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voicebot_core::{InputModality, ReplySource};

    fn transcript() -> Transcript {
        Transcript::new(EventBus::new())
    }

    #[test]
    fn test_append_preserves_order() {
        let t = transcript();
        t.append(TranscriptEntry::user(TurnId(1), "hi", InputModality::Typed));
        t.append(TranscriptEntry::assistant(TurnId(1), "hello", ReplySource::Remote, None));
        t.append(TranscriptEntry::system("report ready"));

        let entries = t.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].speaker, Speaker::User);
        assert_eq!(entries[1].speaker, Speaker::Assistant);
        assert_eq!(entries[2].speaker, Speaker::System);
        assert_eq!(t.count_by_speaker(Speaker::User), 1);
    }

    #[test]
    fn test_quick_replies_cleared_by_next_user_entry() {
        let t = transcript();
        t.append(TranscriptEntry::user(TurnId(1), "prices?", InputModality::Typed));
        assert!(t.offer_quick_replies(TurnId(1), vec!["EMI".into(), "Test ride".into()]));
        assert_eq!(t.quick_replies().unwrap().replies.len(), 2);

        t.append(TranscriptEntry::user(TurnId(2), "something else", InputModality::Voice));
        assert!(t.quick_replies().is_none());
    }

    #[test]
    fn test_system_entry_keeps_quick_replies() {
        let t = transcript();
        t.append(TranscriptEntry::user(TurnId(1), "q", InputModality::Typed));
        t.offer_quick_replies(TurnId(1), vec!["A".into()]);
        t.append(TranscriptEntry::system("metrics refreshed"));
        assert!(t.quick_replies().is_some());
    }

    #[test]
    fn test_stale_offer_dropped() {
        let t = transcript();
        t.append(TranscriptEntry::user(TurnId(1), "first", InputModality::Typed));
        t.append(TranscriptEntry::user(TurnId(2), "second", InputModality::Typed));
        assert!(!t.offer_quick_replies(TurnId(1), vec!["late".into()]));
        assert!(t.quick_replies().is_none());
    }

    #[test]
    fn test_empty_offer_ignored() {
        let t = transcript();
        t.append(TranscriptEntry::user(TurnId(1), "q", InputModality::Typed));
        assert!(!t.offer_quick_replies(TurnId(1), vec![]));
    }

    #[test]
    fn test_take_quick_reply_is_one_shot() {
        let t = transcript();
        t.append(TranscriptEntry::user(TurnId(1), "q", InputModality::Typed));
        t.offer_quick_replies(TurnId(1), vec!["A".into(), "B".into()]);

        assert!(t.take_quick_reply(5).is_none());
        assert!(t.quick_replies().is_some());

        assert_eq!(t.take_quick_reply(1).as_deref(), Some("B"));
        assert!(t.take_quick_reply(0).is_none());
    }

    #[test]
    fn test_reply_for_turn() {
        let t = transcript();
        t.append(TranscriptEntry::user(TurnId(7), "q", InputModality::Typed));
        assert!(t.reply_for(TurnId(7)).is_none());
        t.append(TranscriptEntry::assistant(TurnId(7), "a", ReplySource::Fallback, None));
        assert_eq!(t.reply_for(TurnId(7)).unwrap().text, "a");
    }

    #[tokio::test]
    async fn test_events_published() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let t = Transcript::new(bus);
        t.append(TranscriptEntry::user(TurnId(1), "q", InputModality::Typed));
        t.offer_quick_replies(TurnId(1), vec!["A".into()]);
        t.append(TranscriptEntry::user(TurnId(2), "next", InputModality::Typed));

        let names: Vec<&str> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.event_name())
            .collect();
        assert_eq!(
            names,
            vec![
                "transcript_appended",
                "quick_replies_offered",
                "quick_replies_cleared",
                "transcript_appended",
            ]
        );
    }
}
