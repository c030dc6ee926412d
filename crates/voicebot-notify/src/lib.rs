//! Notification feed for the voicebot session.
//!
//! The feed is the only user-visible failure surface: every recoverable
//! error in the session ends up here as a [`Notification`].

pub mod feed;

pub use feed::NotificationFeed;
pub use voicebot_core::{Notification, Severity};
