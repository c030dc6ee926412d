//! Voice command recognition.
//!
//! Maps an utterance to a zero-argument local action before it reaches the
//! message dispatcher. Matching is a case-insensitive substring search over
//! an ordered trigger table; the first trigger in declared order wins.

pub mod action;
pub mod recognizer;

pub use action::CommandAction;
pub use recognizer::{CommandError, CommandRecognizer, CommandRule};
