//! Session controller composing voice I/O, command recognition, message
//! dispatch, notifications and the metrics/report pipeline.

pub mod controller;
pub mod error;

pub use controller::{Collaborators, SessionController, UtteranceOutcome};
pub use error::SessionError;
