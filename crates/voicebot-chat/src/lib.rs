//! Message dispatch for the voicebot session.
//!
//! A user utterance is appended to the transcript, sent once to the remote
//! chat service under a client-side timeout, and answered either with the
//! service's reply or with a deterministic local fallback. Every turn ends
//! with exactly one assistant entry.

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod fallback;
pub mod transcript;

pub use client::{ChatClient, ChatReply, ChatRequest, HttpChatClient, RequestContext};
pub use dispatcher::{DispatchContext, MessageDispatcher};
pub use error::ChatError;
pub use fallback::{FallbackReply, FallbackResponder};
pub use transcript::{QuickReplies, Transcript};
