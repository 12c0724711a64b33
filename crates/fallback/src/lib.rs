//! Rule-Based Fallback Replies
//!
//! Provides canned supportive replies when the generative AI service is
//! unconfigured or failing.

mod responder;

pub use responder::{FallbackReason, FallbackResponder, ReplyTopic};
