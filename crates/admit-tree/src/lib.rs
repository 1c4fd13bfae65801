//! Program ranking for university applicants.
//!
//! [`matching`] holds the scoring engine; the remaining modules load the
//! catalog, expose the engine over HTTP, and proxy free-form chat.

pub mod catalog;
pub mod chat;
pub mod config;
pub mod error;
pub mod matching;
pub mod recommend;
pub mod telemetry;
