//! # sg-engine
//!
//! Session-scoped validation for saenggi.
//!
//! - [`store::SessionStore`] keeps sessions, file records, and parsed
//!   documents in memory with one lock per session.
//! - [`orchestrator::Orchestrator`] runs the registered validators over every
//!   cell of every pending file, synchronously or in the background with a
//!   pollable status snapshot.
//! - [`poll::poll_until_terminal`] is the caller-side polling loop.
//! - [`Engine`] ties these together with a classifier.

pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod poll;
pub mod store;

pub use engine::{Engine, Upload};
pub use error::EngineError;
pub use orchestrator::{CANCELLED_REASON, Orchestrator, OrchestratorOptions, STALE_REASON};
pub use poll::{PollPolicy, poll_until_terminal};
pub use store::{NewFile, SessionStore};
