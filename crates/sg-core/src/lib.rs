//! # sg-core
//!
//! Core types, ID generation, and error types for saenggi.
//!
//! This crate provides the foundational types shared across all saenggi crates:
//! - Entity structs for the exchange contract (sessions, file records, findings,
//!   validation results, async run status)
//! - Status enums with state machine transitions
//! - ID prefix constants and generators
//! - Highlight marker construction and reconstruction
//! - Cross-cutting error types
//! - Response envelopes returned to UI/CLI consumers

pub mod entities;
pub mod enums;
pub mod errors;
pub mod highlight;
pub mod ids;
pub mod responses;
