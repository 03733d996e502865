//! UTMB runner database integration
//!
//! Searches utmb.world for a runner by name, sex and nationality. Used to
//! attach UTMB index, age group and profile link to start-list participants.

pub mod dto;
mod adapter;
mod client;

pub use adapter::to_candidates;
pub use client::UtmbClient;
