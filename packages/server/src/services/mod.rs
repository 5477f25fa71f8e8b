//! Core of the system: identity, sessions, participation, scoring and
//! aggregation. Handlers stay thin and call into these functions.

pub mod admin;
pub mod aggregation;
pub mod guard;
pub mod identity;
pub mod participation;
pub mod scoring;
pub mod session;
pub mod tenant;
