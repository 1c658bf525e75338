//! # gauntlet-contracts
//!
//! Shared vocabulary for the gauntlet step-transition engine.
//!
//! All crates in the workspace import from here. No decision logic lives in
//! this crate — only the closed status vocabularies, graph node and
//! transition types, the decision value, and error types.

pub mod decision;
pub mod error;
pub mod status;
pub mod transition;
