//! # gauntlet-challenge
//!
//! TOML-driven challenge descriptions for the gauntlet engine.
//!
//! ## Overview
//!
//! This crate provides [`ChallengeDescription`], which implements the
//! [`NextStepsEngine`](gauntlet_core::traits::NextStepsEngine) trait.  Steps
//! and transitions are declared in a TOML file and validated once at load
//! time; a file that loads is a table the engine can trust.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use gauntlet_challenge::ChallengeDescription;
//!
//! let challenge = ChallengeDescription::from_file(Path::new("challenges/two_stage.toml"))?;
//! // Call `challenge.get_next_steps(&status)` on every status update.
//! ```

pub mod config;
pub mod description;

pub use config::{ChallengeConfig, StepConfig, TransitionConfig};
pub use description::ChallengeDescription;

// ── Tests ─────────────────────────────────────────────────────────────────────
