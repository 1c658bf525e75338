//! # gauntlet-core
//!
//! The step-transition engine behind submission evaluation.
//!
//! This crate provides:
//! - [`StepGraph`] — the immutable dependency graph with ancestor queries
//! - [`ChallengeTransitions`] — the validated, ordered transition table
//! - [`sanitize`](sanitize::sanitize) — cleanup of noisy status snapshots
//! - [`decide`](decide::decide) — the pure next-steps decision function
//! - [`NextStepsEngine`] — the single call the orchestration layer integrates
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gauntlet_core::{ChallengeTransitions, NextStepsEngine};
//!
//! let table = ChallengeTransitions::single_step("lf")?;
//! let decision = table.get_next_steps(&status)?;
//! ```

pub mod decide;
pub mod engine;
pub mod graph;
pub mod sanitize;
pub mod traits;
pub mod transitions;

pub use graph::StepGraph;
pub use traits::NextStepsEngine;
pub use transitions::ChallengeTransitions;
