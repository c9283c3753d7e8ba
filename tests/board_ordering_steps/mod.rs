//! Step definitions for board ordering scenarios.

pub mod then;
pub mod when;
pub mod world;
