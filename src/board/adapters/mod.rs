//! Adapter implementations for the board store port.

pub mod memory;
pub mod postgres;
