//! Adapter implementations for the leave ports.

pub mod memory;
pub mod postgres;
