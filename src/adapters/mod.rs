//! Adapters - Concrete implementations of the ports.

pub mod ai;
pub mod market;
pub mod store;
