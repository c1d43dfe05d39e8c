//! Outbound adapters: implementations of the domain's ports against
//! external systems.

pub mod persistence;
