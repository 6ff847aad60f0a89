//! Host-facing bindings for the notebook review core.

pub mod api;
