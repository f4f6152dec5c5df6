// src/core/mod.rs — Refine loop: state, gate, rewrite and the controller

pub mod gate;
pub mod orchestrator;
pub mod reviser;
pub mod types;
