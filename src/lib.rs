// src/lib.rs — Library root for redraft

pub mod api;
pub mod cli;
pub mod core;
pub mod evaluator;
pub mod infra;
pub mod provider;
pub mod util;
