// src/evaluator/mod.rs — Judge and aggregator

pub mod aggregate;
pub mod judge;
pub mod parser;
pub mod rubric;

pub use aggregate::{Aggregate, Aggregator, Feedbacks};
pub use judge::{Judge, Judged};
