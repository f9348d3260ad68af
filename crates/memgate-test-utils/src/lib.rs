//! Test helpers shared across memgate crates.

pub mod engine;

pub use engine::{StubCalls, StubEngine};
