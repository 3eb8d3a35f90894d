//! Core types and trait definitions for the kotoba vocabulary corpus.
//!
//! This crate is deliberately free of subprocess and database dependencies.
//! All other crates depend on it; it depends on nothing heavier than serde.

pub mod error;
pub mod ingest;
pub mod rank;
pub mod schedule;
pub mod sentence;
pub mod store;
pub mod tokenize;
pub mod word;

pub use error::{Error, Result};
