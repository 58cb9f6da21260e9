//! Shared helpers for the integration tests: CSV fixtures and seeded
//! synthetic tables

#![allow(dead_code)]

pub mod test_utils;

// each test crate uses a different subset
#[allow(unused_imports)]
pub use test_utils::{classification_rows, create_test_csv, regression_rows, TempTestFile};
