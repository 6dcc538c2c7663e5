//! Integration tests for Argot.

pub mod dispatch_test;
pub mod parsing_test;
pub mod schema_test;
