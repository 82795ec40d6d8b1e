//! Internal test modules - whitebox tests with crate access
//!
//! Harness-based acceptance tests that drive a page through clicks, fragment
//! changes and the public operations, then inspect the resulting markup.

mod acceptance_lifecycle;
