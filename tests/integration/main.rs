//! Integration tests for Page-Audit
//!
//! These tests use wiremock to create mock HTTP servers and drive the
//! fetch, evaluate and store pipeline end-to-end.

mod batch_tests;
mod common;
mod executor_tests;
mod fetcher_tests;
