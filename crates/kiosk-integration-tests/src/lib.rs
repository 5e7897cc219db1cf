//! Integration test crate for the Kiosk marketplace.
//!
//! This crate has no library code — it only contains integration tests
//! that exercise end-to-end ledger flows across multiple workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p kiosk-integration-tests
//! ```
