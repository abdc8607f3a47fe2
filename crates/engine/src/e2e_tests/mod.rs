//! End-to-end scenario tests.
//!
//! These drive a complete [`App`](crate::app::App) over in-memory storage
//! through whole gameplay flows: building territory under a power budget,
//! raiding, diplomacy, and persistence across a restart.
//!
//! # Running
//!
//! ```bash
//! cargo test -p territory-engine --lib e2e_tests
//! ```

mod diplomacy_tests;
