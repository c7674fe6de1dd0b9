//! Common test infrastructure
//!
//! Every end-to-end test builds a [`TestLake`]: a temporary directory holding
//! an input tree with sample song and log files, and an empty output tree.
//! Tests should only import from this module, not from internal submodules.

mod constants;
mod fixtures;

// Public API - this is what tests import
pub use constants::*;
pub use fixtures::{songplay_rows, TestLake};
