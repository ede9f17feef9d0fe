//! Common test infrastructure
//!
//! Builds throwaway data trees and databases for end-to-end load tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestDataset, SONG_1_ID};
//!
//! #[test]
//! fn test_load() {
//!     let dataset = TestDataset::new();
//!     dataset.write_song_file("A/A/A/TRAAAAW128F429D538.json", &[common::song_1_json()]);
//! }
//! ```

mod constants;
mod fixtures;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{matching_play_json, song_1_json, unmatched_play_json, TestDataset};
