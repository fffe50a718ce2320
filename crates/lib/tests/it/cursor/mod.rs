//! Cursor integration tests
//!
//! This module tests the cursor lifecycle, paging through a fetcher,
//! failure recovery and the in-memory collection backend.

mod memory_tests;
mod paging_tests;
mod state_tests;
