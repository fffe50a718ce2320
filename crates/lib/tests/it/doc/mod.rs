//! Document integration tests
//!
//! This module tests the path codec, raw navigation, the Doc addressing verbs,
//! value conversions and the JSON bridge.

mod json_tests;
mod value_tests;
