//! Test utilities shared across crate-level unit tests.

pub mod matchers;

pub use matchers::{
    assert_failed_with, assert_invalid, assert_pending, assert_succeeded_with, describe,
    mismatched_properties,
};
