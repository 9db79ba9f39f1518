//! Utility functions module
//!
//! This module contains console helpers: size formatting and the progress
//! adapter bridging byte counts to a rendered bar.

pub mod format;
pub mod progress;

pub use format::*;
pub use progress::*;
