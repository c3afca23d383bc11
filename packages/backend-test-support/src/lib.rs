//! Backend test support utilities
//!
//! Shared logging bootstrap and problem-details assertions for the
//! backend's unit and integration tests.

pub mod logging;
pub mod problem_details;
