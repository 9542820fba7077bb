//! Shared test helpers
//!
//! `mock_service` runs an in-process stand-in for the training service;
//! `datasets` builds wizard inputs.

#![allow(dead_code)]

pub mod datasets;
pub mod mock_service;
