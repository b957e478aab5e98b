//! Domain types for the military registration form.
//!
//! Everything here is pure: the rank catalog, the form field model,
//! the validation engine, record assembly and configuration
//! resolution. Nothing in this crate performs I/O.

pub mod config;
pub mod error;
pub mod fields;
pub mod format;
pub mod rank;
pub mod record;
pub mod validation;
