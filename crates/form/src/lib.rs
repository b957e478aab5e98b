//! `muster-form` library crate.
//!
//! The client side of the registration form: field state, the
//! geolocation adapter, feedback overlays and the submission pipeline.
//! The binary entrypoint in `main.rs` drives them from a terminal.

pub mod feedback;
pub mod form;
pub mod geolocation;
pub mod pipeline;
pub mod state;
