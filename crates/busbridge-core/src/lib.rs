//! busbridge-core - Wire contract for busbridge adaptors
//!
//! Everything in this crate is shared byte-for-byte between the code generator
//! and the runtime that generated code links against. Changing any of it is a
//! wire-breaking change: independently built clients and servers stop routing
//! to each other.
//!
//! - [`subject`] maps a service method to its bus subject
//! - [`ERROR_HEADER`] / [`ERROR_CODE_HEADER`] carry failures out of band
//! - [`ERROR_CODE`] is the reserved failure code

mod subject;
mod wire;

pub use subject::{SUBJECT_SERVICE_SEGMENT, subject};
pub use wire::{ERROR_CODE, ERROR_CODE_HEADER, ERROR_HEADER};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{ERROR_CODE, ERROR_CODE_HEADER, ERROR_HEADER, subject};
}
