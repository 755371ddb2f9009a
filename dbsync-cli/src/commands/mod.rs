//! CLI command implementations.

pub mod apply;
pub mod diff;
pub mod validate;
pub mod version;
