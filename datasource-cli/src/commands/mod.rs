//! CLI command implementations.

pub mod drivers;
pub mod resolve;
pub mod version;
