//! Configuration model for lockman.
//!
//! The config file is YAML. Parsing is forward compatible (unknown fields are
//! ignored), every field has a default, and values are validated after load.

mod model;
mod operations;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::Config;
pub use types::GrantPolicy;
