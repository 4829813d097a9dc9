#[macro_use]
pub mod macros;

pub mod collections;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod id;
pub mod markers;
pub mod printer;
pub mod resolve;
pub mod tree;
pub mod visitor;

// Re-export commonly used items for convenience
pub use tracing;

// Alias for error types
pub type Error = crate::error::Error;
pub type Result<T> = crate::error::Result<T>;
