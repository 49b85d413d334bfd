//! Domain types and the pricing engine
//!
//! Everything in here is synchronous and free of I/O.

pub mod analysis;
pub mod coerce;
pub mod pricing;
pub mod projects;
pub mod summary;
pub mod validation;

// Re-export commonly used types
pub use analysis::*;
pub use pricing::*;
pub use projects::*;
pub use validation::*;
