//! Strongly-typed domain types for safer APIs.

mod indices;

pub use indices::VesselIndex;
