//! Vessel network representation.
//!
//! - [`Vessel`]: one segment with uniform nodes, tapered radius, wall stiffness
//!   and an optional Windkessel terminal
//! - [`VesselNetwork`]: the ordered list of vessels; identity is list position

mod network;
mod vessel;

pub use network::VesselNetwork;
pub use vessel::{FaceOffset, SampledGeometry, Vessel, WallStiffness, Windkessel, wall_thickness};
