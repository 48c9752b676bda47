//! Result persistence.
//!
//! - [`ArchiveRecorder`]: reporter writing every persisted frame of a run to
//!   `.{run_id}_archive.npz`
//! - [`ArchiveCache`]: run-identity cache answered by those archive files
//! - [`Archive`]: in-memory form of an archive, readable back from disk
//!
//! # Example
//!
//! ```ignore
//! use artery_fd::io::{ArchiveCache, ArchiveRecorder};
//!
//! let mut solver = solver.with_cache(ArchiveCache::new("results"));
//! let mut recorder = ArchiveRecorder::new("results");
//! solver.solve("aorta", Some(&mut recorder), 100)?;
//! ```

mod archive;

pub use archive::{Archive, ArchiveCache, ArchiveRecorder, VesselRecord};
