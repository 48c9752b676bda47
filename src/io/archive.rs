//! `.npz` result archives keyed by run identity.
//!
//! Layout of an archive (`n` = vessel index):
//!
//! | Key | Shape | Contents |
//! |-----|-------|----------|
//! | `time` | (Nt+1) | full time grid |
//! | `vessels` | (V) | indices of the recorded vessels |
//! | `v{n}_x` | (N) | node positions |
//! | `v{n}_steps` | (F) | reported step indices |
//! | `v{n}_t` | (F) | reported times |
//! | `v{n}_area` | (F, N) | area per frame |
//! | `v{n}_flow` | (F, N) | flow rate per frame |
//! | `v{n}_pressure` | (F, N) | pressure per frame |

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, ArrayBase, Data, Dimension, Ix1, Ix2, OwnedRepr};
use ndarray_npy::{NpzReader, NpzWriter, ReadableElement, WritableElement};

use crate::simulation::{Frame, Reporter, ResultCache, RunId};
use crate::solver::{SolverError, SolverResult};
use crate::types::VesselIndex;

/// Frames of one vessel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VesselRecord {
    pub positions: Vec<f64>,
    pub steps: Vec<u64>,
    pub times: Vec<f64>,
    pub area: Vec<Vec<f64>>,
    pub flow: Vec<Vec<f64>>,
    pub pressure: Vec<Vec<f64>>,
}

impl VesselRecord {
    /// Number of recorded frames.
    pub fn n_frames(&self) -> usize {
        self.steps.len()
    }

    fn push(&mut self, frame: &Frame<'_>) {
        if self.positions.is_empty() {
            self.positions = frame.positions.to_vec();
        }
        self.steps.push(frame.step as u64);
        self.times.push(frame.time);
        self.area.push(frame.area.to_vec());
        self.flow.push(frame.flow.to_vec());
        self.pressure.push(frame.pressure.to_vec());
    }
}

/// Contents of an archive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Archive {
    pub times: Vec<f64>,
    pub vessels: BTreeMap<VesselIndex, VesselRecord>,
}

impl Archive {
    /// Write to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> SolverResult<()> {
        let file = File::create(path.as_ref())?;
        let mut npz = NpzWriter::new(file);

        add(&mut npz, "time", &Array1::from(self.times.clone()))?;
        let indices: Array1<u64> = self.vessels.keys().map(|v| v.get() as u64).collect();
        add(&mut npz, "vessels", &indices)?;

        for (v, record) in &self.vessels {
            let n = v.get();
            add(&mut npz, &format!("v{n}_x"), &Array1::from(record.positions.clone()))?;
            add(&mut npz, &format!("v{n}_steps"), &Array1::from(record.steps.clone()))?;
            add(&mut npz, &format!("v{n}_t"), &Array1::from(record.times.clone()))?;
            let n_nodes = record.positions.len();
            add(&mut npz, &format!("v{n}_area"), &frames_to_array(&record.area, n_nodes)?)?;
            add(&mut npz, &format!("v{n}_flow"), &frames_to_array(&record.flow, n_nodes)?)?;
            add(&mut npz, &format!("v{n}_pressure"), &frames_to_array(&record.pressure, n_nodes)?)?;
        }

        npz.finish()
            .map_err(|e| SolverError::Archive(format!("failed to finish {}: {e}", path.as_ref().display())))?;
        Ok(())
    }

    /// Read an archive written by [`Archive::write`].
    pub fn read(path: impl AsRef<Path>) -> SolverResult<Self> {
        let file = File::open(path.as_ref())?;
        let mut npz = NpzReader::new(file)
            .map_err(|e| SolverError::Archive(format!("failed to open {}: {e}", path.as_ref().display())))?;

        let times = read_array1::<f64>(&mut npz, "time")?.to_vec();
        let indices = read_array1::<u64>(&mut npz, "vessels")?;

        let mut vessels = BTreeMap::new();
        for &n in indices.iter() {
            let area = read_array2(&mut npz, &format!("v{n}_area"))?;
            let flow = read_array2(&mut npz, &format!("v{n}_flow"))?;
            let pressure = read_array2(&mut npz, &format!("v{n}_pressure"))?;
            let record = VesselRecord {
                positions: read_array1::<f64>(&mut npz, &format!("v{n}_x"))?.to_vec(),
                steps: read_array1::<u64>(&mut npz, &format!("v{n}_steps"))?.to_vec(),
                times: read_array1::<f64>(&mut npz, &format!("v{n}_t"))?.to_vec(),
                area: rows(&area),
                flow: rows(&flow),
                pressure: rows(&pressure),
            };
            vessels.insert(VesselIndex::new(n as usize), record);
        }

        Ok(Self { times, vessels })
    }
}

fn add<S, D>(npz: &mut NpzWriter<File>, name: &str, array: &ArrayBase<S, D>) -> SolverResult<()>
where
    S: Data,
    S::Elem: WritableElement,
    D: Dimension,
{
    npz.add_array(name, array)
        .map_err(|e| SolverError::Archive(format!("failed to write {name}: {e}")))
}

fn frames_to_array(frames: &[Vec<f64>], n_nodes: usize) -> SolverResult<Array2<f64>> {
    let flat: Vec<f64> = frames.iter().flatten().copied().collect();
    Array2::from_shape_vec((frames.len(), n_nodes), flat)
        .map_err(|e| SolverError::Archive(format!("ragged frame matrix: {e}")))
}

fn rows(array: &Array2<f64>) -> Vec<Vec<f64>> {
    array.outer_iter().map(|r| r.to_vec()).collect()
}

fn read_array1<A: ReadableElement>(npz: &mut NpzReader<File>, key: &str) -> SolverResult<Array1<A>> {
    npz.by_name::<OwnedRepr<A>, Ix1>(&format!("{key}.npy"))
        .or_else(|_| npz.by_name::<OwnedRepr<A>, Ix1>(key))
        .map_err(|e| SolverError::Archive(format!("failed to read {key}: {e}")))
}

fn read_array2(npz: &mut NpzReader<File>, key: &str) -> SolverResult<Array2<f64>> {
    npz.by_name::<OwnedRepr<f64>, Ix2>(&format!("{key}.npy"))
        .or_else(|_| npz.by_name::<OwnedRepr<f64>, Ix2>(key))
        .map_err(|e| SolverError::Archive(format!("failed to read {key}: {e}")))
}

// =============================================================================
// Recorder
// =============================================================================

/// Reporter that collects persisted frames and writes them as one archive.
///
/// The archive lands in `dir` under [`RunId::archive_file_name`], which is
/// the path [`ArchiveCache`] checks.
#[derive(Clone, Debug)]
pub struct ArchiveRecorder {
    dir: PathBuf,
    archive: Archive,
    written: Option<PathBuf>,
}

impl ArchiveRecorder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            archive: Archive::default(),
            written: None,
        }
    }

    /// Frames of the current or last run.
    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// Path of the archive written by the last finished run.
    pub fn written(&self) -> Option<&Path> {
        self.written.as_deref()
    }
}

impl Reporter for ArchiveRecorder {
    fn start(&mut self, _run_id: &RunId) {
        self.archive = Archive::default();
        self.written = None;
    }

    fn report(&mut self, frame: &Frame<'_>) {
        if frame.print {
            let p_max = frame.pressure.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            println!(
                "{} step {:>6} t={:.5}s | q_in={:.4e} m³/s | p_max={:.1} Pa",
                frame.vessel, frame.step, frame.time, frame.flow[0], p_max
            );
        }
        if !frame.persist {
            return;
        }
        if self.archive.times.is_empty() {
            self.archive.times = frame.times.to_vec();
        }
        self.archive.vessels.entry(frame.vessel).or_default().push(frame);
    }

    fn finish(&mut self, run_id: &RunId) -> SolverResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(run_id.archive_file_name());
        self.archive.write(&path)?;
        log::info!("archive written to {}", path.display());
        self.written = Some(path);
        Ok(())
    }
}

// =============================================================================
// Cache
// =============================================================================

/// Run cache answered by archive files in a directory.
#[derive(Clone, Debug)]
pub struct ArchiveCache {
    dir: PathBuf,
}

impl ArchiveCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Archive path for `id`.
    pub fn path(&self, id: &RunId) -> PathBuf {
        self.dir.join(id.archive_file_name())
    }
}

impl ResultCache for ArchiveCache {
    fn contains(&self, id: &RunId) -> bool {
        self.path(id).is_file()
    }

    /// Writes an empty archive unless a recorder already produced one.
    fn commit(&mut self, id: &RunId) -> SolverResult<()> {
        let path = self.path(id);
        if path.is_file() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.dir)?;
        Archive::default().write(&path)
    }
}
