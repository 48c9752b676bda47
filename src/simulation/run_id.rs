//! Run identity: case name plus a digest of the time grid.

use std::fmt;

use sha1::{Digest, Sha1};

/// Identity of a solve, derived from the case name, Δt and T.
///
/// Two solves with the same identity produce the same result, so a persisted
/// artifact for an identity lets a later solve short-circuit.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RunId(String);

impl RunId {
    /// `case_name` followed by the hex SHA-1 of `"{dt}_{total_time}_"`.
    ///
    /// Both numbers are written in Python's `repr` form (`1e-05`, `0.0001`,
    /// `1.0`), so identities and archive names match those of pylsewave runs.
    pub fn new(case_name: &str, dt: f64, total_time: f64) -> Self {
        let key = format!("{}_{}_", python_repr(dt), python_repr(total_time));
        let digest = Sha1::digest(key.as_bytes());
        let mut id = String::with_capacity(case_name.len() + 2 * digest.len());
        id.push_str(case_name);
        for byte in digest.iter() {
            id.push_str(&format!("{byte:02x}"));
        }
        Self(id)
    }

    /// The identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the archive persisted for this run.
    pub fn archive_file_name(&self) -> String {
        format!(".{}_archive.npz", self.0)
    }
}

/// Shortest round-trip form of `x`, laid out like Python's `float.__repr__`.
///
/// Scientific notation below 1e-4 and from 1e16 up, with a signed exponent of
/// at least two digits; positional notation with a trailing `.0` otherwise.
fn python_repr(x: f64) -> String {
    if !x.is_finite() || x == 0.0 {
        return format!("{x:?}");
    }
    let sci = format!("{x:e}");
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return sci;
    };
    if (-4..16).contains(&exponent) {
        let plain = format!("{x}");
        if plain.contains('.') { plain } else { format!("{plain}.0") }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_is_deterministic() {
        let a = RunId::new("aorta", 1e-4, 1.0);
        let b = RunId::new("aorta", 1e-4, 1.0);
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("aorta"));
        assert_eq!(a.as_str().len(), "aorta".len() + 40);
    }

    #[test]
    fn test_run_id_depends_on_inputs() {
        let base = RunId::new("aorta", 1e-4, 1.0);
        assert_ne!(base, RunId::new("aorta", 2e-4, 1.0));
        assert_ne!(base, RunId::new("aorta", 1e-4, 2.0));
        assert_ne!(base, RunId::new("carotid", 1e-4, 1.0));
    }

    #[test]
    fn test_known_digest() {
        // sha1("0.001_1.0_")
        let id = RunId::new("", 0.001, 1.0);
        let expected = Sha1::digest(b"0.001_1.0_");
        let hex: String = expected.iter().map(|b| format!("{b:02x}")).collect();
        assert_eq!(id.as_str(), hex);
    }

    #[test]
    fn test_python_repr_layout() {
        assert_eq!(python_repr(1e-5), "1e-05");
        assert_eq!(python_repr(2.5e-5), "2.5e-05");
        assert_eq!(python_repr(1e-4), "0.0001");
        assert_eq!(python_repr(0.001), "0.001");
        assert_eq!(python_repr(1.0), "1.0");
        assert_eq!(python_repr(0.8), "0.8");
        assert_eq!(python_repr(12.0), "12.0");
        assert_eq!(python_repr(1e15), "1000000000000000.0");
        assert_eq!(python_repr(1e16), "1e+16");
        assert_eq!(python_repr(1.5e-100), "1.5e-100");
    }

    #[test]
    fn test_digest_uses_python_float_form() {
        // sha1("1e-05_0.8_")
        let id = RunId::new("", 1e-5, 0.8);
        let expected = Sha1::digest(b"1e-05_0.8_");
        let hex: String = expected.iter().map(|b| format!("{b:02x}")).collect();
        assert_eq!(id.as_str(), hex);
    }

    #[test]
    fn test_archive_file_name() {
        let id = RunId::new("case", 0.5, 1.0);
        let name = id.archive_file_name();
        assert!(name.starts_with(".case"));
        assert!(name.ends_with("_archive.npz"));
    }
}
