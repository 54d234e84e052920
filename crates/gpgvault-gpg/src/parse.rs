//! Parsers for the engine's machine-readable output.

use tracing::warn;

use crate::fingerprint::Fingerprint;

/// Outcome of a keyserver receive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// Number of keys the engine processed (`IMPORT_RES` first field).
    pub count: u32,

    /// Fingerprints reported by `IMPORT_OK`, in engine order.
    pub fingerprints: Vec<Fingerprint>,
}

/// Primary key fingerprints from a `--with-colons --fixed-list-mode
/// --fingerprint` listing, in listing order.
///
/// Only the `fpr` record directly following a `pub` record counts; subkey
/// fingerprints (after `sub`) are skipped.
pub fn primary_fingerprints(listing: &str) -> Vec<Fingerprint> {
    let mut fingerprints = Vec::new();
    let mut in_primary = false;

    for line in listing.lines() {
        let fields: Vec<&str> = line.split(':').collect();
        match fields[0] {
            "pub" | "sec" => in_primary = true,
            "fpr" if in_primary => {
                in_primary = false;
                match fields.get(9).map(|f| Fingerprint::parse(f)) {
                    Some(Ok(fpr)) => fingerprints.push(fpr),
                    _ => warn!(record = line, "unparseable fpr record"),
                }
            }
            "fpr" | "grp" => {}
            _ => in_primary = false,
        }
    }

    fingerprints
}

/// Collect the import summary from `[GNUPG:]` status lines.
pub fn import_result<'a>(status_lines: impl Iterator<Item = &'a str>) -> ImportResult {
    let mut result = ImportResult::default();

    for line in status_lines {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("IMPORT_OK") => {
                // IMPORT_OK <reason> <fingerprint>
                if let Some(fpr) = parts.nth(1).and_then(|f| Fingerprint::parse(f).ok()) {
                    if !result.fingerprints.contains(&fpr) {
                        result.fingerprints.push(fpr);
                    }
                }
            }
            Some("IMPORT_RES") => {
                result.count = parts.next().and_then(|c| c.parse().ok()).unwrap_or(0);
            }
            _ => {}
        }
    }

    result
}
