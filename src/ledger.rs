use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

/// File-backed ledger of already-processed lead IDs.
///
/// One ID per line. A missing file reads as an empty ledger so the
/// first sync run needs no setup.
#[derive(Debug, Clone)]
pub struct ProcessedLedger {
    path: PathBuf,
}

impl ProcessedLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads all recorded lead IDs.
    pub fn load(&self) -> io::Result<Vec<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Appends one lead ID to the ledger.
    pub fn record(&self, lead_id: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(handle, "{}", lead_id)
    }
}
