use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

/// Append-only log sink partitioned by date.
///
/// Lines land in `<root>/<year>/<month>/<day>/<file>`, each prefixed with a
/// local timestamp. Directories are created on first write. This is a side
/// channel for request diagnostics; ambient logging stays on `tracing`.
#[derive(Debug, Clone)]
pub struct DatedLogSink {
    root: PathBuf,
}

impl DatedLogSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Appends one timestamped line to today's partition of `file`.
    pub fn append(&self, file: &str, message: &str) -> io::Result<()> {
        let now = Local::now();
        let dir = self
            .root
            .join(now.format("%Y").to_string())
            .join(now.format("%m").to_string())
            .join(now.format("%d").to_string());
        fs::create_dir_all(&dir)?;

        let mut handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(file))?;
        writeln!(handle, "{} - {}", now.format("%Y-%m-%d %H:%M:%S"), message)
    }
}

impl Default for DatedLogSink {
    fn default() -> Self {
        Self::new("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bridge-logs-{}-{}", name, std::process::id()))
    }

    #[test]
    fn append_creates_dated_partition() {
        let root = temp_root("partition");
        let sink = DatedLogSink::new(&root);
        sink.append("error.log", "first line").unwrap();
        sink.append("error.log", "second line").unwrap();

        let now = Local::now();
        let path = root
            .join(now.format("%Y").to_string())
            .join(now.format("%m").to_string())
            .join(now.format("%d").to_string())
            .join("error.log");
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.contains("first line"));
        assert!(contents.contains("second line"));

        fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn lines_carry_timestamp_prefix() {
        let root = temp_root("timestamp");
        let sink = DatedLogSink::new(&root);
        sink.append("calls.log", "registered").unwrap();

        let now = Local::now();
        let path = root
            .join(now.format("%Y").to_string())
            .join(now.format("%m").to_string())
            .join(now.format("%d").to_string())
            .join("calls.log");
        let contents = fs::read_to_string(&path).unwrap();
        let line = contents.lines().next().unwrap();
        assert!(line.contains(" - registered"));
        // "YYYY-MM-DD HH:MM:SS" prefix
        assert_eq!(line.split(" - ").next().unwrap().len(), 19);

        fs::remove_dir_all(&root).unwrap();
    }
}
