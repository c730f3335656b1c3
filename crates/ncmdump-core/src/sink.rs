// ── Config sinks ──
//
// Extracted text leaves the pipeline through a `ConfigSink`. Text is
// passed through untouched; the stdout sink only adds a trailing newline
// between devices.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use ncmdump_api::sanitize;

use crate::device::DeviceRecord;

/// Extension of files written by [`FileSink`].
pub const FILE_EXTENSION: &str = "ncm";

/// Where a config ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum Delivery {
    Stdout,
    File(PathBuf),
}

/// Destination for extracted config text.
pub trait ConfigSink {
    fn deliver(&mut self, device: &DeviceRecord, text: &str) -> io::Result<Delivery>;
}

// ── Stdout ───────────────────────────────────────────────────────────

/// Streams each config to a writer (stdout by default), one after another.
pub struct StdoutSink<W: Write = io::Stdout> {
    out: W,
}

impl StdoutSink {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> StdoutSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ConfigSink for StdoutSink<W> {
    fn deliver(&mut self, _device: &DeviceRecord, text: &str) -> io::Result<Delivery> {
        writeln!(self.out, "{text}")?;
        self.out.flush()?;
        Ok(Delivery::Stdout)
    }
}

// ── Files ────────────────────────────────────────────────────────────

/// Writes `<dir>/<sanitized-name>.ncm` per device, replacing any existing
/// file of that name.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Target path for `device`.
    ///
    /// The stem is the sanitized device name (sanitized id if the name is
    /// empty). Path separators are replaced so every file lands in `dir`.
    pub fn path_for(&self, device: &DeviceRecord) -> PathBuf {
        let mut stem = sanitize(&device.name);
        if stem.trim().is_empty() {
            stem = device.node_id();
        }
        let stem: String = stem
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.dir.join(format!("{stem}.{FILE_EXTENSION}"))
    }
}

impl ConfigSink for FileSink {
    fn deliver(&mut self, device: &DeviceRecord, text: &str) -> io::Result<Delivery> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(device);
        fs::write(&path, text)?;
        debug!(path = %path.display(), bytes = text.len(), "wrote config file");
        Ok(Delivery::File(path))
    }
}
