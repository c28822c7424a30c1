//! Daily rotation of the log files into a dated zip archive.

use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::ArchiveError;
use crate::{PERFORMANCE_LOG_FILENAME, PROCESSES_LOG_FILENAME};

const MAX_NAME_ATTEMPTS: u32 = 100;

#[derive(Clone, Debug, PartialEq)]
pub enum ArchiveOutcome {
    /// At least one log file was missing; nothing was written.
    Skipped,
    Archived(PathBuf),
}

#[derive(Clone, Copy, Debug)]
pub struct Archiver {
    compression: CompressionMethod,
}

impl Default for Archiver {
    fn default() -> Self {
        Archiver {
            compression: CompressionMethod::Deflated,
        }
    }
}

impl Archiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compress both log files in `logs_folder` into an archive named after
    /// `now`. The log files themselves are left in place; see [`remove_logs`].
    pub fn archive_and_rotate(
        &self,
        logs_folder: &Path,
        now: DateTime<Local>,
    ) -> Result<ArchiveOutcome, ArchiveError> {
        let sources = [
            logs_folder.join(PERFORMANCE_LOG_FILENAME),
            logs_folder.join(PROCESSES_LOG_FILENAME),
        ];
        if sources.iter().any(|p| !p.is_file()) {
            return Ok(ArchiveOutcome::Skipped);
        }

        let (archive_path, file) = create_archive_file(logs_folder, now)?;
        if let Err(e) = self.write_entries(file, &archive_path, &sources) {
            let _ = fs::remove_file(&archive_path);
            return Err(e);
        }
        Ok(ArchiveOutcome::Archived(archive_path))
    }

    fn write_entries(
        &self,
        file: File,
        archive_path: &Path,
        sources: &[PathBuf],
    ) -> Result<(), ArchiveError> {
        let options = SimpleFileOptions::default().compression_method(self.compression);
        let mut zip = ZipWriter::new(file);

        for source in sources {
            let entry_name = source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            zip.start_file(entry_name, options)
                .map_err(|e| ArchiveError::zip(archive_path, e))?;
            let mut input = File::open(source).map_err(|e| ArchiveError::io(source, e))?;
            io::copy(&mut input, &mut zip).map_err(|e| ArchiveError::io(archive_path, e))?;
        }

        let file = zip
            .finish()
            .map_err(|e| ArchiveError::zip(archive_path, e))?;
        file.sync_all()
            .map_err(|e| ArchiveError::io(archive_path, e))
    }
}

/// Archive file names to try for `now`, in order: `DD_MM_YYYY.zip`, then
/// `DD_MM_YYYY_HHMMSS.zip`, then numbered variants of the latter.
pub fn archive_names(now: DateTime<Local>) -> impl Iterator<Item = String> {
    let day = now.format("%d_%m_%Y").to_string();
    let stamped = now.format("%d_%m_%Y_%H%M%S").to_string();
    let numbered = stamped.clone();
    [format!("{day}.zip"), format!("{stamped}.zip")]
        .into_iter()
        .chain((2..MAX_NAME_ATTEMPTS).map(move |n| format!("{numbered}_{n}.zip")))
}

fn create_archive_file(
    folder: &Path,
    now: DateTime<Local>,
) -> Result<(PathBuf, File), ArchiveError> {
    let mut last = folder.to_path_buf();
    for name in archive_names(now) {
        let path = folder.join(name);
        match File::options().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => last = path,
            Err(e) => return Err(ArchiveError::io(path, e)),
        }
    }
    Err(ArchiveError::io(
        last,
        io::Error::new(ErrorKind::AlreadyExists, "no free archive name for today"),
    ))
}

/// Delete both log files from `logs_folder`. Files that are already gone are
/// not an error.
pub fn remove_logs(logs_folder: &Path) -> Result<(), ArchiveError> {
    for name in [PERFORMANCE_LOG_FILENAME, PROCESSES_LOG_FILENAME] {
        let path = logs_folder.join(name);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(ArchiveError::io(path, e)),
        }
    }
    Ok(())
}
