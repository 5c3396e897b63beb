//! Gzipped tar archives of the bundle directory
//!
//! Archives are rooted at the bundle directory itself, so extracting one
//! into an empty directory reproduces the original relative layout.
//! Both functions block; async callers run them on the blocking pool.

use crate::error::{CacheError, CacheResult, ExtractStep};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name the archive is moved to inside the bundle before unpacking
pub const INNER_ARCHIVE_NAME: &str = "bundle_cache.tar.gz";

/// A compressed archive on local disk, used as the transfer intermediate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingArchive {
    path: PathBuf,
}

impl StagingArchive {
    /// Wrap an archive that already exists at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the archive file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Archive the full contents of `source_dir` into `archive_path`
pub fn build(source_dir: &Path, archive_path: &Path) -> CacheResult<StagingArchive> {
    let failed = |reason: String| CacheError::ArchiveBuildFailed {
        path: source_dir.to_path_buf(),
        reason,
    };

    if !source_dir.is_dir() {
        return Err(failed("not a directory".to_string()));
    }

    if let Some(parent) = archive_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| failed(format!("creating {}: {}", parent.display(), e)))?;
    }

    let file = File::create(archive_path)
        .map_err(|e| failed(format!("creating {}: {}", archive_path.display(), e)))?;

    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);
    builder
        .append_dir_all(".", source_dir)
        .map_err(|e| failed(e.to_string()))?;

    let mut writer = builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .map_err(|e| failed(e.to_string()))?;
    writer.flush().map_err(|e| failed(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| failed(e.into_error().to_string()))?
        .sync_all()
        .map_err(|e| failed(e.to_string()))?;

    debug!(
        "Archived {} into {}",
        source_dir.display(),
        archive_path.display()
    );
    Ok(StagingArchive::new(archive_path))
}

/// Unpack `archive` into a new `bundle_dir`
///
/// Creating the directory is what enforces "no bundle yet": if it already
/// exists the extraction is refused. Every later step can fail on its own;
/// nothing is rolled back, so a failed unpack leaves partial content behind.
pub fn extract(archive: &StagingArchive, bundle_dir: &Path) -> CacheResult<()> {
    fs::create_dir(bundle_dir).map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => {
            CacheError::DirectoryAlreadyExists(bundle_dir.to_path_buf())
        }
        _ => CacheError::extract(ExtractStep::CreateDir, e),
    })?;

    let inner = bundle_dir.join(INNER_ARCHIVE_NAME);
    move_file(archive.path(), &inner).map_err(|e| CacheError::extract(ExtractStep::Move, e))?;

    unpack(&inner, bundle_dir).map_err(|e| CacheError::extract(ExtractStep::Unpack, e))?;

    fs::remove_file(&inner).map_err(|e| CacheError::extract(ExtractStep::RemoveArchive, e))?;

    debug!("Extracted archive into {}", bundle_dir.display());
    Ok(())
}

fn unpack(archive_path: &Path, destination: &Path) -> io::Result<()> {
    let file = File::open(archive_path)?;
    let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    archive.set_preserve_permissions(true);
    archive.set_overwrite(true);
    archive.unpack(destination)
}

/// Rename, falling back to copy + remove across filesystems
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!(
                "Rename {} -> {} failed ({}), copying instead",
                from.display(),
                to.display(),
                e
            );
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}
