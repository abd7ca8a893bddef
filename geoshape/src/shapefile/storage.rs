//! File access for a `.shp`/`.shx` pair.
//!
//! Every read and write is a single seek followed by one `read_exact` or
//! `write_all` on the file it targets.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::debug;

use super::constants::{SHP_EXTENSIONS, SHX_EXTENSIONS};
use crate::config::AccessMode;
use crate::errors::{ErrorKind, GeoShapeError, GeoShapeResult};

/// The two open files of a shapefile.
#[derive(Debug)]
pub(crate) struct FilePair {
    pub(crate) shp: File,
    pub(crate) shx: File,
    pub(crate) shp_path: PathBuf,
    pub(crate) shx_path: PathBuf,
}

impl FilePair {
    /// Opens an existing pair. `path` may name either file or the bare base
    /// name; lower-case extensions are tried before upper-case ones.
    pub(crate) fn open(path: &Path, mode: AccessMode) -> GeoShapeResult<FilePair> {
        let base = base_name(path);
        let (shp, shp_path) = open_first(&base, &SHP_EXTENSIONS, mode)?;
        let (shx, shx_path) = open_first(&base, &SHX_EXTENSIONS, mode)?;
        debug!(
            "opened {} and {} ({})",
            shp_path.display(),
            shx_path.display(),
            mode
        );
        Ok(FilePair {
            shp,
            shx,
            shp_path,
            shx_path,
        })
    }

    /// Creates (or truncates) both files with lower-case extensions.
    pub(crate) fn create(path: &Path) -> GeoShapeResult<FilePair> {
        let base = base_name(path);
        let shp_path = with_suffix(&base, SHP_EXTENSIONS[0]);
        let shx_path = with_suffix(&base, SHX_EXTENSIONS[0]);
        let options = {
            let mut options = OpenOptions::new();
            options.read(true).write(true).create(true).truncate(true);
            options
        };
        let shp = options.open(&shp_path)?;
        let shx = options.open(&shx_path)?;
        debug!(
            "created {} and {}",
            shp_path.display(),
            shx_path.display()
        );
        Ok(FilePair {
            shp,
            shx,
            shp_path,
            shx_path,
        })
    }

    pub(crate) fn flush(&mut self) -> GeoShapeResult<()> {
        self.shp.flush()?;
        self.shx.flush()?;
        Ok(())
    }
}

/// Reads exactly `buf.len()` bytes at `offset`.
pub(crate) fn read_at(file: &mut File, offset: u64, buf: &mut [u8]) -> GeoShapeResult<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.read_exact(buf)?;
    Ok(())
}

pub(crate) fn write_at(file: &mut File, offset: u64, buf: &[u8]) -> GeoShapeResult<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(buf)?;
    Ok(())
}

/// Strips the extension after the last `.` of the file name, if any.
pub(crate) fn base_name(path: &Path) -> PathBuf {
    match path.extension() {
        Some(_) => path.with_extension(""),
        None => path.to_path_buf(),
    }
}

fn with_suffix(base: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

fn open_first(
    base: &Path,
    extensions: &[&str],
    mode: AccessMode,
) -> GeoShapeResult<(File, PathBuf)> {
    let mut options = OpenOptions::new();
    options.read(true).write(mode.is_writable());

    let mut last_error = None;
    for extension in extensions {
        let candidate = with_suffix(base, extension);
        match options.open(&candidate) {
            Ok(file) => return Ok((file, candidate)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => last_error = Some(err),
            Err(err) => return Err(err.into()),
        }
    }

    Err(match last_error {
        Some(err) => GeoShapeError::new_with_cause(
            &format!("No file found for {}", base.display()),
            ErrorKind::FileNotFound,
            err.into(),
        ),
        None => GeoShapeError::new("No extensions to try", ErrorKind::InvalidOperation),
    })
}
