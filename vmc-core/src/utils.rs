use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

/// Whether a path names a gzip (or BGZF) compressed file, judged by extension.
pub fn is_gzipped(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("gz") | Some("bgz")
    )
}

/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// `MultiGzDecoder` is used so BGZF files (a series of gzip members) are read
/// to the end rather than stopping after the first block.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> io::Result<BufReader<Box<dyn Read>>> {
    let file = File::open(path).map_err(|e| {
        io::Error::new(e.kind(), format!("Failed to open file {:?}: {}", path, e))
    })?;
    let file: Box<dyn Read> = match is_gzipped(path) {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::with_capacity(256 * 1024, file))
}

/// Extension trait for deriving sibling file names.
pub trait PathExtension {
    /// Append `.ext` to the full file name, keeping any existing extensions
    /// (`ref.fa.gz` -> `ref.fa.gz.vmc`).
    fn append_ext(&self, ext: &str) -> PathBuf;
}

impl<T: AsRef<Path>> PathExtension for T {
    fn append_ext(&self, ext: &str) -> PathBuf {
        let path = self.as_ref();
        let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
        name.push(".");
        name.push(ext);
        path.with_file_name(name)
    }
}
