//! The persisted registry file.
//!
//! One line per sequence, `name|identifier|description`. The description is
//! free text and may itself contain `|`, so lines are split on at most two
//! delimiters.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use vmc_core::consts::REGISTRY_DELIMITER;
use vmc_core::{Result, VmcError};

use super::SequenceRegistry;
use crate::identifier::SequenceId;

/// One persisted registry line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub name: String,
    pub sequence_id: SequenceId,
    pub description: String,
}

impl RegistryEntry {
    pub fn to_line(&self) -> String {
        format!(
            "{}{d}{}{d}{}",
            self.name,
            self.sequence_id,
            self.description,
            d = REGISTRY_DELIMITER
        )
    }

    /// Parse one line; the error is a human readable reason.
    pub fn parse_line(line: &str) -> std::result::Result<Self, String> {
        let mut fields = line.splitn(3, REGISTRY_DELIMITER);
        let (Some(name), Some(id), Some(description)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(format!(
                "expected 3 '{}'-delimited fields (name, identifier, description)",
                REGISTRY_DELIMITER
            ));
        };
        if name.is_empty() {
            return Err("empty sequence name".to_string());
        }
        let sequence_id: SequenceId = id.parse().map_err(|e: VmcError| e.to_string())?;

        Ok(RegistryEntry {
            name: name.to_string(),
            sequence_id,
            description: description.to_string(),
        })
    }
}

/// Restore a registry from a persisted file.
pub fn read_registry_file<P: AsRef<Path>>(path: P) -> Result<SequenceRegistry> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(e.kind(), format!("Failed to open registry {:?}: {}", path, e))
    })?;
    read_registry(BufReader::new(file), path)
}

/// Restore a registry from any line source. `path` is only used in errors.
pub fn read_registry<R: BufRead>(reader: R, path: &Path) -> Result<SequenceRegistry> {
    let mut registry = SequenceRegistry::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let entry = RegistryEntry::parse_line(line).map_err(|reason| VmcError::RegistryParse {
            path: path.to_path_buf(),
            line: index + 1,
            reason,
        })?;
        registry.insert_entry(&entry);
    }

    Ok(registry)
}

/// Writes registry lines to `<path>.tmp`, renaming to `path` on commit.
///
/// A pass that fails before [`RegistryWriter::commit`] never leaves a file at
/// `path`, so the next run rebuilds instead of restoring a partial registry.
pub struct RegistryWriter {
    path: PathBuf,
    tmp_path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl RegistryWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        let file = File::create(&tmp_path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to create registry {:?}: {}", tmp_path, e),
            )
        })?;

        Ok(Self {
            path,
            tmp_path,
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    /// Append one line. A name containing the delimiter could not be read
    /// back, so it is rejected before anything is written.
    pub fn write_entry(&mut self, entry: &RegistryEntry) -> Result<()> {
        if entry.name.contains(REGISTRY_DELIMITER) {
            return Err(VmcError::FastaParse(format!(
                "sequence name '{}' contains the registry delimiter '{}'",
                entry.name, REGISTRY_DELIMITER
            )));
        }
        writeln!(self.writer, "{}", entry.to_line())?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and move the file into place. Returns the final path.
    pub fn commit(self) -> Result<PathBuf> {
        let file = self.writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&self.tmp_path, &self.path)?;
        debug!("Committed {} registry lines to {:?}", self.written, self.path);
        Ok(self.path)
    }

    /// Drop the partial file without touching `path`.
    pub fn discard(self) -> Result<()> {
        drop(self.writer);
        std::fs::remove_file(&self.tmp_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use pretty_assertions::assert_eq;
    use rstest::*;

    const ID: &str = "VMC:GS_iYtREV555dUFKg2_agSJW6suquUyPpMw";

    #[rstest]
    fn test_line_round_trip() {
        let entry = RegistryEntry {
            name: "chr1".to_string(),
            sequence_id: ID.parse().unwrap(),
            description: "chr1 AC:CM000663.2 | primary".to_string(),
        };
        let line = entry.to_line();
        assert_eq!(line, format!("chr1|{}|chr1 AC:CM000663.2 | primary", ID));
        assert_eq!(RegistryEntry::parse_line(&line).unwrap(), entry);
    }

    #[rstest]
    fn test_description_may_be_empty() {
        let entry = RegistryEntry::parse_line(&format!("chr1|{}|", ID)).unwrap();
        assert_eq!(entry.description, "");
    }

    #[rstest]
    #[case("chr1")]
    #[case("chr1|VMC:GS_abc")]
    #[case("|VMC:GS_abc|chr1")]
    #[case("chr1|VMC:GL_abc|chr1")]
    #[case("chr1|not-an-id|chr1")]
    fn test_parse_line_rejects(#[case] line: &str) {
        assert!(RegistryEntry::parse_line(line).is_err());
    }

    #[rstest]
    fn test_read_registry_reports_line_number() {
        let text = format!("chr1|{}|chr1\n\nchr2 only two|fields\n", ID);
        let err = read_registry(Cursor::new(text), Path::new("ref.fa.vmc")).unwrap_err();
        match err {
            VmcError::RegistryParse { line, path, .. } => {
                assert_eq!(line, 3);
                assert_eq!(path, PathBuf::from("ref.fa.vmc"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    fn test_read_registry_crlf_and_duplicates() {
        let other = "VMC:GS_aKF498dAxcJAqme6QYQ7EZ07-fiw8Kw2";
        let text = format!("chr1|{ID}|chr1\r\nchr1|{other}|chr1 again\r\n");
        let registry = read_registry(Cursor::new(text), Path::new("x")).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("chr1").unwrap().to_string(), other);
    }

    #[rstest]
    fn test_writer_commits_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.fa.vmc");

        let mut writer = RegistryWriter::create(&path).unwrap();
        writer
            .write_entry(&RegistryEntry {
                name: "chr1".to_string(),
                sequence_id: ID.parse().unwrap(),
                description: "chr1".to_string(),
            })
            .unwrap();
        assert_eq!(writer.written(), 1);
        assert!(!path.exists());
        assert!(dir.path().join("ref.fa.vmc.tmp").exists());

        let committed = writer.commit().unwrap();
        assert_eq!(committed, path);
        assert!(!dir.path().join("ref.fa.vmc.tmp").exists());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            format!("chr1|{}|chr1\n", ID)
        );
    }

    #[rstest]
    fn test_writer_rejects_delimiter_in_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.fa.vmc");

        let mut writer = RegistryWriter::create(&path).unwrap();
        let err = writer
            .write_entry(&RegistryEntry {
                name: "chr1|alt".to_string(),
                sequence_id: ID.parse().unwrap(),
                description: "chr1|alt desc".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.category(), vmc_core::ErrorCategory::Parse);
        assert_eq!(writer.written(), 0);
        writer.discard().unwrap();
        assert!(!path.exists());
    }

    #[rstest]
    fn test_discard_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.fa.vmc");
        let writer = RegistryWriter::create(&path).unwrap();
        writer.discard().unwrap();
        assert!(!path.exists());
        assert!(!dir.path().join("ref.fa.vmc.tmp").exists());
    }

    #[rstest]
    fn test_missing_registry_file_is_io_error() {
        let err = read_registry_file("/nonexistent/ref.fa.vmc").unwrap_err();
        assert_eq!(err.category(), vmc_core::ErrorCategory::Io);
    }
}
