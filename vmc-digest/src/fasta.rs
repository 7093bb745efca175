//! FASTA record source.
//!
//! Reads plain or gzip/BGZF compressed FASTA and yields one
//! [`SequenceHandle`] per record. Sequence lines are concatenated with
//! whitespace removed; case is preserved.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::debug;

use vmc_core::{Result, VmcError};

use crate::models::SequenceHandle;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open a FASTA file, detecting gzip compression from its first two bytes.
pub fn open_fasta<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(e.kind(), format!("Failed to open FASTA {:?}: {}", path, e))
    })?;
    let mut reader = BufReader::with_capacity(256 * 1024, file);

    let is_gzipped = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    debug!("Opening FASTA {:?} (gzipped: {})", path, is_gzipped);

    if is_gzipped {
        Ok(Box::new(BufReader::with_capacity(
            256 * 1024,
            MultiGzDecoder::new(reader),
        )))
    } else {
        Ok(Box::new(reader))
    }
}

/// Iterator over the records of a FASTA stream.
pub struct FastaReader<R: BufRead> {
    reader: R,
    line: Vec<u8>,
    /// Header read ahead while finishing the previous record.
    pending_header: Option<String>,
    line_number: usize,
    done: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::with_capacity(1024),
            pending_header: None,
            line_number: 0,
            done: false,
        }
    }

    /// Read one line into `self.line` without its terminator. `false` at EOF.
    fn next_line(&mut self) -> Result<bool> {
        self.line.clear();
        if self.reader.read_until(b'\n', &mut self.line)? == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        while matches!(self.line.last(), Some(b'\n') | Some(b'\r')) {
            self.line.pop();
        }
        Ok(true)
    }

    fn header_from_line(&self) -> Result<String> {
        let header = std::str::from_utf8(&self.line[1..]).map_err(|e| {
            VmcError::FastaParse(format!(
                "invalid UTF-8 in header at line {}: {}",
                self.line_number, e
            ))
        })?;
        if header.trim().is_empty() {
            return Err(VmcError::FastaParse(format!(
                "record without a name at line {}",
                self.line_number
            )));
        }
        Ok(header.to_string())
    }

    fn read_record(&mut self) -> Result<Option<SequenceHandle>> {
        let header = match self.pending_header.take() {
            Some(header) => header,
            None => loop {
                if !self.next_line()? {
                    return Ok(None);
                }
                if self.line.iter().all(|b| b.is_ascii_whitespace()) {
                    continue;
                }
                if self.line[0] != b'>' {
                    return Err(VmcError::FastaParse(format!(
                        "sequence data before the first header at line {}",
                        self.line_number
                    )));
                }
                break self.header_from_line()?;
            },
        };

        let mut content = Vec::new();
        while self.next_line()? {
            if self.line.first() == Some(&b'>') {
                self.pending_header = Some(self.header_from_line()?);
                break;
            }
            content.extend(self.line.iter().filter(|b| !b.is_ascii_whitespace()));
        }

        Ok(Some(SequenceHandle::new(&header, content)))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<SequenceHandle>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(handle)) => Some(Ok(handle)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
