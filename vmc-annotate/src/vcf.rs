//! Minimal VCF reading and writing.
//!
//! Only what annotation needs: header meta lines are kept verbatim, INFO
//! declarations can be added, and records expose CHROM, POS, REF, ALT and a
//! writable INFO column. Every other column is passed through untouched.

use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;

use vmc_core::utils::get_dynamic_reader;
use vmc_core::{Result, VmcError};

const CHROM: usize = 0;
const POS: usize = 1;
const REF: usize = 3;
const ALT: usize = 4;
const INFO: usize = 7;
const REQUIRED_COLUMNS: usize = 8;

const MISSING: &str = ".";

/// Open a VCF file, detecting gzip/BGZF compression from its extension.
pub fn open_vcf(path: &Path) -> Result<Box<dyn BufRead>> {
    Ok(Box::new(get_dynamic_reader(path)?))
}

/// Create (or truncate) `path` as a gzip stream.
pub fn create_gz_writer(path: &Path) -> Result<GzEncoder<BufWriter<File>>> {
    let file = File::create(path).map_err(|e| {
        std::io::Error::new(e.kind(), format!("Failed to create {:?}: {}", path, e))
    })?;
    Ok(GzEncoder::new(BufWriter::new(file), Compression::default()))
}

/// `##` meta lines plus the `#CHROM` column line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcfHeader {
    meta: Vec<String>,
    columns: String,
}

impl VcfHeader {
    pub fn new(meta: Vec<String>, columns: String) -> Self {
        Self { meta, columns }
    }

    pub fn meta_lines(&self) -> &[String] {
        &self.meta
    }

    pub fn column_line(&self) -> &str {
        &self.columns
    }

    /// Declare an INFO field. A declaration with the same ID is replaced in
    /// place; otherwise the new line goes last, just before `#CHROM`.
    pub fn add_info_field(&mut self, id: &str, number: &str, kind: &str, description: &str) {
        let line = format!(
            "##INFO=<ID={},Number={},Type={},Description=\"{}\">",
            id, number, kind, description
        );
        let prefix = format!("##INFO=<ID={},", id);

        match self.meta.iter_mut().find(|m| m.starts_with(&prefix)) {
            Some(existing) => *existing = line,
            None => self.meta.push(line),
        }
    }

    pub fn has_info_field(&self, id: &str) -> bool {
        let prefix = format!("##INFO=<ID={},", id);
        self.meta.iter().any(|m| m.starts_with(&prefix))
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for line in &self.meta {
            writeln!(out, "{}", line)?;
        }
        writeln!(out, "{}", self.columns)
    }
}

/// One data line, split on tabs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcfRecord {
    fields: Vec<String>,
    pos: u64,
    end: u64,
}

impl VcfRecord {
    /// Parse a data line. `line_number` is only used in errors.
    pub fn parse(line: &str, line_number: usize) -> Result<Self> {
        let fields: Vec<String> = line.split('\t').map(str::to_string).collect();
        let fail = |reason: String| VmcError::VcfParse {
            line: line_number,
            reason,
        };

        if fields.len() < REQUIRED_COLUMNS {
            return Err(fail(format!(
                "expected at least {} tab-separated columns, found {}",
                REQUIRED_COLUMNS,
                fields.len()
            )));
        }
        let pos = fields[POS]
            .parse::<u64>()
            .map_err(|_| fail(format!("invalid POS '{}'", fields[POS])))?;
        if pos == 0 {
            return Err(fail("POS must be at least 1".to_string()));
        }
        if fields[REF].is_empty() {
            return Err(fail("empty REF".to_string()));
        }
        let end = u64::try_from(fields[REF].len() - 1)
            .ok()
            .and_then(|span| pos.checked_add(span))
            .ok_or_else(|| fail(format!("REF at POS {} runs past the end of the coordinate range", pos)))?;

        Ok(Self { fields, pos, end })
    }

    pub fn chrom(&self) -> &str {
        &self.fields[CHROM]
    }

    /// Reported 1-based position.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Reported 1-based, inclusive end: the last base covered by REF.
    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn reference(&self) -> &str {
        &self.fields[REF]
    }

    /// The raw ALT column.
    pub fn alt_field(&self) -> &str {
        &self.fields[ALT]
    }

    /// Alternate alleles; empty when ALT is `.`.
    pub fn alternates(&self) -> Vec<&str> {
        match self.alt_field() {
            MISSING | "" => Vec::new(),
            alt => alt.split(',').collect(),
        }
    }

    pub fn info(&self) -> &str {
        &self.fields[INFO]
    }

    /// Set `key=value` in INFO, replacing an earlier value for `key`.
    pub fn set_info(&mut self, key: &str, value: &str) {
        let pair = format!("{}={}", key, value);
        let info = &self.fields[INFO];
        let mut entries: Vec<&str> = if info == MISSING || info.is_empty() {
            Vec::new()
        } else {
            info.split(';')
                .filter(|entry| entry.split('=').next() != Some(key))
                .collect()
        };
        entries.push(&pair);
        let updated = entries.join(";");
        self.fields[INFO] = updated;
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let mut first = true;
        for field in &self.fields {
            if !first {
                out.write_all(b"\t")?;
            }
            out.write_all(field.as_bytes())?;
            first = false;
        }
        out.write_all(b"\n")
    }
}

/// Reads the header eagerly, then records one at a time.
pub struct VcfReader<R: BufRead> {
    reader: R,
    header: VcfHeader,
    line: String,
    line_number: usize,
}

impl<R: BufRead> VcfReader<R> {
    pub fn new(mut reader: R) -> Result<Self> {
        let mut meta = Vec::new();
        let mut line = String::new();
        let mut line_number = 0;

        let columns = loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Err(VmcError::VcfParse {
                    line: line_number,
                    reason: "missing #CHROM header line".to_string(),
                });
            }
            line_number += 1;
            let text = line.trim_end_matches(['\n', '\r']);
            if text.starts_with("##") {
                meta.push(text.to_string());
            } else if text.starts_with("#CHROM") {
                break text.to_string();
            } else {
                return Err(VmcError::VcfParse {
                    line: line_number,
                    reason: "expected a '##' meta line or the #CHROM header line".to_string(),
                });
            }
        };

        Ok(Self {
            reader,
            header: VcfHeader::new(meta, columns),
            line,
            line_number,
        })
    }

    pub fn header(&self) -> &VcfHeader {
        &self.header
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Next record, or `None` at end of input. Blank lines are skipped.
    pub fn read_record(&mut self) -> Result<Option<VcfRecord>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            let text = self.line.trim_end_matches(['\n', '\r']);
            if text.trim().is_empty() {
                continue;
            }
            return VcfRecord::parse(text, self.line_number).map(Some);
        }
    }
}

/// Writes the header up front, then records.
pub struct VcfWriter<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> VcfWriter<W> {
    pub fn new(mut inner: W, header: &VcfHeader) -> Result<Self> {
        header.write_to(&mut inner)?;
        Ok(Self { inner, written: 0 })
    }

    pub fn write_record(&mut self, record: &VcfRecord) -> Result<()> {
        record.write_to(&mut self.inner)?;
        self.written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.written
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use pretty_assertions::assert_eq;
    use rstest::*;

    const VCF: &str = "##fileformat=VCFv4.2\n\
                       ##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Depth\">\n\
                       #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
                       chr1\t5\trs1\tA\tT\t50\tPASS\tDP=10\n\
                       \n\
                       chr2\t7\t.\tGGA\t.\t.\t.\t.\r\n";

    #[rstest]
    fn test_reader_header_and_records() {
        let mut reader = VcfReader::new(Cursor::new(VCF)).unwrap();
        assert_eq!(reader.header().meta_lines().len(), 2);
        assert!(reader.header().column_line().starts_with("#CHROM\tPOS"));

        let first = reader.read_record().unwrap().unwrap();
        assert_eq!(first.chrom(), "chr1");
        assert_eq!(first.pos(), 5);
        assert_eq!(first.end(), 5);
        assert_eq!(first.alternates(), vec!["T"]);

        let second = reader.read_record().unwrap().unwrap();
        assert_eq!(second.end(), 9);
        assert!(second.alternates().is_empty());
        assert_eq!(second.info(), ".");

        assert!(reader.read_record().unwrap().is_none());
    }

    #[rstest]
    fn test_missing_column_header() {
        let err = VcfReader::new(Cursor::new("##fileformat=VCFv4.2\n")).err().unwrap();
        assert!(matches!(err, VmcError::VcfParse { .. }));
    }

    #[rstest]
    #[case("chr1\t5\t.\tA\tT\t.\tPASS", "at least 8")]
    #[case("chr1\tfive\t.\tA\tT\t.\tPASS\t.", "invalid POS")]
    #[case("chr1\t0\t.\tA\tT\t.\tPASS\t.", "at least 1")]
    #[case("chr1\t5\t.\t\tT\t.\tPASS\t.", "empty REF")]
    #[case("chr1\t18446744073709551615\t.\tAC\tA\t.\tPASS\t.", "past the end")]
    fn test_record_parse_errors(#[case] line: &str, #[case] expected: &str) {
        let err = VcfRecord::parse(line, 12).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 12"), "{msg}");
        assert!(msg.contains(expected), "{msg}");
    }

    #[rstest]
    #[case("chr1\t5\t.\tA\tT\t.\tPASS\t.", 5)]
    #[case("chr1\t5\t.\tACGT\tA\t.\tPASS\t.", 8)]
    #[case("chr1\t18446744073709551615\t.\tA\tT\t.\tPASS\t.", u64::MAX)]
    fn test_record_end_covers_reference(#[case] line: &str, #[case] end: u64) {
        assert_eq!(VcfRecord::parse(line, 1).unwrap().end(), end);
    }

    #[rstest]
    #[case(".", "VMCGSID=x")]
    #[case("DP=10", "DP=10;VMCGSID=x")]
    #[case("VMCGSID=old;DP=10", "DP=10;VMCGSID=x")]
    #[case("DB;DP=10", "DB;DP=10;VMCGSID=x")]
    fn test_set_info(#[case] info: &str, #[case] expected: &str) {
        let line = format!("chr1\t5\t.\tA\tT\t.\tPASS\t{}", info);
        let mut record = VcfRecord::parse(&line, 1).unwrap();
        record.set_info("VMCGSID", "x");
        assert_eq!(record.info(), expected);
    }

    #[rstest]
    fn test_add_info_field_replaces_existing() {
        let mut header = VcfHeader::new(
            vec![
                "##fileformat=VCFv4.2".to_string(),
                "##INFO=<ID=VMCGSID,Number=.,Type=String,Description=\"stale\">".to_string(),
            ],
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO".to_string(),
        );
        header.add_info_field("VMCGSID", "1", "String", "VMC Sequence identifier");
        header.add_info_field("VMCGLID", "1", "String", "VMC Location identifier");

        assert_eq!(
            header.meta_lines(),
            &[
                "##fileformat=VCFv4.2".to_string(),
                "##INFO=<ID=VMCGSID,Number=1,Type=String,Description=\"VMC Sequence identifier\">"
                    .to_string(),
                "##INFO=<ID=VMCGLID,Number=1,Type=String,Description=\"VMC Location identifier\">"
                    .to_string(),
            ]
        );
        assert!(header.has_info_field("VMCGLID"));
        assert!(!header.has_info_field("VMCGAID"));
    }

    #[rstest]
    fn test_writer_round_trips_untouched_columns() {
        let mut reader = VcfReader::new(Cursor::new(VCF)).unwrap();
        let mut writer = VcfWriter::new(Vec::new(), reader.header()).unwrap();
        while let Some(record) = reader.read_record().unwrap() {
            writer.write_record(&record).unwrap();
        }
        assert_eq!(writer.records_written(), 2);

        let text = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert!(text.contains("chr1\t5\trs1\tA\tT\t50\tPASS\tDP=10\n"));
        assert!(text.ends_with("chr2\t7\t.\tGGA\t.\t.\t.\t.\n"));
    }
}
