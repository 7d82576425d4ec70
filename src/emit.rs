// src/emit.rs

use anyhow::{anyhow, Context, Result};
use csv::WriterBuilder;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::normalize::NormalizedRow;

/// Fixed output column order. Written explicitly rather than relying on the
/// csv crate's lazy header emission, so an empty year still gets its header.
const HEADERS: [&str; 9] = [
    "Year",
    "Rank",
    "DonorName",
    "DonorNameWithFlag",
    "Iso3",
    "Iso2",
    "Earmarked",
    "UnEarmarked",
    "Total",
];

/// Render rows to CSV text. Quoting and escaping are the csv crate's.
/// An empty row slice with `include_header = false` yields an empty string,
/// not even a trailing newline.
pub fn render(rows: &[NormalizedRow], include_header: bool) -> Result<String> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    if include_header {
        writer.write_record(HEADERS).context("writing CSV header")?;
    }
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("flushing CSV buffer: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

/// A write-and-close output capability. The driver owns one per destination;
/// nothing else writes to it.
pub trait Sink {
    fn write_text(&mut self, text: &str) -> Result<()>;
    fn close(self) -> Result<()>;
}

/// File-backed sink used for both the cumulative and the per-year outputs.
pub struct FileSink {
    writer: BufWriter<File>,
    path: String,
}

impl FileSink {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("creating output file {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.display().to_string(),
        })
    }
}

impl Sink for FileSink {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.writer
            .write_all(text.as_bytes())
            .with_context(|| format!("writing to {}", self.path))
    }

    fn close(mut self) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("flushing {}", self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: i32, rank: i64, name: &str) -> NormalizedRow {
        NormalizedRow {
            year,
            rank,
            donor_name: name.to_string(),
            donor_name_with_flag: format!(":us: {name}"),
            iso3: "usa".to_string(),
            iso2: "us".to_string(),
            earmarked: "100".to_string(),
            un_earmarked: "50".to_string(),
            total: "150".to_string(),
        }
    }

    #[test]
    fn renders_header_then_rows_in_fixed_order() {
        let csv = render(&[row(2020, 1, "United States")], true).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Year,Rank,DonorName,DonorNameWithFlag,Iso3,Iso2,Earmarked,UnEarmarked,Total")
        );
        assert_eq!(
            lines.next(),
            Some("2020,1,United States,:us: United States,usa,us,100,50,150")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn header_suppressed_when_not_requested() {
        let csv = render(&[row(2020, 1, "United States")], false).unwrap();
        assert!(csv.starts_with("2020,1,"));
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn empty_rows_without_header_render_to_empty_text() {
        assert_eq!(render(&[], false).unwrap(), "");
    }

    #[test]
    fn empty_rows_with_header_render_to_header_only() {
        let csv = render(&[], true).unwrap();
        assert_eq!(
            csv,
            "Year,Rank,DonorName,DonorNameWithFlag,Iso3,Iso2,Earmarked,UnEarmarked,Total\n"
        );
    }

    #[test]
    fn rendering_is_idempotent() {
        let rows = vec![row(2019, 1, "Sweden"), row(2019, 2, "Norway")];
        assert_eq!(render(&rows, true).unwrap(), render(&rows, true).unwrap());
        assert_eq!(render(&rows, false).unwrap(), render(&rows, false).unwrap());
    }

    #[test]
    fn names_with_commas_are_quoted() {
        let mut r = row(2020, 1, "Korea, Republic of");
        r.donor_name_with_flag = ":kr: Korea, Republic of".to_string();
        let csv = render(&[r], false).unwrap();
        assert!(csv.contains(r#""Korea, Republic of""#));
        assert!(csv.contains(r#"":kr: Korea, Republic of""#));
    }

    #[test]
    fn file_sink_writes_and_closes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut sink = FileSink::create(&path).unwrap();
        sink.write_text("a,b\n").unwrap();
        sink.write_text("1,2\n").unwrap();
        sink.close().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n1,2\n");
    }
}
