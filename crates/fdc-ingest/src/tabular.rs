//! Sequential reader for delimited extract files

use csv_async::{AsyncReader, AsyncReaderBuilder, ByteRecord, StringRecord};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tracing::warn;

use crate::error::{IngestError, Result};

/// Streams the rows of one comma-delimited file
///
/// Rows may have differing lengths; decoders treat missing columns as blank.
/// Bytes that are not UTF-8 are replaced with U+FFFD rather than failing the
/// read, so one mis-encoded row never stops a whole extract.
pub struct TabularReader {
    path: PathBuf,
    reader: AsyncReader<File>,
    bytes: ByteRecord,
    rows: u64,
    repaired: u64,
}

impl TabularReader {
    /// Open `path`; with `has_headers` the first line is consumed as a header
    pub async fn open(path: impl AsRef<Path>, has_headers: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).await.map_err(|source| IngestError::Open {
            path: path.clone(),
            source,
        })?;

        let reader = AsyncReaderBuilder::new()
            .has_headers(has_headers)
            .flexible(true)
            .create_reader(file);

        Ok(Self {
            path,
            reader,
            bytes: ByteRecord::new(),
            rows: 0,
            repaired: 0,
        })
    }

    /// Read the next row into `row`, returning `false` at end of file
    ///
    /// Only I/O and framing failures are errors. A row with invalid UTF-8 is
    /// returned with the bad bytes replaced and counted in [`Self::rows_repaired`].
    pub async fn read_row(&mut self, row: &mut StringRecord) -> Result<bool> {
        let more = self
            .reader
            .read_byte_record(&mut self.bytes)
            .await
            .map_err(|source| IngestError::Read {
                path: self.path.clone(),
                source,
            })?;
        if !more {
            return Ok(false);
        }
        self.rows += 1;

        let line = self.bytes.position().map(|p| p.line());
        let bytes = std::mem::replace(&mut self.bytes, ByteRecord::new());
        *row = match StringRecord::from_byte_record(bytes) {
            Ok(decoded) => decoded,
            Err(e) => {
                self.repaired += 1;
                warn!(
                    path = %self.path.display(),
                    row = self.rows,
                    line,
                    field = e.utf8_error().field(),
                    "Row is not valid UTF-8, replacing bad bytes"
                );
                StringRecord::from_byte_record_lossy(e.into_byte_record())
            },
        };
        Ok(true)
    }

    /// Data rows read so far (the header is not counted)
    pub fn rows_read(&self) -> u64 {
        self.rows
    }

    /// Rows whose invalid UTF-8 was replaced
    pub fn rows_repaired(&self) -> u64 {
        self.repaired
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Trimmed text of a column, blank when the row is too short
pub(crate) fn column(row: &StringRecord, index: usize) -> &str {
    row.get(index).map(str::trim).unwrap_or("")
}
