use crate::output::row::{ResultRow, HEADER};
use crate::MetacrawlError;
use parking_lot::Mutex;

/// Append-only CSV buffer shared by the workers of one task
///
/// All writes go through a single lock; every record is flushed as soon as
/// it is written so [`ResultBuffer::render`] only ever sees whole rows.
pub struct ResultBuffer {
    inner: Mutex<BufferInner>,
}

struct BufferInner {
    writer: csv::Writer<Vec<u8>>,
    header_written: bool,
    data_rows: usize,
}

impl ResultBuffer {
    /// Creates an empty buffer
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BufferInner {
                writer: csv::Writer::from_writer(Vec::new()),
                header_written: false,
                data_rows: 0,
            }),
        }
    }

    /// Writes the header row
    ///
    /// Only the first call writes anything; later calls are no-ops.
    pub fn write_header(&self) -> Result<(), MetacrawlError> {
        let mut inner = self.inner.lock();
        if inner.header_written {
            return Ok(());
        }

        inner.writer.write_record(HEADER)?;
        inner.writer.flush()?;
        inner.header_written = true;
        Ok(())
    }

    /// Appends one data row
    pub fn append(&self, row: &ResultRow) -> Result<(), MetacrawlError> {
        let mut inner = self.inner.lock();
        inner.writer.write_record(row.fields())?;
        inner.writer.flush()?;
        inner.data_rows += 1;
        Ok(())
    }

    /// Returns a copy of everything written so far
    pub fn render(&self) -> Vec<u8> {
        self.inner.lock().writer.get_ref().clone()
    }

    /// Number of data rows appended so far (the header is not counted)
    pub fn data_rows(&self) -> usize {
        self.inner.lock().data_rows
    }
}

impl Default for ResultBuffer {
    fn default() -> Self {
        Self::new()
    }
}
