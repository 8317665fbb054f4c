// src/table/export.rs

use arrow::compute::concat_batches;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{fs, fs::File, path::Path};
use tracing::debug;

use super::{indicator_schema, IndicatorTable};
use crate::error::{Error, Result};

impl IndicatorTable {
    /// Write the table as a single Snappy-compressed Parquet file.
    pub fn write_parquet(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::from_io(parent, e))?;
        }
        let file = File::create(path).map_err(|e| Error::from_io(path, e))?;
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, indicator_schema(), Some(props))?;
        writer.write(self.batch())?;
        writer.close()?;
        debug!(path = %path.display(), rows = self.num_rows(), "wrote indicator parquet");
        Ok(())
    }

    /// Read a table previously written with [`IndicatorTable::write_parquet`].
    pub fn read_parquet(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::from_io(path, e))?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
        let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
        let schema = batches
            .first()
            .map(|b| b.schema())
            .unwrap_or_else(indicator_schema);
        let batch = concat_batches(&schema, &batches)?;
        IndicatorTable::from_batch(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::INDICATOR_COUNT;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn export_then_import_gives_equal_table() {
        let dates: Vec<NaiveDate> = (1..=3)
            .map(|m| NaiveDate::from_ymd_opt(2019, m, 1).unwrap())
            .collect();
        let rows: Vec<(String, Vec<Option<f64>>)> = (0..3)
            .map(|r| {
                let mut values: Vec<Option<f64>> =
                    (0..INDICATOR_COUNT).map(|c| Some((r * 100 + c) as f64)).collect();
                if r == 1 {
                    values[6] = None;
                }
                (r.to_string(), values)
            })
            .collect();
        let table = IndicatorTable::try_new(&dates, &rows).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("indicators.parquet");
        table.write_parquet(&path).unwrap();
        let back = IndicatorTable::read_parquet(&path).unwrap();

        assert_eq!(back, table);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = IndicatorTable::read_parquet(&dir.path().join("absent.parquet")).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }
}
