use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use crate::writers::{ColumnData, DataFrame};
use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
    metadata: Vec<KeyValue>,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            metadata: Vec::new(),
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Attach a key-value pair to the file footer.
    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.push(KeyValue::new(key.to_string(), value.to_string()));
        self
    }

    fn properties(&self) -> WriterProperties {
        let metadata = (!self.metadata.is_empty()).then(|| self.metadata.clone());
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .set_key_value_metadata(metadata)
            .build()
    }

    pub fn write_frame(&self, frame: &DataFrame, path: &Path) -> Result<()> {
        self.write_frame_batched(frame, path, frame.num_rows().max(1))
    }

    /// Write `batch_size` rows at a time. An empty frame still produces a
    /// file carrying the schema.
    pub fn write_frame_batched(&self, frame: &DataFrame, path: &Path, batch_size: usize) -> Result<()> {
        let schema = Self::create_schema(frame);
        let batch = Self::frame_to_batch(frame, schema.clone())?;

        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, schema, Some(self.properties()))?;

        let batch_size = batch_size.max(1);
        let mut offset = 0;
        while offset < batch.num_rows() {
            let len = batch_size.min(batch.num_rows() - offset);
            writer.write(&batch.slice(offset, len))?;
            offset += len;
        }

        writer.close()?;
        Ok(())
    }

    fn data_type(data: &ColumnData) -> DataType {
        match data {
            ColumnData::UInt8(_) => DataType::UInt8,
            ColumnData::UInt16(_) => DataType::UInt16,
            ColumnData::UInt32(_) => DataType::UInt32,
            ColumnData::Float32(_) => DataType::Float32,
            ColumnData::Text(_) => DataType::Utf8,
            ColumnData::Timestamp(_) => DataType::Timestamp(TimeUnit::Second, None),
        }
    }

    fn create_schema(frame: &DataFrame) -> Arc<Schema> {
        let fields: Vec<Field> = frame
            .columns()
            .iter()
            .map(|c| Field::new(c.name.as_str(), Self::data_type(&c.data), true))
            .collect();

        Arc::new(Schema::new(fields))
    }

    fn to_array(data: &ColumnData) -> ArrayRef {
        match data {
            ColumnData::UInt8(v) => Arc::new(UInt8Array::from(v.clone())),
            ColumnData::UInt16(v) => Arc::new(UInt16Array::from(v.clone())),
            ColumnData::UInt32(v) => Arc::new(UInt32Array::from(v.clone())),
            ColumnData::Float32(v) => Arc::new(Float32Array::from(v.clone())),
            ColumnData::Text(v) => Arc::new(StringArray::from(v.clone())),
            ColumnData::Timestamp(v) => Arc::new(TimestampSecondArray::from(
                v.iter()
                    .map(|ts| ts.map(|t| t.and_utc().timestamp()))
                    .collect::<Vec<Option<i64>>>(),
            )),
        }
    }

    fn frame_to_batch(frame: &DataFrame, schema: Arc<Schema>) -> Result<RecordBatch> {
        let arrays: Vec<ArrayRef> = frame.columns().iter().map(|c| Self::to_array(&c.data)).collect();
        let options = RecordBatchOptions::new().with_row_count(Some(frame.num_rows()));
        let batch = RecordBatch::try_new_with_options(schema, arrays, &options)?;
        Ok(batch)
    }

    /// Row counts, row-group sizes, codec, column names and key-value
    /// metadata read back from a written file.
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();
        let columns = file_metadata
            .schema_descr()
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let key_value_metadata = file_metadata
            .key_value_metadata()
            .map(|kvs| {
                kvs.iter()
                    .map(|kv| (kv.key.clone(), kv.value.clone().unwrap_or_default()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression: self.compression,
            columns,
            key_value_metadata,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
    pub columns: Vec<String>,
    pub key_value_metadata: Vec<(String, String)>,
}

impl ParquetFileInfo {
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.key_value_metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Columns: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.columns.len(),
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            self.compression,
            avg_rows
        )
    }
}
