pub mod frame;
pub mod output;
pub mod parquet_writer;
pub mod pickle_writer;

pub use frame::{Column, ColumnData, DataFrame};
pub use output::{DatasetWriter, OutputFormat};
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};
pub use pickle_writer::PickleWriter;
