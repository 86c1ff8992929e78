pub mod column_types;
pub mod dataset_reader;
pub mod table_reader;
pub mod tables;

pub use column_types::{parse_timestamp, parse_timezone, ColumnType, ColumnTypes, DType, Value};
pub use dataset_reader::{DatasetPaths, DatasetReader, RawTables};
pub use table_reader::{HeaderIndex, TableReader, TableRecord, TypedRow};
