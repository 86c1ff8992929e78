use crate::error::Result;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use crate::writers::DataFrame;
use serde_pickle::SerOptions;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes a `DataFrame` as a pickled `{column: [values]}` dict, readable
/// with `pd.DataFrame(pickle.load(f))`.
pub struct PickleWriter {
    buffer_size: usize,
}

impl PickleWriter {
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn write_frame(&self, frame: &DataFrame, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::with_capacity(self.buffer_size, file);
        self.write_to(frame, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_to<W: Write>(&self, frame: &DataFrame, writer: &mut W) -> Result<()> {
        serde_pickle::to_writer(writer, frame, SerOptions::new())?;
        Ok(())
    }
}

impl Default for PickleWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writers::ColumnData;
    use serde_pickle::{DeOptions, HashableValue, Value};
    use std::collections::BTreeMap;

    fn sample() -> DataFrame {
        let mut frame = DataFrame::new();
        frame.push_column("building_id", ColumnData::UInt16(vec![Some(3), Some(4)]));
        frame.push_column("air_temperature", ColumnData::Float32(vec![Some(1.5), None]));
        frame.push_column("primary_use", ColumnData::Text(vec![Some("Office".to_string()), None]));
        frame
    }

    fn decode(bytes: &[u8]) -> BTreeMap<HashableValue, Value> {
        match serde_pickle::value_from_slice(bytes, DeOptions::new()).unwrap() {
            Value::Dict(map) => map,
            other => panic!("expected dict, got {:?}", other),
        }
    }

    #[test]
    fn test_pickle_is_a_column_dict() -> Result<()> {
        let mut bytes = Vec::new();
        PickleWriter::new().write_to(&sample(), &mut bytes)?;

        let dict = decode(&bytes);
        assert_eq!(dict.len(), 3);
        assert_eq!(
            dict.get(&HashableValue::String("building_id".to_string())),
            Some(&Value::List(vec![Value::I64(3), Value::I64(4)]))
        );
        assert_eq!(
            dict.get(&HashableValue::String("air_temperature".to_string())),
            Some(&Value::List(vec![Value::F64(1.5), Value::None]))
        );
        Ok(())
    }

    #[test]
    fn test_write_frame_to_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("train_data.pkl");

        PickleWriter::new().with_buffer_size(64).write_frame(&sample(), &path)?;

        let bytes = std::fs::read(&path)?;
        assert_eq!(decode(&bytes).len(), 3);
        Ok(())
    }
}
