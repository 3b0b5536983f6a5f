//! Numeric column access on Parquet tables.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, AsArray, Float64Array, RecordBatch};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Schema, SchemaRef};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::{debug, info};

use crate::error::{IoError, io_error};
use crate::writer::{WriterConfig, write_batches};

/// Reads the schema and all record batches of a Parquet file.
fn read_table(path: &Path) -> Result<(SchemaRef, Vec<RecordBatch>), IoError> {
    let file = std::fs::File::open(path).map_err(|e| io_error(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = Arc::clone(builder.schema());
    let batches = builder.build()?.collect::<Result<Vec<_>, _>>()?;
    Ok((schema, batches))
}

/// Reads column `name` as `f64`.
///
/// Any numeric Arrow type is accepted and cast; null entries become NaN.
///
/// # Errors
///
/// - [`IoError::FileNotFound`] if the file does not exist.
/// - [`IoError::MissingColumn`] if the column is absent.
/// - [`IoError::UnsupportedColumnType`] if the column is not numeric.
/// - [`IoError::Parquet`] on decoding failures.
pub fn read_column(path: &Path, name: &str) -> Result<Vec<f64>, IoError> {
    let (schema, batches) = read_table(path)?;
    let (index, field) = schema
        .column_with_name(name)
        .ok_or_else(|| IoError::MissingColumn {
            name: name.to_string(),
            path: path.to_path_buf(),
        })?;
    if !field.data_type().is_numeric() {
        return Err(IoError::UnsupportedColumnType {
            name: name.to_string(),
            data_type: field.data_type().to_string(),
        });
    }

    let mut values = Vec::new();
    for batch in &batches {
        let column = cast(batch.column(index), &DataType::Float64)?;
        let column = column.as_primitive::<Float64Type>();
        values.extend(column.iter().map(|v| v.unwrap_or(f64::NAN)));
    }
    debug!(path = %path.display(), column = name, n = values.len(), "read column");
    Ok(values)
}

/// Copies the table at `input` to `output` with an extra `Float64` column.
///
/// `input` and `output` may be the same path; the table is rewritten in
/// place.
///
/// # Errors
///
/// - [`IoError::FileNotFound`] if `input` does not exist.
/// - [`IoError::DuplicateColumn`] if a column called `name` already exists.
/// - [`IoError::LengthMismatch`] if `values` does not have one entry per row.
/// - [`IoError::Validation`] if `config` is invalid.
/// - [`IoError::Parquet`] on encoding or decoding failures.
pub fn append_column(
    input: &Path,
    output: &Path,
    name: &str,
    values: &[f64],
    config: &WriterConfig,
) -> Result<(), IoError> {
    config.validate()?;
    let (schema, batches) = read_table(input)?;

    if schema.column_with_name(name).is_some() {
        return Err(IoError::DuplicateColumn {
            name: name.to_string(),
            path: input.to_path_buf(),
        });
    }
    let n_rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
    if n_rows != values.len() {
        return Err(IoError::LengthMismatch {
            expected: n_rows,
            got: values.len(),
        });
    }

    let mut fields: Vec<Arc<Field>> = schema.fields().iter().cloned().collect();
    fields.push(Arc::new(Field::new(name, DataType::Float64, false)));
    let extended = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));

    let mut offset = 0;
    let mut out = Vec::with_capacity(batches.len());
    for batch in &batches {
        let rows = batch.num_rows();
        let column: ArrayRef = Arc::new(Float64Array::from(values[offset..offset + rows].to_vec()));
        offset += rows;

        let mut columns = batch.columns().to_vec();
        columns.push(column);
        out.push(RecordBatch::try_new(Arc::clone(&extended), columns)?);
    }

    write_batches(output, extended, &out, config)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        column = name,
        rows = n_rows,
        "appended column"
    );
    Ok(())
}
