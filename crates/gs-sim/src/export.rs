//! Export of the switch-off aggregate table.
//!
//! Columns: `index, traffic_switched_off, traffic_remaining, offload_coef,
//! coverage_loss, geo_rsrp_realloc, geo_cqi_realloc`.  Missing values are
//! empty CSV fields (null in Parquet); `coverage_loss` is `0`/`1` in CSV.

use std::io::Write;
use std::path::Path;

use csv::Writer;

use crate::{SimResult, SwitchOffTable};

const HEADER: [&str; 7] = [
    "index",
    "traffic_switched_off",
    "traffic_remaining",
    "offload_coef",
    "coverage_loss",
    "geo_rsrp_realloc",
    "geo_cqi_realloc",
];

fn opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// Write `table` to a CSV file at `path`.
pub fn write_aggregates_csv(table: &SwitchOffTable, path: &Path) -> SimResult<()> {
    let file = std::fs::File::create(path)?;
    write_aggregates_writer(table, file)
}

/// Like [`write_aggregates_csv`] but accepts any `Write` sink.
pub fn write_aggregates_writer<W: Write>(table: &SwitchOffTable, sink: W) -> SimResult<()> {
    let mut out = Writer::from_writer(sink);
    out.write_record(HEADER)?;
    for row in table {
        out.write_record(&[
            row.pixel_index.0.to_string(),
            row.traffic_switched_off.to_string(),
            row.traffic_remaining.to_string(),
            opt(row.offload_coefficient),
            (row.coverage_loss as u8).to_string(),
            opt(row.reallocated_signal_level),
            opt(row.reallocated_quality_index),
        ])?;
    }
    out.flush()?;
    Ok(())
}

// ── Parquet (feature `parquet`) ───────────────────────────────────────────────

#[cfg(feature = "parquet")]
pub fn write_aggregates_parquet(table: &SwitchOffTable, path: &Path) -> SimResult<()> {
    use std::sync::Arc;

    use arrow::array::{BooleanBuilder, Float64Builder, UInt64Builder};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use parquet::basic::Compression;
    use parquet::file::properties::WriterProperties;

    let schema = Arc::new(Schema::new(vec![
        Field::new(HEADER[0], DataType::UInt64,  false),
        Field::new(HEADER[1], DataType::Float64, false),
        Field::new(HEADER[2], DataType::Float64, false),
        Field::new(HEADER[3], DataType::Float64, true),
        Field::new(HEADER[4], DataType::Boolean, false),
        Field::new(HEADER[5], DataType::Float64, true),
        Field::new(HEADER[6], DataType::Float64, true),
    ]));

    let mut index     = UInt64Builder::new();
    let mut switched  = Float64Builder::new();
    let mut remaining = Float64Builder::new();
    let mut offload   = Float64Builder::new();
    let mut loss      = BooleanBuilder::new();
    let mut rsrp      = Float64Builder::new();
    let mut cqi       = Float64Builder::new();

    for row in table {
        index.append_value(row.pixel_index.0);
        switched.append_value(row.traffic_switched_off);
        remaining.append_value(row.traffic_remaining);
        offload.append_option(row.offload_coefficient);
        loss.append_value(row.coverage_loss);
        rsrp.append_option(row.reallocated_signal_level);
        cqi.append_option(row.reallocated_quality_index);
    }

    let batch = RecordBatch::try_new(
        Arc::clone(&schema),
        vec![
            Arc::new(index.finish()),
            Arc::new(switched.finish()),
            Arc::new(remaining.finish()),
            Arc::new(offload.finish()),
            Arc::new(loss.finish()),
            Arc::new(rsrp.finish()),
            Arc::new(cqi.finish()),
        ],
    )?;

    let props = WriterProperties::builder().set_compression(Compression::SNAPPY).build();
    let mut writer = ArrowWriter::try_new(std::fs::File::create(path)?, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
