#![cfg(feature = "io-parquet")]

use anyhow::Result;
use sasquatch::testing::*;
use sasquatch::{ConvertError, ConvertOptions, Converter, Decoder, ParquetDecoder, write_parquet_table};
use std::sync::Arc;

fn converter() -> Converter {
    Converter::new(Arc::new(ParquetDecoder::new().with_batch_size(64)))
        .with_cpu_count(|| 8)
        .with_confirm(ScriptedConfirm::no())
}

#[test]
fn metadata_reports_rows_and_schema() -> Result<()> {
    let table = sample_table(1_000)?;
    let file = mock_parquet_file(&table, 128)?;

    let meta = ParquetDecoder::new().read_metadata(file.path())?;
    assert_eq!(meta.total_rows, 1_000);
    assert_eq!(meta.schema.fields().len(), 3);
    assert_eq!(meta.schema.field(0).name(), "id");
    Ok(())
}

#[test]
fn ranged_read_crosses_row_groups() -> Result<()> {
    let table = sample_table(1_000)?;
    let file = mock_parquet_file(&table, 128)?;

    let rows = ParquetDecoder::new().read_rows(file.path(), 100, 300)?;
    assert_eq!(u64_column(&rows, "id"), (100..400).collect::<Vec<u64>>());

    let tail = ParquetDecoder::new().read_rows(file.path(), 950, 300)?;
    assert_eq!(tail.num_rows(), 50);
    Ok(())
}

#[test]
fn parallel_conversion_of_parquet_file() -> Result<()> {
    let table = sample_table(2_500)?;
    let file = mock_parquet_file(&table, 300)?;

    let out = converter().convert_with_report(file.path(), &ConvertOptions::default().with_chunk_size(1_000).with_processes(3))?;
    assert_eq!(out.report.chunks_planned, 3);
    let back: Vec<SampleRecord> = records_from_table(&out.table)?;
    assert_eq!(back, sample_records(2_500));

    let unordered = converter().convert(
        file.path(),
        &ConvertOptions::default()
            .with_chunk_size(100)
            .with_processes(4)
            .with_preserve_order(false),
    )?;
    assert_ids_cover(&unordered, "id", 2_500);
    Ok(())
}

#[test]
fn empty_parquet_file_keeps_schema() -> Result<()> {
    let table = sample_table(0)?;
    let file = mock_parquet_file(&table, 10)?;

    let out = converter().convert_with_report(file.path(), &ConvertOptions::default().with_processes(2))?;
    assert_eq!(out.table.num_rows(), 0);
    assert_eq!(out.table.schema().fields().len(), 3);
    assert!(!out.report.parallel);
    Ok(())
}

#[test]
fn sas_suffix_is_rejected_by_parquet_decoder() -> Result<()> {
    let file = mock_sas_file()?;
    let err = converter()
        .convert(file.path(), &ConvertOptions::default().with_processes(2))
        .unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedFileType { expected: "parquet", .. }));
    Ok(())
}

#[test]
fn garbage_file_fails_metadata_probe() -> Result<()> {
    let file = TempFilePath::with_extension("parquet")?;
    std::fs::write(file.path(), b"not parquet at all")?;
    let err = converter()
        .convert(file.path(), &ConvertOptions::default().with_processes(2))
        .unwrap_err();
    assert!(matches!(err, ConvertError::Metadata { .. }));
    Ok(())
}

#[test]
fn write_converted_table() -> Result<()> {
    let table = sample_table(321)?;
    let src = mock_parquet_file(&table, 50)?;
    let converted = converter().convert(src.path(), &ConvertOptions::default().with_chunk_size(100).with_processes(2))?;

    let tmp = tempfile::tempdir()?;
    let out_path = tmp.path().join("nested").join("out.parquet");
    let n = write_parquet_table(&out_path, &converted)?;
    assert_eq!(n, 321);

    let back = ParquetDecoder::new().read_rows(&out_path, 0, 1_000)?;
    assert_tables_equal(&back, &table);
    Ok(())
}
