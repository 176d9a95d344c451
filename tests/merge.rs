use anyhow::Result;
use arrow::array::{ArrayRef, Int32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use sasquatch::testing::*;
use sasquatch::{concat_eager, LazyConcat};
use std::sync::Arc;

fn fragments(table: &RecordBatch, size: usize) -> Vec<RecordBatch> {
    (0..table.num_rows())
        .step_by(size)
        .map(|o| table.slice(o, size.min(table.num_rows() - o)))
        .collect()
}

#[test]
fn lazy_plan_defers_until_collect() -> Result<()> {
    let table = sample_table(1_050)?;
    let plan = LazyConcat::new(table.schema(), fragments(&table, 100));

    assert_eq!(plan.num_fragments(), 11);
    assert_eq!(plan.num_rows(), 1_050);
    assert_eq!(plan.schema().fields(), table.schema().fields());

    let out = plan.collect()?;
    assert_tables_equal(&out, &table);
    Ok(())
}

#[test]
fn lazy_and_eager_agree() -> Result<()> {
    let table = sample_table(333)?;
    let parts = fragments(&table, 40);

    let eager = concat_eager(&table.schema(), &parts)?;
    let lazy = LazyConcat::new(table.schema(), parts).collect()?;
    assert_tables_equal(&lazy, &eager);
    Ok(())
}

#[test]
fn empty_plan_collects_to_zero_rows_with_schema() -> Result<()> {
    let table = sample_table(5)?;
    let out = LazyConcat::new(table.schema(), vec![]).collect()?;
    assert_eq!(out.num_rows(), 0);
    assert_eq!(out.schema().fields(), table.schema().fields());
    Ok(())
}

#[test]
fn zero_row_fragments_are_harmless() -> Result<()> {
    let table = sample_table(20)?;
    let parts = vec![table.slice(0, 0), table.slice(0, 20), table.slice(20, 0)];
    let out = LazyConcat::new(table.schema(), parts).collect()?;
    assert_tables_equal(&out, &table);
    Ok(())
}

#[test]
fn lazy_collect_rejects_width_mismatch() -> Result<()> {
    let table = sample_table(10)?;
    let narrow = RecordBatch::try_new(
        Arc::new(Schema::new(vec![Field::new("x", DataType::Int32, false)])),
        vec![Arc::new(Int32Array::from(vec![1, 2])) as ArrayRef],
    )?;
    let plan = LazyConcat::new(table.schema(), vec![table, narrow]);
    assert!(plan.collect().is_err());
    Ok(())
}
