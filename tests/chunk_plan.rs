use anyhow::Result;
use sasquatch::testing::*;
use sasquatch::{plan_chunks, read_chunk, ChunkSpec, ConvertError};
use std::path::Path;

fn sizes(total: usize, chunk: usize) -> Result<Vec<usize>> {
    Ok(plan_chunks("data.sas7bdat", total, chunk)?
        .iter()
        .map(|c| c.rows)
        .collect())
}

#[test]
fn plan_25000_rows_in_chunks_of_10000() -> Result<()> {
    assert_eq!(sizes(25_000, 10_000)?, vec![10_000, 10_000, 5_000]);
    Ok(())
}

#[test]
fn plan_exact_multiple_keeps_full_last_chunk() -> Result<()> {
    assert_eq!(sizes(30_000, 10_000)?, vec![10_000, 10_000, 10_000]);
    Ok(())
}

#[test]
fn plan_smaller_than_one_chunk() -> Result<()> {
    assert_eq!(sizes(42, 10_000)?, vec![42]);
    Ok(())
}

#[test]
fn plan_empty_file_has_no_chunks() -> Result<()> {
    assert!(plan_chunks("data.sas7bdat", 0, 100)?.is_empty());
    Ok(())
}

#[test]
fn plan_rejects_zero_chunk_size() {
    let err = plan_chunks("data.sas7bdat", 10, 0).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidConfiguration { .. }));
}

#[test]
fn plan_covers_rows_without_gaps_or_overlaps() -> Result<()> {
    for total in [1usize, 2, 7, 99, 100, 101, 1_000, 12_345] {
        for chunk in [1usize, 3, 10, 100, 4_096, 20_000] {
            let plan = plan_chunks("data.sas7bdat", total, chunk)?;
            let mut next = 0;
            for (i, spec) in plan.iter().enumerate() {
                assert_eq!(spec.index, i);
                assert_eq!(spec.offset, next, "gap or overlap at chunk {i}");
                assert!(spec.rows >= 1 && spec.rows <= chunk);
                next = spec.range().end;
            }
            assert_eq!(next, total);

            let last = plan.last().map(|s| s.rows).unwrap_or(0);
            let expected_last = if total % chunk == 0 { chunk } else { total % chunk };
            assert_eq!(last, expected_last, "total={total} chunk={chunk}");
            assert_eq!(plan.len(), total.div_ceil(chunk));
        }
    }
    Ok(())
}

#[test]
fn plan_carries_the_path() -> Result<()> {
    let plan = plan_chunks("/data/in.sas7bdat", 5, 2)?;
    assert!(plan.iter().all(|c| c.path == Path::new("/data/in.sas7bdat")));
    Ok(())
}

#[test]
fn read_chunk_returns_requested_rows() -> Result<()> {
    let decoder = MockDecoder::new(sample_table(250)?);
    let plan = plan_chunks("data.sas7bdat", 250, 100)?;

    let last = read_chunk(&decoder, &plan[2])?;
    assert_eq!(last.num_rows(), 50);
    assert_eq!(u64_column(&last, "id"), (200..250).collect::<Vec<u64>>());
    Ok(())
}

#[test]
fn read_chunk_propagates_decode_failure_with_range() -> Result<()> {
    let decoder = MockDecoder::new(sample_table(250)?).fail_at(100);
    let plan = plan_chunks("data.sas7bdat", 250, 100)?;

    match read_chunk(&decoder, &plan[1]) {
        Err(ConvertError::Decode { offset, rows, .. }) => {
            assert_eq!(offset, 100);
            assert_eq!(rows, 100);
        }
        other => panic!("expected Decode error, got {other:?}"),
    }
    assert!(read_chunk(&decoder, &plan[0]).is_ok());
    Ok(())
}

#[test]
fn decode_error_message_saturates_at_extreme_ranges() -> Result<()> {
    let decoder = MockDecoder::new(sample_table(10)?);
    let spec = ChunkSpec {
        index: 0,
        path: "data.sas7bdat".into(),
        offset: usize::MAX - 1,
        rows: 10,
    };

    assert_eq!(spec.range().end, usize::MAX);
    let err = read_chunk(&decoder, &spec).unwrap_err();
    assert!(matches!(err, ConvertError::Decode { .. }));
    assert_eq!(
        err.to_string(),
        format!("failed to decode rows {}..{} of data.sas7bdat", usize::MAX - 1, usize::MAX)
    );
    Ok(())
}
