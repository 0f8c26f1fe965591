// Integration tests for the counting pipeline
// Tests cover: end-to-end counts, chunk boundaries, cancellation, mapping failures

use std::collections::HashSet;
use std::fs::File;
use std::io::Write;

use bytes::Bytes;
use ipspan::{CancelToken, CountConfig, CountError, Counter};
use tempfile::NamedTempFile;

fn write_temp(data: &[u8]) -> (NamedTempFile, u64) {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(data).expect("write temp file");
    file.flush().expect("flush temp file");
    (file, data.len() as u64)
}

fn counter(chunk_size: u64, overlap: u64, workers: usize) -> Counter {
    Counter::new(CountConfig::new(chunk_size, overlap, workers).unwrap())
}

fn count_file(counter: &Counter, data: &[u8]) -> u64 {
    let (file, size) = write_temp(data);
    let result = counter.count_file(file.as_file(), size, &CancelToken::new());
    assert!(
        !result.has_errors(),
        "unexpected errors: {:?}",
        result.errors()
    );
    result.unique_count()
}

/// Builds `n` distinct addresses of varying line length.
fn distinct_lines(n: u32) -> (Vec<u8>, usize) {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for i in 0..n {
        let ip = i.wrapping_mul(2_654_435_761);
        seen.insert(ip);
        let [a, b, c, d] = ip.to_be_bytes();
        writeln!(out, "{}.{}.{}.{}", a, b, c, d).unwrap();
    }
    (out, seen.len())
}

// ============================================================================
// End-to-End Counts
// ============================================================================

#[test]
fn test_single_chunk_with_duplicates() {
    let data = b"1.2.3.4\n8.8.8.8\n1.2.3.4\n";
    for workers in 1..=4 {
        assert_eq!(
            count_file(&counter(4096, 16, workers), data),
            2,
            "workers = {}",
            workers
        );
    }
}

#[test]
fn test_octet_edges() {
    let data = b"0.0.0.0\n0.0.0.255\n0.0.1.0\n";
    assert_eq!(count_file(&counter(4096, 16, 2), data), 3);
}

#[test]
fn test_mixed_ips_with_duplicates() {
    let data = b"0.0.0.0\n1.1.1.1\n2.2.2.2\n1.1.1.1\n255.255.255.255\n2.2.2.2\n";
    assert_eq!(count_file(&counter(4096, 16, 1), data), 4);
}

#[test]
fn test_malformed_lines_are_ignored() {
    let data = b"1.2.3.4\n999.1.1.1\n1.2.3.4.5\nhello\n\n10.0.0.1\n7.7.7.7";
    assert_eq!(count_file(&counter(4096, 16, 2), data), 2);
}

#[test]
fn test_empty_file_counts_zero() {
    assert_eq!(count_file(&counter(4096, 16, 2), b""), 0);
}

#[test]
fn test_count_path() {
    let (file, _) = write_temp(b"10.0.0.1\n10.0.0.2\n10.0.0.1\n");
    let result = counter(4096, 16, 2)
        .count_path(file.path(), &CancelToken::new())
        .unwrap();
    assert_eq!(result.into_result().unwrap(), 2);
}

#[test]
fn test_count_path_missing_file() {
    let err = Counter::default()
        .count_path("this-definitely-does-not-exist.txt", &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, CountError::Io(_)));
}

// ============================================================================
// Chunk Boundaries
// ============================================================================

#[test]
fn test_same_line_across_many_chunks() {
    let chunk = 4096u64;
    let line = b"10.0.0.1\n";
    let repeats = chunk as usize / line.len() + 10;
    let data = line.repeat(repeats);

    assert_eq!(count_file(&counter(chunk, 16, 3), &data), 1);
}

#[test]
fn test_distinct_lines_across_unaligned_chunks() {
    let (data, expected) = distinct_lines(20_000);
    assert_eq!(count_file(&counter(1000, 16, 4), &data), expected as u64);
}

#[test]
fn test_chunk_smaller_than_a_line() {
    let (data, expected) = distinct_lines(500);
    for chunk in [1u64, 7, 15, 16, 17] {
        let result = counter(chunk, 16, 3).count_bytes(data.clone(), &CancelToken::new());
        assert_eq!(result.unique_count(), expected as u64, "chunk = {}", chunk);
    }
}

#[test]
fn test_widest_line_on_boundary() {
    // the second line starts exactly at the second chunk
    let data = b"1.1.1.1\n255.255.255.255\n2.2.2.2\n";
    let result = counter(8, 16, 2).count_bytes(&data[..], &CancelToken::new());
    assert_eq!(result.unique_count(), 3);
}

#[test]
fn test_file_and_bytes_agree() {
    let (data, expected) = distinct_lines(3_000);
    let counter = counter(777, 16, 3);

    let from_bytes = counter
        .count_bytes(Bytes::from(data.clone()), &CancelToken::new())
        .unique_count();
    let from_file = count_file(&counter, &data);

    assert_eq!(from_bytes, expected as u64);
    assert_eq!(from_file, from_bytes);
}

#[test]
fn test_small_address_batches() {
    let (data, expected) = distinct_lines(2_000);
    let counter = Counter::new(
        CountConfig::new(512, 16, 2)
            .unwrap()
            .with_address_batch(1),
    );
    assert_eq!(count_file(&counter, &data), expected as u64);
}

// ============================================================================
// Cancellation and Failures
// ============================================================================

#[test]
fn test_external_cancellation_is_not_an_error() {
    let (data, _) = distinct_lines(1_000);
    let cancel = CancelToken::new();
    cancel.cancel();

    let result = counter(64, 16, 2).count_bytes(data, &cancel);
    assert_eq!(result.unique_count(), 0);
    assert!(result.errors().is_empty());
    assert!(result.was_cancelled());
}

#[cfg(unix)]
#[test]
fn test_mapping_failure_is_reported() {
    let (data, _) = distinct_lines(1_000);
    let (file, size) = write_temp(&data);

    // a handle that cannot be read from cannot be mapped either
    let write_only = File::options().write(true).open(file.path()).unwrap();
    let result = counter(1024, 16, 2).count_file(&write_only, size, &CancelToken::new());

    assert!(result.has_errors());
    assert!(result.was_cancelled());
    assert!(
        result
            .errors()
            .iter()
            .all(|err| matches!(err, CountError::Map { .. }))
    );
    // best-effort count is still returned
    assert_eq!(result.unique_count(), 0);
    assert!(result.into_result().is_err());
}
