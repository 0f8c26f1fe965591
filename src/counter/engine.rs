//! Counting engine - Counter and RunResult.
//!
//! A run wires four stages together with bounded queues:
//!
//! ```text
//! generator --indices--> N workers --address batches--> aggregator --> bitmap
//! ```
//!
//! - The generator emits chunk indices `0..ceil(size / chunk_size)`.
//! - Each worker maps the chunk's window, parses it, and forwards addresses.
//! - The aggregator is the only writer of the [`PresenceBitmap`].
//!
//! A single [`CancelToken`] stops the generator and the workers. It is raised
//! by the caller (e.g. on Ctrl-C) or by a worker whose window could not be
//! mapped. The aggregator keeps draining until every worker has stopped and
//! the address queue is closed, so whatever was parsed is still counted.
//!
//! # Example
//!
//! ```
//! use ipspan::{CancelToken, CountConfig, Counter};
//!
//! let counter = Counter::new(CountConfig::new(8, 16, 2)?);
//! let result = counter.count_bytes(&b"1.2.3.4\n8.8.8.8\n1.2.3.4\n"[..], &CancelToken::new());
//!
//! assert_eq!(result.unique_count(), 2);
//! assert!(!result.has_errors());
//! # Ok::<(), ipspan::CountError>(())
//! ```

use std::fs::File;
use std::path::Path;
use std::thread;

use bytes::Bytes;
use crossbeam_channel::bounded;
use tracing::debug;

use super::generator::generate;
use super::worker::{Worker, aggregate};
use crate::bitmap::PresenceBitmap;
use crate::cancel::CancelToken;
use crate::config::CountConfig;
use crate::error::CountError;
use crate::window::{ChunkLayout, WindowMapper, WindowSource};

/// Outcome of a counting run.
///
/// The count is always meaningful: after a failure or a cancellation it
/// covers every address parsed before the run stopped.
#[derive(Debug)]
pub struct RunResult {
    unique_count: u64,
    errors: Vec<CountError>,
    cancelled: bool,
}

impl RunResult {
    /// Number of distinct addresses seen.
    pub fn unique_count(&self) -> u64 {
        self.unique_count
    }

    /// Failures reported by the run, ordered by worker id.
    pub fn errors(&self) -> &[CountError] {
        &self.errors
    }

    /// Returns true if any worker reported a failure.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if the run was stopped before covering the whole input,
    /// either by the caller or by a failure.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Returns the count, or the first error if there was one.
    pub fn into_result(self) -> Result<u64, CountError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.unique_count),
        }
    }

    /// Splits the result into `(unique_count, errors)`.
    pub fn into_parts(self) -> (u64, Vec<CountError>) {
        (self.unique_count, self.errors)
    }
}

/// Counts distinct IPv4 addresses in newline-delimited input.
///
/// `Counter` holds a configuration and runs the pipeline over a file, a
/// path, or an in-memory buffer.
///
/// # Example
///
/// ```no_run
/// use ipspan::{CancelToken, Counter};
///
/// let counter = Counter::default();
/// let result = counter.count_path("addresses.txt", &CancelToken::new())?;
/// println!("{} unique", result.unique_count());
/// # Ok::<(), ipspan::CountError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Counter {
    config: CountConfig,
}

impl Counter {
    /// Creates a new counter with the given configuration.
    pub fn new(config: CountConfig) -> Self {
        Self { config }
    }

    /// Counts the addresses in the first `file_size` bytes of `file`.
    ///
    /// Windows are memory-mapped straight from the file handle. The file
    /// must not shrink below `file_size` while the run is in progress.
    pub fn count_file(&self, file: &File, file_size: u64, cancel: &CancelToken) -> RunResult {
        self.run(file, file_size, cancel)
    }

    /// Opens `path` and counts its addresses.
    ///
    /// # Errors
    ///
    /// Returns [`CountError::Io`] if the file cannot be opened or inspected.
    /// Failures during the run are reported in the [`RunResult`].
    pub fn count_path(
        &self,
        path: impl AsRef<Path>,
        cancel: &CancelToken,
    ) -> Result<RunResult, CountError> {
        let (file, size) = open_input(path.as_ref())?;
        debug!(path = %path.as_ref().display(), size, "opened input");
        Ok(self.count_file(&file, size, cancel))
    }

    /// Counts the addresses in an in-memory buffer.
    ///
    /// Runs the same pipeline as [`count_file`](Self::count_file); windows
    /// are zero-copy slices of `data`.
    pub fn count_bytes(&self, data: impl Into<Bytes>, cancel: &CancelToken) -> RunResult {
        let data = data.into();
        let size = data.len() as u64;
        self.run(&data, size, cancel)
    }

    /// Returns the configuration used by this counter.
    pub fn config(&self) -> &CountConfig {
        &self.config
    }

    fn run<S>(&self, source: &S, file_size: u64, cancel: &CancelToken) -> RunResult
    where
        S: WindowSource + ?Sized,
    {
        if let Err(err) = self.config.validate() {
            return RunResult {
                unique_count: 0,
                errors: vec![err],
                cancelled: false,
            };
        }

        if file_size == 0 {
            return RunResult {
                unique_count: 0,
                errors: Vec::new(),
                cancelled: cancel.is_cancelled(),
            };
        }

        let layout = ChunkLayout::new(file_size, self.config.chunk_size(), self.config.overlap());
        let num_chunks = layout.num_chunks();
        let workers = self.config.workers();
        let batch_size = self.config.address_batch();
        debug!(file_size, num_chunks, workers, "starting run");

        let mut bitmap = PresenceBitmap::new();
        let (index_tx, index_rx) = bounded::<u64>(workers);
        let (addr_tx, addr_rx) = bounded::<Vec<u32>>(workers);

        let (errors, received) = thread::scope(|s| {
            s.spawn(move || generate(num_chunks, index_tx, cancel));

            let bitmap = &mut bitmap;
            let aggregator = s.spawn(move || aggregate(addr_rx, bitmap));

            let handles: Vec<_> = (0..workers)
                .map(|id| {
                    let worker = Worker {
                        id,
                        mapper: WindowMapper::new(source, layout),
                        indices: index_rx.clone(),
                        addresses: addr_tx.clone(),
                        cancel,
                        batch_size,
                    };
                    s.spawn(move || worker.run())
                })
                .collect();
            drop(index_rx);

            let mut errors = Vec::new();
            for (id, handle) in handles.into_iter().enumerate() {
                match handle.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => errors.push(err),
                    Err(_) => {
                        cancel.cancel();
                        errors.push(CountError::WorkerPanicked { worker: id });
                    }
                }
            }

            // every producer has stopped; closing the queue lets the aggregator finish
            drop(addr_tx);
            let received = match aggregator.join() {
                Ok(received) => received,
                Err(panic) => std::panic::resume_unwind(panic),
            };

            (errors, received)
        });

        let unique_count = bitmap.count();
        debug!(unique_count, received, errors = errors.len(), "run finished");

        RunResult {
            unique_count,
            errors,
            cancelled: cancel.is_cancelled(),
        }
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new(CountConfig::default())
    }
}

/// Opens `path` for reading and returns it with its size in bytes.
fn open_input(path: &Path) -> Result<(File, u64), CountError> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    Ok((file, size))
}
