//! Configuration for a counting run.
//!
//! - [`CountConfig`] - Chunk size, overlap, worker count and batch size
//!
//! # Example
//!
//! ```
//! use ipspan::CountConfig;
//!
//! // 8 MiB chunks, 16 bytes of overlap, 4 workers
//! let config = CountConfig::new(8 * 1024 * 1024, 16, 4)?;
//!
//! // Builder pattern
//! let config = CountConfig::default()
//!     .with_chunk_size(64 * 1024)
//!     .with_workers(2);
//! config.validate()?;
//!
//! # Ok::<(), ipspan::CountError>(())
//! ```

use tracing::warn;

use crate::error::CountError;

/// Longest valid line, `"255.255.255.255\n"`.
pub const MAX_LINE_LEN: u64 = 16;

/// Default bytes of file per unit of work (32 MiB).
pub const DEFAULT_CHUNK_SIZE: u64 = 32 * 1024 * 1024;

/// Default bytes appended to every window to recover split lines.
pub const DEFAULT_OVERLAP: u64 = MAX_LINE_LEN;

/// Default number of addresses forwarded to the aggregator per message.
pub const DEFAULT_ADDRESS_BATCH: usize = 4096;

/// Default worker count: all available cores but one, at least one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

/// Configuration for a counting run.
///
/// The file is split into `chunk_size` units of work. Each unit is read
/// through a window of `chunk_size + overlap` bytes so that a line crossing
/// into the next chunk is still complete in the earlier window. The overlap
/// must be at least [`MAX_LINE_LEN`] for boundary lines to be counted
/// reliably.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CountConfig {
    chunk_size: u64,
    overlap: u64,
    workers: usize,
    address_batch: usize,
}

impl CountConfig {
    /// Creates a new configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CountError::InvalidConfig`] if `chunk_size` or `workers`
    /// is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use ipspan::CountConfig;
    ///
    /// let config = CountConfig::new(4096, 16, 2)?;
    /// assert_eq!(config.chunk_size(), 4096);
    /// assert!(CountConfig::new(0, 16, 2).is_err());
    /// # Ok::<(), ipspan::CountError>(())
    /// ```
    pub fn new(chunk_size: u64, overlap: u64, workers: usize) -> Result<Self, CountError> {
        let config = Self {
            chunk_size,
            overlap,
            workers,
            address_batch: DEFAULT_ADDRESS_BATCH,
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the chunk size in bytes.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`CountConfig::validate`] to check it.
    pub fn with_chunk_size(mut self, size: u64) -> Self {
        self.chunk_size = size;
        self
    }

    /// Sets the window overlap in bytes.
    pub fn with_overlap(mut self, overlap: u64) -> Self {
        self.overlap = overlap;
        self
    }

    /// Sets the number of parsing workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets how many addresses a worker buffers before handing them to the
    /// aggregator.
    pub fn with_address_batch(mut self, batch: usize) -> Self {
        self.address_batch = batch;
        self
    }

    /// Returns the chunk size in bytes.
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Returns the window overlap in bytes.
    pub fn overlap(&self) -> u64 {
        self.overlap
    }

    /// Returns the number of parsing workers.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns the address batch size.
    pub fn address_batch(&self) -> usize {
        self.address_batch
    }

    /// Validates the current configuration.
    ///
    /// An overlap below [`MAX_LINE_LEN`] is accepted but logged, since lines
    /// straddling a chunk boundary may then be dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use ipspan::CountConfig;
    ///
    /// let config = CountConfig::default().with_workers(0);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), CountError> {
        if self.chunk_size == 0 {
            return Err(CountError::InvalidConfig {
                message: "chunk_size must be non-zero",
            });
        }

        if self.workers == 0 {
            return Err(CountError::InvalidConfig {
                message: "at least one worker is required",
            });
        }

        if self.address_batch == 0 {
            return Err(CountError::InvalidConfig {
                message: "address_batch must be non-zero",
            });
        }

        if self.overlap < MAX_LINE_LEN {
            warn!(
                overlap = self.overlap,
                min = MAX_LINE_LEN,
                "overlap shorter than the longest address line"
            );
        }

        Ok(())
    }
}

impl Default for CountConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
            workers: default_workers(),
            address_batch: DEFAULT_ADDRESS_BATCH,
        }
    }
}
