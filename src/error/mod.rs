//! Error types for ipspan.

use std::fmt;

/// Errors that can occur while counting addresses.
///
/// Malformed input lines are never errors; they are skipped by the parser.
#[derive(Debug)]
pub enum CountError {
    /// An I/O error occurred while opening or inspecting the input.
    Io(std::io::Error),

    /// The operating system rejected the memory mapping of a chunk window.
    ///
    /// This is fatal for a run: it cancels every other worker.
    Map {
        /// Index of the chunk whose window could not be mapped.
        index: u64,
        /// Byte offset of the requested window.
        offset: u64,
        /// Byte length of the requested window.
        len: u64,
        /// The underlying OS error.
        source: std::io::Error,
    },

    /// Invalid configuration parameter.
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// A parsing worker panicked before finishing its share of chunks.
    WorkerPanicked {
        /// Id of the worker that panicked.
        worker: usize,
    },
}

impl fmt::Display for CountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountError::Io(e) => write!(f, "io error: {}", e),
            CountError::Map {
                index,
                offset,
                len,
                source,
            } => {
                write!(
                    f,
                    "failed to map chunk {} ({} bytes @ {}): {}",
                    index, len, offset, source
                )
            }
            CountError::InvalidConfig { message } => {
                write!(f, "invalid config: {}", message)
            }
            CountError::WorkerPanicked { worker } => {
                write!(f, "worker {} panicked", worker)
            }
        }
    }
}

impl std::error::Error for CountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CountError::Io(e) => Some(e),
            CountError::Map { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CountError {
    fn from(e: std::io::Error) -> Self {
        CountError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: CountError = io_err.into();
        assert!(matches!(err, CountError::Io(_)));
    }

    #[test]
    fn test_map_error_display_and_source() {
        let err = CountError::Map {
            index: 3,
            offset: 96,
            len: 48,
            source: std::io::Error::from_raw_os_error(22),
        };
        let msg = err.to_string();
        assert!(msg.contains("chunk 3"));
        assert!(msg.contains("48 bytes @ 96"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_display() {
        let err = CountError::InvalidConfig {
            message: "chunk_size must be non-zero",
        };
        assert!(err.to_string().contains("invalid config"));
        assert!(err.source().is_none());
    }
}
