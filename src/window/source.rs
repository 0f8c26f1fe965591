//! Window sources: memory-mapped files and in-memory buffers.

use std::fs::File;
use std::io;
use std::ops::Deref;

use bytes::Bytes;
use memmap2::{Mmap, MmapOptions};

/// A read-only byte view over part of the input.
///
/// Dropping a mapped window unmaps it.
#[derive(Debug, Default)]
pub struct Window {
    inner: Inner,
}

#[derive(Debug, Default)]
enum Inner {
    #[default]
    Empty,
    Mapped(Mmap),
    Shared(Bytes),
}

impl Window {
    /// A window with no bytes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wraps a file mapping.
    pub fn mapped(mmap: Mmap) -> Self {
        Self {
            inner: Inner::Mapped(mmap),
        }
    }

    /// Wraps a shared buffer.
    pub fn shared(data: Bytes) -> Self {
        Self {
            inner: Inner::Shared(data),
        }
    }
}

impl Deref for Window {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &self.inner {
            Inner::Empty => &[],
            Inner::Mapped(mmap) => mmap,
            Inner::Shared(data) => data,
        }
    }
}

/// Something that can expose a byte range as a [`Window`].
///
/// Sources are shared by every worker of a run, so they must be `Sync`.
pub trait WindowSource: Sync {
    /// Returns a view over `[offset, offset + len)`.
    ///
    /// Callers only ask for non-empty ranges inside the input.
    fn window(&self, offset: u64, len: usize) -> io::Result<Window>;
}

impl WindowSource for File {
    fn window(&self, offset: u64, len: usize) -> io::Result<Window> {
        // SAFETY: the mapping is read-only and private to one worker. The
        // input must not be truncated while a run is in progress.
        #[allow(unsafe_code)]
        let mmap = unsafe { MmapOptions::new().offset(offset).len(len).map(self)? };

        #[cfg(unix)]
        {
            // Advice is only a hint
            let _ = mmap.advise(memmap2::Advice::Sequential);
        }

        Ok(Window::mapped(mmap))
    }
}

impl WindowSource for Bytes {
    fn window(&self, offset: u64, len: usize) -> io::Result<Window> {
        let start = usize::try_from(offset)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset out of range"))?;
        let end = start
            .checked_add(len)
            .filter(|&end| end <= self.len())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::UnexpectedEof, "window past end of buffer")
            })?;

        Ok(Window::shared(self.slice(start..end)))
    }
}
