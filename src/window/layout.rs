//! Chunk geometry: which bytes belong to which unit of work.

/// Byte range covered by one chunk's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkDescriptor {
    /// Position of the chunk in the file, starting at 0.
    pub index: u64,
    /// First byte of the window, `index * chunk_size`.
    pub offset: u64,
    /// Window length, `min(chunk_size + overlap, file_size - offset)`.
    pub len: u64,
}

impl ChunkDescriptor {
    /// Returns the window as a byte range.
    pub fn range(&self) -> std::ops::Range<u64> {
        self.offset..self.offset + self.len
    }
}

/// Splits `file_size` bytes into `chunk_size` units, each read with
/// `overlap` extra trailing bytes.
///
/// # Example
///
/// ```
/// use ipspan::ChunkLayout;
///
/// let layout = ChunkLayout::new(100, 40, 8);
/// assert_eq!(layout.num_chunks(), 3);
///
/// let first = layout.descriptor(0).unwrap();
/// assert_eq!(first.range(), 0..48);
///
/// let last = layout.descriptor(2).unwrap();
/// assert_eq!(last.range(), 80..100);
///
/// assert!(layout.descriptor(3).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkLayout {
    file_size: u64,
    chunk_size: u64,
    overlap: u64,
}

impl ChunkLayout {
    /// Creates a layout. `chunk_size` must be non-zero.
    pub fn new(file_size: u64, chunk_size: u64, overlap: u64) -> Self {
        debug_assert!(chunk_size > 0, "chunk_size must be non-zero");
        Self {
            file_size,
            chunk_size,
            overlap,
        }
    }

    /// Number of chunks needed to cover the file, rounding up.
    pub fn num_chunks(&self) -> u64 {
        self.file_size.div_ceil(self.chunk_size)
    }

    /// Returns the window for chunk `index`, or `None` if the chunk starts at
    /// or past the end of the file.
    pub fn descriptor(&self, index: u64) -> Option<ChunkDescriptor> {
        let offset = index.checked_mul(self.chunk_size)?;
        if offset >= self.file_size {
            return None;
        }

        let len = self
            .chunk_size
            .saturating_add(self.overlap)
            .min(self.file_size - offset);

        Some(ChunkDescriptor { index, offset, len })
    }

    /// Returns the file size in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Returns the chunk size in bytes.
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Returns the overlap in bytes.
    pub fn overlap(&self) -> u64 {
        self.overlap
    }
}
