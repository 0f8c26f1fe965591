//! Per-worker window mapping.

use std::io;

use tracing::trace;

use super::{ChunkLayout, Window, WindowSource};
use crate::error::CountError;

/// Maps chunk indices to windows of a shared source.
///
/// Each worker owns one mapper and therefore holds at most one live window.
/// The previous window is released before the next one is requested, so a
/// long run never accumulates mappings.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use ipspan::{ChunkLayout, WindowMapper};
///
/// let data = Bytes::from_static(b"1.2.3.4\n5.6.7.8\n");
/// let layout = ChunkLayout::new(data.len() as u64, 8, 4);
/// let mut mapper = WindowMapper::new(&data, layout);
///
/// assert_eq!(mapper.map(0)?, b"1.2.3.4\n5.6.");
/// assert_eq!(mapper.map(1)?, b"5.6.7.8\n");
/// assert!(mapper.map(2)?.is_empty());
/// # Ok::<(), ipspan::CountError>(())
/// ```
pub struct WindowMapper<'s, S: WindowSource + ?Sized> {
    source: &'s S,
    layout: ChunkLayout,
    current: Window,
}

impl<'s, S: WindowSource + ?Sized> WindowMapper<'s, S> {
    /// Creates a mapper over `source` with the given chunk geometry.
    pub fn new(source: &'s S, layout: ChunkLayout) -> Self {
        Self {
            source,
            layout,
            current: Window::empty(),
        }
    }

    /// Maps the window of chunk `index`, replacing the previous one.
    ///
    /// An index that starts at or past the end of the input yields an empty
    /// window and no error.
    ///
    /// # Errors
    ///
    /// Returns [`CountError::Map`] when the source rejects the range.
    pub fn map(&mut self, index: u64) -> Result<&[u8], CountError> {
        self.current = Window::empty();

        let Some(desc) = self.layout.descriptor(index) else {
            return Ok(&self.current[..]);
        };

        let map_err = |source| CountError::Map {
            index,
            offset: desc.offset,
            len: desc.len,
            source,
        };

        let len = usize::try_from(desc.len).map_err(|_| {
            map_err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "window exceeds address space",
            ))
        })?;
        self.current = self.source.window(desc.offset, len).map_err(map_err)?;

        trace!(index, offset = desc.offset, len, "mapped window");
        Ok(&self.current[..])
    }

    /// Releases the current window, if any.
    pub fn release(&mut self) {
        self.current = Window::empty();
    }

    /// Returns the chunk geometry.
    pub fn layout(&self) -> &ChunkLayout {
        &self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    const CHUNK: u64 = 8192;
    const OVERLAP: u64 = 4;
    const FILE_SIZE: usize = 5 * 4096 + 10;

    fn temp_file(size: usize) -> (tempfile::NamedTempFile, Vec<u8>) {
        let data: Vec<u8> = (0..size).map(|i| (i % 256) as u8).collect();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();
        file.flush().unwrap();
        (file, data)
    }

    fn mapper(file: &File, size: usize) -> WindowMapper<'_, File> {
        WindowMapper::new(file, ChunkLayout::new(size as u64, CHUNK, OVERLAP))
    }

    #[test]
    fn test_first_chunk_includes_overlap() {
        let (file, data) = temp_file(FILE_SIZE);
        let mut mm = mapper(file.as_file(), FILE_SIZE);

        let window = mm.map(0).unwrap();
        let want = (CHUNK + OVERLAP) as usize;
        assert_eq!(window.len(), want);
        assert_eq!(window, &data[..want]);
    }

    #[test]
    fn test_middle_chunk_includes_overlap() {
        let (file, data) = temp_file(FILE_SIZE);
        let mut mm = mapper(file.as_file(), FILE_SIZE);

        let window = mm.map(1).unwrap();
        let offset = CHUNK as usize;
        let want = (CHUNK + OVERLAP) as usize;
        assert_eq!(window.len(), want);
        assert_eq!(window, &data[offset..offset + want]);
    }

    #[test]
    fn test_last_chunk_is_shorter() {
        let (file, data) = temp_file(FILE_SIZE);
        let mut mm = mapper(file.as_file(), FILE_SIZE);

        let window = mm.map(2).unwrap();
        let offset = 2 * CHUNK as usize;
        assert_eq!(window.len(), FILE_SIZE - offset);
        assert_eq!(window, &data[offset..]);
    }

    #[test]
    fn test_offset_beyond_end_is_empty() {
        let (file, _) = temp_file(2 * 4096);
        let mut mm = mapper(file.as_file(), 2 * 4096);

        let window = mm.map(2).unwrap();
        assert!(window.is_empty());
    }

    #[test]
    fn test_unaligned_chunk_maps() {
        let (file, data) = temp_file(FILE_SIZE);
        let layout = ChunkLayout::new(FILE_SIZE as u64, 2171, OVERLAP);
        let mut mm = WindowMapper::new(file.as_file(), layout);

        let window = mm.map(3).unwrap();
        assert_eq!(window, &data[3 * 2171..3 * 2171 + 2171 + OVERLAP as usize]);
    }

    #[test]
    fn test_remap_replaces_window() {
        let (file, data) = temp_file(FILE_SIZE);
        let mut mm = mapper(file.as_file(), FILE_SIZE);

        mm.map(0).unwrap();
        let second = mm.map(2).unwrap().to_vec();
        assert_eq!(second, &data[2 * CHUNK as usize..]);

        mm.release();
        assert!(mm.current.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_only_handle_is_map_error() {
        let (file, _) = temp_file(FILE_SIZE);
        let write_only = std::fs::OpenOptions::new()
            .write(true)
            .open(file.path())
            .unwrap();
        let mut mm = mapper(&write_only, FILE_SIZE);

        let err = mm.map(1).unwrap_err();
        assert!(matches!(
            err,
            CountError::Map {
                index: 1,
                offset: CHUNK,
                len,
                ..
            } if len == CHUNK + OVERLAP
        ));
    }
}
