//! Dense presence bitmap indexed by address value.

/// Number of distinct IPv4 addresses.
pub const ADDRESS_SPACE: u64 = 1 << 32;

/// Number of 64-bit words needed to cover [`ADDRESS_SPACE`].
pub const WORDS: usize = (ADDRESS_SPACE >> 6) as usize;

/// A bit array with exactly one bit per 32-bit address.
///
/// Bit `i` is set iff address `i` has been added. Since the index space is the
/// whole value domain there are no collisions and no resizing; the price is a
/// single 512 MiB allocation made up front.
///
/// The bitmap has a single mutator. In a counting run that is the
/// aggregator; nothing else touches it until the aggregator is done.
///
/// # Example
///
/// ```
/// use ipspan::PresenceBitmap;
///
/// let mut set = PresenceBitmap::new();
/// set.add(0x0102_0304);
/// set.add(0x0102_0304);
/// set.add(0x0808_0808);
/// assert_eq!(set.count(), 2);
/// ```
pub struct PresenceBitmap {
    words: Box<[u64]>,
}

impl PresenceBitmap {
    /// Allocates a zeroed bitmap covering every IPv4 address.
    pub fn new() -> Self {
        Self::with_words(WORDS)
    }

    /// Bitmap restricted to the first `words * 64` addresses.
    pub(crate) fn with_words(words: usize) -> Self {
        Self {
            words: vec![0u64; words].into_boxed_slice(),
        }
    }

    /// Marks `address` as seen.
    ///
    /// Returns `true` if the address was not present before. Adding is
    /// idempotent and commutative, so the final [`count`](Self::count) never
    /// depends on call order.
    #[inline]
    pub fn add(&mut self, address: u32) -> bool {
        let word = &mut self.words[(address >> 6) as usize];
        let bit = 1u64 << (address & 63);
        let fresh = *word & bit == 0;
        *word |= bit;
        fresh
    }

    /// Returns true if `address` has been added.
    #[inline]
    pub fn contains(&self, address: u32) -> bool {
        self.words[(address >> 6) as usize] & (1u64 << (address & 63)) != 0
    }

    /// Returns the number of distinct addresses added so far.
    pub fn count(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// Returns the size of the backing storage in bytes.
    pub fn len_bytes(&self) -> usize {
        self.words.len() * std::mem::size_of::<u64>()
    }
}

impl Default for PresenceBitmap {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PresenceBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceBitmap")
            .field("len_bytes", &self.len_bytes())
            .finish_non_exhaustive()
    }
}
