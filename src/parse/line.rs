//! Line automaton for newline-delimited IPv4 addresses.
//!
//! # Grammar
//!
//! A line is accepted when it consists of four decimal octets separated by
//! exactly three dots and is terminated by `\n`. Each octet accumulates
//! digits until it would exceed 255. The automaton has three states:
//!
//! - **AfterDot**: at line start or right after a separator, no digit yet
//! - **Accumulating**: inside an octet
//! - **SkipToEol**: the line is already invalid, discard until `\n`
//!
//! Transitions per byte:
//!
//! | byte      | AfterDot / Accumulating                               | SkipToEol |
//! |-----------|-------------------------------------------------------|-----------|
//! | `0`..`9`  | octet = octet * 10 + d; > 255 → SkipToEol             | stay      |
//! | `.`       | store octet if fewer than 3 dots, else SkipToEol      | stay      |
//! | `\n`      | emit if 3 dots seen, reset to AfterDot                | reset     |
//! | other     | SkipToEol                                             | stay      |
//!
//! Empty octets count as 0, so `1..2.3\n` yields `1.0.2.3`. A line with no
//! terminating newline is never emitted.

use std::ops::ControlFlow;

use crate::cancel::CancelToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AfterDot,
    Accumulating,
    SkipToEol,
}

/// Incremental dotted-quad recognizer.
///
/// Feed bytes with [`update`](Self::update); a completed, valid line yields
/// its address as `(a0 << 24) | (a1 << 16) | (a2 << 8) | a3`.
///
/// # Example
///
/// ```
/// use ipspan::LineParser;
///
/// let mut parser = LineParser::new();
/// let found: Vec<u32> = b"10.0.0.1\n300.1.1.1\n"
///     .iter()
///     .filter_map(|&b| parser.update(b))
///     .collect();
/// assert_eq!(found, vec![0x0a00_0001]);
/// ```
#[derive(Debug, Clone)]
pub struct LineParser {
    state: State,
    number: u32,
    segment: usize,
    octets: [u32; 3],
}

impl LineParser {
    /// Creates a parser positioned at the start of a line.
    pub fn new() -> Self {
        Self {
            state: State::AfterDot,
            number: 0,
            segment: 0,
            octets: [0; 3],
        }
    }

    /// Forgets the current line.
    #[inline]
    pub fn reset(&mut self) {
        self.state = State::AfterDot;
        self.number = 0;
        self.segment = 0;
    }

    #[inline]
    fn skip_line(&mut self) {
        self.state = State::SkipToEol;
        self.number = 0;
        self.segment = 0;
    }

    /// Advances the automaton by one byte.
    ///
    /// Returns the address when `byte` terminates a valid line.
    #[inline]
    pub fn update(&mut self, byte: u8) -> Option<u32> {
        if byte == b'\n' {
            let address = (self.state != State::SkipToEol && self.segment == 3).then(|| {
                (self.octets[0] << 24) | (self.octets[1] << 16) | (self.octets[2] << 8) | self.number
            });
            self.reset();
            return address;
        }

        match (self.state, byte) {
            (State::SkipToEol, _) => {}
            (_, b'0'..=b'9') => {
                self.number = self.number * 10 + u32::from(byte - b'0');
                if self.number > 255 {
                    self.skip_line();
                } else {
                    self.state = State::Accumulating;
                }
            }
            (_, b'.') if self.segment < 3 => {
                self.octets[self.segment] = self.number;
                self.segment += 1;
                self.number = 0;
                self.state = State::AfterDot;
            }
            // a fourth dot, or any byte outside the grammar
            _ => self.skip_line(),
        }

        None
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses every complete line of a chunk window.
///
/// For any chunk other than the first, bytes up to and including the first
/// newline are discarded unconditionally: that line belongs to the previous
/// chunk, whose window reaches into this one by the overlap.
///
/// `cancel` is checked before every byte. `emit` receives each address and
/// may stop the scan by returning [`ControlFlow::Break`].
///
/// Returns `Break` if the scan was cut short, `Continue` if the whole window
/// was consumed.
///
/// # Example
///
/// ```
/// use std::ops::ControlFlow;
/// use ipspan::{CancelToken, parse_window};
///
/// let mut found = Vec::new();
/// let flow = parse_window(b"ial\n1.2.3.4\n", 1, &CancelToken::new(), |ip| {
///     found.push(ip);
///     ControlFlow::Continue(())
/// });
/// assert!(flow.is_continue());
/// assert_eq!(found, vec![0x0102_0304]);
/// ```
pub fn parse_window<F>(
    window: &[u8],
    chunk_index: u64,
    cancel: &CancelToken,
    mut emit: F,
) -> ControlFlow<()>
where
    F: FnMut(u32) -> ControlFlow<()>,
{
    let mut start = 0;
    if chunk_index != 0 {
        match window.iter().position(|&b| b == b'\n') {
            Some(pos) => start = pos + 1,
            None => return ControlFlow::Continue(()),
        }
    }

    let mut parser = LineParser::new();
    for &byte in &window[start..] {
        if cancel.is_cancelled() {
            return ControlFlow::Break(());
        }
        if let Some(address) = parser.update(byte) {
            emit(address)?;
        }
    }

    ControlFlow::Continue(())
}
