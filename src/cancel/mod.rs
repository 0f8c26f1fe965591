//! Broadcast cancellation shared by every stage of a run.
//!
//! - [`CancelToken`] - Cloneable flag plus a channel that disconnects on cancel
//!
//! The flag serves the hot parser loop, where a relaxed load per byte is all
//! we can afford. The channel serves blocking queue operations: the sender is
//! dropped on cancel, so `recv` on [`CancelToken::signal`] returns immediately
//! from that point on and can sit in a `crossbeam_channel::select!` next to
//! any send or receive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::{Receiver, Sender};

/// A cancellation signal that can be raised once and observed by many.
///
/// # Example
///
/// ```
/// use ipspan::CancelToken;
///
/// let token = CancelToken::new();
/// let observer = token.clone();
/// assert!(!observer.is_cancelled());
///
/// token.cancel();
/// assert!(observer.is_cancelled());
/// assert!(observer.signal().recv().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cancelled: AtomicBool,
    trigger: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
}

impl CancelToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        let (trigger, signal) = crossbeam_channel::bounded(0);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                signal,
            }),
        }
    }

    /// Raises the signal. Calling it again is a no-op.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner
            .trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Relaxed)
    }

    /// Receiver that never yields a value and disconnects on cancel.
    ///
    /// Use it as an arm of `crossbeam_channel::select!` to make a blocking
    /// operation give up when the run is cancelled.
    pub fn signal(&self) -> &Receiver<()> {
        &self.inner.signal
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
