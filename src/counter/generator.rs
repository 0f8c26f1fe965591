//! Chunk index generator.

use crossbeam_channel::{Sender, select};
use tracing::debug;

use crate::cancel::CancelToken;

/// Sends `0..num_chunks` into `indices`, blocking while the queue is full.
///
/// Stops early when `cancel` fires or every receiver is gone. The queue is
/// closed when `indices` is dropped on return.
pub(crate) fn generate(num_chunks: u64, indices: Sender<u64>, cancel: &CancelToken) {
    for index in 0..num_chunks {
        if cancel.is_cancelled() {
            debug!(index, "generator cancelled");
            return;
        }

        select! {
            send(indices, index) -> res => {
                if res.is_err() {
                    debug!(index, "no workers left, generator stopping");
                    return;
                }
            }
            recv(cancel.signal()) -> _ => {
                debug!(index, "generator cancelled");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::thread;

    #[test]
    fn test_emits_every_index_then_closes() {
        let (tx, rx) = bounded(2);
        let cancel = CancelToken::new();

        thread::scope(|s| {
            s.spawn(|| generate(5, tx, &cancel));
            let got: Vec<u64> = rx.iter().collect();
            assert_eq!(got, vec![0, 1, 2, 3, 4]);
        });
    }

    #[test]
    fn test_zero_chunks_closes_immediately() {
        let (tx, rx) = bounded::<u64>(1);
        generate(0, tx, &CancelToken::new());
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_cancel_unblocks_full_queue() {
        let (tx, rx) = bounded(1);
        let cancel = CancelToken::new();

        thread::scope(|s| {
            let handle = s.spawn(|| generate(1_000, tx, &cancel));
            assert_eq!(rx.recv().unwrap(), 0);
            cancel.cancel();
            handle.join().unwrap();
        });

        let rest: Vec<u64> = rx.iter().collect();
        assert!(rest.len() <= 1);
    }

    #[test]
    fn test_stops_when_receivers_are_gone() {
        let (tx, rx) = bounded(1);
        drop(rx);
        generate(1_000, tx, &CancelToken::new());
    }
}
