//! Parsing workers and the single aggregator.
//!
//! A worker loops `Idle -> MappingWindow -> Parsing -> Idle` until the index
//! queue is exhausted, the run is cancelled, or a window cannot be mapped.
//! Every blocking queue operation is paired with the cancel signal, so a
//! worker never hangs on a queue after cancellation.

use std::mem;
use std::ops::ControlFlow;

use crossbeam_channel::{Receiver, Sender, select};
use tracing::{debug, error, trace};

use crate::bitmap::PresenceBitmap;
use crate::cancel::CancelToken;
use crate::error::CountError;
use crate::parse::parse_window;
use crate::window::{WindowMapper, WindowSource};

/// One parsing worker with its own window mapper.
pub(crate) struct Worker<'a, S: WindowSource + ?Sized> {
    pub(crate) id: usize,
    pub(crate) mapper: WindowMapper<'a, S>,
    pub(crate) indices: Receiver<u64>,
    pub(crate) addresses: Sender<Vec<u32>>,
    pub(crate) cancel: &'a CancelToken,
    pub(crate) batch_size: usize,
}

impl<S: WindowSource + ?Sized> Worker<'_, S> {
    /// Processes chunks until there is no more work.
    ///
    /// A mapping failure cancels the whole run and is returned.
    pub(crate) fn run(self) -> Result<(), CountError> {
        let Worker {
            id,
            mut mapper,
            indices,
            addresses,
            cancel,
            batch_size,
        } = self;

        debug!(worker = id, "worker started");
        let mut batch = Vec::with_capacity(batch_size);

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let index = select! {
                recv(indices) -> msg => match msg {
                    Ok(index) => index,
                    Err(_) => break,
                },
                recv(cancel.signal()) -> _ => break,
            };

            let window = match mapper.map(index) {
                Ok(window) => window,
                Err(err) => {
                    error!(worker = id, index, %err, "window mapping failed, cancelling run");
                    cancel.cancel();
                    return Err(err);
                }
            };
            trace!(worker = id, index, len = window.len(), "parsing window");

            let flow = parse_window(window, index, cancel, |address| {
                batch.push(address);
                if batch.len() >= batch_size {
                    forward(&addresses, cancel, &mut batch, batch_size)
                } else {
                    ControlFlow::Continue(())
                }
            });
            if flow.is_break() {
                break;
            }

            if forward(&addresses, cancel, &mut batch, batch_size).is_break() {
                break;
            }
        }

        mapper.release();
        if cancel.is_cancelled() {
            debug!(worker = id, "worker stopped on cancellation");
        } else {
            debug!(worker = id, "worker finished");
        }
        Ok(())
    }
}

/// Hands the pending batch to the aggregator.
///
/// Breaks if the run was cancelled or the aggregator is gone; the batch is
/// dropped in that case.
fn forward(
    addresses: &Sender<Vec<u32>>,
    cancel: &CancelToken,
    batch: &mut Vec<u32>,
    batch_size: usize,
) -> ControlFlow<()> {
    if batch.is_empty() {
        return ControlFlow::Continue(());
    }

    let full = mem::replace(batch, Vec::with_capacity(batch_size));
    select! {
        send(addresses, full) -> res => {
            if res.is_ok() {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        }
        recv(cancel.signal()) -> _ => ControlFlow::Break(()),
    }
}

/// Drains `addresses` into `bitmap` until the queue is closed and returns
/// how many addresses were received, duplicates included.
///
/// The aggregator does not watch the cancel signal; it stops only when every
/// sender has been dropped.
pub(crate) fn aggregate(addresses: Receiver<Vec<u32>>, bitmap: &mut PresenceBitmap) -> u64 {
    let mut received = 0u64;
    for batch in addresses {
        received += batch.len() as u64;
        for address in batch {
            bitmap.add(address);
        }
    }
    received
}
