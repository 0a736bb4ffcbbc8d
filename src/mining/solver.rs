//! Parallel proof-of-work nonce search
//!
//! Partitions the 32-bit nonce space into one contiguous range per worker
//! thread and scans each range over a private copy of the header. The first
//! worker to find a hash at or below the target reports it; a cancellation
//! flag stops the rest, and every worker is joined before the call returns.
//!
//! When more than one range holds a valid nonce the winner is whichever
//! worker reports first, so the chosen nonce is not deterministic across
//! runs. Any valid nonce is correct; use a single worker if a test needs
//! reproducible output.

use crate::chain::BlockHeader;
use crate::crypto::hash_meets_target;
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

/// Result sent by each worker exactly once: its winning nonce, or `None`
/// after exhausting its range.
type WorkerResult = Option<u32>;

/// Attempt to find a nonce that makes the header hash meet the target,
/// using one worker per detected processing unit.
///
/// On success the header's nonce field is updated in place and `true` is
/// returned. `false` means the entire nonce space was exhausted without a
/// hit, which is an outcome rather than an error.
pub fn solve_header(header: &mut BlockHeader, target: &[u8; 32]) -> bool {
    let workers = thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1);
    solve_header_with_workers(header, target, workers)
}

/// Like [`solve_header`], with an explicit worker count. A single worker
/// scans nonces in increasing order and therefore always returns the
/// smallest valid nonce.
pub fn solve_header_with_workers(
    header: &mut BlockHeader,
    target: &[u8; 32],
    workers: u32,
) -> bool {
    let workers = workers.max(1);
    let quit = Arc::new(AtomicBool::new(false));
    let (result_tx, result_rx) = mpsc::channel::<WorkerResult>();

    // Disjoint contiguous ranges; the last one absorbs the remainder so the
    // partition covers the full space.
    let nonces_per_worker = u32::MAX / workers;
    let mut handles = Vec::with_capacity(workers as usize);
    for i in 0..workers {
        let range_start = nonces_per_worker * i;
        let range_stop = if i == workers - 1 {
            u32::MAX
        } else {
            nonces_per_worker * (i + 1) - 1
        };

        let header = header.clone();
        let target = *target;
        let quit = Arc::clone(&quit);
        let result_tx = result_tx.clone();
        handles.push(thread::spawn(move || {
            let result = scan_nonce_range(&header, &target, range_start, range_stop, &quit);
            // The receiver may already be gone once another worker has won
            let _ = result_tx.send(result);
        }));
    }
    drop(result_tx);

    let mut solution = None;
    let mut received = 0;
    while received < workers && solution.is_none() {
        match result_rx.recv() {
            Ok(result) => {
                received += 1;
                solution = result;
            }
            Err(_) => break,
        }
    }

    quit.store(true, Ordering::Relaxed);
    for handle in handles {
        let _ = handle.join();
    }

    match solution {
        Some(nonce) => {
            debug!("proof-of-work solved with nonce {}", nonce);
            header.nonce = nonce;
            true
        }
        None => false,
    }
}

/// Scan an inclusive nonce range in increasing order against a private copy
/// of the header, bailing out when the cancellation flag is raised.
fn scan_nonce_range(
    header: &BlockHeader,
    target: &[u8; 32],
    range_start: u32,
    range_stop: u32,
    quit: &AtomicBool,
) -> Option<u32> {
    let mut header = header.clone();
    let mut nonce = range_start;
    loop {
        if quit.load(Ordering::Relaxed) {
            return None;
        }
        header.nonce = nonce;
        if hash_meets_target(&header.hash_bytes(), target) {
            return Some(nonce);
        }
        if nonce == range_stop {
            return None;
        }
        nonce += 1;
    }
}
