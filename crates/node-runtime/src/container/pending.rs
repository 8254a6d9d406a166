//! Buffers between the feed, the mempool side and block production.

use parking_lot::Mutex;
use qe_01_entropy_feed::{FoldedRecords, RecordKey, ValidRecord};
use qe_06_consensus::Transaction;
use std::collections::{HashSet, VecDeque};

#[derive(Default)]
struct EntropyQueue {
    records: VecDeque<ValidRecord>,
    keys: HashSet<RecordKey>,
}

/// Validated seismic records waiting for a block or a rotation.
///
/// Bounded. Each record key is queued at most once.
pub struct PendingEntropy {
    queue: Mutex<EntropyQueue>,
    capacity: usize,
}

/// Duplicate view over the pool and the pending queue.
struct Seen<'a> {
    pool: &'a dyn FoldedRecords,
    pending: &'a HashSet<RecordKey>,
}

impl FoldedRecords for Seen<'_> {
    fn is_folded(&self, key: &RecordKey) -> bool {
        self.pending.contains(key) || self.pool.is_folded(key)
    }
}

impl PendingEntropy {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(EntropyQueue::default()),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.queue.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Run `f` with a duplicate view covering `pool` and the queue, then
    /// enqueue what it returns. Records past capacity are returned.
    pub fn admit<F>(&self, pool: &dyn FoldedRecords, f: F) -> Vec<ValidRecord>
    where
        F: FnOnce(&dyn FoldedRecords) -> Vec<ValidRecord>,
    {
        let mut queue = self.queue.lock();
        let accepted = f(&Seen {
            pool,
            pending: &queue.keys,
        });

        let mut overflow = Vec::new();
        for record in accepted {
            if queue.records.len() >= self.capacity {
                overflow.push(record);
            } else if queue.keys.insert(record.key().clone()) {
                queue.records.push_back(record);
            }
        }
        overflow
    }

    /// Remove up to `max` records, oldest first. Records `pool` has already
    /// folded are discarded on the way.
    pub fn take(&self, max: usize, pool: &dyn FoldedRecords) -> Vec<ValidRecord> {
        let mut queue = self.queue.lock();
        let mut taken = Vec::with_capacity(max.min(queue.records.len()));

        while taken.len() < max {
            let Some(record) = queue.records.pop_front() else {
                break;
            };
            queue.keys.remove(record.key());
            if !pool.is_folded(record.key()) {
                taken.push(record);
            }
        }
        taken
    }

    /// Put records back at the front, keeping their order.
    pub fn restore(&self, records: Vec<ValidRecord>) {
        let mut queue = self.queue.lock();
        for record in records.into_iter().rev() {
            if queue.keys.insert(record.key().clone()) {
                queue.records.push_front(record);
            }
        }
    }
}

/// Transactions waiting for a block.
#[derive(Default)]
pub struct TransactionQueue {
    queue: Mutex<VecDeque<Transaction>>,
}

impl TransactionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&self, transaction: Transaction) {
        self.queue.lock().push_back(transaction);
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn take(&self, max: usize) -> Vec<Transaction> {
        let mut queue = self.queue.lock();
        let n = max.min(queue.len());
        queue.drain(..n).collect()
    }

    pub fn restore(&self, transactions: Vec<Transaction>) {
        let mut queue = self.queue.lock();
        for tx in transactions.into_iter().rev() {
            queue.push_front(tx);
        }
    }
}
