//! Fixed-size worker pool draining a closed queue.
//!
//! All work items are known up front: [`WorkerPool::drain`] pushes every item
//! into a `crossbeam_channel` queue, closes it, and lets `workers` long-lived
//! tasks on a dedicated `rayon` pool pull from it until it is empty. The call
//! returns only after every worker has finished its last item, so borrowed
//! state can be shared with the workers safely.

use crossbeam_channel::unbounded;
use rayon::ThreadPool as RayonPool;

use crate::error::{BenchError, Result};

/// A pool of `workers` threads.
pub struct WorkerPool {
    pool: RayonPool,
    workers: usize,
}

impl WorkerPool {
    /// Builds a pool with `workers` threads; `workers` must be at least 1.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(BenchError::Pool("worker count must be at least 1".into()));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("compstat-worker-{i}"))
            .build()
            .map_err(|e| BenchError::Pool(e.to_string()))?;
        Ok(WorkerPool { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs `work(worker_id, item)` once for every item and blocks until all
    /// items are done. Items are handed out in order; completion order is
    /// unspecified.
    pub fn drain<T, F>(&self, items: Vec<T>, work: F) -> Result<()>
    where
        T: Send,
        F: Fn(usize, T) + Sync,
    {
        let (tx, rx) = unbounded();
        for item in items {
            tx.send(item)
                .map_err(|_| BenchError::Pool("job queue closed early".into()))?;
        }
        drop(tx);

        let work = &work;
        self.pool.scope(|scope| {
            for worker_id in 0..self.workers {
                let rx = rx.clone();
                scope.spawn(move |_| {
                    for item in rx.iter() {
                        work(worker_id, item);
                    }
                });
            }
        });
        Ok(())
    }
}
