use crate::error::{ScanError, ScanResult};
use crossbeam_channel::Receiver;
use rayon::ThreadPoolBuilder;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Number of workers used when nothing else is configured.
pub const DEFAULT_WORKERS: usize = 40;

/// Fixed-size pool of workers draining a pre-filled queue.
///
/// Each call to [`WorkerPool::run`] builds a fresh queue and a fresh set of
/// threads, and returns only once every worker has exited. That join is
/// what keeps scan phases strictly ordered.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    /// Number of concurrent workers
    workers: usize,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}

impl WorkerPool {
    /// Create a pool with `workers` threads (at least one)
    #[must_use]
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Configured pool size
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Process every item with `work`, then wait for all workers to finish.
    ///
    /// The queue is filled before any worker starts and nothing is added
    /// afterwards. Items are claimed in an unspecified order. The first
    /// error stops all workers from claiming further items and is returned
    /// after the join; there is no partial success.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `work`,
    /// [`ScanError::WorkerPanicked`] if a worker panicked, or
    /// [`ScanError::PoolStartup`] if the threads could not be spawned.
    pub fn run<T, F>(&self, items: Vec<T>, work: F) -> ScanResult<()>
    where
        T: Send,
        F: Fn(T) -> ScanResult<()> + Sync,
    {
        if items.is_empty() {
            return Ok(());
        }

        let workers = self.workers.min(items.len());
        debug!(workers, items = items.len(), "starting worker pool");

        let (queue_tx, queue_rx) = crossbeam_channel::unbounded();
        for item in items {
            // Cannot fail: the receiver is alive for the whole call
            let _ = queue_tx.send(item);
        }
        drop(queue_tx);

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("scrubsum-worker-{i}"))
            .build()?;

        let abort = AtomicBool::new(false);
        let first_error: Mutex<Option<ScanError>> = Mutex::new(None);

        let joined = panic::catch_unwind(AssertUnwindSafe(|| {
            pool.scope(|scope| {
                for _ in 0..workers {
                    let queue = queue_rx.clone();
                    let work = &work;
                    let abort = &abort;
                    let first_error = &first_error;
                    scope.spawn(move |_| drain(&queue, work, abort, first_error));
                }
            });
        }));

        if joined.is_err() {
            return Err(ScanError::WorkerPanicked);
        }

        match first_error
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Worker loop: claim items until the queue is exhausted or a peer failed.
fn drain<T, F>(
    queue: &Receiver<T>,
    work: &F,
    abort: &AtomicBool,
    first_error: &Mutex<Option<ScanError>>,
) where
    F: Fn(T) -> ScanResult<()>,
{
    while !abort.load(Ordering::Acquire) {
        // The sender is gone, so this only fails once the queue is empty
        let Ok(item) = queue.recv() else {
            break;
        };

        if let Err(err) = work(item) {
            abort.store(true, Ordering::Release);
            let mut slot = first_error.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.is_none() {
                *slot = Some(err);
            }
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_processes_every_item_once() -> ScanResult<()> {
        let seen = Mutex::new(Vec::new());
        let pool = WorkerPool::new(8);

        pool.run((0..1000).collect(), |i: u32| {
            seen.lock().unwrap().push(i);
            Ok(())
        })?;

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 1000);
        let unique: HashSet<u32> = seen.into_iter().collect();
        assert_eq!(unique.len(), 1000);

        Ok(())
    }

    #[test]
    fn test_empty_queue() -> ScanResult<()> {
        let calls = AtomicUsize::new(0);
        WorkerPool::new(4).run(Vec::<u32>::new(), |_| {
            calls.fetch_add(1, Ordering::Relaxed);
            Ok(())
        })?;
        assert_eq!(calls.load(Ordering::Relaxed), 0);
        Ok(())
    }

    #[test]
    fn test_single_worker() -> ScanResult<()> {
        let order = Mutex::new(Vec::new());
        WorkerPool::new(1).run(vec![1, 2, 3], |i: u32| {
            order.lock().unwrap().push(i);
            Ok(())
        })?;

        // One worker drains the queue in insertion order
        assert_eq!(order.into_inner().unwrap(), vec![1, 2, 3]);
        Ok(())
    }

    #[test]
    fn test_zero_workers_clamped() {
        assert_eq!(WorkerPool::new(0).workers(), 1);
        assert_eq!(WorkerPool::default().workers(), DEFAULT_WORKERS);
    }

    #[test]
    fn test_error_stops_the_pool() {
        let processed = AtomicUsize::new(0);
        let result = WorkerPool::new(1).run((0..100).collect(), |i: u32| {
            processed.fetch_add(1, Ordering::Relaxed);
            if i == 10 {
                return Err(ScanError::Vanished {
                    path: PathBuf::from("gone.txt"),
                });
            }
            Ok(())
        });

        assert!(matches!(result, Err(ScanError::Vanished { .. })));
        assert_eq!(processed.load(Ordering::Relaxed), 11);
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let result = WorkerPool::new(4).run((0..16).collect(), |i: u32| {
            assert!(i != 7, "worker blew up");
            Ok(())
        });

        assert!(matches!(result, Err(ScanError::WorkerPanicked)));
    }
}
