//! Blocking worker pool with completion hand-back.
//!
//! Queue operations block their caller, so the bridge never runs them on the
//! thread that asked for them. [`BlockingWorker`] executes jobs on a fixed
//! pool of OS threads. Results come back one of two ways:
//!
//! * [`BlockingWorker::submit`] queues a callback on the completion channel;
//!   the owning thread runs it from [`BlockingWorker::dispatch_pending`] or
//!   [`BlockingWorker::dispatch_timeout`], so callbacks never run on a worker.
//! * [`BlockingWorker::call`] returns a [`Completion`] future backed by a
//!   oneshot channel.

use std::future::Future;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use futures::channel::oneshot;
use link_queue::{QueueError, QueueResult};
use tracing::{debug, error};

type Job = Box<dyn FnOnce() + Send + 'static>;
type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Fixed pool of threads for blocking calls.
pub struct BlockingWorker {
    jobs: Option<Sender<Job>>,
    done_tx: Sender<Callback>,
    done_rx: Receiver<Callback>,
    threads: Vec<JoinHandle<()>>,
}

impl BlockingWorker {
    /// Spawns `threads` workers (at least one).
    pub fn spawn(threads: usize) -> io::Result<Self> {
        let (jobs, job_rx) = crossbeam_channel::unbounded::<Job>();
        let (done_tx, done_rx) = crossbeam_channel::unbounded();

        let threads = (0..threads.max(1))
            .map(|idx| {
                let job_rx = job_rx.clone();
                thread::Builder::new()
                    .name(format!("bridge-worker-{idx}"))
                    .spawn(move || {
                        while let Ok(job) = job_rx.recv() {
                            if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                                error!(worker = idx, "blocking job panicked");
                            }
                        }
                    })
            })
            .collect::<io::Result<Vec<_>>>()?;
        debug!(threads = threads.len(), "blocking worker started");

        Ok(Self {
            jobs: Some(jobs),
            done_tx,
            done_rx,
            threads,
        })
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.threads.len()
    }

    /// Runs `job` on a worker and queues `callback(result)` for dispatch.
    ///
    /// A job that panics is logged and its callback is dropped unrun; the
    /// worker thread keeps serving jobs.
    pub fn submit<T, J, C>(&self, job: J, callback: C) -> QueueResult<()>
    where
        T: Send + 'static,
        J: FnOnce() -> T + Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        let done = self.done_tx.clone();
        self.push(Box::new(move || {
            let result = job();
            let _ = done.send(Box::new(move || callback(result)));
        }))
    }

    /// Runs `job` on a worker and resolves the returned future with its result.
    pub fn call<T, J>(&self, job: J) -> Completion<T>
    where
        T: Send + 'static,
        J: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        // A rejected job drops `tx`, which resolves the completion as canceled.
        let _ = self.push(Box::new(move || {
            let _ = tx.send(job());
        }));
        Completion { rx }
    }

    /// Runs every callback that is already queued; returns how many ran.
    pub fn dispatch_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(callback) = self.done_rx.try_recv() {
            callback();
            ran += 1;
        }
        ran
    }

    /// Waits up to `timeout` for at least one callback, then runs everything
    /// queued. Returns how many ran.
    pub fn dispatch_timeout(&self, timeout: Duration) -> usize {
        match self.done_rx.recv_timeout(timeout) {
            Ok(callback) => {
                callback();
                1 + self.dispatch_pending()
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => 0,
        }
    }

    fn push(&self, job: Job) -> QueueResult<()> {
        self.jobs
            .as_ref()
            .ok_or(QueueError::Closed)?
            .send(job)
            .map_err(|_| QueueError::Closed)
    }
}

impl std::fmt::Debug for BlockingWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingWorker")
            .field("threads", &self.threads.len())
            .field("pending_jobs", &self.jobs.as_ref().map_or(0, Sender::len))
            .field("pending_callbacks", &self.done_rx.len())
            .finish()
    }
}

impl Drop for BlockingWorker {
    /// Disconnects the job queue and joins every worker.
    ///
    /// Jobs still blocked inside a queue keep their worker alive; close the
    /// queues first.
    fn drop(&mut self) {
        self.jobs.take();
        for handle in self.threads.drain(..) {
            let _ = handle.join();
        }
        debug!("blocking worker stopped");
    }
}

/// Result of [`BlockingWorker::call`].
///
/// Resolves to `Err(Canceled)` if the job never ran or panicked.
#[derive(Debug)]
pub struct Completion<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Completion<T> {
    /// Blocks the current thread until the job finishes.
    pub fn wait(self) -> Result<T, oneshot::Canceled> {
        futures::executor::block_on(self)
    }
}

impl<T> Future for Completion<T> {
    type Output = Result<T, oneshot::Canceled>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx)
    }
}
