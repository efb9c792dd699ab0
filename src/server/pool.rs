//! # Pool de Workers
//! src/server/pool.rs
//!
//! Pool fijo de threads que comparten una cola de trabajos. El accept loop
//! encola una conexión por trabajo y nunca despacha en su propio thread.
//!
//! ## Apagado
//!
//! ```text
//! shutdown(timeout)
//!   1. se cierra la cola → no entran trabajos nuevos
//!   2. los trabajos ya encolados siguen corriendo
//!   3. se espera hasta `timeout` a que cada worker termine
//!   4. si vence: los trabajos no iniciados se descartan y los workers
//!      ocupados quedan desacoplados (nunca se interrumpe un trabajo)
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};
use thiserror::Error;
use tracing::{debug, error, warn};

use super::dispatcher::panic_message;

/// Unidad de trabajo del pool
pub type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker pool is shut down")]
    ShutDown,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Resultado del drenado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Todos los workers terminaron dentro del plazo
    Drained,

    /// Venció el plazo con `unfinished` workers todavía ocupados
    TimedOut { unfinished: usize },
}

struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

/// Avisa al pool cuando un worker sale, incluso si su thread muere
struct ExitSignal {
    id: usize,
    done: Sender<usize>,
}

impl Drop for ExitSignal {
    fn drop(&mut self) {
        let _ = self.done.send(self.id);
    }
}

pub struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<Worker>,
    exited: Receiver<usize>,
    aborted: Arc<AtomicBool>,
    busy: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Crea el pool con `size` workers (mínimo 1)
    pub fn new(size: usize) -> Result<Self, PoolError> {
        let size = size.max(1);
        let (sender, receiver) = channel::unbounded::<Job>();
        let (done_tx, exited) = channel::unbounded();
        let aborted = Arc::new(AtomicBool::new(false));
        let busy = Arc::new(AtomicUsize::new(0));

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let receiver = receiver.clone();
            let signal = ExitSignal {
                id,
                done: done_tx.clone(),
            };
            let aborted = Arc::clone(&aborted);
            let busy = Arc::clone(&busy);

            let handle = thread::Builder::new()
                .name(format!("http-worker-{}", id))
                .spawn(move || worker_loop(id, receiver, aborted, busy, signal))
                .map_err(PoolError::Spawn)?;

            workers.push(Worker {
                id,
                handle: Some(handle),
            });
        }

        debug!(workers = size, "worker pool started");

        Ok(Self {
            sender: Some(sender),
            workers,
            exited,
            aborted,
            busy,
        })
    }

    /// Encola un trabajo para el próximo worker libre
    pub fn execute<F>(&self, job: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(PoolError::ShutDown)?;
        sender.send(Box::new(job)).map_err(|_| PoolError::ShutDown)
    }

    /// Cantidad de workers
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Workers ejecutando un trabajo en este momento
    pub fn busy(&self) -> usize {
        self.busy.load(Ordering::SeqCst)
    }

    /// Cierra la cola y espera hasta `timeout` a que los workers terminen
    ///
    /// Llamarlo más de una vez es seguro.
    pub fn shutdown(&mut self, timeout: Duration) -> DrainOutcome {
        // Sin sender los workers salen al vaciar la cola
        self.sender.take();

        let deadline = Instant::now() + timeout;
        while self.workers.iter().any(|w| w.handle.is_some()) {
            match self.exited.recv_deadline(deadline) {
                Ok(id) => self.join_worker(id),
                Err(_) => break,
            }
        }

        let unfinished = self.workers.iter().filter(|w| w.handle.is_some()).count();
        if unfinished == 0 {
            debug!("worker pool drained");
            return DrainOutcome::Drained;
        }

        // Los trabajos no iniciados se descartan; los que corren terminan solos
        self.aborted.store(true, Ordering::SeqCst);
        for worker in &mut self.workers {
            worker.handle.take();
        }
        warn!(
            unfinished,
            timeout_ms = timeout.as_millis() as u64,
            "worker pool drain timed out, detaching busy workers"
        );
        DrainOutcome::TimedOut { unfinished }
    }

    fn join_worker(&mut self, id: usize) {
        let Some(worker) = self.workers.iter_mut().find(|w| w.id == id) else {
            return;
        };
        if let Some(handle) = worker.handle.take() {
            if handle.join().is_err() {
                error!(worker = id, "worker thread panicked");
            }
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.workers.len())
            .field("busy", &self.busy())
            .field("accepting", &self.sender.is_some())
            .finish()
    }
}

fn worker_loop(
    id: usize,
    receiver: Receiver<Job>,
    aborted: Arc<AtomicBool>,
    busy: Arc<AtomicUsize>,
    _signal: ExitSignal,
) {
    for job in receiver.iter() {
        if aborted.load(Ordering::SeqCst) {
            break;
        }

        busy.fetch_add(1, Ordering::SeqCst);
        if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(job)) {
            error!(worker = id, panic = %panic_message(panic.as_ref()), "job panicked");
        }
        busy.fetch_sub(1, Ordering::SeqCst);
    }
    debug!(worker = id, "worker exiting");
}
