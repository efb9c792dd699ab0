//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! - `pool`: pool fijo de workers con drenado acotado
//! - `dispatcher`: parse → route → pipeline → write por conexión
//! - `lifecycle`: `Server`, dueño del socket y del accept loop
//!
//! ```text
//! listen() ──► accept loop ──► WorkerPool ──► Dispatcher::handle_connection
//!                  ▲
//! stop() ──────────┘ (cierra el socket, drena el pool)
//! ```

pub mod dispatcher;
pub mod lifecycle;
pub mod pool;

use std::time::Duration;

pub use dispatcher::Dispatcher;
pub use lifecycle::{Server, ServerError, StopOutcome};
pub use pool::{DrainOutcome, PoolError, WorkerPool};

/// Cantidad de workers por defecto
pub const DEFAULT_WORKERS: usize = 10;

/// Plazo por defecto para drenar el pool al apagar
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout de lectura por defecto de cada conexión
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Parámetros del motor (la parte de `Config` que le importa al servidor)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub workers: usize,
    pub shutdown_timeout: Duration,

    /// `None` deshabilita el timeout de lectura
    pub read_timeout: Option<Duration>,

    /// Loguea requests y responses completos a nivel `debug`
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            debug: false,
        }
    }
}
