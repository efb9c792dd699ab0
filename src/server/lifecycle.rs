//! # Ciclo de Vida del Servidor
//! src/server/lifecycle.rs
//!
//! Estados: *stopped* → *listening* → *stopped*.
//!
//! - `listen` hace bind, arranca el accept loop en su propio thread, llama
//!   al callback de inicio y retorna sin bloquear.
//! - `stop` es idempotente: baja el flag, cierra el socket (lo que
//!   desbloquea el `accept`), y drena el pool con un plazo máximo.
//!
//! El router se congela al construir el `Server`: registrar rutas mientras
//! se sirve no está soportado.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use socket2::{Domain, Protocol, SockRef, Socket, Type};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::dispatcher::Dispatcher;
use super::pool::{DrainOutcome, PoolError, WorkerPool};
use super::ServerConfig;
use crate::router::Router;

/// Backlog del socket de escucha
const LISTEN_BACKLOG: i32 = 1024;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server is already listening on {0}")]
    AlreadyListening(SocketAddr),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to start accept thread: {0}")]
    Spawn(#[source] io::Error),

    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Resultado de `stop()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// No estaba escuchando; no se hizo nada
    AlreadyStopped,

    /// Todas las conexiones en curso terminaron
    Drained,

    /// Venció el plazo de drenado
    TimedOut { unfinished: usize },
}

struct Running {
    local_addr: SocketAddr,
    running: Arc<AtomicBool>,
    listener: TcpListener,
    acceptor: JoinHandle<WorkerPool>,
}

pub struct Server {
    router: Arc<Router>,
    config: ServerConfig,
    state: Mutex<Option<Running>>,
}

impl Server {
    pub fn new(router: Router, config: ServerConfig) -> Self {
        Self {
            router: Arc::new(router),
            config,
            state: Mutex::new(None),
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Empieza a escuchar en `host:port` sin bloquear
    ///
    /// `on_start` recibe la dirección efectiva (útil con puerto 0). Si el
    /// bind falla el servidor sigue en *stopped*.
    ///
    /// # Ejemplo
    /// ```no_run
    /// use handmade_http::router::Router;
    /// use handmade_http::server::{Server, ServerConfig};
    ///
    /// let server = Server::new(Router::new(), ServerConfig::default());
    /// server
    ///     .listen(8888, "127.0.0.1", |addr| println!("listening on {}", addr))
    ///     .unwrap();
    /// server.stop();
    /// ```
    pub fn listen<F>(&self, port: u16, host: &str, on_start: F) -> Result<SocketAddr, ServerError>
    where
        F: FnOnce(SocketAddr),
    {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(running) = state.as_ref() {
            return Err(ServerError::AlreadyListening(running.local_addr));
        }

        let address = format!("{}:{}", host, port);
        let listener = bind(host, port).map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { address, source })?;

        let pool = WorkerPool::new(self.config.workers)?;
        let accept_listener = listener.try_clone().map_err(ServerError::Spawn)?;
        let running = Arc::new(AtomicBool::new(true));
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&self.router), self.config.clone()));

        let acceptor = {
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name("http-acceptor".to_string())
                .spawn(move || accept_loop(accept_listener, pool, dispatcher, running))
                .map_err(ServerError::Spawn)?
        };

        *state = Some(Running {
            local_addr,
            running,
            listener,
            acceptor,
        });
        drop(state);

        info!(
            address = %local_addr,
            workers = self.config.workers,
            routes = self.router.len(),
            "server listening"
        );
        on_start(local_addr);

        Ok(local_addr)
    }

    /// Deja de aceptar conexiones y espera a las que están en curso
    ///
    /// Llamarlo estando detenido no hace nada.
    pub fn stop(&self) -> StopOutcome {
        let Some(running) = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            return StopOutcome::AlreadyStopped;
        };

        info!(address = %running.local_addr, "stopping server");
        running.running.store(false, Ordering::SeqCst);

        // En Linux esto desbloquea el accept; en otros sistemas lo hace la
        // conexión de despertar
        if let Err(e) = SockRef::from(&running.listener).shutdown(Shutdown::Both) {
            debug!(error = %e, "listener shutdown not supported, relying on wake-up connection");
        }
        wake_acceptor(running.local_addr);

        let pool = running.acceptor.join();
        drop(running.listener);

        let outcome = match pool {
            Ok(mut pool) => pool.shutdown(self.config.shutdown_timeout),
            Err(_) => {
                error!("accept thread panicked");
                DrainOutcome::Drained
            }
        };

        match outcome {
            DrainOutcome::Drained => {
                info!("server stopped");
                StopOutcome::Drained
            }
            DrainOutcome::TimedOut { unfinished } => {
                warn!(unfinished, "server stopped before in-flight connections finished");
                StopOutcome::TimedOut { unfinished }
            }
        }
    }

    pub fn is_listening(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Dirección efectiva mientras escucha
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|running| running.local_addr)
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("router", &self.router)
            .field("config", &self.config)
            .field("local_addr", &self.local_addr())
            .finish()
    }
}

/// Bind con `SO_REUSEADDR` para poder reiniciar sin esperar `TIME_WAIT`
fn bind(host: &str, port: u16) -> io::Result<TcpListener> {
    let addr = (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "host resolved to no address"))?;

    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;

    Ok(socket.into())
}

fn accept_loop(
    listener: TcpListener,
    pool: WorkerPool,
    dispatcher: Arc<Dispatcher>,
    running: Arc<AtomicBool>,
) -> WorkerPool {
    for stream in listener.incoming() {
        if !running.load(Ordering::SeqCst) {
            debug!("accept loop stopped");
            break;
        }

        match stream {
            Ok(stream) => {
                let dispatcher = Arc::clone(&dispatcher);
                let queued = pool.execute(move || {
                    if let Err(e) = dispatcher.handle_connection(stream) {
                        warn!(error = %e, "connection I/O error");
                    }
                });
                if let Err(e) = queued {
                    error!(error = %e, "failed to hand connection to worker pool");
                    break;
                }
            }
            Err(e) => error!(error = %e, "failed to accept connection"),
        }
    }
    pool
}

/// Conexión descartable para sacar al accept loop del `accept`
fn wake_acceptor(addr: SocketAddr) {
    let target = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), addr.port()),
        IpAddr::V6(ip) if ip.is_unspecified() => SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), addr.port()),
        _ => addr,
    };
    let _ = TcpStream::connect_timeout(&target, Duration::from_millis(200));
}
