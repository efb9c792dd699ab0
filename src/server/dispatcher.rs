//! # Despacho de Conexiones
//! src/server/dispatcher.rs
//!
//! Una conexión = un request = una unidad de trabajo en un worker:
//!
//! ```text
//! parse → find → middlewares efectivos → pipeline → serialize → close
//! ```
//!
//! Cualquier falla se convierte en una respuesta HTTP acá. Una conexión que
//! falla nunca afecta a otra.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info_span, warn};

use super::ServerConfig;
use crate::http::{ParseError, Request, Response, StatusCode};
use crate::middleware::{Outcome, Pipeline};
use crate::router::Router;

/// Valor del header `Server`
pub const SERVER_NAME: &str = concat!("handmade_http/", env!("CARGO_PKG_VERSION"));

pub struct Dispatcher {
    router: Arc<Router>,
    config: ServerConfig,
}

impl Dispatcher {
    pub fn new(router: Arc<Router>, config: ServerConfig) -> Self {
        Self { router, config }
    }

    /// Atiende una conexión completa y la cierra
    ///
    /// Solo retorna error si falla la configuración del socket o la
    /// escritura de la respuesta.
    pub fn handle_connection(&self, stream: TcpStream) -> io::Result<()> {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let span = info_span!("connection", %peer);
        let _enter = span.enter();

        stream.set_read_timeout(self.config.read_timeout)?;

        let response = {
            let mut reader = BufReader::new(&stream);
            self.dispatch(&mut reader)
        };

        let Some(response) = response else {
            debug!("peer closed without sending a request");
            return Ok(());
        };

        let mut writer = &stream;
        writer.write_all(&response.to_bytes())?;
        writer.flush()?;

        // Sin keep-alive: se cierra siempre
        let _ = stream.shutdown(Shutdown::Write);
        Ok(())
    }

    /// Lee un request de `reader` y produce la respuesta a escribir
    ///
    /// Retorna `None` si el peer cerró sin enviar nada.
    pub fn dispatch<R: BufRead>(&self, reader: &mut R) -> Option<Response> {
        let start = Instant::now();

        let mut request = match Request::read_from(reader) {
            Ok(request) => request,
            Err(ParseError::ConnectionClosed) => return None,
            Err(err) => return Some(self.finish(parse_failure(&err))),
        };

        if self.config.debug {
            debug!(
                request = %String::from_utf8_lossy(&request.to_bytes()),
                "inbound request"
            );
        }

        let response = self.respond(&mut request);

        if self.config.debug {
            debug!(
                method = %request.method(),
                path = %request.path(),
                status = response.status_code().as_u16(),
                elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                "outbound response"
            );
        }

        Some(self.finish(response))
    }

    /// Busca la ruta y ejecuta la cadena
    fn respond(&self, request: &mut Request) -> Response {
        let clean_path = request.clean_path().to_string();

        let Some(found) = self.router.find(request.method(), &clean_path) else {
            return Response::error(StatusCode::NOT_FOUND, "Route not found");
        };

        let route = found.route;
        let chain = self.router.effective_middlewares(&clean_path, route);
        request.set_path_params(found.params);

        let mut response = Response::new();
        let pipeline = Pipeline::new(&chain, route.handler());
        let result = panic::catch_unwind(AssertUnwindSafe(|| pipeline.execute(request, &mut response)));

        match result {
            Ok(Ok(Outcome::Completed)) => response,
            Ok(Ok(Outcome::Halted { at })) => {
                debug!(at, route = %route.path(), "middleware chain halted");
                response
            }
            Ok(Err(err)) => {
                error!(
                    method = %request.method(),
                    path = %clean_path,
                    error = %err,
                    "handler failed"
                );
                internal_error()
            }
            Err(panic) => {
                error!(
                    method = %request.method(),
                    path = %clean_path,
                    error = %panic_message(panic.as_ref()),
                    "handler panicked"
                );
                internal_error()
            }
        }
    }

    fn finish(&self, mut response: Response) -> Response {
        response
            .set_header("Connection", "close")
            .set_header("Server", SERVER_NAME);
        response
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("router", &self.router)
            .field("config", &self.config)
            .finish()
    }
}

fn parse_failure(err: &ParseError) -> Response {
    if err.is_transport_fault() {
        error!(error = %err, "failed to read request");
        internal_error()
    } else {
        warn!(error = %err, "malformed request");
        Response::error(err.status(), "Bad Request")
    }
}

/// 500 genérico: el detalle de la falla queda solo en el log
fn internal_error() -> Response {
    Response::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

/// Texto legible del payload de un panic
pub(super) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
