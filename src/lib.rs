//! # handmade_http
//! src/lib.rs
//!
//! Motor HTTP/1.1 implementado desde cero sobre `std::net`: protocolo,
//! routing con parámetros, cadena de middlewares y un pool de workers con
//! apagado ordenado.
//!
//! ## Arquitectura
//!
//! - `http`: parsing de requests y serialización de responses
//! - `router`: tabla de rutas por método, patrones `:param`, sub-routers
//! - `middleware`: contrato handler/middleware y ejecución de la cadena
//! - `server`: pool de workers, dispatcher por conexión y ciclo de vida
//! - `config`: argumentos CLI y variables de entorno
//! - `logging`: subscriber de `tracing`
//! - `console`: comandos `stop`/`exit` por stdin
//! - `app`: API de gatos de ejemplo
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use handmade_http::router::Router;
//! use handmade_http::server::{Server, ServerConfig};
//!
//! let mut router = Router::new();
//! router.get("/", |_req, res| {
//!     res.send("Hello World!");
//!     Ok(())
//! });
//!
//! let server = Server::new(router, ServerConfig::default());
//! server.listen(8888, "127.0.0.1", |addr| println!("http://{}", addr)).unwrap();
//! // ...
//! server.stop();
//! ```

pub mod app;
pub mod config;
pub mod console;
pub mod http;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod server;
