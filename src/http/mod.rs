//! # Módulo HTTP
//!
//! Codec del protocolo HTTP/1.1 implementado desde cero, sin librerías de
//! alto nivel. Incluye:
//!
//! - Parsing de requests desde un stream de bytes
//! - Construcción y serialización de responses
//! - Tabla de status codes
//!
//! No sabe nada de routing.
//!
//! ### Formato de Request
//!
//! ```text
//! GET /path?query=value HTTP/1.1\r\n
//! Header-Name: Header-Value\r\n
//! Content-Length: 0\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: application/json; charset=UTF-8\r\n
//! Content-Length: 13\r\n
//! \r\n
//! {"ok": true}
//! ```
//!
//! Fuera de alcance: keep-alive, pipelining, chunked, compresión.

pub mod parser;
pub mod request;
pub mod response;
pub mod status;

pub use parser::{ParseError, MAX_BODY_SIZE};
pub use request::{BodyError, Method, Request};
pub use response::Response;
pub use status::StatusCode;
