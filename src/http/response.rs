//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Los handlers reciben un `Response` mutable y lo van completando
//! (`status`, `send`, `json`). El dispatcher lo serializa al final con
//! `to_bytes`.
//!
//! ## Formato de una respuesta
//!
//! ```text
//! HTTP/1.1 201 Created\r\n
//! Content-Type: application/json; charset=UTF-8\r\n
//! Content-Length: 22\r\n
//! \r\n
//! {"message":"Cat added"}
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use handmade_http::http::Response;
//! use serde_json::json;
//!
//! let mut response = Response::new();
//! response.status(201).json(&json!({"message": "Cat added"})).unwrap();
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.1 201 Created\r\n"));
//! ```

use std::collections::HashMap;

use serde::Serialize;
use serde_json::json;

use super::StatusCode;

/// Versión usada en la status line si nadie la cambia
pub const DEFAULT_VERSION: &str = "HTTP/1.1";

/// Content-Type que se inyecta cuando la respuesta no declara uno
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain; charset=UTF-8";

/// Content-Type de `json()`
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Respuesta HTTP en construcción
#[derive(Debug, Clone)]
pub struct Response {
    version: String,

    status: StatusCode,

    /// Derivado de la tabla de status al llamar `status()`
    status_message: String,

    headers: HashMap<String, String>,

    body: Vec<u8>,
}

impl Response {
    /// Respuesta vacía con 200 OK
    pub fn new() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            status: StatusCode::OK,
            status_message: StatusCode::OK.reason_phrase().to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Crea una respuesta de error con cuerpo JSON
    ///
    /// Formato del JSON: `{"message": "..."}`
    ///
    /// # Ejemplo
    /// ```
    /// use handmade_http::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::NOT_FOUND, "Route not found");
    /// assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    /// assert_eq!(response.body(), br#"{"message":"Route not found"}"#);
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        let mut response = Self::new();
        response.set_status(status);
        response.set_header("Content-Type", JSON_CONTENT_TYPE);
        response.body = json!({ "message": message }).to_string().into_bytes();
        response
    }

    // === API para handlers ===

    /// Establece el código y deriva el mensaje de la tabla de status
    pub fn status(&mut self, code: u16) -> &mut Self {
        self.set_status(StatusCode::from_u16(code))
    }

    pub fn set_status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self.status_message = status.reason_phrase().to_string();
        self
    }

    /// Sobrescribe el mensaje derivado de la tabla
    pub fn set_status_message(&mut self, message: &str) -> &mut Self {
        self.status_message = message.to_string();
        self
    }

    /// Establece el body tal cual
    pub fn send(&mut self, body: impl Into<Vec<u8>>) -> &mut Self {
        self.body = body.into();
        self
    }

    /// Serializa `value` como JSON y lo usa de body
    ///
    /// También establece `Content-Type: application/json; charset=UTF-8`.
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        self.set_header("Content-Type", JSON_CONTENT_TYPE);
        self.body = body;
        Ok(self)
    }

    /// Agrega un header; si ya existe, se sobrescribe
    pub fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Agrega un header (versión builder)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.set_header(name, value);
        self
    }

    /// Versión de la status line; no se valida
    pub fn set_version(&mut self, version: &str) -> &mut Self {
        self.version = version.to_string();
        self
    }

    // === Accesores ===

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Busca un header ignorando mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// - Status line: `HTTP/1.1 200 OK\r\n`
    /// - Headers: `Header-Name: Value\r\n`
    /// - Línea vacía: `\r\n`
    /// - Body
    ///
    /// `Content-Length` siempre se calcula desde el body (cualquier valor
    /// puesto por el handler se descarta). `Content-Type` se inyecta solo si
    /// falta.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(128 + self.body.len());

        // 1. Status line
        let status_line = format!(
            "{} {} {}\r\n",
            self.version,
            self.status.as_u16(),
            self.status_message
        );
        result.extend_from_slice(status_line.as_bytes());

        // 2. Headers
        for (name, value) in &self.headers {
            if name.eq_ignore_ascii_case("Content-Length") {
                continue;
            }
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        if self.header("Content-Type").is_none() {
            result.extend_from_slice(format!("Content-Type: {}\r\n", DEFAULT_CONTENT_TYPE).as_bytes());
        }
        result.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());

        // 3. Línea vacía que separa headers del body
        result.extend_from_slice(b"\r\n");

        // 4. Body
        result.extend_from_slice(&self.body);

        result
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}
