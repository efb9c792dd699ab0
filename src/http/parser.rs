//! # Parsing de Requests HTTP/1.1
//! src/http/parser.rs
//!
//! Lee un request desde cualquier fuente de bytes con buffer (`BufRead`):
//! el socket en producción, un `&[u8]` o un `Cursor` en los tests.
//!
//! ## Pasos
//!
//! 1. **Request Line**: `METHOD /path?query VERSION`, separada por espacios
//!    simples en exactamente 3 tokens
//! 2. **Headers**: `Name: Value` hasta encontrar una línea vacía
//! 3. **Body**: exactamente `Content-Length` bytes (si el header existe)
//!
//! Las líneas terminan en CRLF; también se acepta LF solo. Un CR que no va
//! seguido de LF se conserva como dato.

use std::collections::HashMap;
use std::io::{self, BufRead, Read};

use thiserror::Error;

use super::request::{Method, Request};
use super::StatusCode;

/// Tamaño máximo de body aceptado (1 MiB)
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Longitud máxima de la request line y de cada header
pub const MAX_LINE_LENGTH: usize = 8 * 1024;

/// Número máximo de líneas de header
pub const MAX_HEADERS: usize = 100;

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Error)]
pub enum ParseError {
    /// El cliente cerró sin enviar un solo byte
    #[error("connection closed before any data was received")]
    ConnectionClosed,

    #[error("empty request")]
    EmptyRequest,

    #[error("invalid request line: should have 3 parts, got {0:?}")]
    InvalidRequestLine(String),

    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("line exceeds {} bytes", MAX_LINE_LENGTH)]
    LineTooLong,

    #[error("more than {} header lines", MAX_HEADERS)]
    TooManyHeaders,

    #[error("invalid Content-Length: {0}")]
    InvalidContentLength(String),

    #[error("Content-Length {0} exceeds the {max} byte limit", max = MAX_BODY_SIZE)]
    BodyTooLarge(u64),

    /// El stream terminó antes de completar el body declarado
    #[error("unexpected end of stream while reading body")]
    UnexpectedEof,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ParseError {
    /// Fallas de transporte: el request declarado era válido pero no llegó
    /// completo. Se distinguen de los requests malformados.
    pub fn is_transport_fault(&self) -> bool {
        matches!(self, ParseError::UnexpectedEof | ParseError::Io(_))
    }

    /// Código HTTP con el que se responde a este error
    ///
    /// - Request malformado → 400
    /// - Falla de transporte → 500
    pub fn status(&self) -> StatusCode {
        if self.is_transport_fault() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::BAD_REQUEST
        }
    }
}

impl Request {
    /// Parsea un request completo desde un buffer en memoria
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use handmade_http::http::{Method, Request};
    ///
    /// let raw = b"GET /cats?sort=name HTTP/1.1\r\nHost: localhost\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), Method::GET);
    /// assert_eq!(request.clean_path(), "/cats");
    /// assert_eq!(request.header("Host"), Some("localhost"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let mut reader = buffer;
        Self::read_from(&mut reader)
    }

    /// Lee y parsea un request desde una fuente con buffer
    ///
    /// Consume exactamente los bytes del request (request line, headers y
    /// `Content-Length` bytes de body); lo que venga después queda sin leer.
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Self, ParseError> {
        // 1. Request line
        let line = read_line(reader)?.ok_or(ParseError::ConnectionClosed)?;
        let (method, path, version) = parse_request_line(&line)?;
        let mut request = Request::new(method, path, version);

        // 2. Headers
        let headers = read_headers(reader)?;

        // 3. Body
        let body = match content_length(&headers)? {
            Some(length) => read_body(reader, length)?,
            None => Vec::new(),
        };

        request.set_headers(headers);
        request.set_body(body);
        Ok(request)
    }
}

/// Lee una línea sin su terminador
///
/// Retorna `None` si el stream ya estaba en EOF. Una línea que termina en EOF
/// sin terminador se retorna tal cual.
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>, ParseError> {
    let mut buf = Vec::new();
    // + 2 para que el límite sea el mismo con "\r\n" que con "\n"
    let read = reader
        .by_ref()
        .take(MAX_LINE_LENGTH as u64 + 2)
        .read_until(b'\n', &mut buf)?;

    if read == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    if buf.len() > MAX_LINE_LENGTH {
        return Err(ParseError::LineTooLong);
    }

    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// Formato: `GET /path?query HTTP/1.1`
fn parse_request_line(line: &str) -> Result<(Method, &str, &str), ParseError> {
    if line.is_empty() {
        return Err(ParseError::EmptyRequest);
    }

    // Espacios simples: "GET  / HTTP/1.1" produce un token vacío y se rechaza
    let parts: Vec<&str> = line.split(' ').collect();
    if parts.len() != 3 {
        return Err(ParseError::InvalidRequestLine(line.to_string()));
    }

    let method = Method::from_token(parts[0])
        .ok_or_else(|| ParseError::UnsupportedMethod(parts[0].to_string()))?;

    if !parts[1].starts_with('/') {
        return Err(ParseError::InvalidPath(parts[1].to_string()));
    }

    Ok((method, parts[1], parts[2]))
}

/// Lee headers hasta la línea vacía (o EOF)
///
/// Las líneas sin ':' se ignoran.
fn read_headers<R: BufRead>(reader: &mut R) -> Result<HashMap<String, String>, ParseError> {
    let mut headers = HashMap::new();
    let mut lines = 0;

    while let Some(line) = read_line(reader)? {
        if line.is_empty() {
            break;
        }

        lines += 1;
        if lines > MAX_HEADERS {
            return Err(ParseError::TooManyHeaders);
        }

        if let Some(colon_pos) = line.find(':') {
            let name = line[..colon_pos].trim().to_string();
            let value = line[colon_pos + 1..].trim().to_string();
            headers.insert(name, value);
        }
    }

    Ok(headers)
}

/// Valida el header `Content-Length` si está presente
///
/// El nombre se compara sin mayúsculas. Si aparece en varias variantes con
/// valores distintos el framing es ambiguo y se rechaza.
fn content_length(headers: &HashMap<String, String>) -> Result<Option<usize>, ParseError> {
    let mut values = headers
        .iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case("Content-Length"))
        .map(|(_, value)| value);

    let raw = match values.next() {
        Some(value) => value,
        None => return Ok(None),
    };
    if let Some(other) = values.find(|other| other.trim() != raw.trim()) {
        return Err(ParseError::InvalidContentLength(format!("{}, {}", raw, other)));
    }

    let length: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidContentLength(raw.clone()))?;

    if length < 0 {
        return Err(ParseError::InvalidContentLength(raw.clone()));
    }
    if length as u64 > MAX_BODY_SIZE as u64 {
        return Err(ParseError::BodyTooLarge(length as u64));
    }

    Ok(Some(length as usize))
}

fn read_body<R: BufRead>(reader: &mut R, length: usize) -> Result<Vec<u8>, ParseError> {
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            ParseError::UnexpectedEof
        } else {
            ParseError::Io(e)
        }
    })?;
    Ok(body)
}
