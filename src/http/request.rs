//! # Requests HTTP/1.1
//! src/http/request.rs
//!
//! Representación de un request ya parseado. El parsing desde el socket vive
//! en `parser.rs`; aquí solo están los datos y sus accesores.
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /cats?sort=name HTTP/1.1\r\n
//! Host: localhost:8888\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 24\r\n
//! \r\n
//! {"id": 5, "name": "Ares"}
//! ```

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;
use thiserror::Error;

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
    OPTIONS,
}

impl Method {
    /// Todos los métodos, en el orden en que se listan en el árbol de rutas
    pub const ALL: [Method; 6] = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    /// Parsea un método desde el token de la request line
    ///
    /// La comparación es exacta: `get` no es un método válido.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "PATCH" => Some(Method::PATCH),
            "DELETE" => Some(Method::DELETE),
            "OPTIONS" => Some(Method::OPTIONS),
            _ => None,
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
            Method::OPTIONS => "OPTIONS",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errores al interpretar el body como JSON
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request is not JSON")]
    NotJson,

    #[error("invalid JSON body: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Request HTTP parseado
///
/// Inmutable después del parsing salvo por los parámetros de path (que
/// asigna el router al hacer match) y el body parseado (que asigna el
/// middleware `BodyParser`). Cada conexión tiene su propio Request.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,

    /// Path crudo, puede incluir query string (ej: "/cats?sort=name")
    path: String,

    /// Versión tal como llegó (no se valida)
    version: String,

    /// Headers; la última aparición gana y el nombre se guarda tal cual
    headers: HashMap<String, String>,

    body: Vec<u8>,

    /// Query parameters, derivados la primera vez que se piden
    query_params: OnceLock<HashMap<String, String>>,

    path_params: HashMap<String, String>,

    parsed_body: Option<Value>,
}

impl Request {
    /// Crea un request sin headers ni body
    ///
    /// # Ejemplo
    /// ```
    /// use handmade_http::http::{Method, Request};
    ///
    /// let request = Request::new(Method::GET, "/cats?sort=name", "HTTP/1.1");
    /// assert_eq!(request.clean_path(), "/cats");
    /// assert_eq!(request.query_param("sort"), Some("name"));
    /// ```
    pub fn new(method: Method, path: &str, version: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            version: version.to_string(),
            headers: HashMap::new(),
            body: Vec::new(),
            query_params: OnceLock::new(),
            path_params: HashMap::new(),
            parsed_body: None,
        }
    }

    /// Agrega un header (builder)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Establece el body (builder)
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub(crate) fn set_headers(&mut self, headers: HashMap<String, String>) {
        self.headers = headers;
    }

    pub(crate) fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    pub(crate) fn set_path_params(&mut self, params: HashMap<String, String>) {
        self.path_params = params;
    }

    // === Accesores ===

    pub fn method(&self) -> Method {
        self.method
    }

    /// Path crudo, con query string si la hay
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path sin query string
    pub fn clean_path(&self) -> &str {
        match self.path.find('?') {
            Some(idx) => &self.path[..idx],
            None => &self.path,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header por nombre exacto (sensible a mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    /// Busca un header ignorando mayúsculas
    ///
    /// Si llegó en varias variantes gana la que coincide exacto con `name`;
    /// si ninguna coincide, la de nombre menor en orden byte a byte.
    pub fn header_ignore_case(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.header(name) {
            return Some(value);
        }
        self.headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body como texto, si es UTF-8 válido
    pub fn body_string(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Interpreta el body como JSON
    ///
    /// Falla si el Content-Type no declara `application/json`.
    pub fn body_json(&self) -> Result<Value, BodyError> {
        let is_json = self
            .header_ignore_case("Content-Type")
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);
        if !is_json {
            return Err(BodyError::NotJson);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Query parameters decodificados (`+` y `%XX`)
    ///
    /// # Ejemplo
    /// ```
    /// use handmade_http::http::{Method, Request};
    ///
    /// let request = Request::new(Method::GET, "/search?q=hello%20world&n=2", "HTTP/1.1");
    /// assert_eq!(request.query_param("q"), Some("hello world"));
    /// assert_eq!(request.query_param("missing"), None);
    /// ```
    pub fn query_params(&self) -> &HashMap<String, String> {
        self.query_params.get_or_init(|| match self.path.find('?') {
            Some(idx) => url::form_urlencoded::parse(self.path[idx + 1..].as_bytes())
                .into_owned()
                .collect(),
            None => HashMap::new(),
        })
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params().get(name).map(|s| s.as_str())
    }

    /// Parámetros de path asignados por el router (ej: `id` en `/cats/:id`)
    pub fn path_params(&self) -> &HashMap<String, String> {
        &self.path_params
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(|s| s.as_str())
    }

    /// Body ya parseado por un middleware, si lo hay
    pub fn parsed_body(&self) -> Option<&Value> {
        self.parsed_body.as_ref()
    }

    pub fn set_parsed_body(&mut self, value: Value) {
        self.parsed_body = Some(value);
    }

    /// Serializa el request de vuelta al formato del wire
    ///
    /// Los headers se escriben tal cual: si el body no está vacío, el
    /// llamador es responsable de incluir `Content-Length`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(64 + self.body.len());
        result.extend_from_slice(
            format!("{} {} {}\r\n", self.method, self.path, self.version).as_bytes(),
        );
        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_token() {
        for method in Method::ALL {
            assert_eq!(Method::from_token(method.as_str()), Some(method));
        }
        assert_eq!(Method::from_token("HEAD"), None);
        assert_eq!(Method::from_token("get"), None);
        assert_eq!(Method::from_token(""), None);
    }

    #[test]
    fn test_clean_path() {
        let request = Request::new(Method::GET, "/cats/1?x=2", "HTTP/1.1");
        assert_eq!(request.path(), "/cats/1?x=2");
        assert_eq!(request.clean_path(), "/cats/1");

        let request = Request::new(Method::GET, "/cats", "HTTP/1.1");
        assert_eq!(request.clean_path(), "/cats");
    }

    #[test]
    fn test_query_params_lazy() {
        let request = Request::new(Method::GET, "/t?a=1&b=two+words&a=3", "HTTP/1.1");
        assert_eq!(request.query_param("a"), Some("3"));
        assert_eq!(request.query_param("b"), Some("two words"));
        assert_eq!(request.query_params().len(), 2);
    }

    #[test]
    fn test_query_params_empty() {
        let request = Request::new(Method::GET, "/t", "HTTP/1.1");
        assert!(request.query_params().is_empty());
    }

    #[test]
    fn test_headers_literal_case() {
        let request = Request::new(Method::GET, "/", "HTTP/1.1").with_header("X-Token", "abc");
        assert_eq!(request.header("X-Token"), Some("abc"));
        assert_eq!(request.header("x-token"), None);
        assert_eq!(request.header_ignore_case("x-token"), Some("abc"));
    }

    #[test]
    fn test_header_ignore_case_variants_are_deterministic() {
        let request = Request::new(Method::POST, "/", "HTTP/1.1")
            .with_header("content-type", "text/plain")
            .with_header("CONTENT-TYPE", "application/x-www-form-urlencoded")
            .with_header("Content-Type", "application/json");
        assert_eq!(request.header_ignore_case("Content-Type"), Some("application/json"));
        // "CONTENT-TYPE" < "content-type" byte a byte
        assert_eq!(
            request.header_ignore_case("content-TYPE"),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn test_body_json() {
        let request = Request::new(Method::POST, "/", "HTTP/1.1")
            .with_header("Content-Type", "application/json; charset=UTF-8")
            .with_body(r#"{"name": "Pufu"}"#);
        let value = request.body_json().unwrap();
        assert_eq!(value["name"], "Pufu");
    }

    #[test]
    fn test_body_json_requires_content_type() {
        let request = Request::new(Method::POST, "/", "HTTP/1.1").with_body("{}");
        assert!(matches!(request.body_json(), Err(BodyError::NotJson)));
    }

    #[test]
    fn test_body_json_invalid() {
        let request = Request::new(Method::POST, "/", "HTTP/1.1")
            .with_header("Content-Type", "application/json")
            .with_body("{oops");
        assert!(matches!(request.body_json(), Err(BodyError::Invalid(_))));
    }

    #[test]
    fn test_to_bytes() {
        let request = Request::new(Method::PUT, "/cats/1", "HTTP/1.1")
            .with_header("Content-Length", "2")
            .with_body("hi");
        let text = String::from_utf8(request.to_bytes()).unwrap();
        assert!(text.starts_with("PUT /cats/1 HTTP/1.1\r\n"));
        assert!(text.contains("Content-Length: 2\r\n"));
        assert!(text.ends_with("\r\n\r\nhi"));
    }

    #[test]
    fn test_path_params() {
        let mut request = Request::new(Method::GET, "/cats/42", "HTTP/1.1");
        assert_eq!(request.path_param("id"), None);
        request.set_path_params(HashMap::from([("id".to_string(), "42".to_string())]));
        assert_eq!(request.path_param("id"), Some("42"));
    }
}
