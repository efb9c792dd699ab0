//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Tabla fija código → mensaje que usa el servidor. Cualquier código que no
//! esté en la tabla se serializa como "Unknown Status".
//!
//! - **2xx**: Éxito (200, 201)
//! - **3xx**: Redirección (304)
//! - **4xx**: Error del cliente (400, 401, 403, 404)
//! - **5xx**: Error del servidor (500)

/// Mensaje para códigos que no están en la tabla
pub const UNKNOWN_STATUS: &str = "Unknown Status";

/// Código de estado HTTP
///
/// A diferencia de un enum cerrado, acepta cualquier valor numérico: los
/// handlers pueden responder con códigos arbitrarios y el mensaje se deriva
/// de la tabla.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(u16);

impl StatusCode {
    /// 200 OK
    pub const OK: StatusCode = StatusCode(200);
    /// 201 Created
    pub const CREATED: StatusCode = StatusCode(201);
    /// 304 Not Modified
    pub const NOT_MODIFIED: StatusCode = StatusCode(304);
    /// 400 Bad Request - request malformado
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    /// 401 Unauthorized
    pub const UNAUTHORIZED: StatusCode = StatusCode(401);
    /// 403 Forbidden
    pub const FORBIDDEN: StatusCode = StatusCode(403);
    /// 404 Not Found - ninguna ruta coincide
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    /// 500 Internal Server Error
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    /// Crea un código desde su valor numérico
    pub const fn from_u16(code: u16) -> Self {
        StatusCode(code)
    }

    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use handmade_http::http::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use handmade_http::http::StatusCode;
    /// assert_eq!(StatusCode::OK.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::from_u16(418).reason_phrase(), "Unknown Status");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            304 => "Not Modified",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => UNKNOWN_STATUS,
        }
    }

    /// Indica si el código está en la tabla fija
    pub fn is_known(&self) -> bool {
        self.reason_phrase() != UNKNOWN_STATUS
    }

    /// Verifica si el código indica éxito (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }

    /// Verifica si el código indica error del cliente (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.0)
    }

    /// Verifica si el código indica error del servidor (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.0)
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode::OK
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, self.reason_phrase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_values() {
        assert_eq!(StatusCode::OK.as_u16(), 200);
        assert_eq!(StatusCode::BAD_REQUEST.as_u16(), 400);
        assert_eq!(StatusCode::NOT_FOUND.as_u16(), 404);
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR.as_u16(), 500);
    }

    #[test]
    fn test_reason_phrases_table() {
        let table = [
            (200, "OK"),
            (201, "Created"),
            (304, "Not Modified"),
            (400, "Bad Request"),
            (401, "Unauthorized"),
            (403, "Forbidden"),
            (404, "Not Found"),
            (500, "Internal Server Error"),
        ];
        for (code, message) in table {
            assert_eq!(StatusCode::from_u16(code).reason_phrase(), message);
        }
    }

    #[test]
    fn test_unknown_status() {
        assert_eq!(StatusCode::from_u16(418).reason_phrase(), "Unknown Status");
        assert_eq!(StatusCode::from_u16(999).reason_phrase(), "Unknown Status");
        assert_eq!(StatusCode::from_u16(503).reason_phrase(), "Unknown Status");
        assert!(!StatusCode::from_u16(418).is_known());
        assert!(StatusCode::OK.is_known());
    }

    #[test]
    fn test_default_is_ok() {
        assert_eq!(StatusCode::default(), StatusCode::OK);
    }

    #[test]
    fn test_classes() {
        assert!(StatusCode::CREATED.is_success());
        assert!(StatusCode::UNAUTHORIZED.is_client_error());
        assert!(!StatusCode::OK.is_client_error());
        assert!(StatusCode::INTERNAL_SERVER_ERROR.is_server_error());
        assert!(StatusCode::from_u16(503).is_server_error());
        assert!(!StatusCode::BAD_REQUEST.is_server_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusCode::OK.to_string(), "200 OK");
        assert_eq!(StatusCode::NOT_FOUND.to_string(), "404 Not Found");
        assert_eq!(StatusCode::from_u16(299).to_string(), "299 Unknown Status");
    }
}
