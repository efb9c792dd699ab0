//! # Body Parser
//! src/middleware/body_parser.rs
//!
//! Interpreta el body según el `Content-Type` y lo deja en
//! `Request::parsed_body()`:
//!
//! - `application/json` → el valor JSON; si es inválido responde 400 y corta
//! - `application/x-www-form-urlencoded` → objeto JSON de strings
//! - cualquier otro tipo (o body vacío) → pasa sin tocar nada

use serde_json::{Map, Value};
use tracing::warn;

use super::{HandlerResult, Middleware, Next};
use crate::http::{Request, Response, StatusCode};

#[derive(Debug, Default, Clone, Copy)]
pub struct BodyParser;

impl BodyParser {
    pub fn new() -> Self {
        BodyParser
    }
}

impl Middleware for BodyParser {
    fn handle(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> HandlerResult {
        let content_type = match req.header_ignore_case("Content-Type") {
            Some(ct) if !req.body().is_empty() => ct.to_ascii_lowercase(),
            _ => return next.run(req, res),
        };

        if content_type.contains("application/json") {
            match serde_json::from_slice::<Value>(req.body()) {
                Ok(value) => req.set_parsed_body(value),
                Err(e) => {
                    warn!(error = %e, path = %req.path(), "invalid JSON body");
                    *res = Response::error(StatusCode::BAD_REQUEST, "Invalid JSON format");
                    return Ok(());
                }
            }
        } else if content_type.contains("application/x-www-form-urlencoded") {
            let form: Map<String, Value> = url::form_urlencoded::parse(req.body())
                .into_owned()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            req.set_parsed_body(Value::Object(form));
        }

        next.run(req, res)
    }
}
