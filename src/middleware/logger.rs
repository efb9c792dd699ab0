//! # Logger de Requests
//! src/middleware/logger.rs
//!
//! Registra cada request al entrar a la cadena y el status/latencia cuando
//! la cadena retorna.

use std::time::Instant;

use tracing::info;

use super::{HandlerResult, Middleware, Next};
use crate::http::{Request, Response};

#[derive(Debug, Default, Clone, Copy)]
pub struct RequestLogger;

impl RequestLogger {
    pub fn new() -> Self {
        RequestLogger
    }
}

impl Middleware for RequestLogger {
    fn handle(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> HandlerResult {
        let start = Instant::now();
        let method = req.method();
        let path = req.path().to_string();

        info!(%method, %path, "request");
        let result = next.run(req, res);
        info!(
            %method,
            %path,
            status = res.status_code().as_u16(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            failed = result.is_err(),
            "response"
        );

        result
    }
}
