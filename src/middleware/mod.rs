//! # Middlewares y Handlers
//! src/middleware/mod.rs
//!
//! Contrato que ve el código de la aplicación:
//!
//! ```text
//! Request → [mw 1] → next → [mw 2] → next → Handler → Response
//! ```
//!
//! - Un **handler** recibe `(Request, Response)` y deja la respuesta completa.
//! - Un **middleware** además recibe `Next`. Llamar `next.run(req, res)`
//!   avanza al siguiente eslabón; no llamarlo corta la cadena y el middleware
//!   es responsable de haber escrito la respuesta (ej: un 401).
//!
//! Cualquier `Err` (o panic) que salga de la cadena lo convierte el
//! dispatcher en un 500.
//!
//! ## Ejemplo
//!
//! ```
//! use handmade_http::middleware::{self, HandlerResult, Next};
//! use handmade_http::http::{Request, Response};
//!
//! let auth = middleware::from_fn(|req: &mut Request, res: &mut Response, next: Next<'_>| {
//!     if req.header("Authorization") == Some("secret") {
//!         next.run(req, res)
//!     } else {
//!         res.status(401).send("Unauthorized");
//!         Ok(())
//!     }
//! });
//! # let _ = auth;
//! ```

pub mod body_parser;
pub mod logger;
pub mod pipeline;

use std::sync::Arc;

use crate::http::{Request, Response};

pub use body_parser::BodyParser;
pub use logger::RequestLogger;
pub use pipeline::{Next, Outcome, Pipeline};

/// Error que puede devolver un handler o middleware
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Resultado de un handler o middleware
pub type HandlerResult = Result<(), HandlerError>;

/// Handler terminal de una ruta
pub trait Handler: Send + Sync {
    fn handle(&self, req: &mut Request, res: &mut Response) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&mut Request, &mut Response) -> HandlerResult + Send + Sync,
{
    fn handle(&self, req: &mut Request, res: &mut Response) -> HandlerResult {
        self(req, res)
    }
}

/// Eslabón intermedio de la cadena
pub trait Middleware: Send + Sync {
    fn handle(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> HandlerResult;
}

impl<F> Middleware for F
where
    F: Fn(&mut Request, &mut Response, Next<'_>) -> HandlerResult + Send + Sync,
{
    fn handle(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> HandlerResult {
        self(req, res, next)
    }
}

/// Convierte un closure en middleware compartible entre workers
pub fn from_fn<F>(f: F) -> Arc<dyn Middleware>
where
    F: Fn(&mut Request, &mut Response, Next<'_>) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Convierte un closure en handler compartible entre workers
pub fn handler<F>(f: F) -> Arc<dyn Handler>
where
    F: Fn(&mut Request, &mut Response) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(f)
}
