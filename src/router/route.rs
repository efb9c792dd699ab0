//! # Rutas y Middlewares Globales
//! src/router/route.rs

use std::sync::Arc;

use super::pattern::PathPattern;
use crate::http::Method;
use crate::middleware::{Handler, Middleware};

/// (método, patrón, middlewares propios, handler terminal)
///
/// Se crea al registrar y no cambia después.
#[derive(Clone)]
pub struct Route {
    method: Method,
    pattern: PathPattern,
    middlewares: Vec<Arc<dyn Middleware>>,
    handler: Arc<dyn Handler>,
}

impl Route {
    pub fn new(
        method: Method,
        path: &str,
        middlewares: Vec<Arc<dyn Middleware>>,
        handler: Arc<dyn Handler>,
    ) -> Self {
        Self {
            method,
            pattern: PathPattern::new(path),
            middlewares,
            handler,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn middlewares(&self) -> &[Arc<dyn Middleware>] {
        &self.middlewares
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }

    pub(crate) fn handler_arc(&self) -> Arc<dyn Handler> {
        Arc::clone(&self.handler)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

/// Middleware aplicado a todas las rutas, opcionalmente filtrado por prefijo
#[derive(Clone)]
pub struct GlobalMiddleware {
    prefix: Option<String>,
    middleware: Arc<dyn Middleware>,
}

impl GlobalMiddleware {
    pub fn new(prefix: Option<&str>, middleware: Arc<dyn Middleware>) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            middleware,
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn middleware(&self) -> &Arc<dyn Middleware> {
        &self.middleware
    }

    /// El filtro es un `starts_with` sobre el path limpio: `/cats` también
    /// aplica a `/catsup`.
    pub fn applies_to(&self, clean_path: &str) -> bool {
        match &self.prefix {
            Some(prefix) => clean_path.starts_with(prefix.as_str()),
            None => true,
        }
    }
}

impl std::fmt::Debug for GlobalMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalMiddleware")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
