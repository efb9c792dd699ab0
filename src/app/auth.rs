//! # Autenticación por Token
//! src/app/auth.rs

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::middleware::{from_fn, Middleware};

/// Deja pasar solo si `Authorization` es exactamente `token`; si no,
/// responde 401 y corta la cadena.
pub fn token_auth(token: impl Into<String>) -> Arc<dyn Middleware> {
    let token = token.into();
    from_fn(move |req, res, next| {
        if req.header("Authorization") == Some(token.as_str()) {
            return next.run(req, res);
        }

        debug!(path = %req.path(), "rejected request without valid token");
        res.status(401).json(&json!({ "message": "Unauthorized" }))?;
        Ok(())
    })
}
