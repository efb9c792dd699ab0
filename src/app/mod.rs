//! # Aplicación de Ejemplo
//! src/app/mod.rs
//!
//! API de gatos sobre el motor:
//!
//! | Método | Ruta        | Middlewares  | Respuesta                      |
//! |--------|-------------|--------------|--------------------------------|
//! | GET    | `/`         | -            | `{"message":"Hello World!"}`   |
//! | GET    | `/cats`     | token_auth   | `{"data":[...]}`               |
//! | POST   | `/cats`     | -            | 201 + gato creado              |
//! | GET    | `/cats/:id` | -            | gato, 404 o 400                |
//! | PATCH  | `/cats/:id` | token_auth   | gato actualizado               |
//! | DELETE | `/cats/:id` | token_auth   | `{"message":"Cat deleted"}`    |
//!
//! `RequestLogger` y `BodyParser` son globales.

pub mod auth;
pub mod cats_db;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::http::{Request, Response};
use crate::middleware::{BodyParser, RequestLogger};
use crate::router::Router;

pub use auth::token_auth;
pub use cats_db::{Cat, CatsDb, DbError};

/// Body `{"message": ...}` de las respuestas de la API
#[derive(Debug, Serialize)]
struct Message<'a> {
    message: &'a str,
}

impl<'a> Message<'a> {
    fn new(message: &'a str) -> Self {
        Self { message }
    }
}

#[derive(Debug, Serialize)]
struct CatList {
    data: Vec<Cat>,
}

#[derive(Debug, Serialize)]
struct CatCreated<'a> {
    message: &'a str,
    id: Option<&'a Value>,
    name: Option<&'a Value>,
}

/// Arma el router completo de la aplicación
pub fn build_router(db: Arc<CatsDb>, auth_token: &str) -> Router {
    let mut router = Router::new();
    router.use_middleware(Arc::new(RequestLogger::new()));
    router.use_middleware(Arc::new(BodyParser::new()));

    router.get("/", |_req, res| {
        res.status(200).json(&Message::new("Hello World!"))?;
        Ok(())
    });

    router.mount("/cats", &cats_router(db, auth_token));
    router
}

fn cats_router(db: Arc<CatsDb>, auth_token: &str) -> Router {
    let mut cats = Router::new();

    let list_db = Arc::clone(&db);
    cats.get_with("/", vec![token_auth(auth_token)], move |_req, res| {
        res.status(200).json(&CatList { data: list_db.all() })?;
        Ok(())
    });

    let create_db = Arc::clone(&db);
    cats.post("/", move |req, res| {
        let Some(cat) = body_object(req) else {
            res.status(400).json(&Message::new("Invalid cat data"))?;
            return Ok(());
        };
        let created = create_db.create(cat);
        res.status(201).json(&CatCreated {
            message: "Cat added",
            id: created.get("id"),
            name: created.get("name"),
        })?;
        Ok(())
    });

    let get_db = Arc::clone(&db);
    cats.get("/:id", move |req, res| {
        let Some(id) = cat_id_param(req, res)? else {
            return Ok(());
        };
        match get_db.get(id) {
            Some(cat) => res.status(200).json(&cat)?,
            None => res.status(404).json(&Message::new("Cat not found"))?,
        };
        Ok(())
    });

    let update_db = Arc::clone(&db);
    cats.patch_with("/:id", vec![token_auth(auth_token)], move |req, res| {
        let Some(id) = cat_id_param(req, res)? else {
            return Ok(());
        };
        let Some(data) = body_object(req) else {
            res.status(400).json(&Message::new("Invalid cat data"))?;
            return Ok(());
        };
        match update_db.update(id, data) {
            Some(cat) => res.status(200).json(&cat)?,
            None => res.status(404).json(&Message::new("Cat not found"))?,
        };
        Ok(())
    });

    let delete_db = db;
    cats.delete_with("/:id", vec![token_auth(auth_token)], move |req, res| {
        let Some(id) = cat_id_param(req, res)? else {
            return Ok(());
        };
        if delete_db.delete(id) {
            res.status(200).json(&Message::new("Cat deleted"))?;
        } else {
            res.status(404).json(&Message::new("Cat not found"))?;
        }
        Ok(())
    });

    cats
}

/// `:id` como entero; si no lo es, escribe un 400 y retorna `None`
fn cat_id_param(req: &Request, res: &mut Response) -> Result<Option<i64>, serde_json::Error> {
    match req.path_param("id").and_then(|id| id.parse().ok()) {
        Some(id) => Ok(Some(id)),
        None => {
            res.status(400).json(&Message::new("Invalid cat ID"))?;
            Ok(None)
        }
    }
}

/// Body ya parseado por `BodyParser`, si es un objeto JSON
fn body_object(req: &Request) -> Option<Cat> {
    match req.parsed_body() {
        Some(Value::Object(map)) => Some(map.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;
    use crate::server::{Dispatcher, ServerConfig};
    use serde_json::json;
    use std::io::Cursor;

    fn sample_db() -> Arc<CatsDb> {
        let cats = vec![
            json!({"id": 1, "name": "Tigrutza"}),
            json!({"id": 2, "name": "Pufu"}),
        ]
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();
        Arc::new(CatsDb::new(cats))
    }

    fn app() -> (Dispatcher, Arc<CatsDb>) {
        let db = sample_db();
        let router = build_router(Arc::clone(&db), "LeBron");
        (Dispatcher::new(Arc::new(router), ServerConfig::default()), db)
    }

    fn send(dispatcher: &Dispatcher, raw: &str) -> (StatusCode, Value) {
        let res = dispatcher
            .dispatch(&mut Cursor::new(raw.as_bytes().to_vec()))
            .unwrap();
        let body = serde_json::from_slice(res.body()).unwrap_or(Value::Null);
        (res.status_code(), body)
    }

    fn with_body(method: &str, path: &str, extra_headers: &str, body: &str) -> String {
        format!(
            "{} {} HTTP/1.1\r\nContent-Type: application/json\r\n{}Content-Length: {}\r\n\r\n{}",
            method,
            path,
            extra_headers,
            body.len(),
            body
        )
    }

    #[test]
    fn test_router_shape() {
        let router = build_router(sample_db(), "LeBron");
        let tree = router.route_tree();
        assert!(tree.contains("/cats/:id"));
        assert_eq!(router.len(), 6);
        assert_eq!(router.global_middlewares().len(), 2);
    }

    #[test]
    fn test_hello_world() {
        let (d, _) = app();
        let (status, body) = send(&d, "GET / HTTP/1.1\r\n\r\n");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Hello World!"}));
    }

    // ==================== Auth ====================

    #[test]
    fn test_list_requires_token() {
        let (d, _) = app();
        let (status, body) = send(&d, "GET /cats HTTP/1.1\r\n\r\n");
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthorized");
    }

    #[test]
    fn test_list_with_token() {
        let (d, _) = app();
        let (status, body) = send(&d, "GET /cats HTTP/1.1\r\nAuthorization: LeBron\r\n\r\n");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
    }

    // ==================== Cats ====================

    #[test]
    fn test_get_cat() {
        let (d, _) = app();
        let (status, body) = send(&d, "GET /cats/2 HTTP/1.1\r\n\r\n");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Pufu");
    }

    #[test]
    fn test_get_missing_cat() {
        let (d, _) = app();
        let (status, body) = send(&d, "GET /cats/9 HTTP/1.1\r\n\r\n");
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Cat not found");
    }

    #[test]
    fn test_get_invalid_id() {
        let (d, _) = app();
        let (status, body) = send(&d, "GET /cats/abc HTTP/1.1\r\n\r\n");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid cat ID");
    }

    #[test]
    fn test_create_cat() {
        let (d, db) = app();
        let raw = with_body("POST", "/cats", "", r#"{"id": 7, "name": "Mitza"}"#);
        let (status, body) = send(&d, &raw);
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Cat added");
        assert_eq!(body["name"], "Mitza");
        assert_eq!(body["id"], 3);
        assert_eq!(db.len(), 3);
    }

    #[test]
    fn test_create_invalid_json() {
        let (d, db) = app();
        let raw = with_body("POST", "/cats", "", "{oops");
        let (status, body) = send(&d, &raw);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid JSON format");
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn test_create_non_object() {
        let (d, _) = app();
        let raw = with_body("POST", "/cats", "", "[1, 2]");
        let (status, body) = send(&d, &raw);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid cat data");
    }

    #[test]
    fn test_update_cat() {
        let (d, db) = app();
        let raw = with_body("PATCH", "/cats/1", "Authorization: LeBron\r\n", r#"{"name": "Tigru"}"#);
        let (status, body) = send(&d, &raw);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Tigru");
        assert_eq!(db.get(1).unwrap()["name"], "Tigru");
    }

    #[test]
    fn test_update_requires_token() {
        let (d, _) = app();
        let raw = with_body("PATCH", "/cats/1", "", r#"{"name": "Tigru"}"#);
        let (status, _) = send(&d, &raw);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_delete_cat() {
        let (d, db) = app();
        let (status, body) = send(&d, "DELETE /cats/2 HTTP/1.1\r\nAuthorization: LeBron\r\n\r\n");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Cat deleted");
        assert!(db.get(2).is_none());

        let (status, _) = send(&d, "DELETE /cats/2 HTTP/1.1\r\nAuthorization: LeBron\r\n\r\n");
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
