//! # Base de Datos de Gatos
//! src/app/cats_db.rs
//!
//! Almacén en memoria cargado desde un archivo JSON con un array de objetos.
//! Los cambios no se escriben de vuelta al archivo.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

/// Un gato es un objeto JSON libre con un campo numérico `id`
pub type Cat = Map<String, Value>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid cats file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default)]
pub struct CatsDb {
    cats: RwLock<Vec<Cat>>,
}

impl CatsDb {
    pub fn new(cats: Vec<Cat>) -> Self {
        Self {
            cats: RwLock::new(cats),
        }
    }

    /// Carga el archivo completo
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DbError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cats: Vec<Cat> = serde_json::from_str(&content).map_err(|source| DbError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), cats = cats.len(), "cats database loaded");
        Ok(Self::new(cats))
    }

    /// Igual que `load`, pero arranca vacío si el archivo falta o es inválido
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!(error = %e, "starting with an empty cats database");
            Self::default()
        })
    }

    pub fn all(&self) -> Vec<Cat> {
        self.cats.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn get(&self, id: i64) -> Option<Cat> {
        self.cats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|cat| cat_id(cat) == Some(id))
            .cloned()
    }

    /// Agrega un gato con `id` autoincremental (se ignora el `id` recibido)
    pub fn create(&self, mut cat: Cat) -> Cat {
        let mut cats = self.cats.write().unwrap_or_else(PoisonError::into_inner);
        let next_id = cats.iter().filter_map(cat_id).max().unwrap_or(0) + 1;
        cat.insert("id".to_string(), Value::from(next_id));
        cats.push(cat.clone());
        cat
    }

    /// Sobrescribe los campos de `data`, conservando el `id`
    pub fn update(&self, id: i64, mut data: Cat) -> Option<Cat> {
        let mut cats = self.cats.write().unwrap_or_else(PoisonError::into_inner);
        let cat = cats.iter_mut().find(|cat| cat_id(cat) == Some(id))?;
        data.remove("id");
        cat.extend(data);
        Some(cat.clone())
    }

    pub fn delete(&self, id: i64) -> bool {
        let mut cats = self.cats.write().unwrap_or_else(PoisonError::into_inner);
        let before = cats.len();
        cats.retain(|cat| cat_id(cat) != Some(id));
        cats.len() != before
    }

    pub fn len(&self) -> usize {
        self.cats.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `id` numérico de un gato; acepta `3` y `3.0`
fn cat_id(cat: &Cat) -> Option<i64> {
    let id = cat.get("id")?;
    id.as_i64().or_else(|| id.as_f64().map(|f| f as i64))
}
