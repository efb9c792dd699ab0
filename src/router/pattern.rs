//! # Patrones de Ruta
//! src/router/pattern.rs
//!
//! Un patrón es una secuencia de segmentos separados por `/`. Los segmentos
//! que empiezan con `:` capturan el segmento correspondiente del path:
//!
//! ```text
//! /cats/:id   +   /cats/42   →   { id: "42" }
//! /cats/:id   +   /cats/42/x →   no match (distinta cantidad de segmentos)
//! ```
//!
//! No hay comodines ni segmentos opcionales. Los segmentos vacíos al final se
//! descartan al partir, así que `/cats/` y `/cats` son equivalentes.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

/// Prefijo que marca un segmento como parámetro
pub const PARAM_MARKER: char = ':';

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Patrón compilado al registrar la ruta
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Self {
        let segments = split_segments(pattern)
            .into_iter()
            .map(|part| match part.strip_prefix(PARAM_MARKER) {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(part.to_string()),
            })
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    /// El patrón tal como se registró
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Nombres de los parámetros, en orden
    pub fn param_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Param(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Compara contra un path limpio (sin query string)
    ///
    /// Retorna los parámetros capturados si hay match. Un parámetro acepta
    /// cualquier valor, incluso vacío; un literal debe ser idéntico byte a
    /// byte.
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts = split_segments(path);
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }

        Some(params)
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parte un path en `/` descartando los segmentos vacíos del final
fn split_segments(path: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = path.split('/').collect();
    while parts.last() == Some(&"") {
        parts.pop();
    }
    parts
}

/// Combina el prefijo de montaje con el patrón de una ruta del sub-router
///
/// Colapsa slashes repetidos y quita un slash final, salvo que el resultado
/// sea exactamente `/`.
pub fn join_mount_path(prefix: &str, path: &str) -> String {
    static SLASHES: OnceLock<Regex> = OnceLock::new();
    let slashes = SLASHES.get_or_init(|| Regex::new("/+").expect("static regex"));

    let combined = format!("{}/{}", prefix, path);
    let mut joined = slashes.replace_all(&combined, "/").into_owned();
    if joined.len() > 1 && joined.ends_with('/') {
        joined.pop();
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Matching ====================

    #[test]
    fn test_literal_match() {
        let pattern = PathPattern::new("/cats");
        assert_eq!(pattern.matches("/cats"), Some(HashMap::new()));
        assert_eq!(pattern.matches("/dogs"), None);
        assert_eq!(pattern.matches("/Cats"), None);
    }

    #[test]
    fn test_param_binding() {
        let pattern = PathPattern::new("/cats/:id");
        let params = pattern.matches("/cats/42").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
    }

    #[test]
    fn test_segment_count_mismatch() {
        let pattern = PathPattern::new("/cats/:id");
        assert_eq!(pattern.matches("/cats/42/extra"), None);
        assert_eq!(pattern.matches("/cats"), None);
    }

    #[test]
    fn test_multiple_params() {
        let pattern = PathPattern::new("/owners/:owner/cats/:cat");
        let params = pattern.matches("/owners/ana/cats/pufu").unwrap();
        assert_eq!(params["owner"], "ana");
        assert_eq!(params["cat"], "pufu");
        assert_eq!(pattern.param_names(), vec!["owner", "cat"]);
    }

    #[test]
    fn test_param_accepts_empty_interior_segment() {
        let pattern = PathPattern::new("/cats/:id/toys");
        let params = pattern.matches("/cats//toys").unwrap();
        assert_eq!(params["id"], "");
    }

    #[test]
    fn test_root_pattern() {
        let pattern = PathPattern::new("/");
        assert_eq!(pattern.matches("/"), Some(HashMap::new()));
        assert_eq!(pattern.matches("/cats"), None);
    }

    #[test]
    fn test_trailing_slash_is_insignificant() {
        let pattern = PathPattern::new("/cats");
        assert!(pattern.matches("/cats/").is_some());
        let pattern = PathPattern::new("/cats/");
        assert!(pattern.matches("/cats").is_some());
    }

    #[test]
    fn test_param_value_is_raw() {
        let pattern = PathPattern::new("/files/:name");
        let params = pattern.matches("/files/a%20b").unwrap();
        assert_eq!(params["name"], "a%20b");
    }

    // ==================== Mount Paths ====================

    #[test]
    fn test_join_mount_path() {
        assert_eq!(join_mount_path("/cats", "/"), "/cats");
        assert_eq!(join_mount_path("/cats", "/:id"), "/cats/:id");
        assert_eq!(join_mount_path("/cats/", "//:id/"), "/cats/:id");
        assert_eq!(join_mount_path("/", "/"), "/");
        assert_eq!(join_mount_path("/api", "v1/users"), "/api/v1/users");
    }
}
