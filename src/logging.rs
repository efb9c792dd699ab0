//! # Logging
//! src/logging.rs
//!
//! `tracing` con un subscriber de texto. `RUST_LOG` tiene prioridad sobre el
//! nivel configurado.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directiva de filtro para un nivel y el flag de debug
///
/// Con `debug` el crate siempre loguea a nivel `debug`, sin importar el
/// nivel general.
pub fn filter_directive(level: &str, debug: bool) -> String {
    if debug {
        format!("{},handmade_http=debug", level)
    } else {
        level.to_string()
    }
}

/// Instala el subscriber global
///
/// Retorna `false` si ya había uno instalado (por ejemplo en tests).
pub fn init(level: &str, debug: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level, debug)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_thread_names(true))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("info", false), "info");
        assert_eq!(filter_directive("warn", true), "warn,handmade_http=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init("info", false);
        assert!(!init("debug", true));
    }
}
