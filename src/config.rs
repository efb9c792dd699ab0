//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración por argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./handmade_http --port 8080 \
//!   --workers 16 \
//!   --shutdown-timeout 10000 \
//!   --debug
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_HOST=0.0.0.0 AUTH_TOKEN=secret ./handmade_http
//! ```

use std::time::Duration;

use clap::Parser;

use crate::server::ServerConfig;

/// Configuración del servidor HTTP/1.1
#[derive(Debug, Clone, Parser)]
#[command(name = "handmade_http")]
#[command(about = "Servidor HTTP/1.1 hecho a mano: codec, router, middlewares y pool de workers")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor (0 = puerto efímero)
    #[arg(short, long, default_value = "8888", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    // === Workers ===

    /// Número de workers que atienden conexiones
    #[arg(short, long, default_value = "10", env = "HTTP_WORKERS")]
    pub workers: usize,

    // === Timeouts ===

    /// Plazo para drenar conexiones en curso al apagar, en milisegundos
    #[arg(long = "shutdown-timeout", default_value = "5000", env = "SHUTDOWN_TIMEOUT_MS")]
    pub shutdown_timeout_ms: u64,

    /// Timeout de lectura por conexión en milisegundos (0 = sin timeout)
    #[arg(long = "read-timeout", default_value = "30000", env = "READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    // === Logging ===

    /// Loguea cada request y response completos
    #[arg(long, env = "HTTP_DEBUG")]
    pub debug: bool,

    /// Nivel de log (`RUST_LOG` tiene prioridad)
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,

    // === Aplicación ===

    /// Archivo JSON con los datos de ejemplo
    #[arg(long = "data-file", default_value = "./data/cats.json", env = "CATS_DB")]
    pub data_file: String,

    /// Token exigido en `Authorization` por las rutas protegidas
    #[arg(long = "auth-token", default_value = "LeBron", env = "AUTH_TOKEN")]
    pub auth_token: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use handmade_http::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8888");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("Workers must be >= 1".to_string());
        }
        if self.shutdown_timeout_ms == 0 {
            return Err("Shutdown timeout must be > 0".to_string());
        }
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }
        if self.auth_token.is_empty() {
            return Err("Auth token must not be empty".to_string());
        }

        Ok(())
    }

    /// La parte de la configuración que usa el motor
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            workers: self.workers,
            shutdown_timeout: Duration::from_millis(self.shutdown_timeout_ms),
            read_timeout: match self.read_timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
            debug: self.debug,
        }
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║            handmade_http Server Configuration                ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:          {}", self.address());
        println!("   Workers:          {}", self.workers);
        println!();
        println!("⏱️  Timeouts:");
        println!("   Shutdown drain:   {} ms", self.shutdown_timeout_ms);
        if self.read_timeout_ms > 0 {
            println!("   Read:             {} ms", self.read_timeout_ms);
        } else {
            println!("   Read:             disabled");
        }
        println!();
        println!("📝 Logging:");
        println!("   Level:            {}", self.log_level);
        println!("   Debug:            {}", if self.debug { "enabled" } else { "disabled" });
        println!();
        println!("🐱 Application:");
        println!("   Data file:        {}", self.data_file);
        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8888,
            host: "127.0.0.1".to_string(),
            workers: 10,
            shutdown_timeout_ms: 5_000,
            read_timeout_ms: 30_000,
            debug: false,
            log_level: "info".to_string(),
            data_file: "./data/cats.json".to_string(),
            auth_token: "LeBron".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8888);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.workers, 10);
        assert_eq!(config.shutdown_timeout_ms, 5_000);
        assert!(!config.debug);
    }

    #[test]
    fn test_address() {
        let config = Config::default();
        assert_eq!(config.address(), "127.0.0.1:8888");
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "0.0.0.0".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_validate_success() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_cli_args() {
        let config = Config::try_parse_from([
            "handmade_http",
            "--port",
            "9000",
            "--workers",
            "4",
            "--shutdown-timeout",
            "1500",
            "--debug",
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.workers, 4);
        assert_eq!(config.shutdown_timeout_ms, 1500);
        assert!(config.debug);
    }

    // ==================== Validation ====================

    #[test]
    fn test_validate_invalid_workers() {
        let mut config = Config::default();
        config.workers = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Workers"));
    }

    #[test]
    fn test_validate_invalid_shutdown_timeout() {
        let mut config = Config::default();
        config.shutdown_timeout_ms = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Shutdown timeout"));
    }

    #[test]
    fn test_validate_empty_host() {
        let mut config = Config::default();
        config.host = "  ".to_string();
        assert!(config.validate().unwrap_err().contains("Host"));
    }

    #[test]
    fn test_validate_port_zero_is_allowed() {
        let mut config = Config::default();
        config.port = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_read_timeout_zero_is_allowed() {
        let mut config = Config::default();
        config.read_timeout_ms = 0;
        assert!(config.validate().is_ok());
    }

    // ==================== Server Config ====================

    #[test]
    fn test_server_config_projection() {
        let mut config = Config::default();
        config.workers = 3;
        config.shutdown_timeout_ms = 250;
        config.debug = true;

        let server = config.server_config();
        assert_eq!(server.workers, 3);
        assert_eq!(server.shutdown_timeout, Duration::from_millis(250));
        assert_eq!(server.read_timeout, Some(Duration::from_secs(30)));
        assert!(server.debug);
    }

    #[test]
    fn test_server_config_read_timeout_disabled() {
        let mut config = Config::default();
        config.read_timeout_ms = 0;
        assert_eq!(config.server_config().read_timeout, None);
    }

    #[test]
    fn test_default_matches_server_defaults() {
        assert_eq!(Config::default().server_config(), ServerConfig::default());
    }

    // ==================== Print Summary ====================

    #[test]
    fn test_config_print_summary() {
        let config = Config::default();
        // Should not panic
        config.print_summary();
    }

    #[test]
    fn test_config_print_summary_read_timeout_disabled() {
        let mut config = Config::default();
        config.read_timeout_ms = 0;
        config.debug = true;
        config.print_summary();
    }
}
