//! # handmade_http - Entry Point
//! src/main.rs
//!
//! Arranca la API de gatos y espera `stop`/`exit` por stdin.

use std::io;
use std::process;
use std::sync::Arc;

use handmade_http::app::{self, CatsDb};
use handmade_http::config::Config;
use handmade_http::console::{self, StopCommand};
use handmade_http::logging;
use handmade_http::server::{Server, StopOutcome};
use tracing::{error, info, warn};

fn main() {
    let config = Config::new();

    if let Err(e) = config.validate() {
        eprintln!("💥 Configuración inválida: {}", e);
        process::exit(2);
    }

    logging::init(&config.log_level, config.debug);
    config.print_summary();

    let db = Arc::new(CatsDb::load_or_empty(&config.data_file));
    let router = app::build_router(db, &config.auth_token);
    let server = Server::new(router, config.server_config());

    let started = server.listen(config.port, &config.host, |addr| {
        println!("🚀 Server running on http://{} ...", addr);
        println!();
        print!("{}", server.router().route_tree());
        println!();
        println!("Escribí `stop` o `exit` para apagar el servidor.");
    });

    if let Err(e) = started {
        error!(error = %e, "failed to start server");
        eprintln!("💥 Error fatal: {}", e);
        process::exit(1);
    }

    match console::wait_for_stop(io::stdin().lock()) {
        Ok(StopCommand::EndOfInput) => info!("stdin closed, shutting down"),
        Ok(command) => info!(?command, "shutdown requested"),
        Err(e) => warn!(error = %e, "failed to read stdin, shutting down"),
    }

    match server.stop() {
        StopOutcome::TimedOut { unfinished } => {
            warn!(unfinished, "forced shutdown with connections still in flight");
        }
        _ => println!("👋 Servidor detenido"),
    }
}
