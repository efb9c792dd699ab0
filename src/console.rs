//! # Consola de Control
//! src/console.rs
//!
//! Lee comandos de la entrada estándar mientras el servidor corre. `stop` o
//! `exit` (sin importar mayúsculas) apagan el servidor; cualquier otra línea
//! se ignora.

use std::io::{self, BufRead};

use tracing::debug;

/// Por qué terminó la espera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCommand {
    Stop,
    Exit,

    /// Se cerró la entrada (Ctrl-D o stdin redirigido)
    EndOfInput,
}

impl StopCommand {
    fn from_line(line: &str) -> Option<Self> {
        let command = line.trim();
        if command.eq_ignore_ascii_case("stop") {
            Some(StopCommand::Stop)
        } else if command.eq_ignore_ascii_case("exit") {
            Some(StopCommand::Exit)
        } else {
            None
        }
    }
}

/// Bloquea hasta recibir `stop`/`exit` o hasta el fin de la entrada
pub fn wait_for_stop<R: BufRead>(input: R) -> io::Result<StopCommand> {
    for line in input.lines() {
        let line = line?;
        match StopCommand::from_line(&line) {
            Some(command) => return Ok(command),
            None if line.trim().is_empty() => {}
            None => debug!(input = %line.trim(), "ignoring unknown console command"),
        }
    }
    Ok(StopCommand::EndOfInput)
}
