//! # Ejecución de la Cadena de Middlewares
//! src/middleware/pipeline.rs
//!
//! La cadena es un índice sobre una lista ordenada. `Next` captura "ejecutar
//! el índice siguiente, o el handler si ya no quedan middlewares". Todo corre
//! en el thread del worker, en orden estricto.

use std::cell::Cell;
use std::sync::Arc;

use super::{Handler, HandlerError, HandlerResult, Middleware};
use crate::http::{Request, Response};

/// Cómo terminó una ejecución de la cadena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Se llegó al handler terminal
    Completed,

    /// El middleware en la posición `at` no llamó a `next`
    Halted { at: usize },
}

/// Una ejecución de la cadena para un único par (Request, Response)
pub struct Pipeline<'a> {
    middlewares: &'a [Arc<dyn Middleware>],
    handler: &'a dyn Handler,

    /// Cantidad de middlewares en los que se entró
    reached: Cell<usize>,

    handler_invoked: Cell<bool>,
}

impl<'a> Pipeline<'a> {
    pub fn new(middlewares: &'a [Arc<dyn Middleware>], handler: &'a dyn Handler) -> Self {
        Self {
            middlewares,
            handler,
            reached: Cell::new(0),
            handler_invoked: Cell::new(false),
        }
    }

    /// Ejecuta la cadena completa
    ///
    /// No revisa si la respuesta fue escrita cuando la cadena se corta: eso
    /// es responsabilidad del middleware que la cortó.
    pub fn execute(&self, req: &mut Request, res: &mut Response) -> Result<Outcome, HandlerError> {
        self.run_at(0, req, res)?;

        if self.handler_invoked.get() {
            Ok(Outcome::Completed)
        } else {
            Ok(Outcome::Halted {
                at: self.reached.get().saturating_sub(1),
            })
        }
    }

    fn run_at(&self, index: usize, req: &mut Request, res: &mut Response) -> HandlerResult {
        match self.middlewares.get(index) {
            Some(middleware) => {
                self.reached.set(index + 1);
                middleware.handle(
                    req,
                    res,
                    Next {
                        pipeline: self,
                        index: index + 1,
                    },
                )
            }
            None => {
                self.handler_invoked.set(true);
                self.handler.handle(req, res)
            }
        }
    }
}

/// Continuación que recibe cada middleware
///
/// Se consume al llamarla: un middleware no puede avanzar dos veces.
pub struct Next<'a> {
    pipeline: &'a Pipeline<'a>,
    index: usize,
}

impl Next<'_> {
    /// Avanza al siguiente middleware, o al handler si no quedan
    pub fn run(self, req: &mut Request, res: &mut Response) -> HandlerResult {
        self.pipeline.run_at(self.index, req, res)
    }
}
