//! In-process script resource backed by native closures
//!
//! Handlers receive the direct-object list unpacked into positional
//! arguments, the way a script handler with a parameter list would.

use crate::descriptor::{Descriptor, ProcessSerialNumber};
use crate::dispatch::{ErrorInfo, RawOutcome, ScriptResource};
use crate::error::InvocationError;
use crate::event::AppleEvent;
use std::collections::HashMap;
use std::fmt;

type HandlerFn = dyn Fn(&[Descriptor]) -> Result<Descriptor, ErrorInfo> + Send + Sync;

struct Registered {
    /// Required argument count; `None` accepts any
    arity: Option<usize>,
    body: Box<HandlerFn>,
}

/// Script whose handlers are Rust closures
///
/// Handler names are matched case-insensitively.
#[derive(Default)]
pub struct HandlerScript {
    handlers: HashMap<String, Registered>,
}

impl fmt::Debug for HandlerScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("HandlerScript").field("handlers", &names).finish()
    }
}

impl HandlerScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with a fixed number of parameters
    pub fn with_handler<F>(mut self, name: &str, arity: usize, body: F) -> Self
    where
        F: Fn(&[Descriptor]) -> Result<Descriptor, ErrorInfo> + Send + Sync + 'static,
    {
        self.register(name, Some(arity), body);
        self
    }

    /// Register `name` accepting any number of parameters
    pub fn with_variadic_handler<F>(mut self, name: &str, body: F) -> Self
    where
        F: Fn(&[Descriptor]) -> Result<Descriptor, ErrorInfo> + Send + Sync + 'static,
    {
        self.register(name, None, body);
        self
    }

    /// Add or replace a handler
    pub fn register<F>(&mut self, name: &str, arity: Option<usize>, body: F)
    where
        F: Fn(&[Descriptor]) -> Result<Descriptor, ErrorInfo> + Send + Sync + 'static,
    {
        self.handlers.insert(
            name.to_lowercase(),
            Registered {
                arity,
                body: Box::new(body),
            },
        );
    }

    fn run(&self, event: &AppleEvent) -> Result<Descriptor, ErrorInfo> {
        if !event.is_subroutine_call() {
            return Err(ErrorInfo::new(
                InvocationError::EVENT_NOT_HANDLED,
                format!(
                    "event {}/{} is not a subroutine call",
                    event.event_class, event.event_id
                ),
            ));
        }

        if event.target != Descriptor::ProcessSerialNumber(ProcessSerialNumber::CURRENT) {
            return Err(ErrorInfo::new(
                InvocationError::PROCESS_NOT_FOUND,
                "event is not addressed to the current process",
            ));
        }

        let name = event.subroutine_name().ok_or_else(|| {
            ErrorInfo::new(
                InvocationError::EVENT_NOT_HANDLED,
                "subroutine call has no handler name",
            )
        })?;

        let handler = self.handlers.get(&name.to_lowercase()).ok_or_else(|| {
            ErrorInfo::new(
                InvocationError::EVENT_NOT_HANDLED,
                format!("script doesn't understand the \"{}\" message", name),
            )
        })?;

        let arguments: &[Descriptor] = match event.direct_object() {
            None => &[],
            Some(Descriptor::List(items)) => items.as_slice(),
            Some(single) => std::slice::from_ref(single),
        };

        if let Some(arity) = handler.arity {
            if arguments.len() != arity {
                return Err(ErrorInfo::new(
                    InvocationError::WRONG_NUMBER_OF_ARGS,
                    format!(
                        "{} expects {} parameters, got {}",
                        name,
                        arity,
                        arguments.len()
                    ),
                ));
            }
        }

        (handler.body)(arguments)
    }
}

impl ScriptResource for HandlerScript {
    fn execute_event(&self, event: &AppleEvent) -> RawOutcome {
        match self.run(event) {
            Ok(result) => RawOutcome::success(result),
            Err(error) => RawOutcome::failure(error),
        }
    }
}
