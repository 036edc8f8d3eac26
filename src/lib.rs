//! osa-handler - Typed calls into script handlers
//!
//! Native values are encoded into descriptors, packed into a subroutine call
//! event, dispatched to a compiled script resource, and the response is
//! decoded back into a native value.
//!
//! ```ignore
//! use osa_handler::{HandlerExt, HandlerScript};
//! use std::sync::Arc;
//!
//! let script = Arc::new(my_compiled_script);
//! let add = script.handler::<(i32, i32), i32>("add");
//! assert_eq!(add.call((2, 3))?, 5);
//! ```

pub mod config;
pub mod convert;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod fourcc;
pub mod handler;
pub mod logging;
pub mod script;
pub mod stats;

// Re-export core types
pub use config::{Config, NameCase};
pub use convert::DescriptorConvertible;
pub use descriptor::{Descriptor, ProcessSerialNumber};
pub use dispatch::{dispatch, ErrorInfo, RawOutcome, ScriptResource};
pub use error::{ConversionError, Error, InvocationError, InvocationErrorKind, Result};
pub use event::{AppleEvent, EventBuilder};
pub use fourcc::{four_char_code, FourCharCode};
pub use handler::{Handler, HandlerArgs, HandlerExt, RawHandler, VoidHandler};
pub use logging::{init_logging, LogConfig, LogFormat, LogOutput};
pub use script::HandlerScript;
pub use stats::{stats, CallStats};
