//! Error types for conversion and invocation failures

use crate::fourcc::FourCharCode;
use std::fmt;

/// Descriptor ⇄ native conversion failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The descriptor's tag has no coercion to the requested native type
    CouldNotCoerce {
        descriptor_type: FourCharCode,
        target: &'static str,
    },
    /// A list slot (1-based) could not be read
    ListItemNotFound(usize),
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CouldNotCoerce { descriptor_type, target } => write!(
                f,
                "Failed to convert descriptor to type {}; descriptor type: {}",
                target, descriptor_type
            ),
            Self::ListItemNotFound(index) => {
                write!(f, "Could not retrieve descriptor at index {}", index)
            }
        }
    }
}

impl std::error::Error for ConversionError {}

/// Broad classification of [`InvocationError`] codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationErrorKind {
    CompileFailure,
    HandlerNotFound,
    /// The handler ran and raised an error
    HandlerFailed,
    PermissionDenied,
    /// Synthesized by this crate, not reported by the script runtime
    Internal,
}

/// Failure reported by (or synthesized around) the script runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationError {
    pub code: i32,
    pub message: String,
}

impl InvocationError {
    /// Code used when the runtime reported no number of its own
    pub const SYNTHESIZED: i32 = -1;
    /// `errOSASyntaxError`
    pub const SYNTAX_ERROR: i32 = -2740;
    /// `errOSASyntaxTypeError`
    pub const SYNTAX_TYPE_ERROR: i32 = -2741;
    /// `errAEEventNotHandled`
    pub const EVENT_NOT_HANDLED: i32 = -1708;
    /// `errAEEventNotPermitted`
    pub const EVENT_NOT_PERMITTED: i32 = -1743;
    /// `errAEWrongNumberArgs`
    pub const WRONG_NUMBER_OF_ARGS: i32 = -1721;
    /// `procNotFound`
    pub const PROCESS_NOT_FOUND: i32 = -600;

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The runtime returned neither a result nor an error
    pub fn no_result() -> Self {
        Self::new(
            Self::SYNTHESIZED,
            "script returned neither a result nor an error",
        )
    }

    pub fn kind(&self) -> InvocationErrorKind {
        match self.code {
            Self::SYNTAX_ERROR | Self::SYNTAX_TYPE_ERROR => InvocationErrorKind::CompileFailure,
            Self::EVENT_NOT_HANDLED => InvocationErrorKind::HandlerNotFound,
            Self::EVENT_NOT_PERMITTED => InvocationErrorKind::PermissionDenied,
            Self::SYNTHESIZED => InvocationErrorKind::Internal,
            _ => InvocationErrorKind::HandlerFailed,
        }
    }
}

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for InvocationError {}

/// Any failure of a typed handler call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Conversion(ConversionError),
    Invocation(InvocationError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conversion(err) => write!(f, "Conversion failed: {}", err),
            Self::Invocation(err) => write!(f, "Invocation failed: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Conversion(err) => Some(err),
            Self::Invocation(err) => Some(err),
        }
    }
}

impl From<ConversionError> for Error {
    fn from(err: ConversionError) -> Self {
        Self::Conversion(err)
    }
}

impl From<InvocationError> for Error {
    fn from(err: InvocationError) -> Self {
        Self::Invocation(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
