//! Dispatching events to a compiled script resource
//!
//! Design: The resource reports a nullable result and a nullable error, like
//! the platform call it stands for. `dispatch` turns that pair into exactly one
//! of `Ok(descriptor)` or `Err(InvocationError)`.

use crate::descriptor::Descriptor;
use crate::error::InvocationError;
use crate::event::AppleEvent;
use crate::logging;
use crate::stats;
use parking_lot::Mutex;
use std::fmt;

/// Error dictionary reported by a script runtime. Every entry is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    pub number: Option<i32>,
    pub message: Option<String>,
    pub brief_message: Option<String>,
    pub app_name: Option<String>,
    /// Byte range of the offending source
    pub range: Option<(usize, usize)>,
}

impl ErrorInfo {
    pub fn new(number: i32, message: impl Into<String>) -> Self {
        Self {
            number: Some(number),
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries = Vec::new();
        if let Some(number) = self.number {
            entries.push(format!("number = {}", number));
        }
        if let Some(message) = &self.message {
            entries.push(format!("message = {}", message));
        }
        if let Some(brief) = &self.brief_message {
            entries.push(format!("brief message = {}", brief));
        }
        if let Some(app) = &self.app_name {
            entries.push(format!("app name = {}", app));
        }
        if let Some((start, end)) = self.range {
            entries.push(format!("range = {}..{}", start, end));
        }
        write!(f, "{{{}}}", entries.join(", "))
    }
}

impl From<ErrorInfo> for InvocationError {
    fn from(info: ErrorInfo) -> Self {
        let code = info.number.unwrap_or(InvocationError::SYNTHESIZED);
        let message = match (&info.message, &info.brief_message) {
            (Some(message), _) => message.clone(),
            (None, Some(brief)) => brief.clone(),
            (None, None) => info.to_string(),
        };
        InvocationError::new(code, message)
    }
}

/// Raw result of executing an event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOutcome {
    pub result: Option<Descriptor>,
    pub error: Option<ErrorInfo>,
}

impl RawOutcome {
    pub fn success(result: Descriptor) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: ErrorInfo) -> Self {
        Self {
            result: None,
            error: Some(error),
        }
    }
}

/// A compiled script that can execute events
///
/// Implementations block until the script finishes. They need not be safe
/// for concurrent use; wrap them in a [`Mutex`] to share across threads.
pub trait ScriptResource {
    fn execute_event(&self, event: &AppleEvent) -> RawOutcome;
}

impl<S: ScriptResource + ?Sized> ScriptResource for Mutex<S> {
    fn execute_event(&self, event: &AppleEvent) -> RawOutcome {
        self.lock().execute_event(event)
    }
}

impl<S: ScriptResource + ?Sized> ScriptResource for Box<S> {
    fn execute_event(&self, event: &AppleEvent) -> RawOutcome {
        (**self).execute_event(event)
    }
}

/// Send `event` and wait for its outcome
pub fn dispatch<S>(script: &S, event: &AppleEvent) -> Result<Descriptor, InvocationError>
where
    S: ScriptResource + ?Sized,
{
    let handler = event.subroutine_name().unwrap_or_default();
    let args_count = event.direct_object().map_or(0, Descriptor::number_of_items);
    logging::log_handler_call(&handler, args_count);
    stats::record_call();

    let outcome = script.execute_event(event);
    let result = match (outcome.result, outcome.error) {
        (result, Some(error)) => {
            if result.is_some() {
                tracing::warn!(
                    target: "osa_handler::dispatch",
                    handler = %handler,
                    "script reported both a result and an error; using the error"
                );
            }
            Err(InvocationError::from(error))
        }
        (Some(result), None) => Ok(result),
        (None, None) => Err(InvocationError::no_result()),
    };

    match &result {
        Ok(_) => logging::log_handler_return(&handler, true),
        Err(err) => {
            stats::record_invocation_error();
            logging::log_handler_error(&handler, err);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvocationErrorKind;
    use crate::event::EventBuilder;

    struct Fixed(RawOutcome);

    impl ScriptResource for Fixed {
        fn execute_event(&self, _event: &AppleEvent) -> RawOutcome {
            self.0.clone()
        }
    }

    fn event() -> AppleEvent {
        EventBuilder::new().subroutine_call("test", None)
    }

    #[test]
    fn test_success() {
        let script = Fixed(RawOutcome::success(Descriptor::Int32(1)));
        assert_eq!(dispatch(&script, &event()), Ok(Descriptor::Int32(1)));
    }

    #[test]
    fn test_error() {
        let script = Fixed(RawOutcome::failure(ErrorInfo::new(-1708, "not handled")));
        let err = dispatch(&script, &event()).unwrap_err();
        assert_eq!(err.code, -1708);
        assert_eq!(err.message, "not handled");
    }

    #[test]
    fn test_neither_is_internal_error() {
        let script = Fixed(RawOutcome::default());
        let err = dispatch(&script, &event()).unwrap_err();
        assert_eq!(err.code, InvocationError::SYNTHESIZED);
        assert_eq!(err.kind(), InvocationErrorKind::Internal);
    }

    #[test]
    fn test_both_prefers_error() {
        let script = Fixed(RawOutcome {
            result: Some(Descriptor::Int32(1)),
            error: Some(ErrorInfo::new(-2700, "boom")),
        });
        assert_eq!(dispatch(&script, &event()).unwrap_err().code, -2700);
    }

    #[test]
    fn test_error_without_number_or_message() {
        let info = ErrorInfo {
            app_name: Some("Finder".to_string()),
            ..ErrorInfo::default()
        };
        let err = InvocationError::from(info);
        assert_eq!(err.code, InvocationError::SYNTHESIZED);
        assert_eq!(err.message, "{app name = Finder}");
    }

    #[test]
    fn test_brief_message_fallback() {
        let info = ErrorInfo {
            number: Some(-2753),
            brief_message: Some("variable x is not defined".to_string()),
            ..ErrorInfo::default()
        };
        assert_eq!(InvocationError::from(info).message, "variable x is not defined");
    }

    #[test]
    fn test_mutex_resource() {
        let script = Mutex::new(Fixed(RawOutcome::success(Descriptor::null())));
        assert_eq!(dispatch(&script, &event()), Ok(Descriptor::null()));
    }
}
