//! Subroutine call events
//!
//! Design: An event is an envelope built fresh for one call and dropped after
//! dispatch. All logical arguments travel as one list in the direct object.

use crate::config::{Config, NameCase};
use crate::descriptor::{Descriptor, ProcessSerialNumber};
use crate::fourcc::FourCharCode;

/// AppleScript event suite (`kASAppleScriptSuite`)
pub const APPLESCRIPT_SUITE: FourCharCode = FourCharCode::from_bytes(*b"ascr");
/// Generic subroutine call (`kASSubroutineEvent`)
pub const SUBROUTINE_EVENT: FourCharCode = FourCharCode::from_bytes(*b"psbr");
/// Keyword holding the handler name (`keyASSubroutineName`)
pub const SUBROUTINE_NAME: FourCharCode = FourCharCode::from_bytes(*b"snam");
/// Keyword of the single positional parameter (`keyDirectObject`)
pub const DIRECT_OBJECT: FourCharCode = FourCharCode::from_bytes(*b"----");

/// `kAutoGenerateReturnID`
pub const AUTO_GENERATE_RETURN_ID: i16 = -1;
/// `kAnyTransactionID`
pub const ANY_TRANSACTION_ID: i32 = 0;

/// Command envelope sent to a script resource
#[derive(Debug, Clone, PartialEq)]
pub struct AppleEvent {
    pub event_class: FourCharCode,
    pub event_id: FourCharCode,
    pub target: Descriptor,
    pub return_id: i16,
    pub transaction_id: i32,
    params: Vec<(FourCharCode, Descriptor)>,
}

impl AppleEvent {
    pub fn new(
        event_class: FourCharCode,
        event_id: FourCharCode,
        target: Descriptor,
        return_id: i16,
        transaction_id: i32,
    ) -> Self {
        Self {
            event_class,
            event_id,
            target,
            return_id,
            transaction_id,
            params: Vec::new(),
        }
    }

    /// Set or replace a keyword parameter
    pub fn set_param(&mut self, keyword: FourCharCode, value: Descriptor) {
        match self.params.iter_mut().find(|(key, _)| *key == keyword) {
            Some((_, slot)) => *slot = value,
            None => self.params.push((keyword, value)),
        }
    }

    pub fn param(&self, keyword: FourCharCode) -> Option<&Descriptor> {
        self.params
            .iter()
            .find(|(key, _)| *key == keyword)
            .map(|(_, value)| value)
    }

    /// Whether this is a generic subroutine call
    pub fn is_subroutine_call(&self) -> bool {
        self.event_class == APPLESCRIPT_SUITE && self.event_id == SUBROUTINE_EVENT
    }

    /// Handler name carried by a subroutine call
    pub fn subroutine_name(&self) -> Option<String> {
        self.param(SUBROUTINE_NAME)?.string_value()
    }

    pub fn direct_object(&self) -> Option<&Descriptor> {
        self.param(DIRECT_OBJECT)
    }
}

/// Builds subroutine call events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventBuilder {
    pub name_case: NameCase,
    pub return_id: i16,
    pub transaction_id: i32,
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self {
            name_case: NameCase::Lower,
            return_id: AUTO_GENERATE_RETURN_ID,
            transaction_id: ANY_TRANSACTION_ID,
        }
    }
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            name_case: config.handlers.name_case,
            return_id: config.event.return_id,
            transaction_id: config.event.transaction_id,
        }
    }

    pub fn with_name_case(mut self, name_case: NameCase) -> Self {
        self.name_case = name_case;
        self
    }

    /// Handler name as it will appear in the event
    pub fn normalize_name(&self, name: &str) -> String {
        match self.name_case {
            NameCase::Lower => name.to_lowercase(),
            NameCase::Preserve => name.to_string(),
        }
    }

    /// Build a self-targeted call to handler `name`
    ///
    /// `arguments` becomes the direct object when present; it should be the
    /// packed list of all logical arguments.
    pub fn subroutine_call(&self, name: &str, arguments: Option<Descriptor>) -> AppleEvent {
        let mut event = AppleEvent::new(
            APPLESCRIPT_SUITE,
            SUBROUTINE_EVENT,
            Descriptor::ProcessSerialNumber(ProcessSerialNumber::CURRENT),
            self.return_id,
            self.transaction_id,
        );

        let handler = self.normalize_name(name);
        tracing::trace!(
            target: "osa_handler::event",
            handler = %handler,
            has_arguments = arguments.is_some(),
            "built subroutine call"
        );

        event.set_param(SUBROUTINE_NAME, Descriptor::Text(handler));
        if let Some(arguments) = arguments {
            event.set_param(DIRECT_OBJECT, arguments);
        }
        event
    }
}
