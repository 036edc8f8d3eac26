//! Descriptors - tagged, self-describing values exchanged with scripts
//!
//! Design: One enum covers every tag the call path produces or consumes.
//! Lists and records are indexed from 1, like the event format they model.
//!
//! Architecture:
//! - `descriptor.rs` - value model, item access, typed accessors
//! - `coerce.rs` - loose coercions between tags

use crate::fourcc::FourCharCode;

mod coerce;

/// Descriptor type tags
pub mod desc_type {
    use crate::fourcc::FourCharCode;

    pub const NULL: FourCharCode = FourCharCode::from_bytes(*b"null");
    pub const BOOLEAN: FourCharCode = FourCharCode::from_bytes(*b"bool");
    pub const INT32: FourCharCode = FourCharCode::from_bytes(*b"long");
    pub const DOUBLE: FourCharCode = FourCharCode::from_bytes(*b"doub");
    pub const UNICODE_TEXT: FourCharCode = FourCharCode::from_bytes(*b"utxt");
    pub const LIST: FourCharCode = FourCharCode::from_bytes(*b"list");
    pub const RECORD: FourCharCode = FourCharCode::from_bytes(*b"reco");
    pub const TYPE: FourCharCode = FourCharCode::from_bytes(*b"type");
    pub const ENUMERATED: FourCharCode = FourCharCode::from_bytes(*b"enum");
    pub const PROCESS_SERIAL_NUMBER: FourCharCode = FourCharCode::from_bytes(*b"psn ");
}

/// Process address used as an event target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessSerialNumber {
    pub high: u32,
    pub low: u32,
}

impl ProcessSerialNumber {
    /// `kCurrentProcess`: the process building the event
    pub const CURRENT: Self = Self { high: 0, low: 2 };
}

/// Tagged value container
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    Null,
    Boolean(bool),
    Int32(i32),
    Double(f64),
    Text(String),
    List(Vec<Descriptor>),
    /// Keyword/value pairs in insertion order
    Record(Vec<(FourCharCode, Descriptor)>),
    Type(FourCharCode),
    Enumerated(FourCharCode),
    ProcessSerialNumber(ProcessSerialNumber),
    /// Payload with a tag this crate does not interpret
    Data { desc_type: FourCharCode, bytes: Vec<u8> },
}

impl Descriptor {
    /// The null descriptor, also the encoding of an absent optional
    #[inline]
    pub const fn null() -> Self {
        Self::Null
    }

    /// Empty list
    #[inline]
    pub const fn list() -> Self {
        Self::List(Vec::new())
    }

    /// Empty record
    #[inline]
    pub const fn record() -> Self {
        Self::Record(Vec::new())
    }

    #[inline]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Tag describing the payload
    pub fn desc_type(&self) -> FourCharCode {
        match self {
            Self::Null => desc_type::NULL,
            Self::Boolean(_) => desc_type::BOOLEAN,
            Self::Int32(_) => desc_type::INT32,
            Self::Double(_) => desc_type::DOUBLE,
            Self::Text(_) => desc_type::UNICODE_TEXT,
            Self::List(_) => desc_type::LIST,
            Self::Record(_) => desc_type::RECORD,
            Self::Type(_) => desc_type::TYPE,
            Self::Enumerated(_) => desc_type::ENUMERATED,
            Self::ProcessSerialNumber(_) => desc_type::PROCESS_SERIAL_NUMBER,
            Self::Data { desc_type, .. } => *desc_type,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Item count of a list or record; 0 for anything else
    pub fn number_of_items(&self) -> usize {
        match self {
            Self::List(items) => items.len(),
            Self::Record(fields) => fields.len(),
            _ => 0,
        }
    }

    /// Item at a 1-based index of a list or record
    pub fn at_index(&self, index: usize) -> Option<&Descriptor> {
        let slot = index.checked_sub(1)?;
        match self {
            Self::List(items) => items.get(slot),
            Self::Record(fields) => fields.get(slot).map(|(_, value)| value),
            _ => None,
        }
    }

    /// Insert into a list at a 1-based index; 0 appends.
    ///
    /// Indices past the end also append. Returns `false` when `self` is not a list.
    pub fn insert(&mut self, item: Descriptor, index: usize) -> bool {
        let Self::List(items) = self else {
            return false;
        };

        if index == 0 || index > items.len() {
            items.push(item);
        } else {
            items.insert(index - 1, item);
        }
        true
    }

    /// Value stored under `keyword` in a record
    pub fn record_value(&self, keyword: FourCharCode) -> Option<&Descriptor> {
        match self {
            Self::Record(fields) => fields
                .iter()
                .find(|(key, _)| *key == keyword)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Set or replace a record field. Returns `false` when `self` is not a record.
    pub fn set_record_value(&mut self, keyword: FourCharCode, value: Descriptor) -> bool {
        let Self::Record(fields) = self else {
            return false;
        };

        match fields.iter_mut().find(|(key, _)| *key == keyword) {
            Some((_, slot)) => *slot = value,
            None => fields.push((keyword, value)),
        }
        true
    }

    /// Text view of the descriptor, coercing when needed
    pub fn string_value(&self) -> Option<String> {
        match self.coerce(desc_type::UNICODE_TEXT)? {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Integer view of the descriptor, coercing when needed
    pub fn int32_value(&self) -> Option<i32> {
        match self.coerce(desc_type::INT32)? {
            Self::Int32(value) => Some(value),
            _ => None,
        }
    }

    /// Real view of the descriptor, coercing when needed
    pub fn double_value(&self) -> Option<f64> {
        match self.coerce(desc_type::DOUBLE)? {
            Self::Double(value) => Some(value),
            _ => None,
        }
    }

    /// Boolean view of the descriptor, coercing when needed
    pub fn boolean_value(&self) -> Option<bool> {
        match self.coerce(desc_type::BOOLEAN)? {
            Self::Boolean(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Vec<Descriptor>> for Descriptor {
    fn from(items: Vec<Descriptor>) -> Self {
        Self::List(items)
    }
}
