//! Loose coercions between descriptor tags
//!
//! Mirrors what script handlers expect from their host: numbers convert into
//! each other, numeric text converts into numbers, and a one-item list stands
//! in for its item. Null coerces to nothing but itself.

use super::{desc_type, Descriptor};
use crate::fourcc::FourCharCode;
use num_traits::cast;

impl Descriptor {
    /// Coerce to the descriptor type `target`, or `None` if no rule applies
    pub fn coerce(&self, target: FourCharCode) -> Option<Descriptor> {
        if self.desc_type() == target {
            return Some(self.clone());
        }

        if target == desc_type::LIST {
            return self.to_list();
        }

        if let Self::List(items) = self {
            return match items.as_slice() {
                [only] => only.coerce(target),
                _ => None,
            };
        }

        match target {
            desc_type::INT32 => self.to_int32().map(Self::Int32),
            desc_type::DOUBLE => self.to_double().map(Self::Double),
            desc_type::BOOLEAN => self.to_boolean().map(Self::Boolean),
            desc_type::UNICODE_TEXT => self.to_text().map(Self::Text),
            _ => None,
        }
    }

    fn to_list(&self) -> Option<Descriptor> {
        match self {
            Self::Null => None,
            Self::List(_) => Some(self.clone()),
            Self::Record(fields) => Some(Self::List(
                fields.iter().map(|(_, value)| value.clone()).collect(),
            )),
            other => Some(Self::List(vec![other.clone()])),
        }
    }

    fn to_int32(&self) -> Option<i32> {
        match self {
            Self::Int32(value) => Some(*value),
            Self::Double(value) => real_to_int32(*value),
            Self::Boolean(value) => Some(i32::from(*value)),
            Self::Text(text) => {
                let text = text.trim();
                text.parse::<i32>()
                    .ok()
                    .or_else(|| parse_real(text).and_then(real_to_int32))
            }
            _ => None,
        }
    }

    fn to_double(&self) -> Option<f64> {
        match self {
            Self::Double(value) => Some(*value),
            Self::Int32(value) => Some(f64::from(*value)),
            Self::Text(text) => parse_real(text.trim()),
            _ => None,
        }
    }

    fn to_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            Self::Int32(0) => Some(false),
            Self::Int32(1) => Some(true),
            Self::Text(text) => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if text.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn to_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Int32(value) => Some(value.to_string()),
            Self::Double(value) => Some(format_real(*value)),
            Self::Boolean(value) => Some(value.to_string()),
            Self::Type(code) | Self::Enumerated(code) => Some(code.to_string()),
            _ => None,
        }
    }
}

/// Round half to even, reject non-finite and out-of-range values
fn real_to_int32(value: f64) -> Option<i32> {
    if !value.is_finite() {
        return None;
    }
    cast::<f64, i32>(value.round_ties_even())
}

fn parse_real(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Reals always print with a fractional part (`3.0`, not `3`)
fn format_real(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}
