//! Native ⇄ descriptor conversion
//!
//! Design: One trait, implemented per primitive and composed generically for
//! `Vec<T>` and `Option<T>`. Decoding goes through descriptor coercion so
//! loosely typed handler results still convert.

use crate::descriptor::{desc_type, Descriptor};
use crate::error::ConversionError;
use crate::fourcc::FourCharCode;

/// A type that can be converted to and from a [`Descriptor`]
pub trait DescriptorConvertible {
    /// Encode the value
    fn to_descriptor(&self) -> Result<Descriptor, ConversionError>;

    /// Decode a value from `descriptor`
    fn from_descriptor(descriptor: &Descriptor) -> Result<Self, ConversionError>
    where
        Self: Sized;
}

/// Coerce `descriptor` to `target`, reporting `type_name` on failure
fn coerce_to(
    descriptor: &Descriptor,
    target: FourCharCode,
    type_name: &'static str,
) -> Result<Descriptor, ConversionError> {
    descriptor
        .coerce(target)
        .ok_or(ConversionError::CouldNotCoerce {
            descriptor_type: descriptor.desc_type(),
            target: type_name,
        })
}

impl DescriptorConvertible for String {
    fn to_descriptor(&self) -> Result<Descriptor, ConversionError> {
        Ok(Descriptor::Text(self.clone()))
    }

    fn from_descriptor(descriptor: &Descriptor) -> Result<Self, ConversionError> {
        match coerce_to(descriptor, desc_type::UNICODE_TEXT, "String")? {
            Descriptor::Text(text) => Ok(text),
            other => Err(ConversionError::CouldNotCoerce {
                descriptor_type: other.desc_type(),
                target: "String",
            }),
        }
    }
}

impl DescriptorConvertible for i32 {
    fn to_descriptor(&self) -> Result<Descriptor, ConversionError> {
        Ok(Descriptor::Int32(*self))
    }

    fn from_descriptor(descriptor: &Descriptor) -> Result<Self, ConversionError> {
        match coerce_to(descriptor, desc_type::INT32, "i32")? {
            Descriptor::Int32(value) => Ok(value),
            other => Err(ConversionError::CouldNotCoerce {
                descriptor_type: other.desc_type(),
                target: "i32",
            }),
        }
    }
}

impl DescriptorConvertible for f64 {
    fn to_descriptor(&self) -> Result<Descriptor, ConversionError> {
        Ok(Descriptor::Double(*self))
    }

    fn from_descriptor(descriptor: &Descriptor) -> Result<Self, ConversionError> {
        match coerce_to(descriptor, desc_type::DOUBLE, "f64")? {
            Descriptor::Double(value) => Ok(value),
            other => Err(ConversionError::CouldNotCoerce {
                descriptor_type: other.desc_type(),
                target: "f64",
            }),
        }
    }
}

impl DescriptorConvertible for bool {
    fn to_descriptor(&self) -> Result<Descriptor, ConversionError> {
        Ok(Descriptor::Boolean(*self))
    }

    fn from_descriptor(descriptor: &Descriptor) -> Result<Self, ConversionError> {
        match coerce_to(descriptor, desc_type::BOOLEAN, "bool")? {
            Descriptor::Boolean(value) => Ok(value),
            other => Err(ConversionError::CouldNotCoerce {
                descriptor_type: other.desc_type(),
                target: "bool",
            }),
        }
    }
}

impl DescriptorConvertible for Descriptor {
    fn to_descriptor(&self) -> Result<Descriptor, ConversionError> {
        Ok(self.clone())
    }

    fn from_descriptor(descriptor: &Descriptor) -> Result<Self, ConversionError> {
        Ok(descriptor.clone())
    }
}

impl<T: DescriptorConvertible> DescriptorConvertible for Vec<T> {
    fn to_descriptor(&self) -> Result<Descriptor, ConversionError> {
        let mut list = Descriptor::list();
        for element in self {
            // index 0 appends
            list.insert(element.to_descriptor()?, 0);
        }
        Ok(list)
    }

    fn from_descriptor(descriptor: &Descriptor) -> Result<Self, ConversionError> {
        let list = coerce_to(descriptor, desc_type::LIST, "Vec")?;
        let count = list.number_of_items();

        let mut values = Vec::with_capacity(count);
        // indexed from 1
        for index in 1..=count {
            let item = list
                .at_index(index)
                .ok_or(ConversionError::ListItemNotFound(index))?;
            values.push(T::from_descriptor(item)?);
        }
        Ok(values)
    }
}

impl<T: DescriptorConvertible> DescriptorConvertible for Option<T> {
    fn to_descriptor(&self) -> Result<Descriptor, ConversionError> {
        match self {
            Some(value) => value.to_descriptor(),
            None => Ok(Descriptor::null()),
        }
    }

    fn from_descriptor(descriptor: &Descriptor) -> Result<Self, ConversionError> {
        if *descriptor == Descriptor::null() {
            Ok(None)
        } else {
            T::from_descriptor(descriptor).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourcc::four_char_code;

    fn round_trip<T>(value: T) -> T
    where
        T: DescriptorConvertible,
    {
        let descriptor = value.to_descriptor().unwrap();
        T::from_descriptor(&descriptor).unwrap()
    }

    #[test]
    fn test_primitive_round_trips() {
        assert_eq!(round_trip("hello".to_string()), "hello");
        assert_eq!(round_trip(String::new()), "");
        assert_eq!(round_trip(i32::MIN), i32::MIN);
        assert_eq!(round_trip(-0.125f64), -0.125);
        assert!(round_trip(true));
        assert!(!round_trip(false));
    }

    #[test]
    fn test_vec_preserves_order() {
        let values = vec![3i32, 1, 2];
        let descriptor = values.to_descriptor().unwrap();

        assert_eq!(descriptor.at_index(1), Some(&Descriptor::Int32(3)));
        assert_eq!(descriptor.at_index(3), Some(&Descriptor::Int32(2)));
        assert_eq!(round_trip(values.clone()), values);
    }

    #[test]
    fn test_vec_lengths() {
        assert_eq!(round_trip(Vec::<i32>::new()), Vec::<i32>::new());
        assert_eq!(round_trip(vec!["one".to_string()]), vec!["one".to_string()]);
        assert_eq!(
            round_trip(vec![vec![true], vec![], vec![false, true]]),
            vec![vec![true], vec![], vec![false, true]]
        );
    }

    #[test]
    fn test_vec_from_scalar() {
        let values = Vec::<i32>::from_descriptor(&Descriptor::Int32(4)).unwrap();
        assert_eq!(values, vec![4]);
    }

    #[test]
    fn test_vec_element_failure() {
        let list = Descriptor::from(vec![Descriptor::Int32(1), Descriptor::null()]);
        let err = Vec::<i32>::from_descriptor(&list).unwrap_err();
        assert_eq!(
            err,
            ConversionError::CouldNotCoerce {
                descriptor_type: four_char_code("null"),
                target: "i32",
            }
        );
    }

    #[test]
    fn test_option_round_trips() {
        assert_eq!(round_trip(None::<i32>), None);
        assert_eq!(round_trip(Some(5i32)), Some(5));
        assert_eq!(round_trip(Some("x".to_string())), Some("x".to_string()));
        assert_eq!(None::<String>.to_descriptor().unwrap(), Descriptor::null());
    }

    #[test]
    fn test_null_sentinel_distinct() {
        let null = Descriptor::null();
        let encoded = [
            String::new().to_descriptor().unwrap(),
            0i32.to_descriptor().unwrap(),
            0.0f64.to_descriptor().unwrap(),
            false.to_descriptor().unwrap(),
            Vec::<i32>::new().to_descriptor().unwrap(),
        ];
        for descriptor in &encoded {
            assert_ne!(*descriptor, null);
        }
    }

    #[test]
    fn test_could_not_coerce() {
        let err = i32::from_descriptor(&Descriptor::text("abc")).unwrap_err();
        assert_eq!(
            err,
            ConversionError::CouldNotCoerce {
                descriptor_type: four_char_code("utxt"),
                target: "i32",
            }
        );

        let err = String::from_descriptor(&Descriptor::null()).unwrap_err();
        assert!(matches!(err, ConversionError::CouldNotCoerce { target: "String", .. }));
    }

    #[test]
    fn test_loose_decoding() {
        assert_eq!(i32::from_descriptor(&Descriptor::text("12")).unwrap(), 12);
        assert_eq!(f64::from_descriptor(&Descriptor::Int32(2)).unwrap(), 2.0);
        assert_eq!(String::from_descriptor(&Descriptor::Int32(2)).unwrap(), "2");
    }
}
