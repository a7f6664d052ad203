use std::{cmp::Ordering, fmt, time::SystemTime};

use serde_derive::{Deserialize, Serialize};

use crate::{error::Result, Error};

/// Types that can be used as keys of a [`Btree`](crate::Btree).
///
/// Keys must have a total order, which is why plain `f64` is not a key type
/// and [`Number`] has to be used instead.
pub trait KeyType: Ord + Clone {}

macro_rules! impl_key_type {
    ( $type:ty ) => {
        impl KeyType for $type {}
    };
}

impl_key_type!(u8);
impl_key_type!(u16);
impl_key_type!(u32);
impl_key_type!(u64);
impl_key_type!(u128);
impl_key_type!(usize);
impl_key_type!(i8);
impl_key_type!(i16);
impl_key_type!(i32);
impl_key_type!(i64);
impl_key_type!(i128);
impl_key_type!(isize);
impl_key_type!(char);
impl_key_type!(bool);
impl_key_type!(String);
impl_key_type!(Vec<u8>);
impl_key_type!(SystemTime);
impl_key_type!(Number);

/// Floating point number with a total order.
///
/// NaN is rejected when the number is created and negative zero is stored as
/// positive zero, so equal numbers are always the same key.
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
#[serde(try_from = "f64", into = "f64")]
pub struct Number(f64);

impl Number {
    pub fn new(value: f64) -> Result<Number> {
        if value.is_nan() {
            Err(Error::NanKey)
        } else if value == 0.0 {
            Ok(Number(0.0))
        } else {
            Ok(Number(value))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Number {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Number::new(value)
    }
}

impl From<Number> for f64 {
    fn from(n: Number) -> Self {
        n.0
    }
}

macro_rules! impl_number_from {
    ( $type:ty ) => {
        impl From<$type> for Number {
            fn from(value: $type) -> Self {
                Number(value.into())
            }
        }
    };
}

impl_number_from!(i8);
impl_number_from!(i16);
impl_number_from!(i32);
impl_number_from!(u8);
impl_number_from!(u16);
impl_number_from!(u32);

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for Number {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_nan() {
        assert_eq!(Err(Error::NanKey), Number::new(f64::NAN));
        assert_eq!(Err(Error::NanKey), Number::try_from(f64::NAN));
    }

    #[test]
    fn negative_zero_is_zero() {
        let a = Number::new(-0.0).unwrap();
        let b = Number::new(0.0).unwrap();
        assert_eq!(a, b);
        assert_eq!(Ordering::Equal, a.cmp(&b));
    }

    #[test]
    fn total_order() {
        let mut numbers: Vec<Number> = [3.5, -1.0, f64::INFINITY, 0.25, f64::NEG_INFINITY]
            .iter()
            .map(|n| Number::new(*n).unwrap())
            .collect();
        numbers.sort();
        let numbers: Vec<f64> = numbers.into_iter().map(f64::from).collect();
        assert_eq!(
            vec![f64::NEG_INFINITY, -1.0, 0.25, 3.5, f64::INFINITY],
            numbers
        );
        assert!(Number::from(2i32) < Number::new(2.5).unwrap());
    }
}
