use std::fmt::Debug;

use crate::{error::Result, Error};

#[derive(Clone, Debug, PartialEq)]
struct Interval<T> {
    min: Option<T>,
    max: Option<T>,
}

impl<T> Interval<T>
where
    T: PartialOrd,
{
    fn contains(&self, value: &T) -> bool {
        let above_min = self.min.as_ref().map_or(true, |min| value >= min);
        let below_max = self.max.as_ref().map_or(true, |max| value <= max);
        above_min && below_max
    }
}

/// Interval membership check over one or more inclusive ranges.
///
/// A missing minimum or maximum leaves that side of the range open.
/// Values are accepted if they are part of any of the ranges.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeRule<T> {
    ranges: Vec<Interval<T>>,
}

impl<T> RangeRule<T>
where
    T: PartialOrd + Debug,
{
    pub fn new(min: Option<T>, max: Option<T>) -> Result<RangeRule<T>> {
        let mut rule = RangeRule { ranges: Vec::new() };
        rule.add_range(min, max)?;
        Ok(rule)
    }

    /// Adds another accepted range.
    ///
    /// Fails if the maximum is smaller than the minimum.
    pub fn add_range(&mut self, min: Option<T>, max: Option<T>) -> Result<()> {
        if let (Some(min), Some(max)) = (&min, &max) {
            if max < min {
                return Err(Error::InvalidRange {
                    min: format!("{:?}", min),
                    max: format!("{:?}", max),
                });
            }
        }
        self.ranges.push(Interval { min, max });
        Ok(())
    }

    pub fn test(&self, value: &T) -> bool {
        self.ranges.iter().any(|r| r.contains(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_range() {
        let r = RangeRule::new(Some(10), Some(20)).unwrap();
        assert!(!r.test(&9));
        assert!(r.test(&10));
        assert!(r.test(&15));
        assert!(r.test(&20));
        assert!(!r.test(&21));
    }

    #[test]
    fn open_ranges() {
        let r = RangeRule::new(None, Some("m")).unwrap();
        assert!(r.test(&"a"));
        assert!(r.test(&"m"));
        assert!(!r.test(&"n"));

        let r = RangeRule::new(Some(1.5), None).unwrap();
        assert!(!r.test(&1.0));
        assert!(r.test(&1e300));
    }

    #[test]
    fn multiple_ranges() {
        let mut r = RangeRule::new(Some(0), Some(5)).unwrap();
        r.add_range(Some(100), None).unwrap();
        assert!(r.test(&3));
        assert!(!r.test(&50));
        assert!(r.test(&500));
    }

    #[test]
    fn reject_inverted_range() {
        let err = RangeRule::new(Some(20), Some(10)).unwrap_err();
        assert_eq!(
            Error::InvalidRange {
                min: "20".to_string(),
                max: "10".to_string()
            },
            err
        );

        let mut r = RangeRule::new(Some(0), Some(1)).unwrap();
        assert!(r.add_range(Some(3), Some(2)).is_err());
        // The failed range was not added
        assert!(!r.test(&2));
    }
}
