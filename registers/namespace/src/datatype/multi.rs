// Licensed under the Apache-2.0 license

use super::{unknown, Datatype};
use crate::error::DatatypeError;
use crate::value::Value;
use std::rc::Rc;

/// One inclusive value range handled by a sub-datatype.
#[derive(Clone, Debug)]
pub struct MultiRange {
    pub datatype: Rc<Datatype>,
    pub min: Value,
    pub max: Value,
}

impl MultiRange {
    pub fn contains(&self, value: &Value) -> bool {
        &self.min <= value && value <= &self.max
    }
}

/// Dispatches to a sub-datatype by value range.
///
/// Ranges are kept sorted by `min` and never overlap.
#[derive(Clone, Debug, Default)]
pub struct MultiDatatype {
    ranges: Vec<MultiRange>,
}

impl MultiDatatype {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ranges(&self) -> &[MultiRange] {
        &self.ranges
    }

    /// Add `[min, max]` handled by `datatype`.
    ///
    /// Fails if `min > max` or the range shares any value with an existing one.
    pub fn add_range(
        &mut self,
        datatype: Rc<Datatype>,
        min: impl Into<Value>,
        max: impl Into<Value>,
    ) -> Result<(), DatatypeError> {
        let (min, max) = (min.into(), max.into());
        if min > max {
            return Err(DatatypeError::invalid("multi", format!("range [{min}, {max}]")));
        }
        // Every range before `pos` ends below `min`; only the one at `pos`
        // can reach into the new range.
        let pos = self.ranges.partition_point(|r| r.max < min);
        if let Some(next) = self.ranges.get(pos) {
            if next.min <= max {
                return Err(DatatypeError::invalid(
                    "multi",
                    format!(
                        "range [{min}, {max}] overlaps [{}, {}]",
                        next.min, next.max
                    ),
                ));
            }
        }
        self.ranges.insert(pos, MultiRange { datatype, min, max });
        Ok(())
    }

    /// Builder form of [`MultiDatatype::add_range`].
    pub fn range(
        mut self,
        datatype: Rc<Datatype>,
        min: impl Into<Value>,
        max: impl Into<Value>,
    ) -> Result<Self, DatatypeError> {
        self.add_range(datatype, min, max)?;
        Ok(self)
    }

    fn range_for(&self, value: &Value) -> Option<&MultiRange> {
        self.ranges.iter().find(|r| r.contains(value))
    }

    pub fn evaluate(&self, value: &Value) -> String {
        match self.range_for(value) {
            Some(range) => range.datatype.evaluate(value),
            None => unknown(value),
        }
    }

    /// Try each range from lowest to highest; the first sub-datatype whose
    /// lookup lands inside its own range wins.
    pub fn lookup(&self, text: &str) -> Result<Value, DatatypeError> {
        self.ranges
            .iter()
            .find_map(|r| r.datatype.lookup(text).ok().filter(|v| r.contains(v)))
            .ok_or_else(|| DatatypeError::invalid("multi", text))
    }

    pub fn lookup_value(&self, value: &Value) -> Result<Value, DatatypeError> {
        match self.range_for(value) {
            Some(_) => Ok(value.clone()),
            None => Err(DatatypeError::invalid("multi", value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::{EnumDatatype, HexDatatype, IntDatatype};

    fn int() -> Rc<Datatype> {
        Rc::new(IntDatatype::new().into())
    }

    #[test]
    fn test_overlap_rejected_in_any_order() {
        let cases = [
            ((0, 10), (10, 20)),
            ((5, 5), (0, 9)),
            ((0, 100), (40, 50)),
            ((3, 8), (1, 3)),
        ];
        for ((a_min, a_max), (b_min, b_max)) in cases {
            let mut dt = MultiDatatype::new();
            dt.add_range(int(), a_min, a_max).unwrap();
            assert!(dt.add_range(int(), b_min, b_max).is_err());

            let mut dt = MultiDatatype::new();
            dt.add_range(int(), b_min, b_max).unwrap();
            assert!(dt.add_range(int(), a_min, a_max).is_err());
        }
    }

    #[test]
    fn test_disjoint_ranges_sorted() {
        let mut dt = MultiDatatype::new();
        dt.add_range(int(), 20, 29).unwrap();
        dt.add_range(int(), 0, 9).unwrap();
        dt.add_range(int(), 10, 19).unwrap();
        let mins: Vec<_> = dt.ranges().iter().map(|r| r.min.clone()).collect();
        assert_eq!(mins, vec![Value::from(0), Value::from(10), Value::from(20)]);
        assert!(dt.add_range(int(), 5, 1).is_err());
    }

    #[test]
    fn test_dispatch() {
        let names: Rc<Datatype> =
            Rc::new(EnumDatatype::new().value("none", 0).value("auto", 1).into());
        let dt = MultiDatatype::new()
            .range(Rc::new(HexDatatype::new(8).into()), 0x10, 0xff)
            .unwrap()
            .range(names, 0, 1)
            .unwrap();
        assert_eq!(dt.evaluate(&Value::from(1)), "auto");
        assert_eq!(dt.evaluate(&Value::from(0x20)), "0x20");
        assert_eq!(dt.evaluate(&Value::from(5)), "<!5!>");
        assert_eq!(dt.lookup("auto").unwrap(), Value::from(1));
        assert_eq!(dt.lookup("0x20").unwrap(), Value::from(0x20));
        assert!(dt.lookup("0x5").is_err());
        assert!(dt.lookup_value(&Value::from(0x100)).is_err());
        let value = dt.lookup_value(&Value::from(0x10)).unwrap();
        assert_eq!(value, Value::from(0x10));
    }

    #[test]
    fn test_lowest_range_wins() {
        let high: Rc<Datatype> = Rc::new(EnumDatatype::new().value("dup", 15).into());
        let low: Rc<Datatype> = Rc::new(EnumDatatype::new().value("dup", 5).into());
        let dt = MultiDatatype::new()
            .range(high, 10, 19)
            .unwrap()
            .range(low, 0, 9)
            .unwrap();
        assert_eq!(dt.lookup("dup").unwrap(), Value::from(5));
    }
}
