//! The nodata convention.
//!
//! Every value array handed in or out of the engine uses `-999.0` as its fill
//! value, and any negative value is treated as "no valid measurement". Inside
//! the engine that convention is carried by [`Sample`] and only converted back
//! to the numeric sentinel at the array boundary.

use serde::{Deserialize, Serialize};

/// Fill value written for missing, unmatched and excluded cells.
pub const NODATA: f64 = -999.0;

/// A single measurement, either valid or missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Sample {
    Valid(f64),
    Missing,
}

impl Sample {
    /// Interpret a raw array value.
    ///
    /// Negative values (the fill value included) and NaN are missing.
    #[inline]
    pub fn from_raw(value: f64) -> Self {
        if value.is_nan() || value < 0.0 {
            Sample::Missing
        } else {
            Sample::Valid(value)
        }
    }

    /// Convert back to the array representation.
    #[inline]
    pub fn to_raw(self) -> f64 {
        match self {
            Sample::Valid(v) => v,
            Sample::Missing => NODATA,
        }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        matches!(self, Sample::Valid(_))
    }

    #[inline]
    pub fn value(self) -> Option<f64> {
        match self {
            Sample::Valid(v) => Some(v),
            Sample::Missing => None,
        }
    }
}

impl From<Option<f64>> for Sample {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Sample::Missing, Sample::Valid)
    }
}

/// True when the raw value is exactly the fill value.
#[inline]
pub fn is_nodata(value: f64) -> bool {
    value == NODATA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_values_are_missing() {
        assert_eq!(Sample::from_raw(NODATA), Sample::Missing);
        assert_eq!(Sample::from_raw(-0.5), Sample::Missing);
        assert_eq!(Sample::from_raw(f64::NAN), Sample::Missing);
        assert_eq!(Sample::from_raw(0.0), Sample::Valid(0.0));
        assert_eq!(Sample::from_raw(12.5), Sample::Valid(12.5));
    }

    #[test]
    fn test_to_raw() {
        assert_eq!(Sample::Missing.to_raw(), NODATA);
        assert_eq!(Sample::Valid(3.25).to_raw(), 3.25);
        assert_eq!(Sample::from(None).to_raw(), NODATA);
    }

    #[test]
    fn test_is_nodata_is_exact() {
        assert!(is_nodata(-999.0));
        assert!(!is_nodata(-998.0));
        assert!(!is_nodata(-1.0));
    }
}
