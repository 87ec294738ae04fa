use serde::Serialize;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Result<Self, CoreError> {
        for bound in [min, max].into_iter().flatten() {
            if !bound.is_finite() || bound < 0.0 {
                return Err(CoreError::InvalidPrice(bound));
            }
        }
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(CoreError::InvertedPriceRange { min, max });
            }
        }
        Ok(Self { min, max })
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// A document without a price never satisfies a bounded range.
    pub fn contains(&self, price: Option<f64>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(price) = price else {
            return false;
        };
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_open_ranges() {
        let range = PriceRange::new(Some(10.0), None).unwrap();
        assert!(range.contains(Some(10.0)));
        assert!(range.contains(Some(1_000.0)));
        assert!(!range.contains(Some(9.99)));
    }

    #[test]
    fn accept_equal_bounds() {
        let range = PriceRange::new(Some(90.0), Some(90.0)).unwrap();
        assert!(range.contains(Some(90.0)));
        assert!(!range.contains(Some(90.5)));
    }

    #[test]
    fn reject_inverted_range() {
        let err = PriceRange::new(Some(100.0), Some(50.0)).unwrap_err();
        assert!(matches!(err, CoreError::InvertedPriceRange { .. }));
    }

    #[test]
    fn reject_negative_and_nan() {
        assert!(PriceRange::new(Some(-1.0), None).is_err());
        assert!(PriceRange::new(None, Some(f64::NAN)).is_err());
    }

    #[test]
    fn missing_price_only_passes_unbounded() {
        assert!(PriceRange::default().contains(None));
        assert!(!PriceRange::new(None, Some(5.0)).unwrap().contains(None));
    }
}
