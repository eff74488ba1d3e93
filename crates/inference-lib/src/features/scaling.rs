//! Numeric scaling with a manual fallback when no scaler companion is shipped

use crate::registry::StandardScaler;

/// Affine standardization constants used when the scaler file is absent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineFallback {
    pub mean: f64,
    pub std: f64,
}

/// Campaign durations were 15, 30, 45 or 60 days; population mean and std
pub const CAMPAIGN_DURATION_FALLBACK: AffineFallback = AffineFallback {
    mean: 37.5,
    std: 16.77050983124842,
};

/// Standardize `value`; both paths evaluate `(x - mean) / std` in f64
pub fn scale_numeric(
    column: &str,
    value: f64,
    scaler: Option<&StandardScaler>,
    fallback: AffineFallback,
) -> f64 {
    scaler
        .and_then(|s| s.transform(column, value))
        .unwrap_or_else(|| (value - fallback.mean) / fallback.std)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign_scaler() -> StandardScaler {
        StandardScaler {
            columns: vec!["Duration".to_string()],
            mean: vec![37.5],
            scale: vec![16.77050983124842],
        }
    }

    #[test]
    fn test_fallback_matches_scaler_bit_for_bit() {
        let scaler = campaign_scaler();
        for days in [1.0, 15.0, 30.0, 37.5, 45.0, 60.0, 365.0] {
            let primary = scale_numeric("Duration", days, Some(&scaler), CAMPAIGN_DURATION_FALLBACK);
            let fallback = scale_numeric("Duration", days, None, CAMPAIGN_DURATION_FALLBACK);
            assert_eq!(primary.to_bits(), fallback.to_bits());
        }
    }

    #[test]
    fn test_fallback_constants_are_population_std() {
        let durations = [15.0_f64, 30.0, 45.0, 60.0];
        let mean = durations.iter().sum::<f64>() / 4.0;
        let var = durations.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / 4.0;
        assert_eq!(mean, CAMPAIGN_DURATION_FALLBACK.mean);
        assert!((var.sqrt() - CAMPAIGN_DURATION_FALLBACK.std).abs() < 1e-12);
    }

    #[test]
    fn test_scaler_without_column_uses_fallback() {
        let scaler = StandardScaler {
            columns: vec!["Budget".to_string()],
            mean: vec![1000.0],
            scale: vec![10.0],
        };
        assert_eq!(
            scale_numeric("Duration", 37.5, Some(&scaler), CAMPAIGN_DURATION_FALLBACK),
            0.0
        );
    }
}
