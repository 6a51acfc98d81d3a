//! Batch min-max rescaling of raw team ratings to the unit interval.
//!
//! For a batch with distinct extremes every value maps linearly onto
//! `[0, 1]`: the batch minimum becomes `0.0` and the maximum `1.0`. With
//! `invert` set the axis is reflected (`1 - r`) so that, for metrics where
//! lower is better, the best value still lands on `1.0`.
//!
//! A flat batch (`max == min`) maps every element to `0.0` whether or not
//! `invert` is set.

use crate::error::ContenderError;

/// Rescale `values` into `[0, 1]`, preserving input order.
///
/// Returns `InvalidInput` for an empty slice.
pub fn normalize(values: &[f64], invert: bool) -> Result<Vec<f64>, ContenderError> {
    debug_assert!(
        values.iter().all(|v| v.is_finite()),
        "normalize expects finite values"
    );

    if values.is_empty() {
        return Err(ContenderError::InvalidInput(
            "cannot normalize an empty batch".to_string(),
        ));
    }

    let max_v = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_v = values.iter().copied().fold(f64::INFINITY, f64::min);

    // Flat batch: every team is both best and worst.
    if max_v == min_v {
        return Ok(vec![0.0; values.len()]);
    }

    let range = max_v - min_v;
    Ok(values
        .iter()
        .map(|v| {
            let r = (v - min_v) / range;
            if invert {
                1.0 - r
            } else {
                r
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_all_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert_relative_eq!(*a, *e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_offense_scale() {
        let out = normalize(&[100.0, 110.0, 120.0], false).unwrap();
        assert_all_close(&out, &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_defense_scale_inverted() {
        let out = normalize(&[100.0, 110.0, 120.0], true).unwrap();
        assert_all_close(&out, &[1.0, 0.5, 0.0]);
    }

    /// A flat batch maps to all zeros, not 0.5, on both axes. This is the
    /// contract the dashboard has always had; it is not a "no variance" guess.
    #[test]
    fn test_flat_batch_is_all_zero_both_directions() {
        assert_eq!(normalize(&[105.0, 105.0, 105.0], false).unwrap(), vec![0.0; 3]);
        assert_eq!(normalize(&[105.0, 105.0, 105.0], true).unwrap(), vec![0.0; 3]);
        assert_eq!(normalize(&[-3.5], true).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_empty_batch_is_invalid_input() {
        match normalize(&[], false) {
            Err(ContenderError::InvalidInput(_)) => {}
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_order_is_preserved() {
        let out = normalize(&[120.0, 100.0, 115.0, 110.0], false).unwrap();
        assert_all_close(&out, &[1.0, 0.0, 0.75, 0.5]);
    }

    #[test]
    fn test_negative_values() {
        let out = normalize(&[-10.0, 0.0, 10.0], false).unwrap();
        assert_all_close(&out, &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_extremes_land_exactly_once() {
        let values = [112.3, 108.9, 119.4, 101.7, 115.0];
        let plain = normalize(&values, false).unwrap();
        let inverted = normalize(&values, true).unwrap();

        assert_eq!(plain.iter().filter(|v| **v == 1.0).count(), 1);
        assert_eq!(plain.iter().filter(|v| **v == 0.0).count(), 1);
        assert_eq!(plain[2], 1.0);
        assert_eq!(plain[3], 0.0);
        assert_eq!(inverted[2], 0.0);
        assert_eq!(inverted[3], 1.0);
        assert!(plain.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(inverted.iter().all(|v| (0.0..=1.0).contains(v)));
    }
}
