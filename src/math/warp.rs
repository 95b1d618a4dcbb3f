use crate::equalizationerror::{
    EqualizationError,
    Result
};

// Power-law warp on [0, 1]:
//
//   warp(x, k)   = (k^x - 1) / (k - 1)            k != 1
//   unwarp(I, k) = log(I (k - 1) + 1) / log(k)     k != 1
//
// Both reduce to the identity at k = 1. They are evaluated through
// exp_m1 / ln_1p of (k - 1) so that k near 1 keeps its significant digits.

fn check_k(k: f64) -> Result<()> {
    if k >= 0.0 && k.is_finite() {
        Ok(())
    } else {
        Err(EqualizationError::precision_violation("k", k))
    }
}

fn check_unit(what: &'static str, x: f64) -> Result<()> {
    if (0.0..=1.0).contains(&x) {
        Ok(())
    } else {
        Err(EqualizationError::precision_violation(what, x))
    }
}

pub fn warp(x: f64, k: f64) -> Result<f64> {
    check_k(k)?;
    check_unit("x", x)?;
    Ok(warp_unchecked(x, k))
}

pub fn unwarp(i: f64, k: f64) -> Result<f64> {
    check_k(k)?;
    check_unit("I", i)?;
    Ok(unwarp_unchecked(i, k))
}

#[inline]
pub(crate) fn warp_unchecked(x: f64, k: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    if x == 1.0 {
        return 1.0;
    }
    if k == 1.0 {
        return x;
    }
    let k_minus_1 = k - 1.0;
    (x * k_minus_1.ln_1p()).exp_m1() / k_minus_1
}

#[inline]
pub(crate) fn unwarp_unchecked(i: f64, k: f64) -> f64 {
    if i == 0.0 {
        return 0.0;
    }
    if i == 1.0 {
        return 1.0;
    }
    if k == 1.0 {
        return i;
    }
    let k_minus_1 = k - 1.0;
    (i * k_minus_1).ln_1p() / k_minus_1.ln_1p()
}

/// Value-domain warp: rescales `value` inside `[min, max]`, warps it and maps
/// the result back onto `[min, max]`.
pub fn transform_by_range(value: f64, min: f64, max: f64, k: f64) -> Result<f64> {
    if max == min {
        return Ok(min);
    }
    if value == max {
        return Ok(max);
    }
    let exponent = (value - min) / (max - min);
    Ok(min + (max - min) * warp(exponent, k)?)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const KS: [f64; 9] = [1e-8, 0.01, 0.5, 0.999, 1.0, 1.001, 2.0, 100.0, 99999999.0];

    #[test]
    fn test_boundaries_are_exact() {
        for k in KS {
            assert_eq!(warp(0.0, k).unwrap(), 0.0);
            assert_eq!(warp(1.0, k).unwrap(), 1.0);
        }
    }

    #[test]
    fn test_unwarp_inverts_warp() {
        for k in KS {
            for step in 0..=20 {
                let x = step as f64 / 20.0;
                let i = warp(x, k).unwrap();
                assert_abs_diff_eq!(unwarp(i, k).unwrap(), x, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_identity_at_k_one() {
        assert_eq!(warp(0.37, 1.0).unwrap(), 0.37);
        assert_eq!(unwarp(0.37, 1.0).unwrap(), 0.37);
    }

    #[test]
    fn test_concavity_follows_k() {
        assert!(warp(0.5, 0.2).unwrap() > 0.5);
        assert!(warp(0.5, 5.0).unwrap() < 0.5);
        assert_abs_diff_eq!(warp(0.5, 4.0).unwrap(), 1.0 / 3.0, epsilon = 1e-15);
    }

    #[test]
    fn test_precondition_violations() {
        assert!(matches!(
            warp(1.5, 2.0),
            Err(EqualizationError::PrecisionViolation { what: "x", .. })
        ));
        assert!(matches!(
            warp(0.5, -1.0),
            Err(EqualizationError::PrecisionViolation { what: "k", .. })
        ));
        assert!(matches!(
            unwarp(-0.1, 2.0),
            Err(EqualizationError::PrecisionViolation { what: "I", .. })
        ));
    }

    #[test]
    fn test_transform_by_range() {
        assert_eq!(transform_by_range(0.2, 0.2, 0.6, 3.0).unwrap(), 0.2);
        assert_eq!(transform_by_range(0.6, 0.2, 0.6, 3.0).unwrap(), 0.6);
        assert_eq!(transform_by_range(0.4, 0.4, 0.4, 3.0).unwrap(), 0.4);
        let expected = 0.2 + 0.4 * warp(0.5, 3.0).unwrap();
        assert_abs_diff_eq!(transform_by_range(0.4, 0.2, 0.6, 3.0).unwrap(), expected, epsilon = 1e-15);
    }
}
