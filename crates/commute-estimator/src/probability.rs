use statrs::function::erf::erf;

/// Standard deviation substituted when the caller passes a degenerate one.
const FALLBACK_STD_MIN: f64 = 1.0;

/// Probability that a Normal(mean, std²) trip duration fits within `time_budget`.
///
/// P(X <= time_budget) = 0.5 * (1 + erf((time_budget - mean) / (std * sqrt(2))))
///
/// A non-positive (or NaN) `std` is replaced by 1.0 minute. Negative budgets and
/// means are valid inputs; erf saturates to ±1 for extreme arguments so the
/// result stays within [0, 1].
pub fn ontime_prob(time_budget: f64, mean: f64, std: f64) -> f64 {
    let std = if std > 0.0 { std } else { FALLBACK_STD_MIN };
    let z = (time_budget - mean) / (std * std::f64::consts::SQRT_2);
    0.5 * (1.0 + erf(z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_budget_equal_to_mean_is_even_odds() {
        assert_relative_eq!(ontime_prob(23.0, 23.0, 4.14), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_one_sigma_above_mean() {
        // Phi(1) = 0.841344746...
        assert_relative_eq!(ontime_prob(30.0, 25.0, 5.0), 0.841_344_746, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_std_uses_fallback() {
        assert_eq!(ontime_prob(25.0, 20.0, 0.0), ontime_prob(25.0, 20.0, 1.0));
        assert_eq!(ontime_prob(25.0, 20.0, -3.0), ontime_prob(25.0, 20.0, 1.0));
        assert_eq!(ontime_prob(25.0, 20.0, f64::NAN), ontime_prob(25.0, 20.0, 1.0));
    }

    #[test]
    fn test_extreme_budgets_saturate() {
        let late = ontime_prob(-1.0e12, 30.0, 5.0);
        let early = ontime_prob(1.0e12, 30.0, 5.0);
        assert!(late.is_finite() && early.is_finite());
        assert_relative_eq!(late, 0.0, epsilon = 1e-12);
        assert_relative_eq!(early, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_budget_is_valid() {
        let p = ontime_prob(-10.0, 20.0, 5.0);
        assert!((0.0..=1.0).contains(&p));
        assert!(p < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_midpoint_is_half(mean in -500.0f64..500.0, std in 0.01f64..200.0) {
            prop_assert!((ontime_prob(mean, mean, std) - 0.5).abs() < 1e-12);
        }

        #[test]
        fn prop_non_decreasing_in_budget(
            mean in 0.0f64..300.0,
            std in 0.01f64..100.0,
            a in -1000.0f64..1000.0,
            delta in 0.0f64..500.0,
        ) {
            let lower = ontime_prob(a, mean, std);
            let upper = ontime_prob(a + delta, mean, std);
            prop_assert!(upper + 1e-12 >= lower);
        }

        #[test]
        fn prop_within_unit_interval(budget in -1.0e6f64..1.0e6, mean in -1.0e3f64..1.0e3, std in -10.0f64..100.0) {
            let p = ontime_prob(budget, mean, std);
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }
}
