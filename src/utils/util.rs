//! # Utility Module
//!
//! Small numeric helpers shared by the generators.
//!
//! ## Percentages
//!
//! Configuration expresses rates as percentages (`0..=100`). Values outside the
//! range are clamped rather than rejected, so a hand-edited config with `120`
//! simply means "always".

/// Converts a percentage into a probability in `[0, 1]`.
///
/// ```
/// use rust_levelgen::utils::util::percent_to_probability;
///
/// assert_eq!(percent_to_probability(45.0), 0.45);
/// assert_eq!(percent_to_probability(-3.0), 0.0);
/// ```
pub fn percent_to_probability(percent: f64) -> f64 {
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0) / 100.0
}

/// How many of `total` items a percentage selects, rounded down.
pub fn percent_of(total: usize, percent: f64) -> usize {
    (total as f64 * percent_to_probability(percent)).floor() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_to_probability_clamps() {
        assert_eq!(percent_to_probability(50.0), 0.5);
        assert_eq!(percent_to_probability(120.0), 1.0);
        assert_eq!(percent_to_probability(-1.0), 0.0);
        assert_eq!(percent_to_probability(f64::NAN), 0.0);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(4, 50.0), 2);
        assert_eq!(percent_of(10, 45.0), 4);
        assert_eq!(percent_of(10, 250.0), 10);
        assert_eq!(percent_of(0, 50.0), 0);
    }
}
