//! Listing limit helpers.

/// Default page size when the caller does not ask for one.
pub const DEFAULT_LIMIT: i64 = 50;

/// Hard cap on page size for every listing endpoint.
pub const MAX_LIMIT: i64 = 500;

/// Clamps a requested listing limit into the `1..=MAX_LIMIT` range.
///
/// `None` falls back to [`DEFAULT_LIMIT`]; zero and negative values are
/// raised to 1 rather than rejected.
pub fn clamp_limit(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit_default() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
    }

    #[test]
    fn test_clamp_limit_in_range() {
        assert_eq!(clamp_limit(Some(25)), 25);
        assert_eq!(clamp_limit(Some(1)), 1);
        assert_eq!(clamp_limit(Some(500)), 500);
    }

    #[test]
    fn test_clamp_limit_out_of_range() {
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-10)), 1);
        assert_eq!(clamp_limit(Some(10_000)), MAX_LIMIT);
    }
}
