//! Coordinate range checks

use crate::genome::LocusNormalizer;

use super::outcome::NavigationErrorCode;

/// A request that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub code: NavigationErrorCode,
    pub message: String,
}

impl Rejection {
    fn new(code: NavigationErrorCode, message: String) -> Self {
        Self { code, message }
    }
}

/// Check a coordinate request and resolve its window
///
/// First failure wins: unknown chromosome, then non-positive start, then a
/// range whose end does not exceed its start. A missing end becomes
/// `start + default_window`.
pub fn validate_coordinates(
    normalizer: &LocusNormalizer,
    chromosome: &str,
    start: i64,
    end: Option<i64>,
    default_window: u64,
) -> Result<(u64, u64), Rejection> {
    if !normalizer.is_valid(chromosome) {
        return Err(Rejection::new(
            NavigationErrorCode::InvalidChromosome,
            format!("Invalid chromosome name: {}", chromosome),
        ));
    }

    if start <= 0 {
        return Err(Rejection::new(
            NavigationErrorCode::InvalidStart,
            format!("Invalid start position: {}. Must be greater than 0.", start),
        ));
    }

    let window = i64::try_from(default_window).unwrap_or(i64::MAX);
    let end = end.unwrap_or_else(|| start.saturating_add(window));

    if end <= start {
        return Err(Rejection::new(
            NavigationErrorCode::InvalidRange,
            format!(
                "End position ({}) must be greater than start position ({})",
                end, start
            ),
        ));
    }

    // both positive past this point
    Ok((start as u64, end as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(chromosome: &str, start: i64, end: Option<i64>) -> Result<(u64, u64), Rejection> {
        validate_coordinates(&LocusNormalizer::human(), chromosome, start, end, 10_000)
    }

    #[test]
    fn test_default_window() {
        assert_eq!(check("chr1", 1_000_000, None), Ok((1_000_000, 1_010_000)));
    }

    #[test]
    fn test_explicit_range() {
        assert_eq!(check("X", 5, Some(6)), Ok((5, 6)));
    }

    #[test]
    fn test_invalid_chromosome_wins_over_bad_start() {
        let err = check("chr99", -1, Some(-5)).unwrap_err();
        assert_eq!(err.code, NavigationErrorCode::InvalidChromosome);
        assert_eq!(err.message, "Invalid chromosome name: chr99");
    }

    #[test]
    fn test_invalid_start() {
        let err = check("chr1", 0, Some(100)).unwrap_err();
        assert_eq!(err.code, NavigationErrorCode::InvalidStart);
        assert_eq!(err.message, "Invalid start position: 0. Must be greater than 0.");
    }

    #[test]
    fn test_reversed_and_empty_ranges() {
        let err = check("chr1", 2_000_000, Some(1_000_000)).unwrap_err();
        assert_eq!(err.code, NavigationErrorCode::InvalidRange);
        assert_eq!(
            err.message,
            "End position (1000000) must be greater than start position (2000000)"
        );
        assert_eq!(
            check("chr1", 500, Some(500)).unwrap_err().code,
            NavigationErrorCode::InvalidRange
        );
    }

    #[test]
    fn test_window_saturates() {
        let (start, end) = check("chr1", i64::MAX - 1, None).unwrap();
        assert!(end > start);
    }
}
