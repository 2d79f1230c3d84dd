//! Best-version matching over a set of published versions.
//!
//! Pure function, no I/O: given a semver constraint and the version strings
//! a registry lists, pick the highest version satisfying the constraint.
//! A malformed version string inside the candidate set is a hard error
//! rather than a skip, keeping trust in registry data explicit.

use semver::{Version, VersionReq};

use silo_core::error::SiloError;

use crate::ResolverResult;

/// Find the highest available version satisfying `constraint`.
///
/// Supports exact versions, `~`, `^`, `x`/`*` wildcards, and comparator
/// combinations. Prerelease candidates are only eligible when the
/// constraint itself names a prerelease.
pub fn find_best_version(constraint: &str, available: &[String]) -> ResolverResult<String> {
    let req = VersionReq::parse(constraint).map_err(|_| SiloError::InvalidConstraint {
        constraint: constraint.to_string(),
    })?;
    let allow_prerelease = constraint.contains('-');

    let mut best: Option<Version> = None;
    for raw in available {
        if !allow_prerelease && raw.contains('-') {
            continue;
        }
        let version = Version::parse(raw).map_err(|_| SiloError::InvalidVersion {
            version: raw.clone(),
        })?;
        if req.matches(&version) && best.as_ref().map_or(true, |b| version > *b) {
            best = Some(version);
        }
    }

    match best {
        Some(version) => Ok(version.to_string()),
        None => Err(SiloError::NoMatchingVersion {
            constraint: constraint.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_wildcard_picks_highest() {
        let available = versions(&["1.4.5", "1.0.0", "1.2.3", "0.1.0"]);
        assert_eq!(find_best_version("1.x", &available).unwrap(), "1.4.5");
    }

    #[test]
    fn test_single_candidate() {
        let available = versions(&["1.0.0"]);
        assert_eq!(find_best_version("1.x", &available).unwrap(), "1.0.0");
    }

    #[test]
    fn test_tilde_range() {
        let available = versions(&["1.2.5", "1.3.0", "1.2.4"]);
        assert_eq!(find_best_version("~1.2.4", &available).unwrap(), "1.2.5");
    }

    #[test]
    fn test_caret_range() {
        let available = versions(&["1.3.4", "1.0.0", "1.2.1", "2.0.0"]);
        assert_eq!(find_best_version("^1.0.0", &available).unwrap(), "1.3.4");
    }

    #[test]
    fn test_exact_version_as_constraint() {
        let available = versions(&["1.0.0", "1.0.1"]);
        assert_eq!(find_best_version("1.0.0", &available).unwrap(), "1.0.0");
    }

    #[test]
    fn test_star_matches_everything() {
        let available = versions(&["0.1.0", "2.3.4"]);
        assert_eq!(find_best_version("*", &available).unwrap(), "2.3.4");
    }

    #[test]
    fn test_prerelease_candidates_excluded_for_plain_constraint() {
        let available = versions(&["1.0.0", "1.1.0-beta"]);
        assert_eq!(find_best_version("1.x", &available).unwrap(), "1.0.0");
    }

    #[test]
    fn test_prerelease_constraint_admits_prerelease_candidates() {
        let available = versions(&["2.0.0-alpha.1", "2.0.0-beta.1"]);
        assert_eq!(
            find_best_version(">=2.0.0-alpha", &available).unwrap(),
            "2.0.0-beta.1"
        );
    }

    #[test]
    fn test_invalid_constraint() {
        let available = versions(&["1.0.0"]);
        let err = find_best_version("not-a-range", &available).unwrap_err();
        assert!(matches!(err, SiloError::InvalidConstraint { .. }));
    }

    #[test]
    fn test_malformed_candidate_is_a_hard_error() {
        let available = versions(&["1.0.0", "one-point-two"]);
        // "one-point-two" contains '-', so it survives the prerelease gate
        // only when the constraint has one; force it through
        let err = find_best_version(">=1.0.0-0", &available).unwrap_err();
        assert!(matches!(err, SiloError::InvalidVersion { .. }));
    }

    #[test]
    fn test_no_matching_version() {
        let available = versions(&["1.0.0", "1.4.5"]);
        let err = find_best_version("^2.0.0", &available).unwrap_err();
        assert!(matches!(err, SiloError::NoMatchingVersion { .. }));
    }

    #[test]
    fn test_comparator_combination() {
        let available = versions(&["1.0.0", "1.5.0", "2.0.0"]);
        assert_eq!(
            find_best_version(">=1.0.0, <2.0.0", &available).unwrap(),
            "1.5.0"
        );
    }
}
