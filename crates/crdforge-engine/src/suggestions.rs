//! Closest-match suggestions for unknown attribute names

/// Maximum Levenshtein distance to consider for suggestions
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Find the candidate closest to `target`, if any is close enough
///
/// A match further away than `MAX_SUGGESTION_DISTANCE`, or as far away as
/// the target is long, is noise rather than a suggestion.
pub fn find_closest<'a>(
    target: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<&'a str> {
    candidates
        .into_iter()
        .map(|candidate| (strsim::levenshtein(target, candidate), candidate))
        .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE && *distance < target.len())
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_match_found() {
        let candidates = ["replicas", "selector", "template"];
        assert_eq!(find_closest("replcas", candidates), Some("replicas"));
        assert_eq!(find_closest("selektor", candidates), Some("selector"));
    }

    #[test]
    fn test_distant_names_rejected() {
        let candidates = ["replicas", "selector"];
        assert_eq!(find_closest("imagePullPolicy", candidates), None);
    }

    #[test]
    fn test_short_target_not_matched_to_everything() {
        // "x" is distance 1 from "y" but suggesting it would be noise
        assert_eq!(find_closest("x", ["y"]), None);
    }
}
