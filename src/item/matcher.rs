use super::ItemSignature;

/// Compare a candidate item against a configured opener.
///
/// Kind, variant and quantity must be identical, and both sides must carry a
/// label that is equal ignoring case. An unlabelled candidate never matches.
pub fn matches_opener(configured: &ItemSignature, candidate: &ItemSignature) -> bool {
    if configured.kind != candidate.kind
        || configured.variant != candidate.variant
        || configured.quantity != candidate.quantity
    {
        return false;
    }

    match (configured.label(), candidate.label()) {
        (Some(expected), Some(actual)) => expected.to_lowercase() == actual.to_lowercase(),
        _ => false,
    }
}
