//! Mention detection over rich-text facets.

use skyreply_sdk::record::{FacetFeature, PostRecord};

/// True if any facet feature mentions `bot_did`. Pure; stops at the
/// first match. A record without facets has no mentions.
pub fn is_mentioned(record: &PostRecord, bot_did: &str) -> bool {
    let Some(facets) = &record.facets else {
        return false;
    };
    facets
        .iter()
        .flat_map(|facet| &facet.features)
        .any(|feature| matches!(feature, FacetFeature::Mention { did } if did == bot_did))
}
