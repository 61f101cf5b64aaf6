//! Argument resolution: merging the three hint sources.
//!
//! Per position the highest-precedence source wins:
//! manual, then annotations, then auto-wiring. The merged spec is ordered
//! by ascending position. Gaps are kept; a missing required position shows
//! up later as an arity problem, not here.

use std::collections::BTreeSet;

use tracing::trace;

use crate::hint::{ArgumentSpec, Hint, HintSources};
use crate::record::ComponentRecord;

/// Merges hint sources into an [`ArgumentSpec`].
pub struct ArgumentResolver;

impl ArgumentResolver {
    /// Merges `sources` by explicit per-position precedence.
    pub fn merge(sources: &HintSources) -> ArgumentSpec {
        let positions: BTreeSet<usize> = sources
            .manual
            .positions()
            .chain(sources.annotations.positions())
            .chain(sources.auto_wiring.positions())
            .collect();

        let slots: Vec<(usize, Hint)> = positions
            .into_iter()
            .filter_map(|position| {
                sources
                    .manual
                    .get(position)
                    .or_else(|| sources.annotations.get(position))
                    .or_else(|| sources.auto_wiring.get(position))
                    .map(|hint| (position, hint.clone()))
            })
            .collect();

        ArgumentSpec::from_sorted(slots)
    }

    /// Merges the record's sources and stores the result on it.
    pub fn apply(record: &mut ComponentRecord) {
        let spec = Self::merge(&record.hints);
        trace!(identity = %record.identity(), arguments = spec.len(), "Merged argument hints");
        record.resolved = Some(spec);
    }
}
