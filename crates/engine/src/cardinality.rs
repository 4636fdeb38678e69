//! Cardinality transitions of a RelationType
//!
//! Tightening a RelationType's cardinality can leave existing Relations that
//! the new rule no longer allows. [`transition`] maps every
//! `(old source, new source, old target, new target)` combination onto a
//! [`PruneStrategy`], and [`prune`] picks the Relations to delete.
//!
//! | Source | Target | Strategy |
//! |--------|--------|----------|
//! | MANY → ONE | MANY → ONE | [`PruneStrategy::KeepFirst`] |
//! | MANY → ONE | MANY → MANY | [`PruneStrategy::DedupByTarget`] |
//! | ONE → ONE | MANY → ONE | [`PruneStrategy::DedupBySource`] |
//! | anything else | | [`PruneStrategy::None`] |
//!
//! "First" is the order the store lists the Relations of a type in, which is
//! creation order. Pruning is lossy: deleted Relations are gone for good.

use std::collections::HashSet;

use metakernel_core::{Cardinality, InstanceId, Relation, RelationId};

/// What to delete when a RelationType's cardinality changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneStrategy {
    /// Keep every Relation
    None,
    /// Keep only the first Relation of the type
    KeepFirst,
    /// Keep the first Relation per target Instance
    DedupByTarget,
    /// Keep the first Relation per source Instance
    DedupBySource,
}

/// Look up the strategy for a cardinality change
pub fn transition(
    old_source: Cardinality,
    new_source: Cardinality,
    old_target: Cardinality,
    new_target: Cardinality,
) -> PruneStrategy {
    use Cardinality::{Many, One};

    match (old_source, new_source, old_target, new_target) {
        (Many, One, Many, One) => PruneStrategy::KeepFirst,
        (Many, One, Many, Many) => PruneStrategy::DedupByTarget,
        (One, One, Many, One) => PruneStrategy::DedupBySource,
        _ => PruneStrategy::None,
    }
}

/// Ids of the Relations the strategy removes, in list order
pub fn prune(strategy: PruneStrategy, relations: &[Relation]) -> Vec<RelationId> {
    match strategy {
        PruneStrategy::None => Vec::new(),
        PruneStrategy::KeepFirst => relations.iter().skip(1).filter_map(|r| r.id).collect(),
        PruneStrategy::DedupByTarget => dedup_by(relations, |r| {
            r.target.as_ref().and_then(|t| t.id)
        }),
        PruneStrategy::DedupBySource => dedup_by(relations, |r| {
            r.source.as_ref().and_then(|s| s.id)
        }),
    }
}

fn dedup_by<F>(relations: &[Relation], key: F) -> Vec<RelationId>
where
    F: Fn(&Relation) -> Option<InstanceId>,
{
    let mut seen = HashSet::new();
    relations
        .iter()
        .filter(|r| !seen.insert(key(r)))
        .filter_map(|r| r.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use metakernel_core::{InstanceRef, RelationTypeId};
    use Cardinality::{Many, One};

    fn relation(id: u64, source: u64, target: u64) -> Relation {
        let mut relation = Relation::new(
            RelationTypeId::new(1),
            InstanceRef::by_id(InstanceId::new(source)),
            InstanceRef::by_id(InstanceId::new(target)),
        );
        relation.id = Some(RelationId::new(id));
        relation
    }

    fn ids(raw: &[u64]) -> Vec<RelationId> {
        raw.iter().copied().map(RelationId::new).collect()
    }

    #[test]
    fn test_table_covers_every_transition() {
        let all = [One, Many];
        let mut pruning = 0;
        for os in all {
            for ns in all {
                for ot in all {
                    for nt in all {
                        if transition(os, ns, ot, nt) != PruneStrategy::None {
                            pruning += 1;
                        }
                    }
                }
            }
        }
        assert_eq!(pruning, 3);
    }

    #[test]
    fn test_table_entries() {
        assert_eq!(transition(Many, One, Many, One), PruneStrategy::KeepFirst);
        assert_eq!(transition(Many, One, Many, Many), PruneStrategy::DedupByTarget);
        assert_eq!(transition(One, One, Many, One), PruneStrategy::DedupBySource);
        // Loosening never prunes
        assert_eq!(transition(One, Many, One, Many), PruneStrategy::None);
        // Source tightening while target was already ONE
        assert_eq!(transition(Many, One, One, One), PruneStrategy::None);
    }

    #[test]
    fn test_keep_first() {
        let relations = vec![relation(1, 10, 20), relation(2, 11, 21), relation(3, 12, 22)];
        assert_eq!(prune(PruneStrategy::KeepFirst, &relations), ids(&[2, 3]));
        assert!(prune(PruneStrategy::KeepFirst, &[]).is_empty());
    }

    #[test]
    fn test_dedup_by_target_keeps_first_source() {
        let relations = vec![
            relation(1, 10, 20),
            relation(2, 11, 20),
            relation(3, 12, 21),
            relation(4, 13, 20),
        ];
        assert_eq!(prune(PruneStrategy::DedupByTarget, &relations), ids(&[2, 4]));
    }

    #[test]
    fn test_dedup_by_source_keeps_first_target() {
        let relations = vec![relation(1, 10, 20), relation(2, 10, 21), relation(3, 11, 21)];
        assert_eq!(prune(PruneStrategy::DedupBySource, &relations), ids(&[2]));
    }

    #[test]
    fn test_none_keeps_everything() {
        let relations = vec![relation(1, 10, 20), relation(2, 10, 20)];
        assert!(prune(PruneStrategy::None, &relations).is_empty());
    }
}
