use crate::equivalence::EquivalentsMerger;
use crate::model::{Item, ItemId};
use crate::query::PrecedenceConfig;

/// Picks the item whose publisher ranks highest in the precedence list.
///
/// Items from publishers missing from the list sort after every enabled
/// one, so they only win when nothing else is available. Within one
/// publisher the context item wins, then the lowest id.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrecedenceEquivalentsMerger;

impl PrecedenceEquivalentsMerger {
    pub fn new() -> Self {
        Self
    }
}

impl EquivalentsMerger for PrecedenceEquivalentsMerger {
    fn merge(
        &self,
        context_id: Option<ItemId>,
        items: &[Item],
        sources: &PrecedenceConfig,
    ) -> Vec<Item> {
        if !sources.precedence_enabled {
            return items.first().cloned().into_iter().collect();
        }

        items
            .iter()
            .min_by_key(|item| {
                (
                    sources.rank_of(&item.publisher).unwrap_or(usize::MAX),
                    Some(item.id) != context_id,
                    item.id,
                )
            })
            .cloned()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Publisher;

    fn item(id: u64, publisher: &str) -> Item {
        Item::new(id, Publisher::new(publisher), format!("item {id}"))
    }

    #[test]
    fn test_highest_precedence_publisher_wins() {
        let items = vec![item(1, "pub-x"), item(2, "pub-y")];
        let sources = PrecedenceConfig::with_precedence([
            Publisher::new("pub-y"),
            Publisher::new("pub-x"),
        ]);

        let merged = PrecedenceEquivalentsMerger::new().merge(None, &items, &sources);

        assert_eq!(merged, vec![item(2, "pub-y")]);
    }

    #[test]
    fn test_disabled_publishers_only_win_when_alone() {
        let sources = PrecedenceConfig::with_precedence([Publisher::new("pub-x")]);
        let merger = PrecedenceEquivalentsMerger::new();

        let mixed = vec![item(1, "unlisted"), item(2, "pub-x")];
        assert_eq!(merger.merge(None, &mixed, &sources), vec![item(2, "pub-x")]);

        let alone = vec![item(3, "unlisted")];
        assert_eq!(merger.merge(None, &alone, &sources), vec![item(3, "unlisted")]);
    }

    #[test]
    fn test_ties_prefer_context_then_lowest_id() {
        let sources = PrecedenceConfig::with_precedence([Publisher::new("pub-x")]);
        let items = vec![item(9, "pub-x"), item(4, "pub-x"), item(7, "pub-x")];
        let merger = PrecedenceEquivalentsMerger::new();

        assert_eq!(merger.merge(None, &items, &sources), vec![item(4, "pub-x")]);
        assert_eq!(
            merger.merge(Some(ItemId::new(7)), &items, &sources),
            vec![item(7, "pub-x")]
        );
    }

    #[test]
    fn test_without_precedence_returns_first() {
        let sources = PrecedenceConfig::without_precedence([Publisher::new("pub-y")]);
        let items = vec![item(1, "pub-x"), item(2, "pub-y")];

        let merged = PrecedenceEquivalentsMerger::new().merge(None, &items, &sources);

        assert_eq!(merged, vec![item(1, "pub-x")]);
        assert!(
            PrecedenceEquivalentsMerger::new()
                .merge(None, &[], &sources)
                .is_empty()
        );
    }
}
