//! Collapsing equivalence sets to one item per schedule slot.

mod precedence;
mod selection;

pub use precedence::PrecedenceEquivalentsMerger;
pub use selection::EquivalenceSelector;

use crate::model::{Item, ItemId};
use crate::query::PrecedenceConfig;

/// Merges a set of equivalent items into representative items.
///
/// Schedule selection always expects exactly one item back; anything else
/// is reported as an inconsistent schedule entry.
pub trait EquivalentsMerger: Send + Sync + std::fmt::Debug {
    /// Returns the representative(s) of `items` under `sources`.
    ///
    /// `context_id` names the item the set was resolved for, if any.
    fn merge(
        &self,
        context_id: Option<ItemId>,
        items: &[Item],
        sources: &PrecedenceConfig,
    ) -> Vec<Item>;
}
