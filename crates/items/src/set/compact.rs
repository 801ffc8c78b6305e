use super::ItemSet;
use crate::error::ItemError;
use crate::registry::{ItemId, ManagedItem};

impl ItemSet {
	/// Greedy cover of the set by named items.
	///
	/// Repeatedly takes the item with the largest bitmap that still fits in the remaining bits
	/// (composites win ties against primitives, then earlier registration wins) until nothing
	/// remains. The union of the returned items' bitmaps equals the set.
	pub fn compact(&self) -> Result<Vec<ItemId>, ItemError> {
		let mut remaining = self.words.to_vec();
		let mut cover = Vec::new();

		while remaining.iter().any(|&w| w != 0) {
			let best = self
				.registry
				.iter()
				.filter(|item| item.cardinality() > 0 && fits(item, &remaining))
				.max_by(|a, b| {
					a.cardinality()
						.cmp(&b.cardinality())
						.then(a.is_composite().cmp(&b.is_composite()))
						.then(b.id().index().cmp(&a.id().index()))
				});

			let Some(best) = best else {
				return Err(ItemError::IncompleteCover {
					remaining: remaining.iter().map(|w| w.count_ones()).sum(),
				});
			};

			for (word, bit) in remaining.iter_mut().zip(best.bitmap()) {
				*word &= !*bit;
			}
			cover.push(best.id());
		}

		Ok(cover)
	}
}

fn fits(item: &ManagedItem, remaining: &[u64]) -> bool {
	item.bitmap()
		.iter()
		.zip(remaining)
		.all(|(want, have)| want & have == *want)
}
