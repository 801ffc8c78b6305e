//! Composite bitmap resolution.

use super::Slot;
use crate::error::ItemError;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
	Unvisited,
	Visiting,
	Done,
}

struct Resolver<'a> {
	names: &'a [&'a str],
	slots: &'a [Option<Slot>],
	composed: &'a [Vec<u32>],
	words: usize,
	marks: Vec<Mark>,
	stack: Vec<usize>,
	bitmaps: Vec<Box<[u64]>>,
}

/// Resolves every item's bitmap: its own slot plus, transitively, its components' bits.
///
/// Composition may form a DAG; a cycle fails with the offending path.
pub(super) fn resolve_bitmaps(
	names: &[&str],
	slots: &[Option<Slot>],
	composed: &[Vec<u32>],
	words: usize,
) -> Result<Vec<Box<[u64]>>, ItemError> {
	let count = names.len();
	let mut resolver = Resolver {
		names,
		slots,
		composed,
		words,
		marks: vec![Mark::Unvisited; count],
		stack: Vec::new(),
		bitmaps: vec![Box::default(); count],
	};
	for index in 0..count {
		resolver.visit(index)?;
	}
	Ok(resolver.bitmaps)
}

impl Resolver<'_> {
	fn visit(&mut self, index: usize) -> Result<(), ItemError> {
		match self.marks[index] {
			Mark::Done => return Ok(()),
			Mark::Visiting => return Err(self.cycle_error(index)),
			Mark::Unvisited => {}
		}

		self.marks[index] = Mark::Visiting;
		self.stack.push(index);

		let mut bitmap = vec![0u64; self.words].into_boxed_slice();
		if let Some(slot) = self.slots[index] {
			bitmap[slot.word as usize] |= slot.mask();
		}
		for &component in &self.composed[index] {
			let component = component as usize;
			self.visit(component)?;
			for (dst, src) in bitmap.iter_mut().zip(self.bitmaps[component].iter()) {
				*dst |= *src;
			}
		}

		self.stack.pop();
		self.marks[index] = Mark::Done;
		self.bitmaps[index] = bitmap;
		Ok(())
	}

	fn cycle_error(&self, index: usize) -> ItemError {
		let start = self
			.stack
			.iter()
			.position(|&i| i == index)
			.unwrap_or_default();
		let cycle = self.stack[start..]
			.iter()
			.chain(std::iter::once(&index))
			.map(|&i| self.names[i].to_string())
			.collect();
		ItemError::CyclicComposition { cycle }
	}
}
