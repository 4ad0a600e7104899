//! Cursor-relative search over ordered sequences of located items.
//!
//! Items must be sorted by start position and must not overlap. Nothing here
//! re-sorts; an absent sequence behaves like an empty one.

use crate::position::{Position, Range, before, inside};

/// Anything occupying a span of a document.
pub trait Locatable {
	fn start(&self) -> Position;
	fn end(&self) -> Position;

	fn range(&self) -> Range {
		Range::new(self.start(), self.end())
	}
}

/// Which end of an item's span a search compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
	Start,
	End,
}

impl Edge {
	#[must_use]
	pub fn of<T: Locatable + ?Sized>(self, item: &T) -> Position {
		match self {
			Self::Start => item.start(),
			Self::End => item.end(),
		}
	}
}

/// Index of the item following `pos`, or preceding it when `reverse` is set.
///
/// Going forward, the first item whose location is strictly after `pos` wins.
/// Going backward, the last item whose location is strictly before `pos` wins.
#[must_use]
pub fn next_item_index<T>(
	pos: Position,
	items: Option<&[T]>,
	location: impl Fn(&T) -> Position,
	reverse: bool,
) -> Option<usize> {
	let items = items?;
	if reverse {
		items.iter().rposition(|item| !before(pos, location(item), true))
	} else {
		items.iter().position(|item| before(pos, location(item), false))
	}
}

/// Index of the item whose span contains `pos`, boundaries included.
///
/// Only two candidates can hold `pos`: the item right before the next item
/// starting after `pos` (or the last item if none does), and that next item.
#[must_use]
pub fn current_item_index<T>(pos: Position, items: Option<&[T]>, span: impl Fn(&T) -> Range) -> Option<usize> {
	let items = items?;
	if items.is_empty() {
		return None;
	}
	let next = next_item_index(pos, Some(items), |item| span(item).from, false);
	let candidate = next.map_or(Some(items.len() - 1), |i| i.checked_sub(1));
	if let Some(i) = candidate {
		if inside(pos, span(&items[i]), true, true) {
			return Some(i);
		}
	}
	let following = candidate.map_or(0, |i| i + 1);
	items.get(following).filter(|item| inside(pos, span(item), true, true)).map(|_| following)
}

/// [`next_item_index`] over [`Locatable`] items.
#[must_use]
pub fn next_index_by<T: Locatable>(pos: Position, items: Option<&[T]>, edge: Edge, reverse: bool) -> Option<usize> {
	next_item_index(pos, items, |item| edge.of(item), reverse)
}

/// [`current_item_index`] over [`Locatable`] items.
#[must_use]
pub fn current_index_of<T: Locatable>(pos: Position, items: Option<&[T]>) -> Option<usize> {
	current_item_index(pos, items, T::range)
}
