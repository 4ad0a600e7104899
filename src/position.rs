use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A zero-based line/column position in an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
	pub line: usize,
	pub ch: usize,
}

impl Position {
	#[must_use]
	pub const fn new(line: usize, ch: usize) -> Self {
		Self { line, ch }
	}
}

impl Ord for Position {
	fn cmp(&self, other: &Self) -> Ordering {
		self.line.cmp(&other.line).then(self.ch.cmp(&other.ch))
	}
}

impl PartialOrd for Position {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl From<Loc> for Position {
	fn from(loc: Loc) -> Self {
		loc.to_position()
	}
}

/// A location as reported by the host's metadata index.
///
/// Hosts disagree on the column field name, so both `col` and `ch` are accepted.
/// `col` wins when both are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Loc {
	pub line: usize,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub col: Option<usize>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ch: Option<usize>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub offset: Option<usize>,
}

impl Loc {
	#[must_use]
	pub const fn new(line: usize, col: usize) -> Self {
		Self { line, col: Some(col), ch: None, offset: None }
	}

	#[must_use]
	pub const fn with_offset(mut self, offset: usize) -> Self {
		self.offset = Some(offset);
		self
	}

	#[must_use]
	pub const fn to_position(self) -> Position {
		let ch = match (self.col, self.ch) {
			(Some(col), _) => col,
			(None, Some(ch)) => ch,
			(None, None) => 0,
		};
		Position { line: self.line, ch }
	}
}

impl From<Position> for Loc {
	fn from(pos: Position) -> Self {
		Self::new(pos.line, pos.ch)
	}
}

/// A pair of positions with `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Range {
	pub from: Position,
	pub to: Position,
}

impl Range {
	#[must_use]
	pub const fn new(from: Position, to: Position) -> Self {
		Self { from, to }
	}

	#[must_use]
	pub const fn from_locs(from: Loc, to: Loc) -> Self {
		Self { from: from.to_position(), to: to.to_position() }
	}

	/// Whether `pos` lies in this range, inclusive on both ends.
	#[must_use]
	pub const fn contains(&self, pos: Position) -> bool {
		inside(pos, *self, true, true)
	}
}

/// Returns `true` if `pos` comes before `other`.
///
/// With `allow_equal`, identical positions also count as "before".
#[must_use]
pub const fn before(pos: Position, other: Position, allow_equal: bool) -> bool {
	pos.line < other.line || (pos.line == other.line && (pos.ch < other.ch || (allow_equal && pos.ch == other.ch)))
}

/// Returns `true` if `pos` is within `range`, each endpoint included or not independently.
#[must_use]
pub const fn inside(pos: Position, range: Range, include_from: bool, include_to: bool) -> bool {
	before(range.from, pos, include_from) && before(pos, range.to, include_to)
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	const fn p(line: usize, ch: usize) -> Position {
		Position::new(line, ch)
	}

	#[rstest]
	#[case(p(0, 0))]
	#[case(p(3, 7))]
	#[case(p(100, 0))]
	fn before_is_reflexive_only_with_allow_equal(#[case] pos: Position) {
		assert!(before(pos, pos, true));
		assert!(!before(pos, pos, false));
	}

	#[rstest]
	#[case(p(0, 5), p(1, 0), true)]
	#[case(p(1, 0), p(0, 5), false)]
	#[case(p(2, 3), p(2, 4), true)]
	#[case(p(2, 4), p(2, 3), false)]
	fn before_compares_line_then_column(#[case] a: Position, #[case] b: Position, #[case] expected: bool) {
		assert_eq!(before(a, b, false), expected);
		assert_eq!(before(a, b, true), expected);
		assert_eq!(a < b, expected);
	}

	#[test]
	fn inside_strictly_between_ignores_inclusivity() {
		let range = Range::new(p(1, 2), p(3, 4));
		for pos in [p(1, 3), p(2, 0), p(3, 3)] {
			assert!(inside(pos, range, true, true));
			assert!(inside(pos, range, false, false));
		}
	}

	#[rstest]
	#[case(true, true, true, true)]
	#[case(false, true, false, true)]
	#[case(true, false, true, false)]
	#[case(false, false, false, false)]
	fn inside_boundaries_follow_inclusivity(
		#[case] include_from: bool,
		#[case] include_to: bool,
		#[case] at_from: bool,
		#[case] at_to: bool,
	) {
		let range = Range::new(p(1, 2), p(1, 9));
		assert_eq!(inside(range.from, range, include_from, include_to), at_from);
		assert_eq!(inside(range.to, range, include_from, include_to), at_to);
	}

	#[test]
	fn inside_rejects_positions_outside() {
		let range = Range::new(p(1, 2), p(1, 9));
		assert!(!inside(p(1, 1), range, true, true));
		assert!(!inside(p(1, 10), range, true, true));
		assert!(!inside(p(0, 5), range, true, true));
		assert!(!range.contains(p(2, 0)));
	}

	#[test]
	fn loc_conversion_prefers_col_over_ch() {
		let both = Loc { line: 4, col: Some(2), ch: Some(9), offset: None };
		assert_eq!(both.to_position(), p(4, 2));
		let ch_only = Loc { line: 4, col: None, ch: Some(9), offset: None };
		assert_eq!(Position::from(ch_only), p(4, 9));
		let neither = Loc { line: 4, col: None, ch: None, offset: None };
		assert_eq!(neither.to_position(), p(4, 0));
	}

	#[test]
	fn range_from_locs_converts_both_ends() {
		let range = Range::from_locs(Loc::new(0, 1), Loc::new(2, 3));
		assert_eq!(range, Range::new(p(0, 1), p(2, 3)));
	}
}
