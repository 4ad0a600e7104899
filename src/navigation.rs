use tracing::debug;

use crate::{
	document::{DocumentId, LinkOccurrence},
	host::{Editor, Vault},
	link::{LinkFormatError, ParsedLink},
	locate::{Edge, current_index_of, next_index_by},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
	Next,
	Previous,
}

impl NavDirection {
	#[must_use]
	pub const fn is_reverse(self) -> bool {
		matches!(self, Self::Previous)
	}
}

pub(crate) fn links_of(vault: &impl Vault, doc: &DocumentId) -> Vec<LinkOccurrence> {
	vault.index(doc).map(|index| index.links).unwrap_or_default()
}

/// Move the cursor to the end of the next (or previous) link in `doc`.
///
/// Returns the index of the link moved to, `None` if there was none.
pub fn go_to_next_link(
	vault: &impl Vault,
	editor: &mut impl Editor,
	doc: &DocumentId,
	direction: NavDirection,
) -> Option<usize> {
	let links = links_of(vault, doc);
	let cursor = editor.cursor();
	let Some(index) = next_index_by(cursor, Some(links.as_slice()), Edge::End, direction.is_reverse()) else {
		debug!(%doc, ?cursor, ?direction, "no link to move to");
		return None;
	};
	editor.set_cursor(links[index].position.end.to_position());
	Some(index)
}

/// The link under the cursor, with its index in `doc`'s link list.
#[must_use]
pub fn link_at_cursor(vault: &impl Vault, editor: &impl Editor, doc: &DocumentId) -> Option<(usize, LinkOccurrence)> {
	let mut links = links_of(vault, doc);
	let index = current_index_of(editor.cursor(), Some(links.as_slice()))?;
	Some((index, links.swap_remove(index)))
}

/// Replace the link under the cursor with its display text.
///
/// Returns whether a link was removed.
///
/// # Errors
///
/// Returns [`LinkFormatError`] if the link's source text cannot be parsed.
pub fn remove_link_at_cursor(
	vault: &impl Vault,
	editor: &mut impl Editor,
	doc: &DocumentId,
) -> Result<bool, LinkFormatError> {
	let Some((index, link)) = link_at_cursor(vault, &*editor, doc) else {
		return Ok(false);
	};
	let parsed = ParsedLink::parse(&link.original)?;
	debug!(%doc, index, original = %link.original, "removing link");
	editor.replace_range(parsed.display_text(), link.position.start.to_position(), link.position.end.to_position());
	Ok(true)
}
