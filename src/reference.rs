//! Reference names, notation notes and folder index notes.

use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::{
	config::Settings,
	document::{DocumentId, LinkOccurrence},
	host::{PaneId, Vault, Workspace},
	link::ParsedLink,
	position::Position,
	text::path_accepted_string,
};

const INDEX_PREFIX: &str = "_index";

fn reference_link_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"!?\[\[_reference_(.+?)\]\]").expect("valid reference link pattern"))
}

fn reference_in(text: &str) -> Option<String> {
	reference_link_re().captures(text).map(|c| c[1].to_string())
}

fn link_target(link: &LinkOccurrence) -> Option<String> {
	if !link.link.is_empty() {
		return Some(link.link.clone());
	}
	ParsedLink::parse(&link.original).ok().map(|parsed| parsed.target_name)
}

/// The reference a note belongs to.
///
/// Looks for a `[[_reference_<name>]]` link in the note itself, then in the
/// notes it links to, and falls back to the configured reference name.
///
/// # Errors
///
/// Returns an error if the note itself cannot be read. Linked notes that
/// cannot be read are skipped.
pub fn reference_name(vault: &impl Vault, doc: &DocumentId, settings: &Settings) -> Result<String> {
	let text = vault.read(doc).with_context(|| format!("Failed to read {doc}"))?;
	if let Some(name) = reference_in(&text) {
		return Ok(name);
	}
	let links = vault.index(doc).map(|index| index.links).unwrap_or_default();
	for link in &links {
		let Some(linked) = link_target(link).and_then(|target| vault.resolve_link(&target, doc)) else { continue };
		match vault.read(&linked) {
			Ok(linked_text) => {
				if let Some(name) = reference_in(&linked_text) {
					return Ok(name);
				}
			}
			Err(err) => debug!(%linked, %err, "skipping unreadable linked note"),
		}
	}
	Ok(settings.reference_name.clone())
}

/// Path for a new notation note, numbered `_0`, `_1`, ... when the plain name is taken.
#[must_use]
pub fn notation_note_path(folder: &str, reference_name: &str, notation: &str, exists: impl Fn(&str) -> bool) -> String {
	let stem = format!("{reference_name}_notation_{}", path_accepted_string(notation));
	let base = if folder.is_empty() { stem } else { format!("{folder}/{stem}") };
	let plain = format!("{base}.md");
	if !exists(&plain) {
		return plain;
	}
	(0..).map(|n| format!("{base}_{n}.md")).find(|path| !exists(path)).unwrap_or(plain)
}

#[must_use]
pub fn notation_note_text(notation: &str, main_basename: &str) -> String {
	format!("{notation} [[{main_basename}|denotes]] ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotationNote {
	pub doc: DocumentId,
	pub pane: PaneId,
	/// Where the host should put the cursor: the end of the note's text.
	pub cursor: Position,
}

/// Create a notation note next to `main` and open it in a new, focused pane.
///
/// # Errors
///
/// Returns an error if the note cannot be created or opened.
pub fn create_notation_note(
	vault: &mut impl Vault,
	workspace: &mut impl Workspace,
	main: &DocumentId,
	reference_name: &str,
	notation: &str,
) -> Result<NotationNote> {
	let path = notation_note_path(main.folder(), reference_name, notation, |p| vault.exists(p));
	let text = notation_note_text(notation, main.basename());
	let doc = vault.create(&path, &text).with_context(|| format!("Failed to create notation note {path}"))?;
	let pane = workspace.open_in_new_pane(&doc)?;
	workspace.focus(pane);
	debug!(%doc, ?pane, "created notation note");
	Ok(NotationNote { doc, pane, cursor: Position::new(0, text.chars().count()) })
}

fn parent_folder(folder: &str) -> Option<&str> {
	if folder.is_empty() {
		return None;
	}
	Some(folder.rfind('/').map_or("", |slash| &folder[..slash]))
}

/// The nearest `_index` note in `doc`'s folder or one of its ancestors.
///
/// For an index note the search starts one folder up, so repeated calls climb
/// the hierarchy.
#[must_use]
pub fn find_index_note(vault: &impl Vault, doc: &DocumentId) -> Option<DocumentId> {
	let mut folder = if doc.name().starts_with(INDEX_PREFIX) { parent_folder(doc.folder()) } else { Some(doc.folder()) };
	while let Some(current) = folder {
		if let Some(index) = vault.folder_notes(current).into_iter().find(|note| note.name().starts_with(INDEX_PREFIX)) {
			return Some(index);
		}
		folder = parent_folder(current);
	}
	None
}

/// Byte offset of the first link to `basename` in an index note's text.
#[must_use]
pub fn link_offset_in_index(index_text: &str, basename: &str) -> Option<usize> {
	let pattern = format!(r"\[\[{}(\|.*?)?\]\]", regex::escape(basename));
	Regex::new(&pattern).ok()?.find(index_text).map(|m| m.start())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLocation {
	pub index: DocumentId,
	/// Offset of the link back to the starting note, if the index has one.
	pub link_offset: Option<usize>,
}

/// Find the index note for `doc` and where it links back to `doc`.
///
/// # Errors
///
/// Returns an error if the index note cannot be read.
pub fn locate_in_index(vault: &impl Vault, doc: &DocumentId) -> Result<Option<IndexLocation>> {
	let Some(index) = find_index_note(vault, doc) else {
		debug!(%doc, "no index note found");
		return Ok(None);
	};
	let text = vault.read(&index).with_context(|| format!("Failed to read {index}"))?;
	let link_offset = link_offset_in_index(&text, doc.basename());
	Ok(Some(IndexLocation { index, link_offset }))
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;
	use crate::{
		document::DocumentIndex,
		test_support::{MemoryVault, RecordingWorkspace, links_on_line},
	};

	#[test]
	fn reference_name_prefers_the_note_itself() {
		let mut vault = MemoryVault::default();
		let doc = vault.add("n.md", "see ![[_reference_hartshorne]] and [[_reference_other]]", DocumentIndex::default());
		assert_eq!(reference_name(&vault, &doc, &Settings::default()).unwrap(), "hartshorne");
	}

	#[test]
	fn reference_name_falls_back_to_linked_notes_then_settings() {
		let mut vault = MemoryVault::default();
		vault.add_unindexed("plain.md", "nothing here");
		vault.add_unindexed("hub.md", "[[_reference_stacks]]");
		let doc = vault.add("n.md", "", links_on_line(&[(0, 9, "[[plain]]"), (10, 18, "[[hub]]"), (20, 30, "[[missing]]")]));
		assert_eq!(reference_name(&vault, &doc, &Settings::default()).unwrap(), "stacks");

		let lonely = vault.add("lonely.md", "", links_on_line(&[(0, 9, "[[plain]]")]));
		let settings = Settings { reference_name: "default_ref".to_string(), ..Settings::default() };
		assert_eq!(reference_name(&vault, &lonely, &settings).unwrap(), "default_ref");
	}

	#[rstest]
	#[case("alg", &[], "alg/ref_notation_H_i.md")]
	#[case("alg", &["alg/ref_notation_H_i.md"], "alg/ref_notation_H_i_0.md")]
	#[case("alg", &["alg/ref_notation_H_i.md", "alg/ref_notation_H_i_0.md"], "alg/ref_notation_H_i_1.md")]
	#[case("", &[], "ref_notation_H_i.md")]
	fn test_notation_note_path(#[case] folder: &str, #[case] taken: &[&str], #[case] expected: &str) {
		assert_eq!(notation_note_path(folder, "ref", "$H^i$", |p| taken.contains(&p)), expected);
	}

	#[test]
	fn notation_note_is_created_and_opened() {
		let mut vault = MemoryVault::default();
		let main = vault.add_unindexed("alg/ring.md", "");
		let mut workspace = RecordingWorkspace::default();
		let note = create_notation_note(&mut vault, &mut workspace, &main, "ref", "R").unwrap();
		assert_eq!(note.doc, DocumentId::new("alg/ref_notation_R.md"));
		assert_eq!(vault.read(&note.doc).unwrap(), "R [[ring|denotes]] ");
		assert_eq!(note.cursor, Position::new(0, 19));
		assert_eq!(workspace.focused, vec![note.pane]);
	}

	fn index_vault() -> MemoryVault {
		let mut vault = MemoryVault::default();
		vault.add_unindexed("_index_root.md", "[[a]]");
		vault.add_unindexed("a/_index_a.md", "- [[deep|Deep note]]");
		vault.add_unindexed("a/b/deep.md", "");
		vault.add_unindexed("a/b/c/_index_c.md", "");
		vault.add_unindexed("x/y.md", "");
		vault
	}

	#[rstest]
	#[case("a/b/deep.md", Some("a/_index_a.md"))]
	#[case("a/_index_a.md", Some("_index_root.md"))]
	#[case("a/b/c/_index_c.md", Some("a/_index_a.md"))]
	#[case("x/y.md", Some("_index_root.md"))]
	#[case("_index_root.md", None)]
	fn test_find_index_note(#[case] doc: &str, #[case] expected: Option<&str>) {
		let found = find_index_note(&index_vault(), &DocumentId::new(doc));
		assert_eq!(found.as_ref().map(DocumentId::path), expected);
	}

	#[test]
	fn index_location_points_at_link_back() {
		let vault = index_vault();
		let location = locate_in_index(&vault, &DocumentId::new("a/b/deep.md")).unwrap().unwrap();
		assert_eq!(location.index, DocumentId::new("a/_index_a.md"));
		assert_eq!(location.link_offset, Some(2));
		assert_eq!(link_offset_in_index("[[deeper]] [[deep]]", "deep"), Some(11));
	}
}
