//! Flow-style list lines (`tags: [a, b]`, `aliases: [x]`) in a note's frontmatter.

use std::ops::Range as ByteRange;

use anyhow::Result;
use tracing::debug;

use crate::{
	config::Settings,
	document::{DocumentId, DocumentIndex},
	host::Vault,
	html::definitions,
	text::{path_accepted_string, text_without_footnote_marker},
};

const FENCE: &str = "---";

/// Whether the text opens with a `---` fence that is closed later on.
#[must_use]
pub fn has_frontmatter(text: &str) -> bool {
	let trimmed = text.trim();
	trimmed.starts_with(FENCE) && trimmed.get(FENCE.len() + 1..).is_some_and(|rest| rest.contains(FENCE))
}

/// Byte range of the `key: [...]` line inside the frontmatter, newline excluded.
#[must_use]
pub fn find_list_line(text: &str, key: &str) -> Option<ByteRange<usize>> {
	if !has_frontmatter(text) {
		return None;
	}
	let body_start = text.find(FENCE)? + FENCE.len();
	let body_end = body_start + text[body_start..].find(FENCE)?;
	let needle = format!("{key}: [");
	let start = text[body_start..body_end]
		.match_indices(&needle)
		.map(|(i, _)| body_start + i)
		.find(|&i| text[..i].ends_with('\n'))?;
	let end = text[start..].find('\n').map_or(text.len(), |i| start + i);
	Some(start..end)
}

fn replace_list_line(text: &str, key: &str, items: &[String]) -> Option<String> {
	let line = find_list_line(text, key)?;
	Some(format!("{}{key}: [{}]{}", &text[..line.start], items.join(", "), &text[line.end..]))
}

/// Add `tag` to the frontmatter tags, or remove it if present.
///
/// A tag counts as present when either `tag` or `_auto/<tag>` is listed; with
/// `toggle_auto` the `_auto/` variant is removed too. `None` when the note has
/// no `tags: [...]` line.
#[must_use]
pub fn toggle_tag(text: &str, current_tags: &[String], tag: &str, toggle_auto: bool) -> Option<String> {
	let auto_tag = format!("_auto/{tag}");
	let mut tags = current_tags.to_vec();
	if tags.iter().any(|t| t == tag || *t == auto_tag) {
		tags.retain(|t| t != tag && !(toggle_auto && *t == auto_tag));
	} else {
		tags.push(tag.to_string());
	}
	replace_list_line(text, "tags", &tags)
}

/// Rewrite the frontmatter aliases line. `None` when the note has no `aliases: [...]` line.
#[must_use]
pub fn replace_aliases(text: &str, aliases: &[String]) -> Option<String> {
	replace_list_line(text, "aliases", aliases)
}

/// Existing aliases followed by new ones built from headings and `definition` attributes.
#[must_use]
pub fn aliases_from_headings_and_definitions(index: &DocumentIndex, text: &str, settings: &Settings) -> Vec<String> {
	let existing = index.frontmatter_aliases();
	let headings = index
		.heading_titles()
		.into_iter()
		.map(text_without_footnote_marker)
		.filter(|heading| !settings.is_excluded_heading(heading));
	let mut aliases = existing.to_vec();
	for candidate in headings.chain(definitions(text)) {
		let alias = format!("{}_{}", settings.reference_name, path_accepted_string(&candidate));
		if !aliases.contains(&alias) {
			aliases.push(alias);
		}
	}
	aliases
}

/// Toggle `tag` in the note's frontmatter and save it. Returns whether the note changed.
///
/// # Errors
///
/// Returns an error if the note cannot be read or written.
pub fn toggle_tag_in_note(vault: &mut impl Vault, doc: &DocumentId, tag: &str, settings: &Settings) -> Result<bool> {
	let text = vault.read(doc)?;
	let current = vault.index(doc).map(|index| index.frontmatter_tags().to_vec()).unwrap_or_default();
	let Some(updated) = toggle_tag(&text, &current, tag, settings.toggle_auto_tags) else {
		debug!(%doc, "no tags line in frontmatter");
		return Ok(false);
	};
	vault.modify(doc, &updated)?;
	Ok(true)
}

/// Append heading and definition aliases to the note's frontmatter and save it.
///
/// # Errors
///
/// Returns an error if the note cannot be read or written.
pub fn update_aliases_in_note(vault: &mut impl Vault, doc: &DocumentId, settings: &Settings) -> Result<bool> {
	let text = vault.read(doc)?;
	let index = vault.index(doc).unwrap_or_default();
	let aliases = aliases_from_headings_and_definitions(&index, &text, settings);
	let Some(updated) = replace_aliases(&text, &aliases) else {
		debug!(%doc, "no aliases line in frontmatter");
		return Ok(false);
	};
	vault.modify(doc, &updated)?;
	Ok(true)
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;
	use crate::{
		document::{Frontmatter, Heading, SourceSpan},
		test_support::MemoryVault,
	};

	const NOTE: &str = "---\ncssclass: clean\ntags: [algebra, _auto/ring]\naliases: [old]\n---\n# Body\n";

	fn tags(list: &[&str]) -> Vec<String> {
		list.iter().map(ToString::to_string).collect()
	}

	#[rstest]
	#[case(NOTE, true)]
	#[case("  \n---\na: b\n---", true)]
	#[case("---\nunterminated", false)]
	#[case("----", false)]
	#[case("no meta", false)]
	fn test_has_frontmatter(#[case] text: &str, #[case] expected: bool) {
		assert_eq!(has_frontmatter(text), expected);
	}

	#[test]
	fn list_line_is_found_inside_frontmatter_only() {
		let range = find_list_line(NOTE, "tags").unwrap();
		assert_eq!(&NOTE[range], "tags: [algebra, _auto/ring]");
		assert!(find_list_line("---\na: b\n---\ntags: [x]\n", "tags").is_none());
		assert!(find_list_line("---\nsubtags: [x]\n---\n", "tags").is_none());
	}

	#[rstest]
	#[case(&["algebra"], "ring", true, "tags: [algebra, ring]")]
	#[case(&["algebra", "ring"], "ring", true, "tags: [algebra]")]
	#[case(&["algebra", "_auto/ring"], "ring", true, "tags: [algebra]")]
	#[case(&["algebra", "_auto/ring"], "ring", false, "tags: [algebra, _auto/ring]")]
	#[case(&["ring", "_auto/ring"], "ring", false, "tags: [_auto/ring]")]
	#[case(&[], "ring", true, "tags: [ring]")]
	fn test_toggle_tag(#[case] current: &[&str], #[case] tag: &str, #[case] toggle_auto: bool, #[case] line: &str) {
		let updated = toggle_tag(NOTE, &tags(current), tag, toggle_auto).unwrap();
		assert_eq!(updated, NOTE.replace("tags: [algebra, _auto/ring]", line));
	}

	#[test]
	fn toggle_without_tags_line_changes_nothing() {
		assert!(toggle_tag("---\naliases: []\n---\n", &[], "x", true).is_none());
		assert!(toggle_tag("plain text", &[], "x", true).is_none());
	}

	#[test]
	fn aliases_line_at_end_of_text_is_replaced() {
		let text = "---\naliases: [a]\n---";
		assert_eq!(replace_aliases(text, &tags(&["b", "c"])).unwrap(), "---\naliases: [b, c]\n---");
	}

	fn heading(title: &str) -> Heading {
		Heading { heading: title.to_string(), level: 2, position: SourceSpan::default() }
	}

	#[test]
	fn aliases_come_from_headings_and_definitions() {
		let index = DocumentIndex {
			headings: vec![heading("Ring homomorphism[^1]"), heading("See Also"), heading("Kernel"), heading("Kernel")],
			frontmatter: Some(Frontmatter { aliases: tags(&["ref_Kernel"]), tags: Vec::new() }),
			..DocumentIndex::default()
		};
		let settings = Settings { reference_name: "ref".to_string(), ..Settings::default() };
		let text = "<b definition=\"ideal;prime ideal\">I</b>";
		assert_eq!(
			aliases_from_headings_and_definitions(&index, text, &settings),
			tags(&["ref_Kernel", "ref_Ring_homomorphism", "ref_ideal", "ref_prime_ideal"])
		);
	}

	#[test]
	fn toggle_tag_in_note_saves_the_note() {
		let mut vault = MemoryVault::default();
		let index = DocumentIndex {
			frontmatter: Some(Frontmatter { aliases: Vec::new(), tags: tags(&["algebra", "_auto/ring"]) }),
			..DocumentIndex::default()
		};
		let doc = vault.add("n.md", NOTE, index);
		assert!(toggle_tag_in_note(&mut vault, &doc, "ring", &Settings::default()).unwrap());
		assert!(vault.read(&doc).unwrap().contains("tags: [algebra]\n"));
	}

	#[test]
	fn update_aliases_without_aliases_line_leaves_note_alone() {
		let mut vault = MemoryVault::default();
		let doc = vault.add("n.md", "---\ntags: []\n---\n", DocumentIndex::default());
		assert!(!update_aliases_in_note(&mut vault, &doc, &Settings::default()).unwrap());
		assert_eq!(vault.read(&doc).unwrap(), "---\ntags: []\n---\n");
	}
}
