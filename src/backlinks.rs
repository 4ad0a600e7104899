//! Group and rewrite the link texts other notes use to point at a note.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::{document::DocumentId, host::Vault, link::ParsedLink};

/// Original link text mapped to the notes containing it.
pub type LinkVarieties = BTreeMap<String, BTreeSet<DocumentId>>;

/// Every distinct link text in `sources` that resolves to `target`.
#[must_use]
pub fn link_varieties(vault: &impl Vault, target: &DocumentId, sources: &[DocumentId]) -> LinkVarieties {
	let mut varieties = LinkVarieties::new();
	for source in sources {
		let Some(index) = vault.index(source) else { continue };
		for link in index.links {
			let parsed = match ParsedLink::parse(&link.original) {
				Ok(parsed) => parsed,
				Err(err) => {
					debug!(%source, %err, "skipping link");
					continue;
				}
			};
			if vault.resolve_link(&parsed.target_name, source).as_ref() == Some(target) {
				varieties.entry(link.original).or_default().insert(source.clone());
			}
		}
	}
	varieties
}

/// [`link_varieties`] over every note in the vault.
#[must_use]
pub fn backlink_varieties(vault: &impl Vault, target: &DocumentId) -> LinkVarieties {
	link_varieties(vault, target, &vault.all_notes())
}

/// Replace every literal occurrence of `from` in `text` with `to`.
#[must_use]
pub fn rewrite_link_text(text: &str, from: &str, to: &str) -> String {
	if from.is_empty() {
		return text.to_string();
	}
	text.replace(from, to)
}

/// Replacement texts that point every variety at `new_target`, keeping anchors and aliases.
///
/// Link texts that would not change are left out.
#[must_use]
pub fn retarget_changes(varieties: &LinkVarieties, new_target: &str) -> BTreeMap<String, String> {
	varieties
		.keys()
		.filter_map(|original| {
			let retargeted = ParsedLink::parse(original).ok()?.with_target(new_target).to_link_text();
			(retargeted != *original).then(|| (original.clone(), retargeted))
		})
		.collect()
}

/// Apply `changes` (old link text to new) to every note listed in `varieties`.
///
/// Unchanged or unmentioned link texts are left alone. Returns the number of
/// note rewrites that actually changed a note.
///
/// # Errors
///
/// Returns an error if a note cannot be read or written.
pub fn apply_link_changes(
	vault: &mut impl Vault,
	varieties: &LinkVarieties,
	changes: &BTreeMap<String, String>,
) -> Result<usize> {
	let mut rewrites = 0;
	for (original, docs) in varieties {
		let Some(replacement) = changes.get(original).filter(|new| *new != original) else { continue };
		for doc in docs {
			let text = vault.read(doc).with_context(|| format!("Failed to read {doc}"))?;
			let rewritten = rewrite_link_text(&text, original, replacement);
			if rewritten == text {
				debug!(%doc, from = %original, "link text no longer present");
				continue;
			}
			vault.modify(doc, &rewritten).with_context(|| format!("Failed to rewrite links in {doc}"))?;
			rewrites += 1;
		}
		info!(from = %original, to = %replacement, notes = docs.len(), "rewrote backlinks");
	}
	Ok(rewrites)
}
