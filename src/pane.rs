//! Link-walking sessions: a pane that steps through the links of a base note.

use std::{collections::HashMap, time::Duration};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::{
	config::Settings,
	document::{DocumentId, LinkOccurrence},
	host::{Editor, PaneId, Vault, Workspace},
	link::ParsedLink,
	locate::current_index_of,
	navigation::{NavDirection, links_of},
};

/// What a navigation pane is walking through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneState {
	pub current_index: usize,
	pub items: Vec<LinkOccurrence>,
	pub base_document: DocumentId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
	Opened(PaneId),
	NoLinkAtCursor,
	TargetMissing(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
	Opened { index: usize, target: DocumentId },
	AtBoundary,
	UnknownPane,
	/// Still unresolved after refreshing the link list; the index is not rolled back.
	TargetMissing { index: usize, target: String },
}

/// Navigation pane states, keyed by the pane they belong to.
#[derive(Debug)]
pub struct NavigationPanes {
	panes: HashMap<PaneId, PaneState>,
	reindex_timeout: Duration,
}

impl Default for NavigationPanes {
	fn default() -> Self {
		Self::new(Settings::default().reindex_timeout)
	}
}

fn resolve_item(vault: &impl Vault, state: &PaneState) -> Result<(String, Option<DocumentId>)> {
	let Some(item) = state.items.get(state.current_index) else {
		return Ok((String::new(), None));
	};
	let parsed = ParsedLink::parse(&item.original)?;
	let target = vault.resolve_link(&parsed.target_name, &state.base_document);
	Ok((parsed.target_name, target))
}

impl NavigationPanes {
	#[must_use]
	pub fn new(reindex_timeout: Duration) -> Self {
		Self { panes: HashMap::new(), reindex_timeout }
	}

	#[must_use]
	pub fn from_settings(settings: &Settings) -> Self {
		Self::new(settings.reindex_timeout)
	}

	#[must_use]
	pub fn state(&self, pane: PaneId) -> Option<&PaneState> {
		self.panes.get(&pane)
	}

	/// Forget a pane the host has closed.
	pub fn close(&mut self, pane: PaneId) -> Option<PaneState> {
		self.panes.remove(&pane)
	}

	/// Open the target of the link under the cursor in a new navigation pane.
	///
	/// # Errors
	///
	/// Returns an error if the link text is malformed or the host cannot open the pane.
	pub fn open(
		&mut self,
		vault: &impl Vault,
		workspace: &mut impl Workspace,
		editor: &impl Editor,
		doc: &DocumentId,
	) -> Result<OpenOutcome> {
		let links = links_of(vault, doc);
		let Some(index) = current_index_of(editor.cursor(), Some(links.as_slice())) else {
			return Ok(OpenOutcome::NoLinkAtCursor);
		};
		let parsed = ParsedLink::parse(&links[index].original)?;
		let Some(target) = vault.resolve_link(&parsed.target_name, doc) else {
			info!(%doc, target = %parsed.target_name, "link target does not exist");
			return Ok(OpenOutcome::TargetMissing(parsed.target_name));
		};
		let pane = workspace.open_in_new_pane(&target)?;
		debug!(?pane, %doc, index, %target, "opened navigation pane");
		self.panes.insert(pane, PaneState { current_index: index, items: links, base_document: doc.clone() });
		workspace.focus(pane);
		Ok(OpenOutcome::Opened(pane))
	}

	/// Move a navigation pane to the next or previous link of its base note.
	///
	/// # Errors
	///
	/// Returns an error if the link text is malformed or the host cannot open the note.
	pub fn step(
		&mut self,
		vault: &impl Vault,
		workspace: &mut impl Workspace,
		pane: PaneId,
		direction: NavDirection,
	) -> Result<StepOutcome> {
		let timeout = self.reindex_timeout;
		let Some(state) = self.panes.get_mut(&pane) else {
			return Ok(StepOutcome::UnknownPane);
		};
		match direction {
			NavDirection::Next if state.current_index + 1 < state.items.len() => state.current_index += 1,
			NavDirection::Previous if state.current_index > 0 => state.current_index -= 1,
			_ => return Ok(StepOutcome::AtBoundary),
		}
		let (mut name, mut target) = resolve_item(vault, state)?;
		if target.is_none() {
			debug!(?pane, index = state.current_index, target = %name, "link unresolved, refreshing link list");
			refresh(vault, workspace, state, timeout);
			(name, target) = resolve_item(vault, state)?;
		}
		let index = state.current_index;
		let Some(target) = target else {
			info!(?pane, index, target = %name, "link target does not exist");
			return Ok(StepOutcome::TargetMissing { index, target: name });
		};
		workspace.open_in_pane(pane, &target)?;
		Ok(StepOutcome::Opened { index, target })
	}
}

/// Re-read the base note's links once the host has reindexed it.
fn refresh(vault: &impl Vault, workspace: &impl Workspace, state: &mut PaneState, timeout: Duration) {
	if !workspace.wait_for_reindex(&state.base_document, timeout) {
		warn!(doc = %state.base_document, ?timeout, "reindex notification did not arrive, using current index");
	}
	state.items = links_of(vault, &state.base_document);
	state.current_index = state.current_index.min(state.items.len().saturating_sub(1));
}
