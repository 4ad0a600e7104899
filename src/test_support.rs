//! Host fakes shared by the command tests.

use std::{
	cell::{Cell, RefCell},
	collections::HashMap,
	sync::Arc,
	time::Duration,
};

use anyhow::{Result, anyhow};

use crate::{
	document::{DocumentId, DocumentIndex, LinkOccurrence},
	host::{PaneId, ReindexSignal, Vault, Workspace},
	position::Loc,
};

#[derive(Default)]
pub struct MemoryVault {
	pub texts: HashMap<DocumentId, String>,
	pub indexes: HashMap<DocumentId, DocumentIndex>,
	pub resolve_calls: Cell<usize>,
}

impl MemoryVault {
	pub fn add(&mut self, path: &str, text: &str, index: DocumentIndex) -> DocumentId {
		let id = DocumentId::new(path);
		self.texts.insert(id.clone(), text.to_string());
		self.indexes.insert(id.clone(), index);
		id
	}

	/// A note the index has not caught up with yet.
	pub fn add_unindexed(&mut self, path: &str, text: &str) -> DocumentId {
		let id = DocumentId::new(path);
		self.texts.insert(id.clone(), text.to_string());
		id
	}
}

impl Vault for MemoryVault {
	fn index(&self, doc: &DocumentId) -> Option<DocumentIndex> {
		self.indexes.get(doc).cloned()
	}

	fn resolve_link(&self, target: &str, _source: &DocumentId) -> Option<DocumentId> {
		self.resolve_calls.set(self.resolve_calls.get() + 1);
		let mut notes: Vec<&DocumentId> = self.texts.keys().collect();
		notes.sort();
		notes.into_iter().find(|id| id.basename() == target || id.path() == target).cloned()
	}

	fn read(&self, doc: &DocumentId) -> Result<String> {
		self.texts.get(doc).cloned().ok_or_else(|| anyhow!("missing note {doc}"))
	}

	fn modify(&mut self, doc: &DocumentId, text: &str) -> Result<()> {
		self.texts.insert(doc.clone(), text.to_string());
		Ok(())
	}

	fn create(&mut self, path: &str, text: &str) -> Result<DocumentId> {
		if self.exists(path) {
			return Err(anyhow!("note {path} already exists"));
		}
		Ok(self.add_unindexed(path, text))
	}

	fn exists(&self, path: &str) -> bool {
		self.texts.keys().any(|id| id.path() == path)
	}

	fn folder_notes(&self, folder: &str) -> Vec<DocumentId> {
		let mut notes: Vec<DocumentId> = self.texts.keys().filter(|id| id.folder() == folder).cloned().collect();
		notes.sort();
		notes
	}

	fn all_notes(&self) -> Vec<DocumentId> {
		let mut notes: Vec<DocumentId> = self.texts.keys().cloned().collect();
		notes.sort();
		notes
	}
}

/// Records pane actions; reindex waits always time out.
#[derive(Default)]
pub struct RecordingWorkspace {
	pub opened: Vec<(PaneId, DocumentId)>,
	pub focused: Vec<PaneId>,
	pub waits: Cell<usize>,
	next_pane: u64,
}

impl Workspace for RecordingWorkspace {
	fn open_in_new_pane(&mut self, doc: &DocumentId) -> Result<PaneId> {
		self.next_pane += 1;
		let pane = PaneId(self.next_pane);
		self.opened.push((pane, doc.clone()));
		Ok(pane)
	}

	fn open_in_pane(&mut self, pane: PaneId, doc: &DocumentId) -> Result<()> {
		self.opened.push((pane, doc.clone()));
		Ok(())
	}

	fn focus(&mut self, pane: PaneId) {
		self.focused.push(pane);
	}

	fn wait_for_reindex(&self, _doc: &DocumentId, _timeout: Duration) -> bool {
		self.waits.set(self.waits.get() + 1);
		false
	}
}

/// Pane actions as in [`RecordingWorkspace`]; reindex waits go through a [`ReindexSignal`].
#[derive(Default)]
pub struct SignalWorkspace {
	pub panes: RecordingWorkspace,
	pub signal: Arc<ReindexSignal>,
	pub wait_results: RefCell<Vec<bool>>,
}

impl Workspace for SignalWorkspace {
	fn open_in_new_pane(&mut self, doc: &DocumentId) -> Result<PaneId> {
		self.panes.open_in_new_pane(doc)
	}

	fn open_in_pane(&mut self, pane: PaneId, doc: &DocumentId) -> Result<()> {
		self.panes.open_in_pane(pane, doc)
	}

	fn focus(&mut self, pane: PaneId) {
		self.panes.focus(pane);
	}

	fn wait_for_reindex(&self, doc: &DocumentId, timeout: Duration) -> bool {
		let notified = self.signal.wait(doc, timeout);
		self.wait_results.borrow_mut().push(notified);
		notified
	}
}

/// Links on line 0 with the given `(start, end)` columns and source texts.
pub fn links_on_line(spans: &[(usize, usize, &str)]) -> DocumentIndex {
	let links = spans
		.iter()
		.map(|&(start, end, original)| {
			LinkOccurrence::new(original, Loc::new(0, start).with_offset(start), Loc::new(0, end).with_offset(end))
		})
		.collect();
	DocumentIndex { links, ..DocumentIndex::default() }
}
