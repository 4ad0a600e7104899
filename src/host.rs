//! The editor application, as seen from the command logic.

use std::{
	collections::HashMap,
	sync::{Condvar, Mutex, PoisonError},
	time::Duration,
};

use anyhow::Result;

use crate::{
	document::{DocumentId, DocumentIndex},
	position::Position,
};

/// Note storage plus the host's metadata index.
pub trait Vault {
	/// Metadata snapshot for `doc`, `None` while the host has not indexed it yet.
	fn index(&self, doc: &DocumentId) -> Option<DocumentIndex>;

	/// Resolve a link target as written in `source` to an existing note.
	fn resolve_link(&self, target: &str, source: &DocumentId) -> Option<DocumentId>;

	/// Read a note's full text.
	///
	/// # Errors
	///
	/// Returns an error if the note cannot be read.
	fn read(&self, doc: &DocumentId) -> Result<String>;

	/// Replace a note's full text.
	///
	/// # Errors
	///
	/// Returns an error if the note cannot be written.
	fn modify(&mut self, doc: &DocumentId, text: &str) -> Result<()>;

	/// Create a note at `path` with `text`.
	///
	/// # Errors
	///
	/// Returns an error if the note already exists or cannot be written.
	fn create(&mut self, path: &str, text: &str) -> Result<DocumentId>;

	fn exists(&self, path: &str) -> bool;

	/// Notes directly inside `folder` (not recursive).
	fn folder_notes(&self, folder: &str) -> Vec<DocumentId>;

	/// Every note the vault knows about.
	fn all_notes(&self) -> Vec<DocumentId>;
}

/// The text editor of one pane.
pub trait Editor {
	fn cursor(&self) -> Position;
	fn set_cursor(&mut self, pos: Position);
	fn selection(&self) -> String;
	fn value(&self) -> String;
	fn line(&self, line: usize) -> Option<String>;
	fn replace_range(&mut self, text: &str, from: Position, to: Position);
	/// Position of a byte offset into [`Editor::value`].
	fn offset_to_pos(&self, offset: usize) -> Position;
	fn pos_to_offset(&self, pos: Position) -> usize;

	fn insert_at(&mut self, text: &str, at: Position) {
		self.replace_range(text, at, at);
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaneId(pub u64);

/// Pane management and reindex notifications.
pub trait Workspace {
	/// # Errors
	///
	/// Returns an error if the host cannot create the pane.
	fn open_in_new_pane(&mut self, doc: &DocumentId) -> Result<PaneId>;

	/// # Errors
	///
	/// Returns an error if the pane no longer exists.
	fn open_in_pane(&mut self, pane: PaneId, doc: &DocumentId) -> Result<()>;

	fn focus(&mut self, pane: PaneId);

	/// Block until the host reports `doc` reindexed, or until `timeout` elapses.
	///
	/// Returns `false` on timeout.
	fn wait_for_reindex(&self, doc: &DocumentId, timeout: Duration) -> bool;
}

/// Reindex notifications that can be waited on with a deadline.
///
/// Hosts that receive "metadata resolved" events on another thread call
/// [`ReindexSignal::notify`] and implement [`Workspace::wait_for_reindex`] with
/// [`ReindexSignal::wait`].
#[derive(Debug, Default)]
pub struct ReindexSignal {
	generations: Mutex<HashMap<DocumentId, u64>>,
	changed: Condvar,
}

impl ReindexSignal {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn notify(&self, doc: &DocumentId) {
		let mut generations = self.generations.lock().unwrap_or_else(PoisonError::into_inner);
		*generations.entry(doc.clone()).or_insert(0) += 1;
		self.changed.notify_all();
	}

	/// Wait for a notification about `doc` issued after this call started.
	#[must_use]
	pub fn wait(&self, doc: &DocumentId, timeout: Duration) -> bool {
		let generations = self.generations.lock().unwrap_or_else(PoisonError::into_inner);
		let seen = generations.get(doc).copied().unwrap_or(0);
		let (_guard, result) = self
			.changed
			.wait_timeout_while(generations, timeout, |g| g.get(doc).copied().unwrap_or(0) == seen)
			.unwrap_or_else(PoisonError::into_inner);
		!result.timed_out()
	}
}

/// An in-memory [`Editor`] over a `String`.
///
/// Columns count characters; offsets are byte offsets.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
	text: String,
	cursor: Position,
	anchor: Option<Position>,
}

impl TextBuffer {
	#[must_use]
	pub fn new(text: impl Into<String>) -> Self {
		Self { text: text.into(), cursor: Position::default(), anchor: None }
	}

	#[must_use]
	pub const fn with_cursor(mut self, cursor: Position) -> Self {
		self.cursor = cursor;
		self
	}

	/// Select `from..to`, leaving the cursor at `to`.
	pub const fn select(&mut self, from: Position, to: Position) {
		self.anchor = Some(from);
		self.cursor = to;
	}

	#[must_use]
	pub fn text(&self) -> &str {
		&self.text
	}

	fn line_start(&self, line: usize) -> Option<usize> {
		if line == 0 {
			return Some(0);
		}
		self.text.match_indices('\n').nth(line - 1).map(|(idx, _)| idx + 1)
	}
}

impl Editor for TextBuffer {
	fn cursor(&self) -> Position {
		self.cursor
	}

	fn set_cursor(&mut self, pos: Position) {
		self.cursor = pos;
		self.anchor = None;
	}

	fn selection(&self) -> String {
		let Some(anchor) = self.anchor else { return String::new() };
		let (from, to) = if anchor <= self.cursor { (anchor, self.cursor) } else { (self.cursor, anchor) };
		self.text[self.pos_to_offset(from)..self.pos_to_offset(to)].to_string()
	}

	fn value(&self) -> String {
		self.text.clone()
	}

	fn line(&self, line: usize) -> Option<String> {
		self.text.split('\n').nth(line).map(str::to_string)
	}

	fn replace_range(&mut self, text: &str, from: Position, to: Position) {
		let start = self.pos_to_offset(from);
		let end = self.pos_to_offset(to).max(start);
		let cursor = self.pos_to_offset(self.cursor);
		self.text.replace_range(start..end, text);
		let mapped = if cursor >= end {
			cursor - (end - start) + text.len()
		} else if cursor > start {
			start + text.len()
		} else {
			cursor
		};
		self.cursor = self.offset_to_pos(mapped);
		self.anchor = None;
	}

	fn offset_to_pos(&self, offset: usize) -> Position {
		let mut offset = offset.min(self.text.len());
		while !self.text.is_char_boundary(offset) {
			offset -= 1;
		}
		let before = &self.text[..offset];
		let line = before.matches('\n').count();
		let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
		Position::new(line, before[line_start..].chars().count())
	}

	fn pos_to_offset(&self, pos: Position) -> usize {
		let Some(start) = self.line_start(pos.line) else { return self.text.len() };
		let line = self.text[start..].split('\n').next().unwrap_or_default();
		start + line.char_indices().nth(pos.ch).map_or(line.len(), |(idx, _)| idx)
	}
}
