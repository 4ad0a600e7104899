use std::fmt::{Display, Formatter, Result as FmtResult};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
	locate::Locatable,
	position::{Loc, Position},
};

/// Vault-relative path of a note, `/`-separated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl DocumentId {
	#[must_use]
	pub fn new(path: impl Into<String>) -> Self {
		Self(path.into())
	}

	#[must_use]
	pub fn path(&self) -> &str {
		&self.0
	}

	/// File name including extension.
	#[must_use]
	pub fn name(&self) -> &str {
		self.0.rsplit('/').next().unwrap_or(&self.0)
	}

	/// File name without its extension.
	#[must_use]
	pub fn basename(&self) -> &str {
		let name = self.name();
		match name.rfind('.') {
			Some(dot) if dot > 0 => &name[..dot],
			_ => name,
		}
	}

	/// Containing folder, empty for notes at the vault root.
	#[must_use]
	pub fn folder(&self) -> &str {
		self.0.rfind('/').map_or("", |slash| &self.0[..slash])
	}
}

impl Display for DocumentId {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.write_str(&self.0)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceSpan {
	pub start: Loc,
	pub end: Loc,
}

impl SourceSpan {
	#[must_use]
	pub const fn new(start: Loc, end: Loc) -> Self {
		Self { start, end }
	}
}

/// One link as it appears in a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkOccurrence {
	pub original: String,
	#[serde(default)]
	pub link: String,
	pub position: SourceSpan,
}

impl LinkOccurrence {
	#[must_use]
	pub fn new(original: impl Into<String>, start: Loc, end: Loc) -> Self {
		Self { original: original.into(), link: String::new(), position: SourceSpan::new(start, end) }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
	pub heading: String,
	#[serde(default)]
	pub level: u8,
	pub position: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagOccurrence {
	pub tag: String,
	pub position: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Frontmatter {
	#[serde(default)]
	pub aliases: Vec<String>,
	#[serde(default)]
	pub tags: Vec<String>,
}

/// Snapshot of the host's metadata for one note.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentIndex {
	#[serde(default)]
	pub headings: Vec<Heading>,
	#[serde(default)]
	pub links: Vec<LinkOccurrence>,
	#[serde(default)]
	pub tags: Vec<TagOccurrence>,
	#[serde(default)]
	pub frontmatter: Option<Frontmatter>,
}

impl DocumentIndex {
	/// Read an index from the JSON shape hosts serialize their metadata cache to.
	///
	/// # Errors
	///
	/// Returns an error if the JSON is malformed.
	pub fn from_json(json: &str) -> Result<Self> {
		serde_json::from_str(json).context("Failed to parse document index")
	}

	#[must_use]
	pub fn heading_titles(&self) -> Vec<&str> {
		self.headings.iter().map(|h| h.heading.as_str()).collect()
	}

	#[must_use]
	pub fn frontmatter_aliases(&self) -> &[String] {
		self.frontmatter.as_ref().map(|fm| fm.aliases.as_slice()).unwrap_or_default()
	}

	#[must_use]
	pub fn frontmatter_tags(&self) -> &[String] {
		self.frontmatter.as_ref().map(|fm| fm.tags.as_slice()).unwrap_or_default()
	}
}

macro_rules! locatable_by_position {
	($($ty:ty),*) => {
		$(impl Locatable for $ty {
			fn start(&self) -> Position {
				self.position.start.to_position()
			}

			fn end(&self) -> Position {
				self.position.end.to_position()
			}
		})*
	};
}

locatable_by_position!(LinkOccurrence, Heading, TagOccurrence);
