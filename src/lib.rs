#![warn(clippy::all, clippy::nursery, clippy::pedantic)]

pub mod backlinks;
pub mod config;
pub mod document;
pub mod footnote;
pub mod frontmatter;
pub mod host;
pub mod html;
pub mod link;
pub mod locate;
pub mod logging;
pub mod navigation;
pub mod pane;
pub mod position;
pub mod reference;
#[cfg(test)]
mod test_support;
pub mod text;

pub use config::Settings;
pub use document::{DocumentId, DocumentIndex, LinkOccurrence};
pub use host::{Editor, PaneId, ReindexSignal, TextBuffer, Vault, Workspace};
pub use link::{LinkFormatError, LinkGrammar, ParsedLink};
pub use navigation::NavDirection;
pub use pane::{NavigationPanes, OpenOutcome, StepOutcome};
pub use position::{Loc, Position, Range};
