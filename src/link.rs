use std::{
	error::Error,
	fmt::{Display, Formatter, Result as FmtResult},
	str::FromStr,
	sync::OnceLock,
};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::Regex;

use crate::text::url_decode;

const LINK_PATH: &AsciiSet = &CONTROLS.add(b' ').add(b'(').add(b')').add(b'%').add(b'#');

fn wikilink_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"!?\[\[([^#|]*?)(?:#(.*?))?(?:\|(.*?))?\]\]").expect("valid wikilink pattern"))
}

fn markdown_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"!?\[([^\]]*)\]\(([^)#]+)(?:#([^)]+))?\)").expect("valid markdown link pattern"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFormatError {
	pub text: String,
}

impl Display for LinkFormatError {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		write!(f, "Link is not formatted properly: {}", self.text)
	}
}

impl Error for LinkFormatError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkGrammar {
	Wikilink,
	Markdown,
}

/// An inline link, split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLink {
	pub is_embedded: bool,
	pub target_name: String,
	pub anchor: Option<String>,
	pub custom_text: Option<String>,
	pub grammar: LinkGrammar,
	/// Markdown target and anchor were not valid UTF-8 once decoded and are kept as written.
	verbatim: bool,
}

fn non_empty(value: Option<&str>) -> Option<String> {
	value.filter(|s| !s.is_empty()).map(str::to_string)
}

impl ParsedLink {
	/// Parse the source text of one link occurrence, delimiters included.
	///
	/// Wikilink syntax is tried first, then markdown link syntax.
	///
	/// # Errors
	///
	/// Returns [`LinkFormatError`] if neither grammar matches.
	pub fn parse(text: &str) -> Result<Self, LinkFormatError> {
		let is_embedded = text.starts_with('!');
		if let Some(caps) = wikilink_re().captures(text) {
			return Ok(Self {
				is_embedded,
				target_name: caps.get(1).map_or("", |m| m.as_str()).to_string(),
				anchor: non_empty(caps.get(2).map(|m| m.as_str())),
				custom_text: non_empty(caps.get(3).map(|m| m.as_str())),
				grammar: LinkGrammar::Wikilink,
				verbatim: false,
			});
		}
		if let Some(caps) = markdown_re().captures(text) {
			let raw_target = caps.get(2).map_or("", |m| m.as_str());
			let raw_anchor = non_empty(caps.get(3).map(|m| m.as_str()));
			let decoded_anchor = raw_anchor.as_deref().map(url_decode);
			let (target_name, anchor, verbatim) = match (url_decode(raw_target), decoded_anchor) {
				(Some(target), None) => (target, None, false),
				(Some(target), Some(Some(anchor))) => (target, Some(anchor), false),
				_ => (raw_target.to_string(), raw_anchor, true),
			};
			return Ok(Self {
				is_embedded,
				target_name,
				anchor,
				custom_text: non_empty(caps.get(1).map(|m| m.as_str())),
				grammar: LinkGrammar::Markdown,
				verbatim,
			});
		}
		Err(LinkFormatError { text: text.to_string() })
	}

	/// The custom text if there is one, otherwise the bare target name.
	///
	/// The anchor is not part of the fallback, so `[[Note#Part]]` yields `Note`.
	#[must_use]
	pub fn display_text(&self) -> &str {
		self.custom_text.as_deref().unwrap_or(&self.target_name)
	}

	/// The same link pointing at another note; anchor, alias and embedding are kept.
	#[must_use]
	pub fn with_target(mut self, target: impl Into<String>) -> Self {
		self.target_name = target.into();
		self
	}

	/// `target#anchor`, or just the target.
	#[must_use]
	pub fn link_path(&self) -> String {
		match &self.anchor {
			Some(anchor) => format!("{}#{anchor}", self.target_name),
			None => self.target_name.clone(),
		}
	}

	/// Render the link back into source text in its own grammar.
	#[must_use]
	pub fn to_link_text(&self) -> String {
		let bang = if self.is_embedded { "!" } else { "" };
		match self.grammar {
			LinkGrammar::Wikilink => {
				let alias = self.custom_text.as_ref().map(|t| format!("|{t}")).unwrap_or_default();
				format!("{bang}[[{}{alias}]]", self.link_path())
			}
			LinkGrammar::Markdown => {
				let encode = |part: &str| {
					if self.verbatim { part.to_string() } else { utf8_percent_encode(part, LINK_PATH).to_string() }
				};
				let target = encode(&self.target_name);
				let anchor = self.anchor.as_deref().map(|a| format!("#{}", encode(a))).unwrap_or_default();
				let label = self.custom_text.as_deref().unwrap_or_default();
				format!("{bang}[{label}]({target}{anchor})")
			}
		}
	}
}

impl FromStr for ParsedLink {
	type Err = LinkFormatError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
