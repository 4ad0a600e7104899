//! Top-level HTML elements embedded in note text.
//!
//! Element boundaries are found by scanning the raw source so spans are exact
//! byte offsets into the note; attributes are read with `scraper`.

use std::{collections::BTreeMap, ops::Range as ByteRange};

use scraper::{ElementRef, Html};
use tracing::debug;

use crate::{
	host::Editor,
	locate::current_item_index,
	position::{Position, Range},
};

const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// One top-level element. `start..end` covers the whole element, `inner` its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlTag {
	pub start: usize,
	pub end: usize,
	pub name: String,
	pub attributes: BTreeMap<String, String>,
	pub inner: ByteRange<usize>,
}

impl HtmlTag {
	#[must_use]
	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.get(name).map(String::as_str)
	}

	fn span_in(&self, editor: &impl Editor) -> Range {
		Range::new(editor.offset_to_pos(self.start), editor.offset_to_pos(self.end))
	}
}

/// Styled wrappers inserted around a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlAnnotation {
	Definition,
	Span,
	Notation,
}

impl HtmlAnnotation {
	#[must_use]
	pub const fn open_tag(self) -> &'static str {
		match self {
			Self::Definition => r#"<b style="border-width:1px;border-style:solid;padding:3px" definition="">"#,
			Self::Span => "<span>",
			Self::Notation => r#"<span style="border-width:1px;border-style:solid;padding:3px" notation="">"#,
		}
	}

	#[must_use]
	pub const fn close_tag(self) -> &'static str {
		match self {
			Self::Definition => "</b>",
			Self::Span | Self::Notation => "</span>",
		}
	}
}

const fn is_name_byte(b: u8) -> bool {
	b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

/// Offset just past the `>` closing the tag that starts at `from`, honouring quoted values.
fn tag_close(text: &str, from: usize) -> Option<usize> {
	let mut quote = None;
	for (i, b) in text.bytes().enumerate().skip(from) {
		match (quote, b) {
			(Some(q), _) if b == q => quote = None,
			(Some(_), _) => {}
			(None, b'"' | b'\'') => quote = Some(b),
			(None, b'>') => return Some(i + 1),
			_ => {}
		}
	}
	None
}

/// End of a `<!-- -->` comment, or of the text when unterminated.
fn comment_end(text: &str, from: usize) -> usize {
	text[from + 4..].find("-->").map_or(text.len(), |i| from + 4 + i + 3)
}

fn name_at(text: &str, from: usize) -> &str {
	let bytes = text.as_bytes();
	let mut end = from;
	while end < bytes.len() && is_name_byte(bytes[end]) {
		end += 1;
	}
	&text[from..end]
}

/// Find the `</name>` balancing an element whose opening tag ends at `from`.
///
/// Returns `(inner_end, element_end)`.
fn matching_close(text: &str, name: &str, from: usize) -> Option<(usize, usize)> {
	let bytes = text.as_bytes();
	let raw_text = RAW_TEXT_ELEMENTS.contains(&name);
	let mut depth = 1usize;
	let mut i = from;
	while let Some(rel) = text[i..].find('<') {
		let lt = i + rel;
		if text[lt..].starts_with("<!--") && !raw_text {
			i = comment_end(text, lt);
			continue;
		}
		let closing = bytes.get(lt + 1) == Some(&b'/');
		let name_start = if closing { lt + 2 } else { lt + 1 };
		let candidate = name_at(text, name_start);
		if raw_text && !(closing && candidate.eq_ignore_ascii_case(name)) {
			i = lt + 1;
			continue;
		}
		if !candidate.eq_ignore_ascii_case(name) {
			// Other tags are skipped whole so quoted attribute values cannot close this element.
			let is_tag = bytes.get(name_start).is_some_and(u8::is_ascii_alphabetic);
			i = if is_tag { tag_close(text, lt).unwrap_or(lt + 1) } else { lt + 1 };
			continue;
		}
		let close = tag_close(text, name_start)?;
		if closing {
			depth -= 1;
			if depth == 0 {
				return Some((lt, close));
			}
		} else if bytes[close - 2] != b'/' {
			depth += 1;
		}
		i = close;
	}
	None
}

fn parse_attributes(open_tag: &str) -> BTreeMap<String, String> {
	let fragment = Html::parse_fragment(open_tag);
	fragment
		.root_element()
		.children()
		.find_map(ElementRef::wrap)
		.map(|element| element.value().attrs().map(|(k, v)| (k.to_string(), v.to_string())).collect())
		.unwrap_or_default()
}

/// Top-level elements of `text`, in source order.
///
/// Comments, doctypes, processing instructions and stray closing tags are
/// skipped. An element that is never closed runs to the end of the text.
#[must_use]
pub fn html_tags(text: &str) -> Vec<HtmlTag> {
	let bytes = text.as_bytes();
	let mut tags = Vec::new();
	let mut i = 0;
	while let Some(rel) = text[i..].find('<') {
		let start = i + rel;
		if text[start..].starts_with("<!--") {
			i = comment_end(text, start);
			continue;
		}
		match bytes.get(start + 1) {
			Some(b'!' | b'?' | b'/') => {
				i = tag_close(text, start).unwrap_or(text.len());
				continue;
			}
			Some(b) if b.is_ascii_alphabetic() => {}
			_ => {
				i = start + 1;
				continue;
			}
		}
		let Some(open_end) = tag_close(text, start) else { break };
		let name = name_at(text, start + 1).to_ascii_lowercase();
		let self_closing = bytes[open_end - 2] == b'/';
		let (inner, end) = if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
			(open_end..open_end, open_end)
		} else {
			matching_close(text, &name, open_end)
				.map_or((open_end..text.len(), text.len()), |(inner_end, end)| (open_end..inner_end, end))
		};
		let attributes = parse_attributes(&text[start..open_end]);
		tags.push(HtmlTag { start, end, name, attributes, inner });
		i = end;
	}
	tags
}

/// Values of every `definition` attribute on top-level elements, split on `;`.
#[must_use]
pub fn definitions(text: &str) -> Vec<String> {
	html_tags(text)
		.iter()
		.filter_map(|tag| tag.attribute("definition"))
		.flat_map(|value| value.split(';'))
		.map(ToString::to_string)
		.collect()
}

/// Unwrap the top-level element under the cursor, keeping its inner source.
///
/// Returns the removed element.
pub fn remove_html_tag_at_cursor(editor: &mut impl Editor) -> Option<HtmlTag> {
	let text = editor.value();
	let tags = html_tags(&text);
	let index = current_item_index(editor.cursor(), Some(tags.as_slice()), |tag| tag.span_in(&*editor))?;
	let tag = tags.into_iter().nth(index)?;
	let span = tag.span_in(&*editor);
	debug!(name = %tag.name, start = tag.start, end = tag.end, "removing html tag");
	editor.replace_range(&text[tag.inner.clone()], span.from, span.to);
	Some(tag)
}

/// Wrap the selection in `open`/`close` and put the cursor after the result.
///
/// The selection is assumed to lie on the cursor's line and end at the cursor.
pub fn insert_html_tag_around_selection(editor: &mut impl Editor, open: &str, close: &str) {
	let selection = editor.selection();
	let cursor = editor.cursor();
	let start = Position::new(cursor.line, cursor.ch.saturating_sub(selection.chars().count()));
	let replacement = format!("{open}{selection}{close}");
	editor.replace_range(&replacement, start, cursor);
	editor.set_cursor(Position::new(start.line, start.ch + replacement.chars().count()));
}

pub fn insert_annotation(editor: &mut impl Editor, annotation: HtmlAnnotation) {
	insert_html_tag_around_selection(editor, annotation.open_tag(), annotation.close_tag());
}
