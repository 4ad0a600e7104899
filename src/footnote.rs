use std::{collections::HashSet, sync::OnceLock};

use regex::Regex;

use crate::{host::Editor, position::Position};

fn definition_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"\[\^(\d+)\]:").expect("valid footnote definition pattern"))
}

fn definition_line_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"^\[\^\d+\]:").expect("valid footnote line pattern"))
}

/// Smallest positive number without a `[^n]:` definition in `text`.
#[must_use]
pub fn least_unused_footnote(text: &str) -> u32 {
	let used: HashSet<u32> = definition_re().captures_iter(text).filter_map(|c| c[1].parse().ok()).collect();
	(1..).find(|n| !used.contains(n)).unwrap_or(1)
}

/// Line where a new definition goes, and whether it joins an existing definition block.
fn definition_line(lines: &[&str], cursor_line: usize) -> (usize, bool) {
	let mut insert_line = cursor_line + 1;
	while lines.get(insert_line).is_some_and(|line| !line.trim().is_empty()) {
		insert_line += 1;
	}
	let existing = lines
		.iter()
		.enumerate()
		.skip(insert_line)
		.find(|(_, line)| !line.trim().is_empty())
		.filter(|(_, line)| definition_line_re().is_match(line))
		.map(|(i, _)| i);
	existing.map_or((insert_line, false), |i| (i, true))
}

/// Insert a numbered footnote reference after the cursor and an empty definition for it.
///
/// The definition goes right above the first definition following the current
/// paragraph, or after the paragraph behind a blank line. Returns the footnote number.
pub fn create_footnote(editor: &mut impl Editor) -> u32 {
	let text = editor.value();
	let number = least_unused_footnote(&text);
	let cursor = editor.cursor();
	let line_len = editor.line(cursor.line).map_or(0, |line| line.chars().count());
	let at = Position::new(cursor.line, cursor.ch + usize::from(cursor.ch < line_len));
	let reference = format!("[^{number}]");
	editor.insert_at(&reference, at);
	editor.set_cursor(Position::new(at.line, at.ch + reference.len() - 1));

	let lines: Vec<&str> = text.split('\n').collect();
	let (line, joins_block) = definition_line(&lines, cursor.line);
	let definition = if joins_block { format!("[^{number}]:\n") } else { format!("\n\n[^{number}]:\n") };
	editor.insert_at(&definition, Position::new(line, 0));
	number
}
