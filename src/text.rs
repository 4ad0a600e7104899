use std::{borrow::Cow, sync::OnceLock};

use regex::Regex;

const PATH_REMOVED: &[&str] = &[
	".", "'", "$", ")", "{", "}", ":", "?", "!", "#", "%", "&", "\\", "<", ">", "*", "/", "\"", "@", "+", "`", "|",
	"=", "[", "]", "mathscr", "mathbf", "mathrm", "mathfrak", "mathcal", "mathbb", "operatorname",
];
const PATH_UNDERSCORED: &[char] = &[' ', '-', '^', '(', ','];

/// Percent-decode `input`, or `None` if the decoded bytes are not UTF-8.
///
/// Malformed escapes such as `%ZZ` are passed through unchanged.
#[must_use]
pub fn url_decode(input: &str) -> Option<String> {
	percent_encoding::percent_decode_str(input).decode_utf8().ok().map(Cow::into_owned)
}

/// Turn a heading or LaTeX snippet into something usable inside a file name.
#[must_use]
pub fn path_accepted_string(latex: &str) -> String {
	let mut result = latex.trim().to_string();
	for removed in PATH_REMOVED {
		result = result.replace(removed, "");
	}
	result.replace(PATH_UNDERSCORED, "_")
}

fn footnote_marker_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"(.+)\[\^([^\]]+)\]").expect("valid footnote marker pattern"))
}

/// Drop a trailing footnote marker such as `[^3]` from a heading.
#[must_use]
pub fn text_without_footnote_marker(text: &str) -> String {
	footnote_marker_re().replace_all(text, "$1").into_owned()
}

fn invalid_filename_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r#"[\\/:*?"<>|]"#).expect("valid filename pattern"))
}

fn whitespace_run_re() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

/// Strip characters that are invalid in file names.
///
/// Returns `None` when nothing usable is left.
#[must_use]
pub fn sanitize_filename(name: &str, replace_spaces_with_underscore: bool) -> Option<String> {
	let mut sanitized = invalid_filename_re().replace_all(name, "").into_owned();
	if replace_spaces_with_underscore {
		sanitized = whitespace_run_re().replace_all(&sanitized, "_").into_owned();
	}
	let trimmed = sanitized.trim_matches(|c: char| c == '.' || c.is_whitespace());
	if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("hello%20world", Some("hello world"))]
	#[case("test%2Fpath", Some("test/path"))]
	#[case("100%25", Some("100%"))]
	#[case("a%2520b", Some("a%20b"))]
	#[case("bad%ZZvalue", Some("bad%ZZvalue"))]
	#[case("%", Some("%"))]
	#[case("caf%C3%A9", Some("café"))]
	#[case("caf%FF", None)]
	fn test_url_decode(#[case] input: &str, #[case] expected: Option<&str>) {
		assert_eq!(url_decode(input).as_deref(), expected);
	}

	#[rstest]
	#[case("  Main theorem  ", "Main_theorem")]
	#[case("$H^i_{et}(X, F)$", "H_i_et_X__F")]
	#[case(r"\mathbb{Z}-module", "Z_module")]
	#[case("What is this?", "What_is_this")]
	#[case(r"\operatorname{Spec} A", "Spec_A")]
	fn test_path_accepted_string(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(path_accepted_string(input), expected);
	}

	#[rstest]
	#[case("Definition[^1]", "Definition")]
	#[case("No marker", "No marker")]
	#[case("[^1]", "[^1]")]
	#[case("Two[^a] markers[^b]", "Two[^a] markers")]
	fn test_text_without_footnote_marker(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(text_without_footnote_marker(input), expected);
	}

	#[rstest]
	#[case("my file: draft?", true, Some("my_file_draft"))]
	#[case("my file", false, Some("my file"))]
	#[case("  .hidden.  ", false, Some("hidden"))]
	#[case(" draft one ", true, Some("_draft_one_"))]
	#[case("a/b\\c|d", true, Some("abcd"))]
	#[case("???", true, None)]
	#[case(" . ", false, None)]
	fn test_sanitize_filename(#[case] input: &str, #[case] underscores: bool, #[case] expected: Option<&str>) {
		assert_eq!(sanitize_filename(input, underscores).as_deref(), expected);
	}
}
