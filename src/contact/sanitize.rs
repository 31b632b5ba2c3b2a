//! Markup stripping for free-text fields.
//!
//! Applied to every submitted field before it is measured or interpolated
//! into an HTML mail body.

use regex::Regex;
use std::sync::LazyLock;

/// `<script ...> ... </script>`, case-insensitive, body may span lines,
/// shortest match so two blocks don't swallow the text between them.
static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script>").expect("static pattern"));

/// Strip script blocks, then every angle bracket, then surrounding whitespace.
///
/// The output never contains `<` or `>`, so running it again is a no-op.
pub fn sanitize(input: &str) -> String {
    let without_scripts = SCRIPT_BLOCK.replace_all(input, "");
    without_scripts
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .collect::<String>()
        .trim()
        .to_string()
}
