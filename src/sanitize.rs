//! Markdown decoration stripping for plain-text export
//!
//! This is a line-oriented textual transform, not a markdown parser. It
//! recognises the literal marker patterns assistants tend to emit and leaves
//! anything it does not match untouched.

use std::sync::LazyLock;

use regex::Regex;

/// Fence lines, including an optional language tag (` ```rust `)
static FENCE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*```[\w+-]*[ \t]*$\n?").expect("valid regex"));

/// Bullet markers at line start, normalised to `- `
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[*+\-][ \t]+").expect("valid regex"));

/// Emphasis needs a non-space character just inside each marker, so
/// arithmetic like `2 * 3 * 4` is left alone
static BOLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*([^*\s](?:[^*\n]*[^*\s])?)\*\*").expect("valid regex")
});

static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\s](?:[^*\n]*[^*\s])?)\*").expect("valid regex"));

/// Heading markers, either at line start or after whitespace (`and # Heading`)
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^|[ \t])#{1,6}[ \t]+").expect("valid regex"));

static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`{1,3}").expect("valid regex"));

/// `[label](target)` and `![alt](src)`, keeping only the visible label
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[([^\]\n]+)\]\([^)\n]*\)").expect("valid regex"));

static BLOCKQUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*>[ \t]?").expect("valid regex"));

/// Strip markdown decoration from `text`, producing plain prose.
///
/// Handles:
/// - `**bold**` and `*italic*` → inner text
/// - `# Heading` (any level) → `Heading`
/// - `* item` / `+ item` / `- item` → `- item`
/// - code fences and inline backticks → removed
/// - `[label](url)` → `label`
/// - `> quote` → `quote`
#[must_use]
pub fn sanitize(text: &str) -> String {
    // Bullets go first so a leading `* ` is never mistaken for an italic opener
    let out = FENCE_LINE.replace_all(text, "");
    let out = BULLET.replace_all(&out, "- ");
    let out = BOLD.replace_all(&out, "$1");
    let out = ITALIC.replace_all(&out, "$1");
    let out = HEADING.replace_all(&out, "$1");
    let out = INLINE_CODE.replace_all(&out, "");
    let out = LINK.replace_all(&out, "$1");
    let out = BLOCKQUOTE.replace_all(&out, "");
    out.into_owned()
}
