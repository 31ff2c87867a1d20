//! Markup stripping and JSON normalization for user-supplied text.
//!
//! Two sanitizers are provided:
//! - [`sanitize_plain_text`] removes every tag. Used for names, emails,
//!   categories and anything else that is displayed verbatim.
//! - [`sanitize_rich_text`] keeps a small set of inline formatting tags
//!   (`p`, `br`, `strong`, `em`, `u`) and drops all attributes. Used for
//!   alert descriptions.
//!
//! Tag content is kept (only the tags go), except for `script` and `style`
//! elements whose bodies are removed as well. Stripping is repeated until the
//! output is stable so nested fragments like `<scr<b>ipt>` cannot reassemble
//! into a live tag.
//!
//! Rich-text output is meant to be rendered as HTML, so stray `<`, `>` and
//! `&` in the kept text are entity-escaped (existing entities are left
//! alone). Plain-text output is not escaped; it is escaped wherever it is
//! rendered.

use regex::{Captures, Regex};
use serde_json::Value;

/// Inline tags that survive rich-text sanitization.
pub const RICH_TEXT_ALLOWED_TAGS: &[&str] = &["p", "br", "strong", "em", "u"];

/// Upper bound on strip passes; real input stabilizes in one or two.
const MAX_PASSES: usize = 8;

lazy_static::lazy_static! {
    static ref COMMENT_REGEX: Regex = Regex::new(r"(?s)<!--.*?(-->|$)").unwrap();
    static ref SCRIPT_REGEX: Regex =
        Regex::new(r"(?is)<script\b[^>]*>.*?(</\s*script\s*>|$)").unwrap();
    static ref STYLE_REGEX: Regex =
        Regex::new(r"(?is)<style\b[^>]*>.*?(</\s*style\s*>|$)").unwrap();
    static ref TAG_REGEX: Regex =
        Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9-]*)\b[^>]*>").unwrap();
    /// Exactly the tags [`sanitize_rich_text`] emits.
    static ref CANONICAL_TAG_REGEX: Regex =
        Regex::new(r"</?(?:p|strong|em|u)>|<br>").unwrap();
    static ref AMPERSAND_REGEX: Regex =
        Regex::new(r"&(#[0-9]+;|#[xX][0-9a-fA-F]+;|[a-zA-Z][a-zA-Z0-9]*;)?").unwrap();
}

/// Strips all markup from `text`.
///
/// Empty input is returned unchanged.
///
/// # Example
/// ```
/// use shared::sanitize::sanitize_plain_text;
///
/// assert_eq!(sanitize_plain_text("<b>Riverside</b>"), "Riverside");
/// ```
pub fn sanitize_plain_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    strip_until_stable(text, |_, _| String::new())
}

/// Strips markup from `text` except for [`RICH_TEXT_ALLOWED_TAGS`].
///
/// Allowed tags are re-emitted in canonical lowercase form with no
/// attributes, so `<P class="x">` becomes `<p>` and `<br/>` becomes `<br>`.
/// Text between them is escaped: `a < b & c` becomes `a &lt; b &amp; c`.
pub fn sanitize_rich_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let stripped = strip_until_stable(text, |name, closing| {
        if !RICH_TEXT_ALLOWED_TAGS.contains(&name) {
            return String::new();
        }
        match (name, closing) {
            ("br", _) => "<br>".to_string(),
            (_, true) => format!("</{}>", name),
            (_, false) => format!("<{}>", name),
        }
    });
    escape_between_tags(&stripped)
}

fn escape_between_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for tag in CANONICAL_TAG_REGEX.find_iter(html) {
        out.push_str(&escape_text(&html[last..tag.start()]));
        out.push_str(tag.as_str());
        last = tag.end();
    }
    out.push_str(&escape_text(&html[last..]));
    out
}

fn escape_text(text: &str) -> String {
    AMPERSAND_REGEX
        .replace_all(text, |caps: &Captures| match caps.get(1) {
            Some(_) => caps[0].to_string(),
            None => "&amp;".to_string(),
        })
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn strip_until_stable<F>(text: &str, render_tag: F) -> String
where
    F: Fn(&str, bool) -> String,
{
    let mut current = text.to_string();

    for _ in 0..MAX_PASSES {
        let next = strip_once(&current, &render_tag);
        if next == current {
            break;
        }
        current = next;
    }

    current
}

fn strip_once<F>(text: &str, render_tag: &F) -> String
where
    F: Fn(&str, bool) -> String,
{
    let without_comments = COMMENT_REGEX.replace_all(text, "");
    let without_scripts = SCRIPT_REGEX.replace_all(&without_comments, "");
    let without_styles = STYLE_REGEX.replace_all(&without_scripts, "");

    TAG_REGEX
        .replace_all(&without_styles, |caps: &Captures| {
            let closing = !caps[1].is_empty();
            let name = caps[2].to_ascii_lowercase();
            render_tag(&name, closing)
        })
        .into_owned()
}

/// Outcome of [`validate_and_normalize_json`].
///
/// Callers that need to treat non-JSON input differently can match on the
/// variant; callers that only want the stored text use [`Self::into_string`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonNormalization {
    /// Input was empty.
    Empty,
    /// Input parsed as JSON and was re-serialized in compact canonical form.
    Normalized(String),
    /// Input was not JSON; the plain-text sanitized original is kept.
    SanitizedText(String),
}

impl JsonNormalization {
    /// Returns the text to store.
    pub fn into_string(self) -> String {
        match self {
            JsonNormalization::Empty => String::new(),
            JsonNormalization::Normalized(s) | JsonNormalization::SanitizedText(s) => s,
        }
    }

    /// True when the input was valid JSON (or empty).
    pub fn is_json(&self) -> bool {
        !matches!(self, JsonNormalization::SanitizedText(_))
    }
}

/// Normalizes JSON text, falling back to plain-text sanitization.
///
/// Object keys come out sorted, so equal documents normalize to equal text.
pub fn validate_and_normalize_json(text: &str) -> JsonNormalization {
    if text.is_empty() {
        return JsonNormalization::Empty;
    }

    match serde_json::from_str::<Value>(text) {
        Ok(value) => JsonNormalization::Normalized(value.to_string()),
        Err(_) => JsonNormalization::SanitizedText(sanitize_plain_text(text)),
    }
}

/// Returns true if `text` parses as JSON.
pub fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<Value>(text).is_ok()
}
