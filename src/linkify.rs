//! URL detection for sanitized message text.

use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("URL regex pattern is valid"));

/// A piece of a rendered message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain text, shown verbatim.
    Text(String),
    /// A hyperlink whose visible text and target are both this URL.
    Link(String),
}

impl Segment {
    /// The text a reader sees for this segment.
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Text(text) => text,
            Segment::Link(url) => url,
        }
    }

    /// Returns true if this segment is a link.
    pub fn is_link(&self) -> bool {
        matches!(self, Segment::Link(_))
    }

    /// Append this segment as markup.
    ///
    /// Text is written as a text node. Links become an anchor opening in a
    /// new browsing context.
    pub fn write_html(&self, out: &mut String) {
        match self {
            Segment::Text(text) => out.push_str(&escape_html(text)),
            Segment::Link(url) => {
                let url = escape_html(url);
                let _ = write!(out, r#"<a href="{url}" target="_blank">{url}</a>"#);
            }
        }
    }
}

/// Split `text` into plain and link segments.
///
/// Every maximal run of `http://` or `https://` followed by non-whitespace
/// becomes a [`Segment::Link`]. Matching is greedy, left to right and
/// non-overlapping; everything between matches is passed through unchanged.
/// Empty input yields no segments.
pub fn linkify(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;
    for found in URL_RE.find_iter(text) {
        if found.start() > last {
            segments.push(Segment::Text(text[last..found.start()].to_string()));
        }
        segments.push(Segment::Link(found.as_str().to_string()));
        last = found.end();
    }
    if last < text.len() {
        segments.push(Segment::Text(text[last..].to_string()));
    }
    segments
}

/// Linkify `text` and render the result as markup.
pub fn linkify_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in linkify(text) {
        segment.write_html(&mut out);
    }
    out
}

pub(crate) fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
