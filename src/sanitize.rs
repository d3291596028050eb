//! Text extraction for untrusted message bodies.
//!
//! Message text arrives from other users and may contain markup, either by
//! accident or on purpose. [`sanitize`] parses it as an HTML fragment and
//! keeps only the text a reader would see. This is extraction, not escaping:
//! character references are decoded, and the result is plain text that must
//! be written to a surface as text (see [`crate::render`]).

use scraper::{Html, Node};

/// Elements whose contents are never visible text.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style"];

/// Strip all markup from `input`, returning its text content.
///
/// Tags and comments are removed, entities are decoded, and the bodies of
/// `<script>` and `<style>` elements are dropped. Never fails.
///
/// ```
/// assert_eq!(webchat::sanitize::sanitize("<b>hi</b>"), "hi");
/// ```
pub fn sanitize(input: &str) -> String {
    if !input.contains(['<', '&']) {
        return input.to_string();
    }
    let fragment = Html::parse_fragment(input);
    let mut text = String::with_capacity(input.len());
    for node in fragment.tree.root().descendants() {
        let Node::Text(chunk) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
            Node::Element(element) => SKIPPED_ELEMENTS.contains(&element.name()),
            _ => false,
        });
        if !hidden {
            text.push_str(chunk);
        }
    }
    text
}
