//! Chat line rendering and log surfaces.
//!
//! A [`Fragment`] is one displayable chat line: the sender, a colon, and the
//! sanitized, linkified body. Fragments are appended to a [`LogSurface`],
//! which is wherever the visible log lives. Two surfaces are provided: a
//! [`MemoryLog`] that keeps fragments and their markup, and a
//! [`TerminalLog`] that prints them.
//!
//! Content never becomes markup by concatenation. The sanitizer extracts
//! text, the linkifier types links as [`Segment::Link`], and every surface
//! writes the remaining text as text.

use std::fmt;
use std::io::{self, Stdout, Write};

use crate::linkify::{Segment, escape_html, linkify};
use crate::sanitize::sanitize;
use crate::types::Message;

/// Banner shown once at client start.
pub const DEFAULT_BANNER: &str = "Welcome to go-webchat!";

/// Label of the container every chat line is wrapped in.
pub const MESSAGE_CONTAINER_ID: &str = "message_display";

/// ANSI escape code for bold text (used for sender names).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for notices).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for underlined text (used for links).
const ANSI_UNDERLINE: &str = "\x1b[4m";

/// ANSI escape code for cyan text (used for the banner).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

///////////////////////////////////////// Fragments ////////////////////////////////////////

/// One rendered chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    sender: String,
    body: Vec<Segment>,
}

impl Fragment {
    /// Creates a fragment from a sender and already-prepared body segments.
    pub fn new(sender: impl Into<String>, body: Vec<Segment>) -> Self {
        Self {
            sender: sender.into(),
            body,
        }
    }

    /// The sender's display name, as text.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// The body segments in display order.
    pub fn body(&self) -> &[Segment] {
        &self.body
    }

    /// URLs linked from this line.
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.body.iter().filter_map(|segment| match segment {
            Segment::Link(url) => Some(url.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// The line as plain text, e.g. `A: hi`.
    pub fn to_plain(&self) -> String {
        self.to_string()
    }

    /// The line as markup inside its labeled container.
    pub fn to_html(&self) -> String {
        let mut out = format!(
            r#"<div id="{MESSAGE_CONTAINER_ID}">{}: "#,
            escape_html(&self.sender)
        );
        for segment in &self.body {
            segment.write_html(&mut out);
        }
        out.push_str("</div>");
        out
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.sender)?;
        for segment in &self.body {
            f.write_str(segment.as_str())?;
        }
        Ok(())
    }
}

/// Build the display fragment for one message.
///
/// The body goes through sanitize then linkify; the sender is kept as text.
pub fn construct_message(message: &Message) -> Fragment {
    let plain = sanitize(&message.text);
    Fragment::new(message.sender.clone(), linkify(&plain))
}

/// Markup for the welcome banner.
pub fn banner_html(banner: &str) -> String {
    format!("<h1>{}</h1>", escape_html(banner))
}

///////////////////////////////////////// Surfaces /////////////////////////////////////////

/// Destination for rendered chat lines.
pub trait LogSurface: Send {
    /// Show the one-time welcome banner.
    fn append_banner(&mut self, banner: &str);

    /// Append one chat line to the end of the log.
    fn append(&mut self, fragment: Fragment);

    /// Discard every chat line shown so far. The banner stays.
    fn reset(&mut self);

    /// Move the viewport to the newest line.
    fn scroll_to_end(&mut self) {}
}

/// Append the welcome banner to `surface`.
pub fn welcome_message<S: LogSurface + ?Sized>(surface: &mut S, banner: &str) {
    surface.append_banner(banner);
}

/// Append the fragment for every index in `[from, to)` of `list`.
///
/// Indices are visited in ascending order and clamped to the list, so an
/// empty or inverted range appends nothing. Returns the number of lines
/// appended.
pub fn update_chat_log<S: LogSurface + ?Sized>(
    surface: &mut S,
    list: &[Message],
    from: usize,
    to: usize,
) -> usize {
    let to = to.min(list.len());
    if from >= to {
        return 0;
    }
    for message in &list[from..to] {
        surface.append(construct_message(message));
    }
    to - from
}

/// In-memory log surface.
///
/// Holds the banner and fragments exactly as a page would, and can render
/// the whole log as markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryLog {
    banner: Option<String>,
    fragments: Vec<Fragment>,
    resets: usize,
    scrolls: usize,
}

impl MemoryLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// The banner, if one has been shown.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Chat lines currently shown.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Chat lines as plain text.
    pub fn lines(&self) -> Vec<String> {
        self.fragments.iter().map(Fragment::to_plain).collect()
    }

    /// Number of times the log was reset.
    pub fn reset_count(&self) -> usize {
        self.resets
    }

    /// Number of times the viewport was moved to the end.
    pub fn scroll_count(&self) -> usize {
        self.scrolls
    }

    /// The banner followed by every chat line, as markup.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        if let Some(banner) = &self.banner {
            out.push_str(&banner_html(banner));
        }
        for fragment in &self.fragments {
            out.push_str(&fragment.to_html());
        }
        out
    }
}

impl LogSurface for MemoryLog {
    fn append_banner(&mut self, banner: &str) {
        self.banner = Some(banner.to_string());
    }

    fn append(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    fn reset(&mut self) {
        self.fragments.clear();
        self.resets += 1;
    }

    fn scroll_to_end(&mut self) {
        self.scrolls += 1;
    }
}

/// Terminal log surface with optional ANSI styling.
///
/// Lines are printed as they arrive. With color enabled, senders are bold
/// and links are underlined OSC 8 hyperlinks. Control characters in message
/// content are dropped so a sender cannot drive the terminal.
pub struct TerminalLog<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
}

impl TerminalLog<Stdout> {
    /// Creates a TerminalLog on stdout with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a TerminalLog on stdout with the specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl Default for TerminalLog<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> TerminalLog<W> {
    /// Creates a TerminalLog writing to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self { out, use_color }
    }

    /// Consumes the surface, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn style(&self, code: &'static str) -> &'static str {
        if self.use_color { code } else { "" }
    }

    fn format_line(&self, fragment: &Fragment) -> String {
        let mut line = format!(
            "{}{}{}: ",
            self.style(ANSI_BOLD),
            printable(fragment.sender()),
            self.style(ANSI_RESET)
        );
        for segment in fragment.body() {
            match segment {
                Segment::Text(text) => line.push_str(&printable(text)),
                Segment::Link(url) => {
                    let url = printable(url);
                    if self.use_color {
                        line.push_str(&format!(
                            "{ANSI_UNDERLINE}\x1b]8;;{url}\x1b\\{url}\x1b]8;;\x1b\\{ANSI_RESET}"
                        ));
                    } else {
                        line.push_str(&url);
                    }
                }
            }
        }
        line
    }

    fn write_line(&mut self, line: &str) {
        // A closed terminal leaves nothing to report to.
        let _ = writeln!(self.out, "{line}");
        let _ = self.out.flush();
    }
}

impl<W: Write + Send> LogSurface for TerminalLog<W> {
    fn append_banner(&mut self, banner: &str) {
        let line = format!(
            "{}{}{}{}",
            self.style(ANSI_BOLD),
            self.style(ANSI_CYAN),
            printable(banner),
            self.style(ANSI_RESET)
        );
        self.write_line(&line);
    }

    fn append(&mut self, fragment: Fragment) {
        let line = self.format_line(&fragment);
        self.write_line(&line);
    }

    fn reset(&mut self) {
        let line = format!(
            "{}-- server history changed, showing it again --{}",
            self.style(ANSI_DIM),
            self.style(ANSI_RESET)
        );
        self.write_line(&line);
    }

    fn scroll_to_end(&mut self) {
        let _ = self.out.flush();
    }
}

/// Line breaks become spaces so one message stays on one line. Other control
/// characters except tab are dropped.
fn printable(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\n' | '\r' => Some(' '),
            '\t' => Some(c),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}
