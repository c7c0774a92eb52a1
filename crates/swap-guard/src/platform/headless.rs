//! In-memory host for running the guard without a browser.
//!
//! Provides a document of links, a scripted confirm dialog and click
//! simulation. Used by the tests and by the `swap-guard` CLI.

use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::GuardConfig;
use crate::guard::{ConfirmationGuard, InvalidTransition};
use crate::host::{Confirm, Link, LinkSource, NavigationEvent};

// Attribute values may contain `>`, so the tag body is matched quote by quote.
static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b((?:"[^"]*"|'[^']*'|[^'">])*)>(.*?)</a\s*>"#).expect("anchor pattern")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'=<>/]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("attribute pattern")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<(?:"[^"]*"|'[^']*'|[^'">])*>"#).expect("tag pattern"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|([a-zA-Z]+));")
        .expect("entity pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HeadlessLink {
    /// Position among all links of the document.
    pub position: usize,
    pub href: Option<String>,
    pub text: String,
}

impl Link for HeadlessLink {
    fn href(&self) -> Option<String> {
        self.href.clone()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlessDocument {
    links: Vec<HeadlessLink>,
}

impl HeadlessDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_link(mut self, href: impl Into<String>, text: impl Into<String>) -> Self {
        self.push(Some(href.into()), text.into());
        self
    }

    /// Adds an anchor without an `href` attribute.
    pub fn with_bare_link(mut self, text: impl Into<String>) -> Self {
        self.push(None, text.into());
        self
    }

    fn push(&mut self, href: Option<String>, text: String) {
        let position = self.links.len();
        self.links.push(HeadlessLink {
            position,
            href,
            text,
        });
    }

    /// Collects the `<a>` elements of an HTML page.
    ///
    /// This is a scan, not a parser: nested anchors and anchors inside
    /// comments or scripts are not handled specially.
    pub fn parse_html(html: &str) -> Self {
        let mut document = Self::new();
        for anchor in ANCHOR.captures_iter(html) {
            let attributes = anchor.get(1).map_or("", |m| m.as_str());
            let href = attribute(attributes, "href");
            let inner = anchor.get(2).map_or("", |m| m.as_str());
            let text = TAG.replace_all(inner, " ");
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            let text = decode_entities(&text);
            document.push(href, text);
        }
        document
    }

    pub fn get(&self, position: usize) -> Option<&HeadlessLink> {
        self.links.get(position)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl LinkSource for HeadlessDocument {
    type Link = HeadlessLink;

    fn links(&self) -> Vec<HeadlessLink> {
        self.links.clone()
    }
}

/// Value of the first attribute called `name`, entities decoded.
/// An attribute without a value yields an empty string, as in the DOM.
fn attribute(attributes: &str, name: &str) -> Option<String> {
    ATTRIBUTE
        .captures_iter(attributes)
        .find(|captures| captures[1].eq_ignore_ascii_case(name))
        .map(|captures| {
            let value = captures
                .get(2)
                .or_else(|| captures.get(3))
                .or_else(|| captures.get(4))
                .map_or("", |m| m.as_str());
            decode_entities(value)
        })
}

fn decode_entities(value: &str) -> String {
    ENTITY
        .replace_all(value, |captures: &regex::Captures| {
            let decoded = if let Some(decimal) = captures.get(1) {
                decimal.as_str().parse().ok().and_then(char::from_u32)
            } else if let Some(hex) = captures.get(2) {
                u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
            } else {
                match &captures[3] {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                }
            };
            match decoded {
                Some(character) => character.to_string(),
                None => captures[0].to_owned(),
            }
        })
        .into_owned()
}

/// Confirm dialog with pre-recorded answers.
///
/// Answers are consumed in order; once the queue is empty every further
/// question gets the default answer.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConfirm {
    answers: VecDeque<bool>,
    default_answer: bool,
    prompts: Vec<String>,
}

impl ScriptedConfirm {
    pub fn new(default_answer: bool) -> Self {
        Self {
            default_answer,
            ..Self::default()
        }
    }

    pub fn enqueue(&mut self, answer: bool) {
        self.answers.push_back(answer);
    }

    pub fn set_default_answer(&mut self, answer: bool) {
        self.default_answer = answer;
    }

    /// Every message shown so far.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        self.prompts.push(message.to_owned());
        self.answers.pop_front().unwrap_or(self.default_answer)
    }
}

#[derive(Debug, Default)]
pub struct RecordingEvent {
    prevent_default_calls: Cell<u32>,
}

impl RecordingEvent {
    pub fn default_prevented(&self) -> bool {
        self.prevent_default_calls.get() > 0
    }

    pub fn prevent_default_calls(&self) -> u32 {
        self.prevent_default_calls.get()
    }
}

impl NavigationEvent for RecordingEvent {
    fn prevent_default(&self) {
        self.prevent_default_calls.set(self.prevent_default_calls.get() + 1);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClickError {
    #[error("document has no link at position {0}")]
    NoSuchLink(usize),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ClickOutcome {
    /// The guard asked the user.
    pub prompted: bool,
    /// `preventDefault` was called on the click.
    pub prevented: bool,
    /// Where the page went, `None` if it stayed.
    pub navigated_to: Option<String>,
}

/// A document plus the guard and a scripted user.
#[derive(Debug)]
pub struct HeadlessPage {
    document: HeadlessDocument,
    guard: ConfirmationGuard<HeadlessLink>,
    confirm: ScriptedConfirm,
    history: Vec<String>,
}

impl HeadlessPage {
    pub fn new(document: HeadlessDocument, config: GuardConfig) -> Self {
        Self {
            document,
            guard: ConfirmationGuard::new(config),
            confirm: ScriptedConfirm::default(),
            history: Vec::new(),
        }
    }

    /// Equivalent of the document becoming ready. Safe to call repeatedly.
    pub fn initialize(&mut self) -> usize {
        self.guard.initialize(&self.document).len()
    }

    pub fn document(&self) -> &HeadlessDocument {
        &self.document
    }

    pub fn guard(&self) -> &ConfirmationGuard<HeadlessLink> {
        &self.guard
    }

    pub fn confirm(&self) -> &ScriptedConfirm {
        &self.confirm
    }

    pub fn confirm_mut(&mut self) -> &mut ScriptedConfirm {
        &mut self.confirm
    }

    /// Every navigation that went through, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Clicks the link at `position` (document order, guarded or not).
    pub fn click(&mut self, position: usize) -> Result<ClickOutcome, ClickError> {
        let href = self
            .document
            .get(position)
            .ok_or(ClickError::NoSuchLink(position))?
            .href
            .clone();
        let event = RecordingEvent::default();

        let guarded_index = self.guard.position(|link| link.position == position);
        let prompted = match guarded_index {
            Some(index) => {
                self.guard
                    .activate(index, &mut self.confirm, &event)
                    .transpose()?;
                true
            }
            None => false,
        };

        let navigated_to = if event.default_prevented() { None } else { href };
        if let Some(target) = &navigated_to {
            self.history.push(target.clone());
        }
        Ok(ClickOutcome {
            prompted,
            prevented: event.default_prevented(),
            navigated_to,
        })
    }
}
