//! Seams between the guard and whatever hosts it.
//!
//! The browser host implements these over `web-sys`, the headless host over
//! plain structs. The guard itself never touches a document directly.

/// A candidate element. Only the navigation target is inspected.
pub trait Link {
    /// `None` when the element has no `href` attribute at all.
    fn href(&self) -> Option<String>;
}

/// The document the guard is initialized over.
pub trait LinkSource {
    type Link: Link;

    /// All links of the document, in document order.
    fn links(&self) -> Vec<Self::Link>;
}

/// Blocking yes/no question to the user.
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// One pending activation (a click) whose default action can be cancelled.
pub trait NavigationEvent {
    fn prevent_default(&self);
}
