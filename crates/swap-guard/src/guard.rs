//! The confirmation guard.
//!
//! Lifecycle:
//! 1. `ConfirmationGuard::initialize` selects the matching links once. The set
//!    is frozen afterwards; links inserted later are not picked up.
//! 2. Each activation of a guarded link walks
//!    `Idle -> AwaitingConfirmation -> {Allowed, Suppressed} -> Idle`.
//!    The confirm call is the only point where an activation waits.
//! 3. A decline cancels the default action exactly once. A confirmation leaves
//!    the event untouched so the host navigates to the link's `href`.

use crate::config::GuardConfig;
use crate::host::{Confirm, Link, LinkSource, NavigationEvent};
use crate::matcher::HrefMatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardState {
    #[default]
    Idle,
    AwaitingConfirmation,
    Allowed,
    Suppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid guard transition {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: GuardState,
    pub to: GuardState,
}

impl GuardState {
    pub fn transition(self, to: GuardState) -> Result<GuardState, InvalidTransition> {
        use GuardState::*;
        match (self, to) {
            (Idle, AwaitingConfirmation)
            | (AwaitingConfirmation, Allowed)
            | (AwaitingConfirmation, Suppressed)
            | (Allowed, Idle)
            | (Suppressed, Idle) => Ok(to),
            (from, to) => Err(InvalidTransition { from, to }),
        }
    }
}

/// How one activation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// User confirmed, default navigation proceeds.
    Allowed,
    /// User declined, default navigation was cancelled.
    Suppressed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// Position of the link among the guarded links.
    pub index: usize,
    pub href: String,
    pub outcome: Outcome,
}

impl Activation {
    /// Where the host navigates, if anywhere.
    pub fn navigation_target(&self) -> Option<&str> {
        match self.outcome {
            Outcome::Allowed => Some(&self.href),
            Outcome::Suppressed => None,
        }
    }
}

#[derive(Debug)]
pub struct GuardedLink<L> {
    link: L,
    href: String,
    state: GuardState,
}

impl<L> GuardedLink<L> {
    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    fn advance(&mut self, to: GuardState) -> Result<(), InvalidTransition> {
        self.state = self.state.transition(to)?;
        Ok(())
    }

    /// Handles one click on this link.
    ///
    /// Fails only if the link is already waiting for an answer, i.e. the host
    /// delivered a second click while the first prompt was still open.
    pub fn activate<C, E>(
        &mut self,
        prompt: &str,
        confirm: &mut C,
        event: &E,
    ) -> Result<Outcome, InvalidTransition>
    where
        C: Confirm + ?Sized,
        E: NavigationEvent + ?Sized,
    {
        self.advance(GuardState::AwaitingConfirmation)?;
        let outcome = if confirm.confirm(prompt) {
            self.advance(GuardState::Allowed)?;
            Outcome::Allowed
        } else {
            event.prevent_default();
            self.advance(GuardState::Suppressed)?;
            Outcome::Suppressed
        };
        self.advance(GuardState::Idle)?;
        Ok(outcome)
    }
}

#[derive(Debug)]
pub struct ConfirmationGuard<L> {
    config: GuardConfig,
    matcher: HrefMatcher,
    guarded: Option<Vec<GuardedLink<L>>>,
}

impl<L> Default for ConfirmationGuard<L> {
    fn default() -> Self {
        Self::new(GuardConfig::default())
    }
}

impl<L> ConfirmationGuard<L> {
    pub fn new(config: GuardConfig) -> Self {
        let matcher = config.matcher();
        Self {
            config,
            matcher,
            guarded: None,
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn matcher(&self) -> &HrefMatcher {
        &self.matcher
    }

    pub fn is_initialized(&self) -> bool {
        self.guarded.is_some()
    }

    /// Guarded links in document order. Empty before initialization.
    pub fn guarded(&self) -> &[GuardedLink<L>] {
        self.guarded.as_deref().unwrap_or_default()
    }

    /// Handles a click on the guarded link at `index`.
    ///
    /// Returns `None` when `index` is not a guarded link; the host should let
    /// such a click through untouched.
    pub fn activate<C, E>(
        &mut self,
        index: usize,
        confirm: &mut C,
        event: &E,
    ) -> Option<Result<Activation, InvalidTransition>>
    where
        C: Confirm + ?Sized,
        E: NavigationEvent + ?Sized,
    {
        let guarded = self.guarded.as_mut()?.get_mut(index)?;
        let result = guarded
            .activate(&self.config.prompt, confirm, event)
            .map(|outcome| Activation {
                index,
                href: guarded.href.clone(),
                outcome,
            });
        Some(result)
    }

    /// Click handler body for hosts that can't report errors to anyone.
    ///
    /// Same as [`ConfirmationGuard::activate`], except that a failed
    /// activation cancels the default action: a guarded link never navigates
    /// without an answer.
    pub fn handle_click<C, E>(
        &mut self,
        index: usize,
        confirm: &mut C,
        event: &E,
    ) -> Option<Outcome>
    where
        C: Confirm + ?Sized,
        E: NavigationEvent + ?Sized,
    {
        match self.activate(index, confirm, event)? {
            Ok(activation) => Some(activation.outcome),
            Err(error) => {
                log::warn!("blocking click on guarded link {index}: {error}");
                event.prevent_default();
                Some(Outcome::Suppressed)
            }
        }
    }
}

impl<L: Link> ConfirmationGuard<L> {
    /// Links of `source` whose `href` satisfies the matcher, in document order.
    pub fn select<S>(&self, source: &S) -> Vec<L>
    where
        S: LinkSource<Link = L> + ?Sized,
    {
        source
            .links()
            .into_iter()
            .filter(|link| link.href().is_some_and(|href| self.matcher.matches(&href)))
            .collect()
    }

    /// Selects and guards the matching links of `source`.
    ///
    /// Runs once. Later calls return the existing set without re-selecting, so
    /// no link ever ends up with two handlers.
    pub fn initialize<S>(&mut self, source: &S) -> &[GuardedLink<L>]
    where
        S: LinkSource<Link = L> + ?Sized,
    {
        if self.guarded.is_some() {
            log::debug!("confirmation guard already initialized, keeping existing links");
        } else {
            let guarded: Vec<_> = self
                .select(source)
                .into_iter()
                .filter_map(|link| {
                    let href = link.href()?;
                    Some(GuardedLink {
                        link,
                        href,
                        state: GuardState::Idle,
                    })
                })
                .collect();
            log::info!(
                "confirmation guard attached to {} link(s) matching {}",
                guarded.len(),
                self.matcher.css_selector()
            );
            self.guarded = Some(guarded);
        }
        self.guarded()
    }

    /// Index of the guarded link for which `is_same` holds.
    pub fn position(&self, is_same: impl Fn(&L) -> bool) -> Option<usize> {
        self.guarded().iter().position(|guarded| is_same(&guarded.link))
    }
}
