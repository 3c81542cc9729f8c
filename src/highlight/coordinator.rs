//! Highlight emphasis and scroll synchronization.

use std::collections::BTreeMap;

use serde::Serialize;

use super::anchor::{Anchor, AnchorResolver};
use crate::commit::{HighlightKind, HighlightTrigger, Locator};
use crate::core::{HighlightConfig, Millis, TimerSet};

/// An emphasized element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveHighlight {
    pub kind: HighlightKind,
    pub locator: Locator,
    pub anchor: Anchor,
    /// When the emphasis clears
    pub until: Millis,
}

/// A request to bring an anchor into view. `allowed` is false while the
/// user's own scrolling holds the lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrollIntent {
    pub anchor: Anchor,
    pub allowed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum HighlightTimer {
    Emphasis(HighlightKind),
    ScrollLock,
}

/// Turns commit triggers into emphasis and scroll intents.
///
/// One highlight per kind; a newer trigger of the same kind replaces the
/// older one at once. Emphasis and the scroll-lock run on separate timers.
#[derive(Debug, Clone)]
pub struct Highlighter {
    emphasis: Millis,
    scroll_lock: Millis,
    active: BTreeMap<HighlightKind, ActiveHighlight>,
    timers: TimerSet<HighlightTimer>,
    scroll: Option<ScrollIntent>,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(&HighlightConfig::default())
    }
}

impl Highlighter {
    pub fn new(config: &HighlightConfig) -> Self {
        Self {
            emphasis: config.emphasis_ms,
            scroll_lock: config.scroll_lock_ms,
            active: BTreeMap::new(),
            timers: TimerSet::new(),
            scroll: None,
        }
    }

    /// Handle a commit trigger.
    ///
    /// A locator with no rendered anchor is dropped; nothing is queued.
    pub fn trigger(
        &mut self,
        trigger: &HighlightTrigger,
        resolver: &dyn AnchorResolver,
        now: Millis,
    ) -> Option<&ScrollIntent> {
        let Some(anchor) = resolver.resolve(&trigger.locator) else {
            tracing::debug!(locator = %trigger.locator, "Highlight target not rendered, dropping");
            return None;
        };

        let kind = trigger.kind;
        let until = now + self.emphasis;
        let highlight =
            ActiveHighlight { kind, locator: trigger.locator.clone(), anchor: anchor.clone(), until };
        if let Some(previous) = self.active.insert(kind, highlight) {
            tracing::debug!(?kind, replaced = %previous.locator, "Replacing highlight");
        }
        self.timers.arm(HighlightTimer::Emphasis(kind), until);

        let allowed = !self.is_scroll_locked(now);
        if !allowed {
            tracing::debug!(anchor = %anchor.id, "Scroll suppressed by manual scroll");
        }
        self.scroll = Some(ScrollIntent { anchor, allowed });
        self.scroll.as_ref()
    }

    /// The user scrolled or dragged the document view.
    pub fn note_manual_scroll(&mut self, now: Millis) {
        self.timers.arm(HighlightTimer::ScrollLock, now + self.scroll_lock);
    }

    pub fn is_scroll_locked(&self, now: Millis) -> bool {
        self.timers.deadline(&HighlightTimer::ScrollLock).is_some_and(|until| now < until)
    }

    /// Expire emphasis and the scroll-lock.
    pub fn tick(&mut self, now: Millis) {
        for timer in self.timers.due(now) {
            match timer {
                HighlightTimer::Emphasis(kind) => {
                    self.active.remove(&kind);
                }
                HighlightTimer::ScrollLock => {}
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_deadline()
    }

    pub fn active(&self, kind: HighlightKind) -> Option<&ActiveHighlight> {
        self.active.get(&kind)
    }

    pub fn highlights(&self) -> impl Iterator<Item = &ActiveHighlight> {
        self.active.values()
    }

    pub fn is_emphasized(&self, locator: &Locator) -> bool {
        self.active.values().any(|h| &h.locator == locator)
    }

    /// The latest scroll intent, consumed by the presentation.
    pub fn take_scroll_intent(&mut self) -> Option<ScrollIntent> {
        self.scroll.take()
    }

    /// Clear every highlight and timer.
    pub fn teardown(&mut self) {
        self.timers.clear();
        self.active.clear();
        self.scroll = None;
    }
}
