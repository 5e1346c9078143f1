//! Page navigation with a two-phase fade transition.
//!
//! `navigate` starts a fade-out; once [`FADE_OUT`] has elapsed the page is swapped and the
//! scroll position reset, then the incoming page fades in for [`SETTLE`] before the
//! controller is idle again. Phases advance only when [`Navigator::poll`] observes the
//! clock past a deadline.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tracing::debug;

use crate::clock::Clock;

pub const FADE_OUT: Duration = Duration::from_millis(300);
pub const SETTLE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    #[default]
    Landing,
    SignIn,
    SignUp,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    FadingOut { target: Page, since: Instant },
    Swapping { target: Page },
    FadingIn { since: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationEvent {
    Started { from: Page, to: Page },
    /// A navigation arrived while another was still fading out; the newest target wins.
    Restarted { abandoned: Page, to: Page },
    PageSwapped { from: Page, to: Page },
    ScrollReset,
    Settled { page: Page },
}

pub struct Navigator {
    clock: Arc<dyn Clock>,
    page: Page,
    phase: TransitionPhase,
    scroll_offset: u32,
}

impl Navigator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            page: Page::default(),
            phase: TransitionPhase::Idle,
            scroll_offset: 0,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    /// True from `navigate` until the incoming page has settled.
    pub fn is_transitioning(&self) -> bool {
        !matches!(self.phase, TransitionPhase::Idle)
    }

    pub fn scroll_offset(&self) -> u32 {
        self.scroll_offset
    }

    pub fn set_scroll_offset(&mut self, offset: u32) {
        self.scroll_offset = offset;
    }

    pub fn navigate(&mut self, target: Page) -> NavigationEvent {
        let since = self.clock.now();
        let event = match self.phase {
            TransitionPhase::FadingOut {
                target: abandoned, ..
            } => NavigationEvent::Restarted {
                abandoned,
                to: target,
            },
            _ => NavigationEvent::Started {
                from: self.page,
                to: target,
            },
        };
        debug!(?event, "navigation requested");
        self.phase = TransitionPhase::FadingOut { target, since };
        event
    }

    /// The instant at which the next phase change becomes due, if a transition is running.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.phase {
            TransitionPhase::Idle => None,
            TransitionPhase::FadingOut { since, .. } => Some(since + FADE_OUT),
            TransitionPhase::Swapping { .. } => Some(self.clock.now()),
            TransitionPhase::FadingIn { since } => Some(since + SETTLE),
        }
    }

    pub fn poll(&mut self) -> Vec<NavigationEvent> {
        let mut events = Vec::new();
        loop {
            let now = self.clock.now();
            match self.phase {
                TransitionPhase::FadingOut { target, since }
                    if now.saturating_duration_since(since) >= FADE_OUT =>
                {
                    self.phase = TransitionPhase::Swapping { target };
                }
                TransitionPhase::Swapping { target } => {
                    let from = self.page;
                    self.page = target;
                    self.scroll_offset = 0;
                    events.push(NavigationEvent::PageSwapped { from, to: target });
                    events.push(NavigationEvent::ScrollReset);
                    self.phase = TransitionPhase::FadingIn { since: now };
                }
                TransitionPhase::FadingIn { since }
                    if now.saturating_duration_since(since) >= SETTLE =>
                {
                    self.phase = TransitionPhase::Idle;
                    events.push(NavigationEvent::Settled { page: self.page });
                }
                _ => break,
            }
        }
        if !events.is_empty() {
            debug!(page = ?self.page, phase = ?self.phase, ?events, "navigation advanced");
        }
        events
    }

    /// Sleeps on the tokio timer until the running transition (if any) settles.
    pub async fn settle(&mut self) -> Vec<NavigationEvent> {
        let mut events = self.poll();
        while let Some(deadline) = self.next_deadline() {
            let wait = deadline.saturating_duration_since(self.clock.now());
            tokio::time::sleep(wait).await;
            events.extend(self.poll());
        }
        events
    }
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
