//! Resume-on-entry for reading views.
//!
//! When a surah or juz is opened, its saved scroll offset decides what
//! happens:
//!
//! ```text
//! Idle ──offset > threshold──▶ Prompting ──accept──▶ Restoring ──▶ Highlighted ──10s──▶ Idle
//!   │                             └──decline──▶ Idle     ▲
//!   └──auto restore───────────────────────────────────────┘
//! ```
//!
//! The coordinator tells the view what to do through [`ResumeAction`]s.
//! Closing or dropping it cancels every pending timer.

mod scroll;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::ModeKey;
use crate::store::KeyValueStore;

pub use scroll::{save_offset, saved_offset, ScrollSaver};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResumeTimings {
    /// Offsets at or below this are treated as "at the top".
    pub threshold_px: f64,
    pub restore_delay: Duration,
    pub highlight_duration: Duration,
}

impl Default for ResumeTimings {
    fn default() -> Self {
        Self {
            threshold_px: 10.0,
            restore_delay: Duration::from_millis(800),
            highlight_duration: Duration::from_secs(10),
        }
    }
}

/// What [`ResumeCoordinator::enter`] decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResumeDecision {
    /// Render from the top.
    Idle,
    /// A resume was already offered for this session.
    AlreadyOffered,
    /// Restoring without asking.
    AutoRestore { offset: f64 },
    /// Ask the reader, then call [`ResumeCoordinator::answer`].
    Prompt { offset: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResumePhase {
    Idle,
    Prompting { offset: f64 },
    Restoring { offset: f64 },
    Highlighted { verse: u32 },
}

/// Instructions for the reading view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResumeAction {
    ScrollTo(f64),
    Highlight(u32),
    ClearHighlight,
}

pub struct ResumeCoordinator<S: KeyValueStore> {
    store: Arc<S>,
    mode: ModeKey,
    timings: ResumeTimings,
    phase: Arc<Mutex<ResumePhase>>,
    highlight_verse: Option<u32>,
    offered: bool,
    actions: mpsc::UnboundedSender<ResumeAction>,
    timers: Vec<JoinHandle<()>>,
}

impl<S: KeyValueStore> ResumeCoordinator<S> {
    pub fn new(
        store: Arc<S>,
        mode: ModeKey,
        timings: ResumeTimings,
    ) -> (Self, mpsc::UnboundedReceiver<ResumeAction>) {
        let (actions, rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            store,
            mode,
            timings,
            phase: Arc::new(Mutex::new(ResumePhase::Idle)),
            highlight_verse: None,
            offered: false,
            actions,
            timers: Vec::new(),
        };
        (coordinator, rx)
    }

    pub fn mode(&self) -> ModeKey {
        self.mode
    }

    pub fn phase(&self) -> ResumePhase {
        *lock(&self.phase)
    }

    /// Decide how to open the view. `highlight_verse` is the ayah to mark
    /// once the offset is restored.
    pub async fn enter(&mut self, auto_restore: bool, highlight_verse: Option<u32>) -> ResumeDecision {
        if self.offered {
            return ResumeDecision::AlreadyOffered;
        }
        self.offered = true;
        self.highlight_verse = highlight_verse;

        let offset = match saved_offset(&*self.store, self.mode).await {
            Some(offset) if offset > self.timings.threshold_px => offset,
            _ => {
                self.set_phase(ResumePhase::Idle);
                return ResumeDecision::Idle;
            }
        };

        if auto_restore {
            self.schedule_restore(offset);
            ResumeDecision::AutoRestore { offset }
        } else {
            self.set_phase(ResumePhase::Prompting { offset });
            ResumeDecision::Prompt { offset }
        }
    }

    /// Answer a pending prompt. Ignored unless prompting.
    pub fn answer(&mut self, accept: bool) {
        let ResumePhase::Prompting { offset } = self.phase() else {
            return;
        };

        if accept {
            self.schedule_restore(offset);
        } else {
            self.set_phase(ResumePhase::Idle);
        }
    }

    /// Allow the next [`enter`](Self::enter) to offer a resume again, as
    /// after an explicit reload following a load error.
    pub fn retry(&mut self) {
        self.close();
        self.offered = false;
    }

    /// Cancel pending timers. Nothing is emitted afterwards.
    pub fn close(&mut self) {
        for timer in self.timers.drain(..) {
            timer.abort();
        }
        self.set_phase(ResumePhase::Idle);
    }

    fn set_phase(&self, phase: ResumePhase) {
        *lock(&self.phase) = phase;
    }

    fn schedule_restore(&mut self, offset: f64) {
        self.set_phase(ResumePhase::Restoring { offset });

        let phase = self.phase.clone();
        let actions = self.actions.clone();
        let verse = self.highlight_verse;
        let ResumeTimings {
            restore_delay,
            highlight_duration,
            ..
        } = self.timings;

        let timer = tokio::spawn(async move {
            tokio::time::sleep(restore_delay).await;

            // A dropped receiver only means the view is gone.
            let _ = actions.send(ResumeAction::ScrollTo(offset));

            let Some(verse) = verse else {
                *lock(&phase) = ResumePhase::Idle;
                return;
            };

            let _ = actions.send(ResumeAction::Highlight(verse));
            *lock(&phase) = ResumePhase::Highlighted { verse };

            tokio::time::sleep(highlight_duration).await;

            let _ = actions.send(ResumeAction::ClearHighlight);
            *lock(&phase) = ResumePhase::Idle;
        });

        self.timers.push(timer);
    }
}

impl<S: KeyValueStore> Drop for ResumeCoordinator<S> {
    fn drop(&mut self) {
        for timer in self.timers.drain(..) {
            timer.abort();
        }
    }
}

fn lock(m: &Mutex<ResumePhase>) -> MutexGuard<'_, ResumePhase> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
