//! Hover fade scheduling.
//!
//! A fade is a fixed number of paint calls at one position, each followed by
//! a fixed delay. The scheduler does not sleep; the worker asks it for the
//! next deadline and calls [`FadeScheduler::due`] when it passes.

use std::time::Duration;

use floormap_protocol::{RelPos, ShapeId};
use tokio::time::Instant;

use crate::config::{AnimationPolicy, Timing};

/// The shape the worker last saw under the pointer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Hover {
    /// Nothing rendered yet. Never equal to a hit-test result, so the first
    /// render always fades.
    #[default]
    Unset,
    Nothing,
    Shape(ShapeId),
}

impl From<Option<ShapeId>> for Hover {
    fn from(candidate: Option<ShapeId>) -> Self {
        match candidate {
            Some(shape) => Hover::Shape(shape),
            None => Hover::Nothing,
        }
    }
}

/// Work the scheduler hands back to the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum FadeEvent {
    Paint(RelPos),
    /// A fade finished and its target becomes the hover state
    /// ([`AnimationPolicy::Overlap`] only).
    Commit(Hover),
}

#[derive(Debug)]
struct Fade {
    pos: RelPos,
    target: Hover,
    painted: u32,
    next_at: Instant,
}

#[derive(Debug)]
pub struct FadeScheduler {
    frames: u32,
    delay: Duration,
    policy: AnimationPolicy,
    active: Vec<Fade>,
}

impl FadeScheduler {
    pub fn new(timing: &Timing) -> Self {
        Self {
            frames: timing.fade_frames,
            delay: timing.fade_delay,
            policy: timing.animation_policy,
            active: Vec::new(),
        }
    }

    /// Whether a fade target becomes the hover state only when it finishes.
    pub fn commits_on_finish(&self) -> bool {
        self.policy == AnimationPolicy::Overlap
    }

    /// Schedule a fade whose first paint is due at `now`. Under
    /// [`AnimationPolicy::Supersede`] any running fade is dropped.
    pub fn start(&mut self, pos: RelPos, target: Hover, now: Instant) {
        if self.policy == AnimationPolicy::Supersede {
            self.active.clear();
        }
        self.active.push(Fade {
            pos,
            target,
            painted: 0,
            next_at: now,
        });
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// Earliest deadline among running fades.
    pub fn next_due(&self) -> Option<Instant> {
        self.active.iter().map(|fade| fade.next_at).min()
    }

    /// Advance every fade whose deadline has passed by one step.
    pub fn due(&mut self, now: Instant) -> Vec<FadeEvent> {
        let mut events = Vec::new();
        let commit = self.commits_on_finish();
        let (frames, delay) = (self.frames, self.delay);

        self.active.retain_mut(|fade| {
            if fade.next_at > now {
                return true;
            }
            if fade.painted < frames {
                events.push(FadeEvent::Paint(fade.pos));
                fade.painted += 1;
                fade.next_at = now + delay;
                return true;
            }
            if commit {
                events.push(FadeEvent::Commit(fade.target.clone()));
            }
            false
        });
        events
    }
}
