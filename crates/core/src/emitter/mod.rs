use std::{collections::BTreeMap, sync::Arc, time::Duration};

use rand::{seq::IndexedRandom, Rng};

use crate::{
    render::Surface,
    timeline::{Scheduler, TimerId},
    visual::{EmissionStyle, Position, Span, SpawnRegion, TransientVisual, Unit, VisualHandle},
};

/// Largest flutter displacement in px on either axis.
const FLUTTER_REACH: f32 = 10.0;

/// Deferred effect work queued on the presentation [`Scheduler`].
#[derive(Debug, Clone, PartialEq)]
pub enum EffectTask {
    /// Spawn one visual from the style.
    Emit(Arc<EmissionStyle>),
    /// Lifetime of a visual is over.
    Expire(VisualHandle),
    Flutter(VisualHandle),
    /// Cadence tick of the ambience job.
    AmbienceTick,
}

/// Picks one element of `set` uniformly, or `None` if it is empty.
pub fn pick<'a, T, R: Rng + ?Sized>(set: &'a [T], rng: &mut R) -> Option<&'a T> {
    set.choose(rng)
}

/// Spawns visuals onto a surface and guarantees each one is removed again.
///
/// Every visual the emitter inserts stays in its registry until it expires
/// or [`Emitter::release_all`] runs, so nothing outlives its owner. Flutter
/// timers are tied to the visual they move.
#[derive(Debug, Default)]
pub struct Emitter {
    next_handle: u64,
    live: BTreeMap<VisualHandle, Option<TimerId>>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of visuals emitted and not yet released.
    pub fn live(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, handle: VisualHandle) -> bool {
        self.live.contains_key(&handle)
    }

    /// Randomizes a visual from `style`, inserts it and schedules its removal
    /// after exactly `style.lifetime`.
    pub fn emit<R, S, T>(
        &mut self,
        style: &EmissionStyle,
        rng: &mut R,
        surface: &mut S,
        timers: &mut Scheduler<T>,
    ) -> VisualHandle
    where
        R: Rng + ?Sized,
        S: Surface + ?Sized,
        T: From<EffectTask>,
    {
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;

        let visual = TransientVisual {
            handle,
            kind: style.kind,
            symbol: pick(&style.symbols, rng).cloned(),
            color: pick(&style.palette, rng).cloned(),
            position: place(style.region, rng),
            offset: (0.0, 0.0),
            size_px: style.size_px.map(|span| sample(span, rng)),
            animation: style.animation.map(|span| sample_duration(span, rng)),
            animation_delay: style.animation_delay.map(|span| sample_duration(span, rng)),
            hue_rotate_deg: style.hue_rotate_deg.map(|span| sample(span, rng)),
            spawned_at: timers.now(),
            lifetime: style.lifetime,
        };

        surface.insert(visual);
        timers.after(style.lifetime, EffectTask::Expire(handle).into());
        let flutter = style
            .flutter
            .map(|cadence| timers.every(cadence, EffectTask::Flutter(handle).into()));
        self.live.insert(handle, flutter);

        handle
    }

    /// Removes an expired visual. Unknown or already released handles are a
    /// no-op.
    pub fn expire<S, T>(&mut self, handle: VisualHandle, surface: &mut S, timers: &mut Scheduler<T>) -> bool
    where
        S: Surface + ?Sized,
    {
        let Some(flutter) = self.live.remove(&handle) else {
            return false;
        };
        if let Some(timer) = flutter {
            timers.cancel(timer);
        }
        surface.remove(handle)
    }

    /// Moves a live visual to a new random displacement.
    pub fn flutter<R, S>(&self, handle: VisualHandle, rng: &mut R, surface: &mut S)
    where
        R: Rng + ?Sized,
        S: Surface + ?Sized,
    {
        if !self.is_live(handle) {
            return;
        }
        let reach = Span::new(-FLUTTER_REACH, FLUTTER_REACH);
        surface.nudge(handle, (sample(reach, rng), sample(reach, rng)));
    }

    /// Removes every live visual and cancels their flutter timers. Returns the
    /// number released.
    pub fn release_all<S, T>(&mut self, surface: &mut S, timers: &mut Scheduler<T>) -> usize
    where
        S: Surface + ?Sized,
    {
        let live = std::mem::take(&mut self.live);
        for (handle, flutter) in &live {
            if let Some(timer) = flutter {
                timers.cancel(*timer);
            }
            surface.remove(*handle);
        }
        live.len()
    }
}

fn place<R: Rng + ?Sized>(region: SpawnRegion, rng: &mut R) -> Position {
    match region {
        SpawnRegion::Viewport => Position {
            x: sample(Span::new(0.0, 100.0), rng),
            y: sample(Span::new(0.0, 100.0), rng),
            unit: Unit::Viewport,
        },
        SpawnRegion::Centered { radius } => {
            let spread = Span::new(50.0 - radius, 50.0 + radius);
            Position {
                x: sample(spread, rng),
                y: sample(spread, rng),
                unit: Unit::Viewport,
            }
        }
        SpawnRegion::Cursor { x, y } => Position { x, y, unit: Unit::Px },
    }
}

fn sample<R: Rng + ?Sized>(span: Span<f32>, rng: &mut R) -> f32 {
    if span.max <= span.min {
        return span.min;
    }
    rng.random_range(span.min..span.max)
}

fn sample_duration<R: Rng + ?Sized>(span: Span<Duration>, rng: &mut R) -> Duration {
    if span.max <= span.min {
        return span.min;
    }
    rng.random_range(span.min..span.max)
}
