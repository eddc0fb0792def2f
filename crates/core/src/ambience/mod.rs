use std::{sync::Arc, time::Duration};

use rand::Rng;

use crate::{
    emitter::EffectTask,
    timeline::{Scheduler, TimerId},
    visual::EmissionStyle,
};

/// Low-rate background emission: every `cadence`, a Bernoulli trial with
/// `spawn_probability` decides whether one visual is spawned.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicEmissionJob {
    pub cadence: Duration,
    pub spawn_probability: f64,
    pub style: Arc<EmissionStyle>,
}

#[derive(Debug)]
struct ActiveJob {
    timer: TimerId,
    job: PeriodicEmissionJob,
}

/// Single-slot owner of the ambience timer. Starting a job always stops the
/// previous one first, so at most one tick stream exists.
#[derive(Debug, Default)]
pub struct Ambience {
    slot: Option<ActiveJob>,
    ticks: u64,
}

impl Ambience {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start<T: From<EffectTask>>(&mut self, job: PeriodicEmissionJob, timers: &mut Scheduler<T>) {
        if self.stop(timers) {
            tracing::debug!("restarting ambience");
        }
        let timer = timers.every(job.cadence, EffectTask::AmbienceTick.into());
        tracing::debug!(cadence_ms = job.cadence.as_millis() as u64, "ambience started");
        self.slot = Some(ActiveJob { timer, job });
    }

    /// Cancels the running job, if any. Returns whether one was running.
    pub fn stop<T>(&mut self, timers: &mut Scheduler<T>) -> bool {
        match self.slot.take() {
            Some(active) => {
                timers.cancel(active.timer);
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.slot.is_some()
    }

    pub fn job(&self) -> Option<&PeriodicEmissionJob> {
        self.slot.as_ref().map(|active| &active.job)
    }

    /// Ticks handled since creation, across restarts.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Handles a cadence tick fired by `timer`. Returns the style to emit
    /// when the trial succeeds. Ticks from a timer that no longer owns the
    /// slot are dropped.
    pub fn tick<R: Rng + ?Sized>(&mut self, timer: TimerId, rng: &mut R) -> Option<Arc<EmissionStyle>> {
        let active = self.slot.as_ref().filter(|active| active.timer == timer)?;
        self.ticks += 1;
        rng.random_bool(trial_probability(active.job.spawn_probability))
            .then(|| Arc::clone(&active.job.style))
    }
}

/// Clamps into [0, 1]; NaN never spawns.
fn trial_probability(probability: f64) -> f64 {
    if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn job(cadence_ms: u64, probability: f64) -> PeriodicEmissionJob {
        PeriodicEmissionJob {
            cadence: Duration::from_millis(cadence_ms),
            spawn_probability: probability,
            style: Arc::new(EmissionStyle::ambient()),
        }
    }

    fn run(ambience: &mut Ambience, timers: &mut Scheduler<EffectTask>, until: Duration) -> usize {
        let mut rng = StdRng::seed_from_u64(11);
        let mut spawned = 0;
        while let Some(event) = timers.pop_due(until) {
            if event.task == EffectTask::AmbienceTick && ambience.tick(event.id, &mut rng).is_some() {
                spawned += 1;
            }
        }
        timers.settle(until);
        spawned
    }

    #[test]
    fn restarting_keeps_a_single_tick_stream() {
        let mut ambience = Ambience::new();
        let mut timers = Scheduler::new();

        ambience.start(job(800, 1.0), &mut timers);
        ambience.start(job(800, 1.0), &mut timers);
        assert_eq!(timers.pending(), 1);

        let spawned = run(&mut ambience, &mut timers, Duration::from_millis(8000));
        assert_eq!(ambience.ticks(), 10);
        assert_eq!(spawned, 10);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut ambience = Ambience::new();
        let mut timers = Scheduler::<EffectTask>::new();

        assert!(!ambience.stop(&mut timers));
        ambience.start(job(1500, 0.7), &mut timers);
        assert!(ambience.stop(&mut timers));
        assert!(!ambience.stop(&mut timers));
        assert!(!ambience.is_running());
        assert_eq!(run(&mut ambience, &mut timers, Duration::from_secs(10)), 0);
    }

    #[test]
    fn spawn_rate_follows_probability() {
        let mut ambience = Ambience::new();
        let mut timers = Scheduler::new();
        ambience.start(job(10, 0.7), &mut timers);

        let spawned = run(&mut ambience, &mut timers, Duration::from_secs(10));
        assert_eq!(ambience.ticks(), 1000);
        assert!((600..=800).contains(&spawned), "spawned {spawned}");
    }

    #[test]
    fn out_of_range_probabilities_are_clamped() {
        for (probability, expected) in [(f64::NAN, 0), (-3.0, 0), (f64::INFINITY, 10)] {
            let mut ambience = Ambience::new();
            let mut timers = Scheduler::new();
            ambience.start(job(100, probability), &mut timers);

            assert_eq!(run(&mut ambience, &mut timers, Duration::from_secs(1)), expected);
            assert_eq!(ambience.ticks(), 10);
        }
    }

    #[test]
    fn never_spawns_at_zero_probability() {
        let mut ambience = Ambience::new();
        let mut timers = Scheduler::new();
        ambience.start(job(100, 0.0), &mut timers);

        assert_eq!(run(&mut ambience, &mut timers, Duration::from_secs(2)), 0);
        assert_eq!(ambience.ticks(), 20);
    }
}
