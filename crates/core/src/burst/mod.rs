use std::{sync::Arc, time::Duration};

use crate::{emitter::EffectTask, timeline::Scheduler, visual::EmissionStyle};

/// A finite, staggered wave of emissions. Once fired it runs to completion
/// on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct BurstJob {
    pub count: usize,
    pub step_delay: Duration,
    pub style: Arc<EmissionStyle>,
}

impl BurstJob {
    pub fn new(count: usize, step_delay: Duration, style: EmissionStyle) -> Self {
        Self {
            count,
            step_delay,
            style: Arc::new(style),
        }
    }

    /// Queues `count` emissions, the i-th `i * step_delay` from now. Each call
    /// owns its own timers, so bursts may overlap freely.
    pub fn fire<T: From<EffectTask>>(&self, timers: &mut Scheduler<T>) {
        tracing::debug!(
            count = self.count,
            step_ms = self.step_delay.as_millis() as u64,
            kind = ?self.style.kind,
            "burst fired"
        );
        let mut delay = Duration::ZERO;
        for _ in 0..self.count {
            timers.after(delay, EffectTask::Emit(Arc::clone(&self.style)).into());
            delay = delay.saturating_add(self.step_delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emission_times(count: usize) -> Vec<u128> {
        let mut timers = Scheduler::<EffectTask>::new();
        BurstJob::new(count, Duration::from_millis(100), EmissionStyle::cute()).fire(&mut timers);

        let mut times = Vec::new();
        while let Some(event) = timers.pop_due(Duration::from_secs(60)) {
            assert!(matches!(event.task, EffectTask::Emit(_)));
            times.push(event.due.as_millis());
        }
        times
    }

    #[test]
    fn emits_exactly_count_times_on_the_step_grid() {
        for count in [0, 1, 30, 50] {
            let times = emission_times(count);
            assert_eq!(times.len(), count);
            for (j, at) in times.iter().enumerate() {
                assert_eq!(*at, j as u128 * 100);
            }
        }
    }

    #[test]
    fn overlapping_bursts_are_independent() {
        let mut timers = Scheduler::<EffectTask>::new();
        let hearts = BurstJob::new(3, Duration::from_millis(300), EmissionStyle::heart());
        hearts.fire(&mut timers);
        hearts.fire(&mut timers);

        assert_eq!(timers.pending(), 6);
    }
}
