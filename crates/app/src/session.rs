use std::time::Duration;

use keepsake_core::{
    AudioBackend, ClickTarget, Presentation, Resolution, Result, ScrollMetrics, Stage, Surface,
};
use rand::Rng;
use serde_json::{json, Value};

/// Simulated frame length when pumping time in real time.
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Choice {
    Yes,
    No,
}

/// Scripted walk through the card, standing in for a reader.
#[derive(Debug, Clone)]
pub struct SessionPlan {
    pub song: usize,
    pub choice: Choice,
    /// Time spent on each step before the next click.
    pub dwell: Duration,
    /// How long the celebration is left running before teardown.
    pub linger: Duration,
    pub realtime: bool,
}

pub fn run<B, R>(presentation: &mut Presentation<Stage, B, R>, plan: &SessionPlan) -> Result<Value>
where
    B: AudioBackend,
    R: Rng,
{
    presentation.select_song(plan.song)?;
    wait(presentation, plan.dwell, plan.realtime);

    presentation.click(ClickTarget::Other, 240.0, 180.0);
    presentation.click_cover()?;
    wait(presentation, plan.dwell, plan.realtime);

    let pages = presentation.book().page_count();
    for page in 1..=pages {
        let revealed = presentation.scroll_page(page, bottom_of_page())?;
        tracing::info!(page, revealed, "read to the bottom");
        wait(presentation, plan.dwell, plan.realtime);
        presentation.click_next()?;
    }

    while !presentation.overlay().is_visible() && presentation.pending_timers() > 0 {
        wait(presentation, FRAME, plan.realtime);
    }

    let resolution = match plan.choice {
        Choice::Yes => presentation.choose_affirmative(),
        Choice::No => {
            presentation.choose_negative();
            wait(presentation, plan.dwell, plan.realtime);
            presentation.choose_shy()
        }
    };
    wait(presentation, plan.linger, plan.realtime);

    let elapsed = presentation.now();
    let live_before_teardown = presentation.surface().len();
    presentation.teardown();

    Ok(json!({
        "elapsed_ms": elapsed.as_millis() as u64,
        "song": presentation.audio().song(),
        "music_playing_at_end": presentation.audio().is_playing(),
        "resolution": resolution.map(describe),
        "overlay": format!("{:?}", presentation.overlay().phase()),
        "live_before_teardown": live_before_teardown,
        "live_after_teardown": presentation.surface().len(),
        "stage": presentation.surface().stats(),
    }))
}

fn describe(resolution: Resolution) -> &'static str {
    match resolution {
        Resolution::Affirmative => "affirmative",
        Resolution::Shy => "shy",
    }
}

fn bottom_of_page() -> ScrollMetrics {
    ScrollMetrics {
        scroll_top: 760.0,
        scroll_height: 1200.0,
        client_height: 400.0,
    }
}

fn wait<S, B, R>(presentation: &mut Presentation<S, B, R>, duration: Duration, realtime: bool)
where
    S: Surface,
    B: AudioBackend,
    R: Rng,
{
    if !realtime {
        presentation.advance(duration);
        return;
    }

    let mut remaining = duration;
    while !remaining.is_zero() {
        let step = remaining.min(FRAME);
        std::thread::sleep(step);
        presentation.advance(step);
        remaining -= step;
    }
}

#[cfg(test)]
mod tests {
    use keepsake_core::{AppConfig, SilentBackend};

    use super::*;

    fn plan(choice: Choice) -> SessionPlan {
        SessionPlan {
            song: 0,
            choice,
            dwell: Duration::from_millis(500),
            linger: Duration::from_secs(8),
            realtime: false,
        }
    }

    fn presentation() -> Presentation<Stage, SilentBackend, rand::rngs::StdRng> {
        let config = AppConfig {
            seed: Some(7),
            ..AppConfig::default()
        };
        Presentation::in_memory(&config, SilentBackend::new()).unwrap()
    }

    #[test]
    fn yes_session_celebrates_and_cleans_up() {
        let mut p = presentation();
        let report = run(&mut p, &plan(Choice::Yes)).unwrap();

        assert_eq!(report["resolution"], "affirmative");
        assert_eq!(report["live_after_teardown"], 0);
        assert_eq!(report["stage"]["by_kind"]["celebration-emoji"], 50);
    }

    #[test]
    fn no_session_ends_shy() {
        let mut p = presentation();
        let report = run(&mut p, &plan(Choice::No)).unwrap();

        assert_eq!(report["resolution"], "shy");
        assert_eq!(report["stage"]["by_kind"]["celebration-emoji"], 30);
        assert_eq!(report["stage"]["scroll_resets"], 3);
    }
}
