//! Top-level orchestration of the card.
//!
//! [`Presentation`] turns user input into navigation, audio and effect work.
//! All deferred work lives on one [`Scheduler`] driven by
//! [`Presentation::advance`], so a host only has to forward input events and
//! pump time.

use std::{sync::Arc, time::Duration};

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    ambience::{Ambience, PeriodicEmissionJob},
    audio::{AudioBackend, AudioEngine, Cue, SilentBackend},
    book::{Book, BookState, ScrollMetrics, Transition},
    burst::BurstJob,
    config::{AppConfig, Capabilities, EffectProfile, SongOption},
    emitter::{EffectTask, Emitter},
    overlay::{FinalOverlay, Resolution},
    render::{Stage, Surface},
    timeline::{ScheduledEvent, Scheduler},
    visual::{EmissionStyle, VisualHandle},
    CardError, Result,
};

/// Work queued on the presentation's timer queue.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Effect(EffectTask),
    RevealOverlay,
}

impl From<EffectTask> for Task {
    fn from(task: EffectTask) -> Self {
        Self::Effect(task)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    MusicSelection,
    Book,
}

/// State of the floating music button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MusicToggle {
    Hidden,
    Playing,
    Muted,
}

impl MusicToggle {
    pub fn icon(&self) -> Option<&'static str> {
        match self {
            Self::Hidden => None,
            Self::Playing => Some("🔊"),
            Self::Muted => Some("🔇"),
        }
    }
}

/// What a free click landed on. Interactive controls do not get a heart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Cover,
    NextButton,
    SongOption,
    Other,
}

pub struct Presentation<S, B, R>
where
    S: Surface,
    B: AudioBackend,
    R: Rng,
{
    capabilities: Capabilities,
    profile: EffectProfile,
    songs: Vec<SongOption>,
    surface: S,
    audio: AudioEngine<B>,
    rng: R,
    timers: Scheduler<Task>,
    emitter: Emitter,
    ambience: Ambience,
    book: Book,
    overlay: FinalOverlay,
    screen: Screen,
    toggle: MusicToggle,
    torn_down: bool,
}

impl Presentation<Stage, SilentBackend, StdRng> {
    /// Builds a presentation on the in-memory stage and silent audio backend.
    pub fn in_memory(config: &AppConfig, backend: SilentBackend) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(config, Stage::new(), backend, rng)
    }
}

impl<S, B, R> Presentation<S, B, R>
where
    S: Surface,
    B: AudioBackend,
    R: Rng,
{
    pub fn new(config: &AppConfig, surface: S, backend: B, rng: R) -> Result<Self> {
        config.validate()?;
        let mut presentation = Self {
            capabilities: config.capabilities,
            profile: config.profile(),
            songs: config.songs.clone(),
            surface,
            audio: AudioEngine::new(backend, config.cues.yes.clone(), config.cues.cute.clone()),
            rng,
            timers: Scheduler::new(),
            emitter: Emitter::new(),
            ambience: Ambience::new(),
            book: Book::new(config.pages)?,
            overlay: FinalOverlay::new(),
            screen: Screen::MusicSelection,
            toggle: MusicToggle::Hidden,
            torn_down: false,
        };

        tracing::info!(
            pages = config.pages,
            device = ?presentation.capabilities.device,
            reduced_motion = presentation.capabilities.reduced_motion,
            "presentation ready"
        );
        if !presentation.profile.reduced_motion {
            presentation.spawn_butterflies();
        }
        Ok(presentation)
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn music_toggle(&self) -> MusicToggle {
        self.toggle
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn overlay(&self) -> &FinalOverlay {
        &self.overlay
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn audio(&self) -> &AudioEngine<B> {
        &self.audio
    }

    pub fn ambience(&self) -> &Ambience {
        &self.ambience
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn live_visuals(&self) -> usize {
        self.emitter.live()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Picks the background song and reveals the book. A rejected playback
    /// only costs the music; the rest of the experience proceeds.
    pub fn select_song(&mut self, index: usize) -> Result<()> {
        self.ensure_live()?;
        let song = self
            .songs
            .get(index)
            .cloned()
            .ok_or(CardError::UnknownSong(index))?;

        match self.audio.play_song(&song.source) {
            Ok(()) => tracing::info!(title = %song.title, "music started"),
            Err(err) => {
                tracing::warn!(title = %song.title, %err, "autoplay prevented, showing book anyway");
            }
        }

        self.screen = Screen::Book;
        self.toggle = if self.audio.is_playing() {
            MusicToggle::Playing
        } else {
            MusicToggle::Muted
        };

        if !self.profile.reduced_motion {
            self.spawn_butterflies();
            self.start_ambience();
            BurstJob::new(
                self.profile.opening_burst,
                self.profile.opening_burst_step,
                EmissionStyle::opening_burst(),
            )
            .fire(&mut self.timers);
        }
        Ok(())
    }

    pub fn click_cover(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.book.open()?;
        self.fire_hearts();
        Ok(())
    }

    /// Handles the "next" control of the active page.
    pub fn click_next(&mut self) -> Result<Transition> {
        self.ensure_live()?;
        let transition = self.book.advance()?;
        match transition {
            Transition::Turned { to, .. } => self.surface.scroll_to_top(to),
            Transition::Closed => {
                self.fire_hearts();
                if self.overlay.schedule() {
                    self.timers.after(self.profile.overlay_delay, Task::RevealOverlay);
                }
            }
            Transition::Opened => {}
        }
        Ok(transition)
    }

    /// Feeds a scroll observation of one page. Returns its controls flag.
    pub fn scroll_page(&mut self, page: usize, metrics: ScrollMetrics) -> Result<bool> {
        self.ensure_live()?;
        self.book.on_scroll(page, metrics)
    }

    pub fn toggle_music(&mut self) -> MusicToggle {
        if self.torn_down {
            return self.toggle;
        }
        self.toggle = if self.audio.toggle() {
            MusicToggle::Playing
        } else {
            MusicToggle::Muted
        };
        self.toggle
    }

    /// Reacts to the host being hidden or shown again. Hiding pauses music;
    /// showing leaves it paused until the reader toggles it back.
    pub fn set_hidden(&mut self, hidden: bool) {
        if hidden {
            self.audio.pause_background();
            if self.toggle != MusicToggle::Hidden {
                self.toggle = MusicToggle::Muted;
            }
        }
    }

    /// Click-to-like: a small heart at the pointer.
    pub fn click(&mut self, target: ClickTarget, x: f32, y: f32) -> Option<VisualHandle> {
        if target != ClickTarget::Other || self.profile.reduced_motion || self.torn_down {
            return None;
        }
        let style = EmissionStyle::click_heart(x, y);
        Some(
            self.emitter
                .emit(&style, &mut self.rng, &mut self.surface, &mut self.timers),
        )
    }

    pub fn choose_affirmative(&mut self) -> Option<Resolution> {
        if self.torn_down {
            return None;
        }
        let resolution = self.overlay.affirm()?;
        self.audio.play_cue(Cue::Yes);
        BurstJob::new(
            self.profile.romantic_burst,
            self.profile.celebration_step,
            EmissionStyle::romantic(),
        )
        .fire(&mut self.timers);
        Some(resolution)
    }

    /// Hides the negative answer and offers the shy affirmation instead.
    pub fn choose_negative(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        self.overlay.decline()
    }

    pub fn choose_shy(&mut self) -> Option<Resolution> {
        if self.torn_down {
            return None;
        }
        let resolution = self.overlay.accept_shy()?;
        self.audio.play_cue(Cue::Cute);
        BurstJob::new(
            self.profile.cute_burst,
            self.profile.celebration_step,
            EmissionStyle::cute(),
        )
        .fire(&mut self.timers);
        Some(resolution)
    }

    /// Moves time forward by `delta`, running every timer that comes due.
    pub fn advance(&mut self, delta: Duration) {
        if self.torn_down {
            return;
        }
        let until = self.timers.now().saturating_add(delta);
        while let Some(event) = self.timers.pop_due(until) {
            self.dispatch(event);
        }
        self.timers.settle(until);
    }

    /// Lifecycle hook for unload. Stops the ambience, releases every visual
    /// and drops all outstanding timers. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.ambience.stop(&mut self.timers);
        let released = self
            .emitter
            .release_all(&mut self.surface, &mut self.timers);
        let dropped = self.timers.pending();
        self.timers.clear();
        self.audio.pause_background();
        tracing::info!(released, dropped, "presentation torn down");
    }

    pub fn state(&self) -> BookState {
        self.book.state()
    }

    fn ensure_live(&self) -> Result<()> {
        if self.torn_down {
            return Err(CardError::TornDown);
        }
        Ok(())
    }

    fn dispatch(&mut self, event: ScheduledEvent<Task>) {
        match event.task {
            Task::Effect(EffectTask::Emit(style)) => {
                self.emitter
                    .emit(&style, &mut self.rng, &mut self.surface, &mut self.timers);
            }
            Task::Effect(EffectTask::Expire(handle)) => {
                self.emitter
                    .expire(handle, &mut self.surface, &mut self.timers);
            }
            Task::Effect(EffectTask::Flutter(handle)) => {
                self.emitter.flutter(handle, &mut self.rng, &mut self.surface);
            }
            Task::Effect(EffectTask::AmbienceTick) => {
                if let Some(style) = self.ambience.tick(event.id, &mut self.rng) {
                    self.emitter
                        .emit(&style, &mut self.rng, &mut self.surface, &mut self.timers);
                }
            }
            Task::RevealOverlay => {
                self.overlay.reveal();
            }
        }
    }

    fn start_ambience(&mut self) {
        let job = PeriodicEmissionJob {
            cadence: self.profile.ambience_cadence,
            spawn_probability: self.profile.spawn_probability,
            style: Arc::new(EmissionStyle::ambient()),
        };
        self.ambience.start(job, &mut self.timers);
    }

    fn fire_hearts(&mut self) {
        if self.profile.reduced_motion {
            return;
        }
        BurstJob::new(self.profile.hearts, self.profile.heart_step, EmissionStyle::heart())
            .fire(&mut self.timers);
    }

    fn spawn_butterflies(&mut self) {
        let style = EmissionStyle::butterfly(self.profile.butterfly_lifetime);
        for _ in 0..self.profile.butterflies {
            self.emitter
                .emit(&style, &mut self.rng, &mut self.surface, &mut self.timers);
        }
    }
}

impl<S, B, R> Drop for Presentation<S, B, R>
where
    S: Surface,
    B: AudioBackend,
    R: Rng,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
