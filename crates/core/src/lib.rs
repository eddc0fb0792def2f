//! Core library for the Keepsake animated greeting card.
//!
//! Each module owns one piece of the presentation: timers, decorative
//! effects, page navigation, the closing overlay and audio. The
//! [`Presentation`] controller wires them to user input. Rendering and sound
//! are reached through the [`Surface`] and [`AudioBackend`] traits so the
//! same sequencing runs in a host UI and under test.

pub mod ambience;
pub mod audio;
pub mod book;
pub mod burst;
pub mod config;
pub mod emitter;
pub mod error;
pub mod overlay;
pub mod presentation;
pub mod render;
pub mod timeline;
pub mod visual;

pub use ambience::{Ambience, PeriodicEmissionJob};
pub use audio::{AudioBackend, AudioEngine, AudioEvent, Channel, Cue, SilentBackend};
pub use book::{Book, BookState, PageState, ScrollMetrics, Transition};
pub use burst::BurstJob;
pub use config::{AppConfig, Capabilities, CueConfig, DeviceClass, EffectProfile, EffectTuning, SongOption};
pub use emitter::{pick, EffectTask, Emitter};
pub use error::{CardError, Result};
pub use overlay::{Backdrop, Controls, FinalOverlay, OverlayPhase, Resolution};
pub use presentation::{ClickTarget, MusicToggle, Presentation, Screen, Task};
pub use render::{Stage, StageStats, Surface};
pub use timeline::{PlaybackClock, ScheduledEvent, Scheduler, TimerId};
pub use visual::{EmissionStyle, Position, Span, SpawnRegion, TransientVisual, Unit, VisualHandle, VisualKind};
