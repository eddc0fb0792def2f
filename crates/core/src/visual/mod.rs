//! Decorative elements and the styles they are spawned from.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const FLUTTER_CADENCE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualKind {
    Butterfly,
    Emoji,
    Heart,
    CelebrationEmoji,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Percent of the viewport (`vw` horizontally, `vh` vertically).
    Viewport,
    Px,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub unit: Unit,
}

/// Where a new visual may appear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpawnRegion {
    /// Anywhere on screen.
    Viewport,
    /// Around the centre of the screen, up to `radius` viewport percent away
    /// on each axis.
    Centered { radius: f32 },
    /// Exactly at a pointer position, in px.
    Cursor { x: f32, y: f32 },
}

/// Inclusive `[min, max]` sampling range. `min == max` is a fixed value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span<T> {
    pub min: T,
    pub max: T,
}

impl<T: Copy> Span<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub const fn fixed(value: T) -> Self {
        Self {
            min: value,
            max: value,
        }
    }
}

/// Everything the emitter randomizes for one family of visuals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionStyle {
    pub kind: VisualKind,
    pub symbols: Vec<String>,
    pub palette: Vec<String>,
    pub region: SpawnRegion,
    /// `None` leaves sizing to the stylesheet.
    pub size_px: Option<Span<f32>>,
    pub animation: Option<Span<Duration>>,
    pub animation_delay: Option<Span<Duration>>,
    pub hue_rotate_deg: Option<Span<f32>>,
    pub lifetime: Duration,
    pub flutter: Option<Duration>,
}

impl EmissionStyle {
    fn symbols(kind: VisualKind, symbols: &[&str], lifetime: Duration) -> Self {
        Self {
            kind,
            symbols: symbols.iter().map(|s| (*s).to_string()).collect(),
            palette: Vec::new(),
            region: SpawnRegion::Viewport,
            size_px: None,
            animation: None,
            animation_delay: None,
            hue_rotate_deg: None,
            lifetime,
            flutter: None,
        }
    }

    /// Background drift of flowers, butterflies and hearts.
    pub fn ambient() -> Self {
        Self {
            size_px: Some(Span::new(20.0, 50.0)),
            animation: Some(Span::new(secs(3.0), secs(6.0))),
            ..Self::symbols(
                VisualKind::Emoji,
                &["🌺", "🦋", "🌸", "💖", "🌹", "💐"],
                secs(5.0),
            )
        }
    }

    /// Wave that greets the reader once a song is picked.
    pub fn opening_burst() -> Self {
        Self {
            region: SpawnRegion::Centered { radius: 10.0 },
            size_px: Some(Span::new(30.0, 70.0)),
            animation: Some(Span::new(secs(4.0), secs(6.0))),
            ..Self::symbols(VisualKind::Emoji, &["🌺", "🦋"], secs(6.0))
        }
    }

    pub fn heart() -> Self {
        Self {
            size_px: Some(Span::new(10.0, 30.0)),
            animation: Some(Span::new(secs(2.0), secs(5.0))),
            ..Self::symbols(VisualKind::Heart, &["❤️"], secs(4.0))
        }
    }

    pub fn click_heart(x: f32, y: f32) -> Self {
        Self {
            region: SpawnRegion::Cursor { x, y },
            size_px: Some(Span::fixed(20.0)),
            animation: Some(Span::fixed(secs(3.0))),
            ..Self::symbols(VisualKind::Heart, &["❤️"], secs(3.0))
        }
    }

    pub fn romantic() -> Self {
        Self::symbols(
            VisualKind::CelebrationEmoji,
            &["💖", "🌹", "💐", "❤️"],
            secs(3.0),
        )
    }

    pub fn cute() -> Self {
        Self::symbols(
            VisualKind::CelebrationEmoji,
            &["🐥", "🥰", "🐣", "🐤", "💞"],
            secs(3.0),
        )
    }

    pub fn butterfly(lifetime: Duration) -> Self {
        Self {
            kind: VisualKind::Butterfly,
            symbols: Vec::new(),
            palette: ["#ff66b3", "#ff99cc", "#ffb3d9", "#ff80bf"]
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
            region: SpawnRegion::Viewport,
            size_px: Some(Span::new(20.0, 50.0)),
            animation: None,
            animation_delay: Some(Span::new(Duration::ZERO, secs(15.0))),
            hue_rotate_deg: Some(Span::new(0.0, 60.0)),
            lifetime,
            flutter: Some(FLUTTER_CADENCE),
        }
    }
}

/// A decorative element living on the surface for a bounded time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransientVisual {
    pub handle: VisualHandle,
    pub kind: VisualKind,
    pub symbol: Option<String>,
    pub color: Option<String>,
    pub position: Position,
    /// Flutter displacement in px, applied on top of `position`.
    pub offset: (f32, f32),
    pub size_px: Option<f32>,
    pub animation: Option<Duration>,
    pub animation_delay: Option<Duration>,
    pub hue_rotate_deg: Option<f32>,
    pub spawned_at: Duration,
    pub lifetime: Duration,
}

impl TransientVisual {
    pub fn expires_at(&self) -> Duration {
        self.spawned_at.saturating_add(self.lifetime)
    }
}

fn secs(value: f64) -> Duration {
    Duration::from_secs_f64(value)
}
