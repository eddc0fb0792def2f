use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::visual::{TransientVisual, VisualHandle, VisualKind};

/// Presentation surface the effects draw onto. Styling and transitions are
/// owned by whatever sits behind it; the core only appends, removes and
/// scrolls.
pub trait Surface {
    fn insert(&mut self, visual: TransientVisual);

    /// Removes a visual. Returns `false` if it was not on the surface.
    fn remove(&mut self, handle: VisualHandle) -> bool;

    /// Replaces the flutter displacement of a live visual.
    fn nudge(&mut self, handle: VisualHandle, offset: (f32, f32));

    /// Smoothly scrolls a page's content back to its top.
    fn scroll_to_top(&mut self, page: usize);
}

/// Running totals kept by [`Stage`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStats {
    pub inserted: usize,
    pub removed: usize,
    pub peak_live: usize,
    pub by_kind: BTreeMap<VisualKind, usize>,
    pub scroll_resets: usize,
}

/// In-memory [`Surface`] that keeps the live visuals around for inspection.
#[derive(Debug, Default)]
pub struct Stage {
    live: BTreeMap<VisualHandle, TransientVisual>,
    stats: StageStats,
    last_scrolled: Option<usize>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn get(&self, handle: VisualHandle) -> Option<&TransientVisual> {
        self.live.get(&handle)
    }

    pub fn visuals(&self) -> impl Iterator<Item = &TransientVisual> {
        self.live.values()
    }

    pub fn count_of(&self, kind: VisualKind) -> usize {
        self.live.values().filter(|v| v.kind == kind).count()
    }

    pub fn stats(&self) -> &StageStats {
        &self.stats
    }

    pub fn last_scrolled(&self) -> Option<usize> {
        self.last_scrolled
    }
}

impl Surface for Stage {
    fn insert(&mut self, visual: TransientVisual) {
        tracing::trace!(handle = visual.handle.0, kind = ?visual.kind, "visual inserted");
        self.stats.inserted += 1;
        *self.stats.by_kind.entry(visual.kind).or_default() += 1;
        self.live.insert(visual.handle, visual);
        self.stats.peak_live = self.stats.peak_live.max(self.live.len());
    }

    fn remove(&mut self, handle: VisualHandle) -> bool {
        let removed = self.live.remove(&handle).is_some();
        if removed {
            tracing::trace!(handle = handle.0, "visual removed");
            self.stats.removed += 1;
        }
        removed
    }

    fn nudge(&mut self, handle: VisualHandle, offset: (f32, f32)) {
        if let Some(visual) = self.live.get_mut(&handle) {
            visual.offset = offset;
        }
    }

    fn scroll_to_top(&mut self, page: usize) {
        self.stats.scroll_resets += 1;
        self.last_scrolled = Some(page);
    }
}
