use serde::{Deserialize, Serialize};

/// Lifecycle of the closing question shown after the last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayPhase {
    Hidden,
    /// Reveal is queued behind the closing delay.
    Pending,
    Asking,
    /// The negative answer was declined into the shy affirmation.
    ShyOffered,
    Resolved(Resolution),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Affirmative,
    Shy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Backdrop {
    #[default]
    Plain,
    Blush,
}

/// Which buttons the overlay currently offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub affirmative: bool,
    pub negative: bool,
    pub shy: bool,
}

#[derive(Debug, Clone)]
pub struct FinalOverlay {
    phase: OverlayPhase,
    backdrop: Backdrop,
    negative_spent: bool,
}

impl Default for FinalOverlay {
    fn default() -> Self {
        Self {
            phase: OverlayPhase::Hidden,
            backdrop: Backdrop::Plain,
            negative_spent: false,
        }
    }
}

impl FinalOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    pub fn backdrop(&self) -> Backdrop {
        self.backdrop
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self.phase, OverlayPhase::Hidden | OverlayPhase::Pending)
    }

    pub fn controls(&self) -> Controls {
        match self.phase {
            OverlayPhase::Hidden | OverlayPhase::Pending | OverlayPhase::Resolved(_) => Controls {
                affirmative: false,
                negative: false,
                shy: false,
            },
            OverlayPhase::Asking => Controls {
                affirmative: true,
                negative: !self.negative_spent,
                shy: false,
            },
            OverlayPhase::ShyOffered => Controls {
                affirmative: true,
                negative: false,
                shy: true,
            },
        }
    }

    /// Queues the reveal. Returns `false` if the overlay was already queued
    /// or shown, so the closing delay is only armed once.
    pub fn schedule(&mut self) -> bool {
        if self.phase != OverlayPhase::Hidden {
            return false;
        }
        self.phase = OverlayPhase::Pending;
        true
    }

    pub fn reveal(&mut self) -> bool {
        if self.phase != OverlayPhase::Pending {
            return false;
        }
        tracing::info!("final overlay shown");
        self.phase = OverlayPhase::Asking;
        true
    }

    pub fn affirm(&mut self) -> Option<Resolution> {
        match self.phase {
            OverlayPhase::Asking | OverlayPhase::ShyOffered => {
                self.backdrop = Backdrop::Blush;
                self.resolve(Resolution::Affirmative)
            }
            phase => ignored(phase, "affirm"),
        }
    }

    /// Hides the negative control for good and offers the shy one instead.
    pub fn decline(&mut self) -> bool {
        if self.phase != OverlayPhase::Asking || self.negative_spent {
            ignored(self.phase, "decline");
            return false;
        }
        self.negative_spent = true;
        self.phase = OverlayPhase::ShyOffered;
        tracing::info!("negative answer swapped for the shy one");
        true
    }

    pub fn accept_shy(&mut self) -> Option<Resolution> {
        match self.phase {
            OverlayPhase::ShyOffered => self.resolve(Resolution::Shy),
            phase => ignored(phase, "accept shy"),
        }
    }

    fn resolve(&mut self, resolution: Resolution) -> Option<Resolution> {
        tracing::info!(?resolution, "final overlay resolved");
        self.phase = OverlayPhase::Resolved(resolution);
        Some(resolution)
    }
}

fn ignored(phase: OverlayPhase, choice: &'static str) -> Option<Resolution> {
    tracing::debug!(?phase, choice, "overlay choice ignored");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asking() -> FinalOverlay {
        let mut overlay = FinalOverlay::new();
        assert!(overlay.schedule());
        assert!(overlay.reveal());
        overlay
    }

    #[test]
    fn choices_need_a_visible_overlay() {
        let mut overlay = FinalOverlay::new();
        assert!(overlay.affirm().is_none());
        assert!(!overlay.decline());
        assert!(!overlay.reveal());

        assert!(overlay.schedule());
        assert!(!overlay.schedule());
        assert!(!overlay.is_visible());
        assert!(overlay.affirm().is_none());
    }

    #[test]
    fn affirmative_recolours_and_resolves_once() {
        let mut overlay = asking();
        assert_eq!(overlay.affirm(), Some(Resolution::Affirmative));
        assert_eq!(overlay.backdrop(), Backdrop::Blush);
        assert!(overlay.affirm().is_none());
        assert!(!overlay.decline());
    }

    #[test]
    fn negative_branch_swaps_in_exactly_one_control() {
        let mut overlay = asking();
        let before = overlay.controls();
        assert!(before.negative && !before.shy);

        assert!(overlay.decline());
        let after = overlay.controls();
        assert!(!after.negative);
        assert!(after.shy);
        assert!(!overlay.decline());

        assert_eq!(overlay.accept_shy(), Some(Resolution::Shy));
        assert!(overlay.accept_shy().is_none());
        assert!(!overlay.controls().negative);
        assert_eq!(overlay.backdrop(), Backdrop::Plain);
    }

    #[test]
    fn affirmative_stays_available_next_to_the_shy_control() {
        let mut overlay = asking();
        overlay.decline();
        assert!(overlay.controls().affirmative);
        assert_eq!(overlay.affirm(), Some(Resolution::Affirmative));
    }
}
