//! Page navigation for the card's book.
//!
//! The book is either closed or showing exactly one page. Opening always
//! lands on page 1, `advance` turns one page at a time, and advancing from
//! the last page closes the book again and rewinds it for the next read.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CardError, Result};

/// Distance in px from the bottom of a page at which its controls appear.
pub const CONTROLS_REVEAL_MARGIN: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookState {
    Closed,
    Page(usize),
}

impl fmt::Display for BookState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => f.write_str("closed"),
            Self::Page(index) => write!(f, "on page {index}"),
        }
    }
}

/// Outcome of a navigation action, used by the caller to pick side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Opened,
    Turned { from: usize, to: usize },
    Closed,
}

/// Scroll geometry of a page's content box, in px.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f32,
    pub scroll_height: f32,
    pub client_height: f32,
}

impl ScrollMetrics {
    pub fn near_bottom(&self) -> bool {
        self.scroll_top >= self.scroll_height - self.client_height - CONTROLS_REVEAL_MARGIN
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageState {
    pub index: usize,
    pub scroll_top: f32,
    pub controls_visible: bool,
}

#[derive(Debug, Clone)]
pub struct Book {
    pages: Vec<PageState>,
    current: usize,
    open: bool,
}

impl Book {
    pub fn new(page_count: usize) -> Result<Self> {
        if page_count == 0 {
            return Err(CardError::InvalidConfig(
                "the book needs at least one page".to_string(),
            ));
        }
        let pages = (1..=page_count)
            .map(|index| PageState {
                index,
                scroll_top: 0.0,
                controls_visible: false,
            })
            .collect();

        Ok(Self {
            pages,
            current: 1,
            open: false,
        })
    }

    pub fn state(&self) -> BookState {
        if self.open {
            BookState::Page(self.current)
        } else {
            BookState::Closed
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The page carrying the active marker. Page 1 while closed.
    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn is_active(&self, index: usize) -> bool {
        index == self.current
    }

    pub fn is_terminal(&self, index: usize) -> bool {
        index == self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&PageState> {
        index.checked_sub(1).and_then(|slot| self.pages.get(slot))
    }

    pub fn pages(&self) -> &[PageState] {
        &self.pages
    }

    pub fn open(&mut self) -> Result<Transition> {
        if self.open {
            return Err(CardError::InvalidTransition {
                from: self.state(),
                action: "open",
            });
        }
        self.open = true;
        self.current = 1;
        tracing::info!("book opened");
        Ok(Transition::Opened)
    }

    pub fn advance(&mut self) -> Result<Transition> {
        if !self.open {
            return Err(CardError::InvalidTransition {
                from: self.state(),
                action: "advance",
            });
        }

        let from = self.current;
        if self.is_terminal(from) {
            self.open = false;
            self.current = 1;
            tracing::info!(from, "book closed");
            return Ok(Transition::Closed);
        }

        let to = from + 1;
        self.current = to;
        let page = self.page_mut(to)?;
        page.scroll_top = 0.0;
        page.controls_visible = false;
        tracing::info!(from, to, "page turned");
        Ok(Transition::Turned { from, to })
    }

    /// Records a scroll of one page's content and updates that page's
    /// controls flag. Returns the new flag.
    pub fn on_scroll(&mut self, index: usize, metrics: ScrollMetrics) -> Result<bool> {
        let page = self.page_mut(index)?;
        page.scroll_top = metrics.scroll_top;
        page.controls_visible = metrics.near_bottom();
        Ok(page.controls_visible)
    }

    fn page_mut(&mut self, index: usize) -> Result<&mut PageState> {
        index
            .checked_sub(1)
            .and_then(|slot| self.pages.get_mut(slot))
            .ok_or(CardError::UnknownPage(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scrolled(top: f32) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top: top,
            scroll_height: 1000.0,
            client_height: 400.0,
        }
    }

    #[test]
    fn full_cycle_returns_to_closed_and_reopens_at_page_one() {
        for pages in 1..=6 {
            let mut book = Book::new(pages).unwrap();
            for _ in 0..2 {
                assert_eq!(book.open().unwrap(), Transition::Opened);
                assert_eq!(book.state(), BookState::Page(1));
                for _ in 1..pages {
                    book.advance().unwrap();
                }
                assert_eq!(book.state(), BookState::Page(pages));
                assert_eq!(book.advance().unwrap(), Transition::Closed);
                assert_eq!(book.state(), BookState::Closed);
                assert_eq!(book.current_page(), 1);
            }
        }
    }

    #[test]
    fn exactly_one_page_is_active() {
        let mut book = Book::new(4).unwrap();
        book.open().unwrap();
        book.advance().unwrap();

        let active: Vec<_> = (1..=4).filter(|i| book.is_active(*i)).collect();
        assert_eq!(active, vec![2]);
    }

    #[test]
    fn rejects_illegal_transitions() {
        let mut book = Book::new(3).unwrap();
        let err = book.advance().unwrap_err();
        assert!(matches!(
            err,
            CardError::InvalidTransition {
                from: BookState::Closed,
                action: "advance"
            }
        ));

        book.open().unwrap();
        assert!(book.open().is_err());
        assert!(Book::new(0).is_err());
    }

    #[test]
    fn turning_resets_the_new_page() {
        let mut book = Book::new(3).unwrap();
        book.on_scroll(2, scrolled(600.0)).unwrap();
        assert!(book.page(2).unwrap().controls_visible);

        book.open().unwrap();
        assert_eq!(book.advance().unwrap(), Transition::Turned { from: 1, to: 2 });
        let page = book.page(2).unwrap();
        assert_eq!(page.scroll_top, 0.0);
        assert!(!page.controls_visible);
    }

    #[test]
    fn scroll_threshold_toggles_only_that_page() {
        let mut book = Book::new(3).unwrap();

        assert!(book.on_scroll(1, scrolled(550.0)).unwrap());
        assert!(!book.page(2).unwrap().controls_visible);
        assert!(!book.on_scroll(1, scrolled(549.0)).unwrap());
        assert!(book.on_scroll(3, scrolled(600.0)).unwrap());
        assert!(!book.page(1).unwrap().controls_visible);

        assert!(matches!(
            book.on_scroll(4, scrolled(0.0)),
            Err(CardError::UnknownPage(4))
        ));
        assert!(book.on_scroll(0, scrolled(0.0)).is_err());
    }
}
