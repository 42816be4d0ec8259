//! Screen state for the listing and detail screens.
//!
//! Everything here is pure state: no terminal, no network. The TUI feeds
//! tickets and fetch results in and renders from what comes out.

use crate::state::{ScreenState, Status, Ticket};
use ratatui::style::Color;
use ratatui::widgets::ListState;
use sfhelper_catalog::{FetchError, ProductDetail, ProductPage, ProductSummary};
use std::time::{Duration, Instant};
use tracing::warn;

/// Number of placeholder rows shown while the product list is loading.
pub const PLACEHOLDER_ROWS: usize = 10;

/// Tag chip colors: `#f50`, `#2db7f5`, `#87d068`, `#108ee9`.
pub const CHIP_PALETTE: [Color; 4] = [
    Color::Rgb(0xff, 0x55, 0x00),
    Color::Rgb(0x2d, 0xb7, 0xf5),
    Color::Rgb(0x87, 0xd0, 0x68),
    Color::Rgb(0x10, 0x8e, 0xe9),
];

/// Advance or retreat a wrapping index within `0..count`.
pub(crate) fn wrapping_nav(index: &mut usize, count: usize, forward: bool) {
    if count > 0 {
        *index = if forward {
            (*index + 1) % count
        } else {
            (*index + count - 1) % count
        };
    }
}

/// Clamped (non-wrapping) movement on a `ListState` within `0..count`.
pub(crate) fn list_nav(state: &mut ListState, count: usize, forward: bool) {
    if let Some(selected) = state.selected() {
        if forward {
            if selected < count.saturating_sub(1) {
                state.select(Some(selected + 1));
            }
        } else if selected > 0 {
            state.select(Some(selected - 1));
        }
    }
}

// ============================================================================
// Listing screen
// ============================================================================

#[derive(Debug, Default)]
pub struct ListingScreen {
    pub(crate) state: ScreenState<Vec<ProductSummary>>,
    pub(crate) list_state: ListState,
}

impl ListingScreen {
    /// Enter loading for `ticket`: placeholders come back, selection resets.
    pub fn activate(&mut self, ticket: Ticket) {
        self.state.begin(ticket);
        self.list_state = ListState::default();
    }

    /// Apply a collection response. Returns false if `ticket` is stale.
    pub fn resolve(&mut self, ticket: Ticket, result: Result<ProductPage, FetchError>) -> bool {
        let accepted = match result {
            Ok(page) => self.state.settle(ticket, Status::Loaded, page.products),
            Err(e) => {
                let accepted = self
                    .state
                    .settle(ticket, Status::Failed(e.to_string()), Vec::new());
                if accepted {
                    warn!(error = %e, "product list request failed");
                }
                accepted
            }
        };
        if accepted && !self.state.data().is_empty() {
            self.list_state.select(Some(0));
        }
        accepted
    }

    pub fn status(&self) -> &Status {
        self.state.status()
    }

    pub fn products(&self) -> &[ProductSummary] {
        self.state.data()
    }

    /// Rows on screen: placeholders while loading, products otherwise.
    pub fn row_count(&self) -> usize {
        if self.status().is_loading() {
            PLACEHOLDER_ROWS
        } else {
            self.products().len()
        }
    }

    pub fn selected(&self) -> Option<&ProductSummary> {
        self.list_state
            .selected()
            .and_then(|index| self.products().get(index))
    }

    pub fn select_next(&mut self) {
        let count = self.products().len();
        list_nav(&mut self.list_state, count, true);
    }

    pub fn select_prev(&mut self) {
        let count = self.products().len();
        list_nav(&mut self.list_state, count, false);
    }
}

// ============================================================================
// Detail screen
// ============================================================================

/// Auto-advancing, looping slideshow over image URLs.
#[derive(Debug)]
pub struct Carousel {
    slides: Vec<String>,
    index: usize,
    interval: Duration,
    last_advance: Instant,
}

impl Carousel {
    pub fn new(slides: Vec<String>, interval: Duration, now: Instant) -> Self {
        Self {
            slides,
            index: 0,
            interval,
            last_advance: now,
        }
    }

    pub fn slides(&self) -> &[String] {
        &self.slides
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&str> {
        self.slides.get(self.index).map(String::as_str)
    }

    /// Autoplay: advance one slide once `interval` has passed since the
    /// last move. Returns true if the slide changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.slides.len() < 2 || now.duration_since(self.last_advance) < self.interval {
            return false;
        }
        self.step(true, now);
        true
    }

    /// Manual move; restarts the autoplay timer.
    pub fn step(&mut self, forward: bool, now: Instant) {
        wrapping_nav(&mut self.index, self.slides.len(), forward);
        self.last_advance = now;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Chip {
    pub label: String,
    pub color: Color,
}

/// Palette color for a tag, stable across runs (FNV-1a over the bytes).
pub fn chip_color(tag: &str) -> Color {
    let hash = tag.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    });
    CHIP_PALETTE[(hash % CHIP_PALETTE.len() as u64) as usize]
}

/// One chip per distinct tag, in first-occurrence order.
pub fn build_chips(detail: &ProductDetail) -> Vec<Chip> {
    detail
        .unique_tags()
        .into_iter()
        .map(|tag| Chip {
            label: tag.to_string(),
            color: chip_color(tag),
        })
        .collect()
}

#[derive(Debug)]
pub struct DetailScreen {
    id: String,
    pub(crate) state: ScreenState<ProductDetail>,
    carousel: Carousel,
    chips: Vec<Chip>,
    carousel_interval: Duration,
}

impl DetailScreen {
    pub fn new(id: impl Into<String>, carousel_interval: Duration) -> Self {
        Self {
            id: id.into(),
            state: ScreenState::default(),
            carousel: Carousel::new(Vec::new(), carousel_interval, Instant::now()),
            chips: Vec::new(),
            carousel_interval,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Enter loading for `id`. Used both on first activation and when the
    /// route's id changes; the previous record is dropped either way.
    pub fn activate(&mut self, id: impl Into<String>, ticket: Ticket) {
        self.id = id.into();
        self.state.begin(ticket);
        self.carousel = Carousel::new(Vec::new(), self.carousel_interval, Instant::now());
        self.chips.clear();
    }

    /// Apply an item response. Returns false if `ticket` is stale.
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        result: Result<ProductDetail, FetchError>,
        now: Instant,
    ) -> bool {
        match result {
            Ok(detail) if detail.is_empty() => {
                self.state
                    .settle(ticket, Status::Empty, ProductDetail::default())
            }
            Ok(detail) => {
                let slides = detail.images().into_iter().map(str::to_string).collect();
                let chips = build_chips(&detail);
                if !self.state.settle(ticket, Status::Loaded, detail) {
                    return false;
                }
                self.carousel = Carousel::new(slides, self.carousel_interval, now);
                self.chips = chips;
                true
            }
            Err(e) => {
                let accepted = self.state.settle(
                    ticket,
                    Status::Failed(e.to_string()),
                    ProductDetail::default(),
                );
                if accepted {
                    warn!(id = %self.id, error = %e, "product detail request failed");
                }
                accepted
            }
        }
    }

    pub fn status(&self) -> &Status {
        self.state.status()
    }

    pub fn detail(&self) -> &ProductDetail {
        self.state.data()
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    pub fn carousel_mut(&mut self) -> &mut Carousel {
        &mut self.carousel
    }

    pub fn chips(&self) -> &[Chip] {
        &self.chips
    }

    /// The neighbouring numeric id, if the current id is numeric.
    pub fn adjacent_id(&self, forward: bool) -> Option<String> {
        let id: u64 = self.id.parse().ok()?;
        let next = if forward {
            id.checked_add(1)?
        } else {
            id.checked_sub(1).filter(|id| *id > 0)?
        };
        Some(next.to_string())
    }
}
