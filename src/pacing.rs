use std::time::{Duration, Instant};

pub const SCROLL_THROTTLE: Duration = Duration::from_millis(200);
pub const SCROLL_LOAD_THRESHOLD: f32 = 300.0;
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
/// Scroll offset past which the back-to-top button is offered.
pub const BACK_TO_TOP_OFFSET: f32 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub offset: f32,
    pub viewport_height: f32,
    pub content_height: f32,
}

impl ScrollMetrics {
    pub fn from_viewport(viewport: &iced::widget::scrollable::Viewport) -> Self {
        Self {
            offset: viewport.absolute_offset().y,
            viewport_height: viewport.bounds().height,
            content_height: viewport.content_bounds().height,
        }
    }

    /// Distance left between the bottom of the viewport and the end of the content.
    pub fn remaining(&self) -> f32 {
        (self.content_height - self.offset - self.viewport_height).max(0.0)
    }
}

/// Lets at most one event through per interval; the rest are dropped.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Collapses a burst of events into one, fired once the burst has been quiet for `delay`.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    pending_since: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending_since: None,
        }
    }

    pub fn touch(&mut self, now: Instant) {
        self.pending_since = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending_since = None;
    }

    /// Returns true exactly once per burst, after the quiet period has elapsed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.pending_since {
            Some(since) if now.saturating_duration_since(since) >= self.delay => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }
}

/// Decides when scrolling close to the end of the grid should load the next page.
#[derive(Debug, Clone)]
pub struct ScrollTrigger {
    throttle: Throttle,
    threshold: f32,
}

impl Default for ScrollTrigger {
    fn default() -> Self {
        Self {
            throttle: Throttle::new(SCROLL_THROTTLE),
            threshold: SCROLL_LOAD_THRESHOLD,
        }
    }
}

impl ScrollTrigger {
    pub fn should_load(
        &mut self,
        metrics: &ScrollMetrics,
        now: Instant,
        is_loading: bool,
        reached_end: bool,
    ) -> bool {
        if !self.throttle.ready(now) {
            return false;
        }
        !is_loading && !reached_end && metrics.remaining() < self.threshold
    }
}
