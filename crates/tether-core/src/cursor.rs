//! Cursor bookkeeping for page fetches.
//!
//! Two shapes exist: [`SkipCursor`], a single offset that only moves
//! forward from zero, and [`WindowCursor`], a `[start, end)` window
//! around an anchor that can move both ways.
//!
//! Cursors are pure arithmetic. Each synchronizer owns exactly one and
//! mutates it from its driver task only.

/// Forward-only offset anchored at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCursor {
    skip: usize,
}

impl SkipCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip(&self) -> usize {
        self.skip
    }

    /// True while no page has been accounted for.
    pub fn is_origin(&self) -> bool {
        self.skip == 0
    }

    pub fn advance(&mut self, by: usize) {
        self.skip = self.skip.saturating_add(by);
    }

    /// Whether another fetch is allowed under an optional total cap.
    pub fn has_room(&self, max_item_limit: Option<usize>) -> bool {
        max_item_limit.map_or(true, |max| max > self.skip)
    }

    /// `(skip, limit)` for the next forward fetch, or `None` once the cap
    /// is reached. With a cap the limit is whatever remains under it.
    pub fn next_request(&self, max_item_limit: Option<usize>, requested: usize) -> Option<(usize, usize)> {
        if !self.has_room(max_item_limit) {
            return None;
        }
        let limit = max_item_limit.map_or(requested, |max| max - self.skip);
        Some((self.skip, limit))
    }
}

/// A `[start, end)` window around an initial anchor offset.
///
/// `start <= end` holds after every operation, and `start` never drops
/// below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCursor {
    anchor: usize,
    start: usize,
    end: usize,
}

impl WindowCursor {
    pub fn new(anchor: usize) -> Self {
        Self {
            anchor,
            start: anchor,
            end: anchor,
        }
    }

    pub fn anchor(&self) -> usize {
        self.anchor
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn bounds(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// True while the window has not moved away from the anchor.
    pub fn at_anchor(&self) -> bool {
        self.start == self.anchor
    }

    /// Account for the items delivered by the initial load.
    pub fn record_initial(&mut self, delivered: usize) {
        self.end = self.end.saturating_add(delivered);
    }

    /// `(skip, limit)` for a forward load, or `None` once the cap is reached.
    pub fn after_request(&self, max_item_limit: Option<usize>, requested: usize) -> Option<(usize, usize)> {
        if let Some(max) = max_item_limit {
            if max <= self.end {
                return None;
            }
            return Some((self.end, max - self.end));
        }
        Some((self.end, requested))
    }

    /// Slide the window forward by the requested size.
    pub fn commit_after(&mut self, requested: usize) {
        self.start = self.end;
        self.end = self.end.saturating_add(requested);
    }

    /// `(skip, limit)` for a backward load, or `None` when the window
    /// already starts at zero.
    pub fn before_request(&self, requested: usize) -> Option<(usize, usize)> {
        let diff = self.start.min(requested);
        if diff == 0 {
            return None;
        }
        Some((self.start - diff, diff))
    }

    /// Slide the window back by `diff`, where `diff` came from
    /// [`before_request`](Self::before_request).
    pub fn commit_before(&mut self, diff: usize) {
        let diff = diff.min(self.start);
        self.end = self.start;
        self.start -= diff;
    }
}
