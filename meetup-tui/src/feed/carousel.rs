/// Circular position over the images of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Carousel {
    index: usize,
    image_count: usize,
}

impl Carousel {
    pub fn new(image_count: usize) -> Self {
        Self {
            index: 0,
            image_count,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn image_count(&self) -> usize {
        self.image_count
    }

    /// With no images the view shows a placeholder instead
    pub fn is_empty(&self) -> bool {
        self.image_count == 0
    }

    /// Navigation only means something with two or more images
    pub fn is_navigable(&self) -> bool {
        self.image_count > 1
    }

    pub fn next(&mut self) -> bool {
        if !self.is_navigable() {
            return false;
        }
        self.index = (self.index + 1) % self.image_count;
        true
    }

    pub fn prev(&mut self) -> bool {
        if !self.is_navigable() {
            return false;
        }
        self.index = (self.index + self.image_count - 1) % self.image_count;
        true
    }

    /// Jump straight to `index`, clamped to the last image
    pub fn goto(&mut self, index: usize) -> bool {
        if !self.is_navigable() {
            return false;
        }
        let target = index.min(self.image_count - 1);
        let moved = target != self.index;
        self.index = target;
        moved
    }

    /// Apply a finished swipe
    pub fn apply(&mut self, outcome: SwipeOutcome) -> bool {
        match outcome {
            SwipeOutcome::Next => self.next(),
            SwipeOutcome::Prev => self.prev(),
            SwipeOutcome::Tap => false,
        }
    }
}

/// How a finished horizontal drag was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// Dragged left past the threshold
    Next,
    /// Dragged right past the threshold
    Prev,
    /// Too short to be a swipe
    Tap,
}

/// Tracks one horizontal drag from start to end
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeTracker {
    threshold: f32,
    start_x: Option<f32>,
}

impl SwipeTracker {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            start_x: None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.start_x.is_some()
    }

    pub fn start(&mut self, x: f32) {
        self.start_x = Some(x);
    }

    /// Finish the drag at `x`. An end without a start, or with a
    /// non-numeric displacement, is a tap.
    pub fn end(&mut self, x: f32) -> SwipeOutcome {
        let Some(start) = self.start_x.take() else {
            return SwipeOutcome::Tap;
        };
        let displacement = start - x;
        if displacement.is_nan() || displacement.abs() <= self.threshold {
            SwipeOutcome::Tap
        } else if displacement > 0.0 {
            SwipeOutcome::Next
        } else {
            SwipeOutcome::Prev
        }
    }

    pub fn cancel(&mut self) {
        self.start_x = None;
    }
}
