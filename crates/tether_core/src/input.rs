//! Pointer input events
//!
//! A gesture stream is the sequence of events for one pointer from the initial
//! `Down` to the closing `Up` or `Cancel`.

/// The kind of a motion event, without its payload
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotionAction {
    Down,
    Move,
    Up,
    Cancel,
}

/// Pointer / touch events delivered to the coordinator
#[derive(Clone, Debug, PartialEq)]
pub enum MotionEvent {
    /// Initial contact; starts a new gesture stream
    Down {
        /// Unique identifier for this pointer
        id: u64,
        /// X position in container coordinates
        x: f32,
        /// Y position in container coordinates
        y: f32,
    },
    /// The pointer moved
    Move {
        /// Unique identifier for this pointer
        id: u64,
        /// X position in container coordinates
        x: f32,
        /// Y position in container coordinates
        y: f32,
    },
    /// The pointer was released
    Up {
        /// Unique identifier for this pointer
        id: u64,
        /// X position when released
        x: f32,
        /// Y position when released
        y: f32,
    },
    /// The stream was aborted, either by the platform or synthesized by the
    /// coordinator for a behavior that lost the stream
    Cancel {
        /// Unique identifier for this pointer
        id: u64,
    },
}

impl MotionEvent {
    /// A synthesized cancellation carrying no position
    pub fn cancel() -> Self {
        MotionEvent::Cancel { id: 0 }
    }

    /// Get the pointer ID
    pub fn id(&self) -> u64 {
        match self {
            MotionEvent::Down { id, .. } => *id,
            MotionEvent::Move { id, .. } => *id,
            MotionEvent::Up { id, .. } => *id,
            MotionEvent::Cancel { id } => *id,
        }
    }

    pub fn action(&self) -> MotionAction {
        match self {
            MotionEvent::Down { .. } => MotionAction::Down,
            MotionEvent::Move { .. } => MotionAction::Move,
            MotionEvent::Up { .. } => MotionAction::Up,
            MotionEvent::Cancel { .. } => MotionAction::Cancel,
        }
    }

    /// Get the position (returns None for Cancel)
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            MotionEvent::Down { x, y, .. } => Some((*x, *y)),
            MotionEvent::Move { x, y, .. } => Some((*x, *y)),
            MotionEvent::Up { x, y, .. } => Some((*x, *y)),
            MotionEvent::Cancel { .. } => None,
        }
    }

    /// True for the event that opens a gesture stream
    pub fn starts_stream(&self) -> bool {
        matches!(self, MotionEvent::Down { .. })
    }

    /// True for events that close a gesture stream
    pub fn ends_stream(&self) -> bool {
        matches!(self, MotionEvent::Up { .. } | MotionEvent::Cancel { .. })
    }
}
