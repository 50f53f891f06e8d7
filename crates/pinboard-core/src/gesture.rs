//! Drag and resize gesture state machine.
//!
//! One controller serves every object on the scene, so at most one gesture
//! is active process-wide. A gesture captures everything it needs at
//! pointer-down; each pointer-move recomputes the result from that capture
//! and the total pointer delta, then commits it through the store.

use crate::geometry::{self, Direction, Frame, ResizeParams};
use crate::handles::HitTarget;
use crate::objects::{ObjectId, ObjectPatch};
use crate::store::ObjectStore;
use kurbo::Point;
use std::fmt;

/// Host hook for top-level move/up listeners.
///
/// `acquire` is called when a gesture starts and `release` exactly once when
/// it ends, so listeners live only for the duration of one gesture.
pub trait PointerCapture {
    fn acquire(&mut self);
    fn release(&mut self);
}

/// Capture hook for hosts that always deliver move/up events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn acquire(&mut self) {}
    fn release(&mut self) {}
}

/// State captured when a drag starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub object: ObjectId,
    pub start_pointer: Point,
    pub start_position: Point,
}

/// State captured when a resize starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSession {
    pub object: ObjectId,
    pub start_pointer: Point,
    pub params: ResizeParams,
}

/// Current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(DragSession),
    Resizing(ResizeSession),
}

impl GestureState {
    pub fn object(&self) -> Option<ObjectId> {
        match self {
            GestureState::Idle => None,
            GestureState::Dragging(session) => Some(session.object),
            GestureState::Resizing(session) => Some(session.object),
        }
    }
}

/// Translates pointer events into geometry updates on the store.
pub struct GestureController {
    state: GestureState,
    capture: Box<dyn PointerCapture>,
}

impl fmt::Debug for GestureController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureController").field("state", &self.state).finish_non_exhaustive()
    }
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureController {
    pub fn new() -> Self {
        Self::with_capture(Box::new(NoCapture))
    }

    pub fn with_capture(capture: Box<dyn PointerCapture>) -> Self {
        Self {
            state: GestureState::Idle,
            capture,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Whether a gesture is in flight for some object.
    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    pub fn active_object(&self) -> Option<ObjectId> {
        self.state.object()
    }

    /// Start the gesture a pointer-down on `target` implies.
    pub fn begin(&mut self, store: &mut ObjectStore, id: ObjectId, target: HitTarget, pointer: Point) -> bool {
        match target {
            HitTarget::Header => self.begin_drag(store, id, pointer),
            HitTarget::Handle(direction) => self.begin_resize(store, id, direction, pointer),
            HitTarget::Body => false,
        }
    }

    /// Pointer-down on an object's header. Raises the object to the front.
    pub fn begin_drag(&mut self, store: &mut ObjectStore, id: ObjectId, pointer: Point) -> bool {
        if self.is_active() {
            log::debug!("Ignoring drag start on {} while {:?}", id, self.state);
            return false;
        }
        let Some(object) = store.get(id) else {
            return false;
        };
        let session = DragSession {
            object: id,
            start_pointer: pointer,
            start_position: object.position,
        };
        store.bring_to_front(id);
        self.enter(GestureState::Dragging(session));
        true
    }

    /// Pointer-down on one of an object's resize handles.
    pub fn begin_resize(&mut self, store: &ObjectStore, id: ObjectId, direction: Direction, pointer: Point) -> bool {
        if self.is_active() {
            log::debug!("Ignoring resize start on {} while {:?}", id, self.state);
            return false;
        }
        let Some(object) = store.get(id) else {
            return false;
        };
        let caps = object.caps();
        let session = ResizeSession {
            object: id,
            start_pointer: pointer,
            params: ResizeParams {
                start: Frame::new(object.position, object.size),
                direction,
                min_size: caps.min_size,
                aspect_ratio: caps.aspect_locked.then(|| object.aspect_ratio()),
            },
        };
        self.enter(GestureState::Resizing(session));
        true
    }

    /// Pointer-move anywhere. Returns true if the store was updated.
    pub fn pointer_move(&mut self, store: &mut ObjectStore, pointer: Point) -> bool {
        let viewport = store.viewport();
        match self.state {
            GestureState::Idle => false,
            GestureState::Dragging(session) => {
                let Some(size) = store.get(session.object).map(|o| o.size) else {
                    return false;
                };
                let position = geometry::drag(session.start_position, size, pointer - session.start_pointer, viewport);
                store.update(session.object, ObjectPatch::position(position))
            }
            GestureState::Resizing(session) => {
                let frame = geometry::resize(&session.params, pointer - session.start_pointer, viewport);
                store.update(session.object, ObjectPatch::geometry(frame.position, frame.size))
            }
        }
    }

    /// Pointer-up anywhere. Returns the object whose gesture ended.
    pub fn pointer_up(&mut self) -> Option<ObjectId> {
        self.finish()
    }

    /// Abandon the active gesture without another update (e.g. focus lost).
    pub fn cancel(&mut self) -> Option<ObjectId> {
        let ended = self.finish();
        if let Some(id) = ended {
            log::debug!("Cancelled gesture on {}", id);
        }
        ended
    }

    fn enter(&mut self, state: GestureState) {
        log::debug!("Gesture start: {:?}", state);
        self.state = state;
        self.capture.acquire();
    }

    fn finish(&mut self) -> Option<ObjectId> {
        let ended = self.state.object()?;
        self.state = GestureState::Idle;
        self.capture.release();
        Some(ended)
    }
}
