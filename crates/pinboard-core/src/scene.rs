//! Scene manager: the single entry point a host drives.
//!
//! Owns the object store, the gesture controller and the persister, and
//! absorbs every failure at its boundary. Mutations mark the scene dirty;
//! the host calls [`Scene::take_save`] after handling a batch of events and
//! runs the returned task.

use crate::config::SceneConfig;
use crate::geometry::{self, Frame};
use crate::gesture::{GestureController, GestureState, PointerCapture};
use crate::handles::{self, HitTarget};
use crate::ingest::{self, DecodedImage, ImageSource};
use crate::input::{MouseButton, PointerEvent};
use crate::objects::{
    ImagePayload, NotePayload, ObjectId, ObjectKind, ObjectPatch, Payload, SceneObject, VideoPayload,
};
use crate::storage::{BoxFuture, SnapshotPersister, Storage};
use crate::store::ObjectStore;
use kurbo::{Point, Size};
use std::collections::{HashMap, VecDeque};
use std::fmt::Display;
use std::sync::{Arc, Mutex, PoisonError};

/// Image decode started by [`Scene::add_image`]. Resolves once the decoded
/// image is queued for [`Scene::drain_pending_images`].
pub type ImageTask = BoxFuture<'static, ()>;

/// Pending save started by [`Scene::take_save`]. Resolves to whether the
/// write succeeded.
pub type SaveTask = BoxFuture<'static, bool>;

/// A whiteboard scene bound to a storage backend.
pub struct Scene<S: Storage> {
    config: SceneConfig,
    store: ObjectStore,
    gestures: GestureController,
    persister: SnapshotPersister<S>,
    /// Decoded images waiting to be placed.
    pending_images: Arc<Mutex<VecDeque<DecodedImage>>>,
    /// Geometry to restore for objects currently shown fullscreen.
    fullscreen: HashMap<ObjectId, Frame>,
}

impl<S: Storage + 'static> Scene<S> {
    /// Open the scene, hydrating it from storage.
    ///
    /// Storage failures produce an empty scene.
    pub async fn open(config: SceneConfig, storage: Arc<S>) -> Self {
        let mut persister = SnapshotPersister::new(storage, config.storage_key.clone());
        let snapshot = persister.load().await;
        let store = ObjectStore::from_snapshot(snapshot, config.max_objects, config.viewport);
        log::info!(
            "Opened scene '{}' with {} objects in {}x{}",
            config.storage_key,
            store.len(),
            config.viewport.width,
            config.viewport.height
        );

        Self {
            config,
            store,
            gestures: GestureController::new(),
            persister,
            pending_images: Arc::new(Mutex::new(VecDeque::new())),
            fullscreen: HashMap::new(),
        }
    }

    /// Install the host's hook for top-level move/up listeners.
    pub fn with_pointer_capture(mut self, capture: Box<dyn PointerCapture>) -> Self {
        if self.gestures.is_active() {
            self.gestures.cancel();
        }
        self.gestures = GestureController::with_capture(capture);
        self
    }

    // --- Creation -------------------------------------------------------

    /// Add a note with the default text, centered in the viewport.
    pub fn add_note(&mut self) -> ObjectId {
        self.place(Payload::Note(NotePayload::default()), ObjectKind::Note.caps().default_size)
    }

    /// Add a video player for `url`. Invalid URLs add nothing.
    pub fn add_video(&mut self, url: &str) -> Option<ObjectId> {
        match VideoPayload::parse(url) {
            Ok(video) => Some(self.place(Payload::Video(video), ObjectKind::Video.caps().default_size)),
            Err(e) => {
                log::warn!("Rejected video: {}", e);
                None
            }
        }
    }

    /// Start decoding an image.
    ///
    /// The object appears once the task has finished and the host calls
    /// [`Scene::drain_pending_images`]. Tasks are independent: a failed
    /// decode is logged and affects no other task.
    ///
    /// Decoding happens on whichever thread polls the task, the first time
    /// it is polled. Nothing runs in the background on its own.
    pub fn add_image(&self, source: ImageSource) -> ImageTask {
        let inbox = Arc::clone(&self.pending_images);
        Box::pin(async move {
            let label = source.label().to_string();
            match ingest::decode_image(source).await {
                Ok(decoded) => inbox.lock().unwrap_or_else(PoisonError::into_inner).push_back(decoded),
                Err(e) => log::warn!("Rejected image {}: {}", label, e),
            }
        })
    }

    /// Feed a paste or drop. Non-image items are dropped; each image gets
    /// its own decode task.
    pub fn ingest(&self, items: Vec<ImageSource>) -> Vec<ImageTask> {
        let images = ingest::filter_images(items);
        log::info!("Ingesting {} image item(s)", images.len());
        images.into_iter().map(|source| self.add_image(source)).collect()
    }

    /// Place every image decoded since the last call. Returns the new ids.
    ///
    /// Placement uses the scene as it is now, not as it was when the decode
    /// started.
    pub fn drain_pending_images(&mut self) -> Vec<ObjectId> {
        let decoded: Vec<DecodedImage> = self
            .pending_images
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        decoded.into_iter().map(|image| self.place_image(image)).collect()
    }

    /// Number of decoded images waiting to be placed.
    pub fn pending_image_count(&self) -> usize {
        self.pending_images.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Place an already decoded image, centered in the viewport.
    pub fn place_image(&mut self, image: DecodedImage) -> ObjectId {
        let size = image.default_size();
        self.place(Payload::Image(image.payload), size)
    }

    fn place(&mut self, payload: Payload, size: Size) -> ObjectId {
        let position = geometry::centered(size, self.store.viewport());
        let id = self.store.create(position, size, payload).id();
        // Eviction may have removed fullscreen objects.
        let store = &self.store;
        self.fullscreen.retain(|id, _| store.contains(*id));
        self.persister.mark_dirty();
        id
    }

    // --- Pointer input --------------------------------------------------

    /// Dispatch a pointer event from the top-level input surface.
    /// Returns true if the scene changed.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent) -> bool {
        match *event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
            } => self.pointer_down(position).is_some_and(|(_, target)| target == HitTarget::Header),
            PointerEvent::Down { .. } => false,
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { .. } => {
                self.pointer_up();
                false
            }
            PointerEvent::Blur => {
                self.focus_lost();
                false
            }
        }
    }

    /// Press at a viewport point.
    ///
    /// The top-most object under the point receives the press. Returns the
    /// object and the region hit when a gesture started.
    pub fn pointer_down(&mut self, point: Point) -> Option<(ObjectId, HitTarget)> {
        if self.gestures.is_active() {
            log::debug!("Ignoring press at {:?} during active gesture", point);
            return None;
        }
        let (id, target) = self
            .store
            .by_z_desc()
            .into_iter()
            .find_map(|object| handles::hit_test(object.bounds(), point).map(|target| (object.id(), target)))?;
        self.pointer_down_on(id, target, point).then_some((id, target))
    }

    /// Press on a known region of a known object.
    pub fn pointer_down_on(&mut self, id: ObjectId, target: HitTarget, point: Point) -> bool {
        let started = self.gestures.begin(&mut self.store, id, target, point);
        if started && target == HitTarget::Header {
            // Drag start raised the object.
            self.persister.mark_dirty();
        }
        started
    }

    /// Pointer moved anywhere. Returns true if an object changed.
    pub fn pointer_move(&mut self, point: Point) -> bool {
        let changed = self.gestures.pointer_move(&mut self.store, point);
        if changed {
            self.persister.mark_dirty();
        }
        changed
    }

    /// Pointer released anywhere. Returns the object whose gesture ended.
    pub fn pointer_up(&mut self) -> Option<ObjectId> {
        self.gestures.pointer_up()
    }

    /// The window lost focus. Ends any gesture in place; no pointer-up will
    /// follow.
    pub fn focus_lost(&mut self) {
        self.gestures.cancel();
    }

    pub fn gesture_state(&self) -> &GestureState {
        self.gestures.state()
    }

    // --- Object operations ----------------------------------------------

    /// New viewport size from the host. Every object is re-clamped.
    pub fn resize_viewport(&mut self, viewport: Size) {
        if !(viewport.width > 0.0 && viewport.height > 0.0) {
            log::warn!("Ignoring invalid viewport {}x{}", viewport.width, viewport.height);
            return;
        }
        self.store.set_viewport(viewport);
        let ids: Vec<ObjectId> = self.fullscreen.keys().copied().collect();
        for id in ids {
            self.fill_viewport(id);
        }
        if !self.store.is_empty() {
            self.persister.mark_dirty();
        }
    }

    /// Delete an object. Absent ids are ignored.
    pub fn close(&mut self, id: ObjectId) -> bool {
        self.fullscreen.remove(&id);
        let removed = self.store.remove(id).is_some();
        if removed {
            log::debug!("Closed {}", id);
            self.persister.mark_dirty();
        }
        removed
    }

    /// Raise an object above all others. Returns its new z-rank.
    pub fn bring_to_front(&mut self, id: ObjectId) -> Option<i64> {
        let z_rank = self.store.bring_to_front(id)?;
        self.persister.mark_dirty();
        Some(z_rank)
    }

    /// Replace a note's text. Other kinds and absent ids are ignored.
    pub fn edit_note(&mut self, id: ObjectId, text: impl Into<String>) -> bool {
        if self.store.get(id).map(SceneObject::kind) != Some(ObjectKind::Note) {
            return false;
        }
        let changed = self
            .store
            .update(id, ObjectPatch::payload(Payload::Note(NotePayload::new(text))));
        if changed {
            self.persister.mark_dirty();
        }
        changed
    }

    /// Apply the outcome of an external image edit.
    ///
    /// A failed edit leaves the stored image untouched.
    pub fn commit_image_edit<E: Display>(&mut self, id: ObjectId, result: Result<ImagePayload, E>) -> bool {
        let payload = match result {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Image edit for {} failed: {}", id, e);
                return false;
            }
        };
        if self.store.get(id).map(SceneObject::kind) != Some(ObjectKind::Image) {
            log::debug!("Dropping image edit for missing image {}", id);
            return false;
        }
        let changed = self.store.update(id, ObjectPatch::payload(Payload::Image(payload)));
        if changed {
            self.persister.mark_dirty();
        }
        changed
    }

    /// Expand an object over the viewport, or restore it.
    ///
    /// Aspect-locked kinds are fitted and centered; others fill the
    /// viewport. Restoring re-clamps the remembered geometry to the current
    /// viewport.
    pub fn toggle_fullscreen(&mut self, id: ObjectId) -> bool {
        if let Some(frame) = self.fullscreen.remove(&id) {
            let restored = self.store.update(id, ObjectPatch::geometry(frame.position, frame.size));
            if restored {
                self.persister.mark_dirty();
            }
            return restored;
        }

        let Some(object) = self.store.get(id) else {
            return false;
        };
        self.fullscreen.insert(id, Frame::new(object.position, object.size));
        self.store.bring_to_front(id);
        self.fill_viewport(id);
        self.persister.mark_dirty();
        true
    }

    pub fn is_fullscreen(&self, id: ObjectId) -> bool {
        self.fullscreen.contains_key(&id)
    }

    fn fill_viewport(&mut self, id: ObjectId) {
        let viewport = self.store.viewport();
        let Some(object) = self.store.get(id) else {
            return;
        };
        let frame = if object.caps().aspect_locked {
            let scale = (viewport.width / object.size.width).min(viewport.height / object.size.height);
            let size = Size::new(object.size.width * scale, object.size.height * scale);
            Frame::new(geometry::centered(size, viewport), size)
        } else {
            Frame::new(Point::ZERO, viewport)
        };
        self.store.update(id, ObjectPatch::geometry(frame.position, frame.size));
    }

    // --- Queries & persistence ------------------------------------------

    /// Objects in rendering (insertion) order.
    pub fn objects(&self) -> &[SceneObject] {
        self.store.list()
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.store.get(id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn viewport(&self) -> Size {
        self.store.viewport()
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Whether mutations are waiting to be saved.
    pub fn is_dirty(&self) -> bool {
        self.persister.is_dirty()
    }

    /// Take the pending save, if the scene changed since the last one.
    ///
    /// The snapshot is taken now; the returned task can run while the scene
    /// keeps changing.
    pub fn take_save(&mut self) -> Option<SaveTask> {
        if !self.persister.is_dirty() {
            return None;
        }
        self.persister.take_save(self.store.snapshot())
    }

    /// Write the current snapshot now.
    pub async fn flush(&mut self) -> bool {
        let snapshot = self.store.snapshot();
        self.persister.flush(snapshot).await
    }
}
