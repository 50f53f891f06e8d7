//! The authoritative collection of scene objects.
//!
//! Objects are kept in insertion order, which is also the order they are
//! listed for rendering. Stacking is expressed separately through each
//! object's `z_rank`, assigned from a high-water mark owned by the store.

use crate::geometry::{self, Frame};
use crate::objects::{ObjectId, ObjectPatch, ObjectRecord, Payload, SceneObject};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Default capacity bound on the number of stored objects.
pub const DEFAULT_MAX_OBJECTS: usize = 100;

/// Persisted form of the store: records in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneSnapshot {
    pub objects: Vec<ObjectRecord>,
}

impl SceneSnapshot {
    /// Serialize the snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Ordered, capacity-bounded object collection.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    /// Objects in insertion order (oldest first).
    objects: Vec<SceneObject>,
    /// Highest z-rank ever handed out.
    z_high_water: i64,
    /// Maximum number of objects kept.
    capacity: usize,
    /// Containment bounds applied on every mutation.
    viewport: Size,
}

impl ObjectStore {
    /// Create an empty store.
    pub fn new(capacity: usize, viewport: Size) -> Self {
        Self {
            objects: Vec::new(),
            z_high_water: 0,
            capacity: capacity.max(1),
            viewport,
        }
    }

    /// Rebuild a store from persisted records, keeping the newest `capacity`.
    pub fn from_snapshot(snapshot: SceneSnapshot, capacity: usize, viewport: Size) -> Self {
        let mut store = Self::new(capacity, viewport);
        let skip = snapshot.objects.len().saturating_sub(store.capacity);
        if skip > 0 {
            log::info!("Dropping {} persisted objects beyond capacity {}", skip, store.capacity);
        }
        for record in snapshot.objects.into_iter().skip(skip) {
            let mut object = SceneObject::from(record);
            if store.contains(object.id) {
                log::warn!("Skipping duplicate persisted object {}", object.id);
                continue;
            }
            store.z_high_water = store.z_high_water.max(object.z_rank);
            store.contain(&mut object);
            store.objects.push(object);
        }
        store
    }

    /// Snapshot of the newest `capacity` objects, in insertion order.
    pub fn snapshot(&self) -> SceneSnapshot {
        let skip = self.objects.len().saturating_sub(self.capacity);
        SceneSnapshot {
            objects: self.objects.iter().skip(skip).map(ObjectRecord::from).collect(),
        }
    }

    /// Insert a new object at the end of the collection.
    ///
    /// The object is given a fresh id and a z-rank above every previous one,
    /// and is clamped into the viewport. The oldest objects are evicted if
    /// the store grows beyond its capacity.
    pub fn create(&mut self, position: Point, size: Size, payload: Payload) -> &SceneObject {
        let z_rank = self.next_z_rank();
        let mut object = SceneObject::new(position, size, z_rank, payload);
        self.contain(&mut object);
        log::debug!("Created {:?} {} at z {}", object.kind(), object.id, z_rank);
        self.objects.push(object);
        self.evict_overflow();
        // Capacity is at least 1, so the object just pushed survives eviction.
        let last = self.objects.len() - 1;
        &self.objects[last]
    }

    /// Apply a sparse update. Returns false when `id` is absent.
    ///
    /// A payload of a different kind than the object is ignored.
    pub fn update(&mut self, id: ObjectId, patch: ObjectPatch) -> bool {
        let viewport = self.viewport;
        let Some(object) = self.objects.iter_mut().find(|o| o.id == id) else {
            log::debug!("Ignoring update for absent object {}", id);
            return false;
        };

        if let Some(payload) = patch.payload {
            if payload.kind() == object.kind() {
                object.payload = payload;
            } else {
                log::warn!(
                    "Ignoring {:?} payload for {:?} object {}",
                    payload.kind(),
                    object.kind(),
                    id
                );
            }
        }
        if let Some(size) = patch.size {
            object.size = size;
        }
        if let Some(position) = patch.position {
            object.position = position;
        }
        contain_object(object, viewport);
        true
    }

    /// Raise an object above every other. Returns the new z-rank.
    pub fn bring_to_front(&mut self, id: ObjectId) -> Option<i64> {
        let index = self.index_of(id)?;
        let z_rank = self.next_z_rank();
        self.objects[index].z_rank = z_rank;
        Some(z_rank)
    }

    /// Delete an object. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.index_of(id)?;
        Some(self.objects.remove(index))
    }

    /// Objects in insertion order.
    pub fn list(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Objects from top-most to bottom-most.
    pub fn by_z_desc(&self) -> Vec<&SceneObject> {
        let mut ordered: Vec<(usize, &SceneObject)> = self.objects.iter().enumerate().collect();
        // Later insertions paint above earlier ones on equal ranks.
        ordered.sort_by(|(ia, a), (ib, b)| b.z_rank.cmp(&a.z_rank).then(ib.cmp(ia)));
        ordered.into_iter().map(|(_, object)| object).collect()
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Highest z-rank handed out so far.
    pub fn z_high_water(&self) -> i64 {
        self.z_high_water
    }

    /// Change the containment bounds and re-clamp every object.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        for object in &mut self.objects {
            contain_object(object, viewport);
        }
    }

    fn next_z_rank(&mut self) -> i64 {
        self.z_high_water += 1;
        self.z_high_water
    }

    fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    fn contain(&self, object: &mut SceneObject) {
        contain_object(object, self.viewport);
    }

    fn evict_overflow(&mut self) {
        let overflow = self.objects.len().saturating_sub(self.capacity);
        if overflow > 0 {
            let evicted: Vec<ObjectId> = self.objects.drain(..overflow).map(|o| o.id).collect();
            log::debug!("Evicted {} oldest objects: {:?}", evicted.len(), evicted);
        }
    }
}

fn contain_object(object: &mut SceneObject, viewport: Size) {
    let caps = object.caps();
    let frame = geometry::contain(
        Frame::new(object.position, object.size),
        caps.min_size,
        caps.aspect_locked,
        viewport,
    );
    object.position = frame.position;
    object.size = frame.size;
}
