//! Scene object definitions shared by every placed item.
//!
//! A [`SceneObject`] is kind-agnostic geometry plus a kind-specific
//! [`Payload`]. Per-kind behavior that the manipulation protocol needs
//! (minimum size, aspect locking, default size) is exposed through
//! [`KindCaps`] so the geometry and gesture code never branch on the kind.

mod image;
mod note;
mod video;

pub use image::{ImageFormat, ImagePayload};
pub use note::{DEFAULT_NOTE_TEXT, NotePayload};
pub use video::VideoPayload;

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a scene object.
pub type ObjectId = Uuid;

/// The kind of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Sticky note with free-form text.
    Note,
    /// Embedded video player.
    Video,
    /// Raster image.
    Image,
}

/// Manipulation capabilities of an object kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindCaps {
    /// Smallest size a resize may produce.
    pub min_size: Size,
    /// Size given to freshly created objects.
    pub default_size: Size,
    /// Whether single-axis resizes co-vary the other axis.
    pub aspect_locked: bool,
}

impl ObjectKind {
    /// Capability set for this kind.
    pub fn caps(self) -> KindCaps {
        match self {
            ObjectKind::Note => KindCaps {
                min_size: Size::new(100.0, 100.0),
                default_size: Size::new(200.0, 200.0),
                aspect_locked: false,
            },
            ObjectKind::Video => KindCaps {
                min_size: Size::new(280.0, 157.0),
                default_size: Size::new(560.0, 315.0),
                aspect_locked: true,
            },
            ObjectKind::Image => KindCaps {
                min_size: Size::new(50.0, 50.0),
                // Height is replaced by width / natural aspect at creation.
                default_size: Size::new(200.0, 200.0),
                aspect_locked: true,
            },
        }
    }

    /// Minimum size for this kind.
    pub fn min_size(self) -> Size {
        self.caps().min_size
    }

    /// Whether resizing preserves the aspect ratio.
    pub fn is_aspect_locked(self) -> bool {
        self.caps().aspect_locked
    }

    /// Header label shown by the presentation layer.
    pub fn label(self) -> &'static str {
        match self {
            ObjectKind::Note => "Note",
            ObjectKind::Video => "Video",
            ObjectKind::Image => "Image",
        }
    }
}

/// Kind-specific content of a scene object.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Note(NotePayload),
    Video(VideoPayload),
    Image(ImagePayload),
}

impl Payload {
    /// The kind this payload belongs to.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Payload::Note(_) => ObjectKind::Note,
            Payload::Video(_) => ObjectKind::Video,
            Payload::Image(_) => ObjectKind::Image,
        }
    }

    /// Flatten to the persisted string form.
    pub fn to_wire(&self) -> String {
        match self {
            Payload::Note(note) => note.text.clone(),
            Payload::Video(video) => video.url().to_string(),
            Payload::Image(image) => image.data_uri().to_string(),
        }
    }

    /// Rebuild from the persisted string form.
    pub fn from_wire(kind: ObjectKind, raw: String) -> Self {
        match kind {
            ObjectKind::Note => Payload::Note(NotePayload::new(raw)),
            ObjectKind::Video => Payload::Video(VideoPayload::from_stored(raw)),
            ObjectKind::Image => Payload::Image(ImagePayload::from_data_uri(raw)),
        }
    }
}

/// One placed item on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub(crate) id: ObjectId,
    /// Top-left corner in viewport space.
    pub position: Point,
    /// Display size.
    pub size: Size,
    /// Stacking order; higher paints on top.
    pub z_rank: i64,
    /// Kind-specific content.
    pub payload: Payload,
}

impl SceneObject {
    pub(crate) fn new(position: Point, size: Size, z_rank: i64, payload: Payload) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            size,
            z_rank,
            payload,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> ObjectKind {
        self.payload.kind()
    }

    pub fn caps(&self) -> KindCaps {
        self.kind().caps()
    }

    /// Bounding rectangle in viewport space.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Current width / height ratio.
    pub fn aspect_ratio(&self) -> f64 {
        self.size.width / self.size.height.max(f64::EPSILON)
    }
}

/// Sparse update for a scene object. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub payload: Option<Payload>,
}

impl ObjectPatch {
    /// Patch that only moves the object.
    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// Patch that moves and resizes the object.
    pub fn geometry(position: Point, size: Size) -> Self {
        Self {
            position: Some(position),
            size: Some(size),
            payload: None,
        }
    }

    /// Patch that only replaces the payload.
    pub fn payload(payload: Payload) -> Self {
        Self {
            payload: Some(payload),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.size.is_none() && self.payload.is_none()
    }
}

/// Persisted layout of one scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecord {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z_rank: i64,
    /// Note text, video URL, or image data URI.
    pub payload: String,
}

impl From<&SceneObject> for ObjectRecord {
    fn from(object: &SceneObject) -> Self {
        Self {
            id: object.id,
            kind: object.kind(),
            x: object.position.x,
            y: object.position.y,
            width: object.size.width,
            height: object.size.height,
            z_rank: object.z_rank,
            payload: object.payload.to_wire(),
        }
    }
}

impl From<ObjectRecord> for SceneObject {
    fn from(record: ObjectRecord) -> Self {
        Self {
            id: record.id,
            position: Point::new(record.x, record.y),
            size: Size::new(record.width, record.height),
            z_rank: record.z_rank,
            payload: Payload::from_wire(record.kind, record.payload),
        }
    }
}
