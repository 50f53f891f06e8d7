//! Pinboard Core Library
//!
//! Platform-agnostic scene model for the Pinboard infinite canvas: placed
//! notes, videos and images, their drag/resize gestures, and persistence.

pub mod config;
pub mod geometry;
pub mod gesture;
pub mod handles;
pub mod ingest;
pub mod input;
pub mod objects;
pub mod scene;
pub mod storage;
pub mod store;

pub use config::{ConfigError, SceneConfig};
pub use geometry::{Direction, Frame};
pub use gesture::{GestureController, GestureState, NoCapture, PointerCapture};
pub use handles::HitTarget;
pub use ingest::{DecodedImage, ImageSource, IngestError};
pub use input::{MouseButton, PointerEvent};
pub use objects::{ObjectId, ObjectKind, ObjectPatch, Payload, SceneObject};
pub use scene::{ImageTask, SaveTask, Scene};
pub use storage::{MemoryStorage, Storage, StorageError};
pub use store::{ObjectStore, SceneSnapshot};
