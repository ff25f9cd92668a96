//! An endless maze streamed in around a moving observer, with a stalker
//! closing in.
//!
//! The crate is the simulation core only: maze generation per chunk, chunk
//! streaming, wall collision, the pursuing agent and the session that orders
//! them each frame. Rendering, audio and input devices live outside it; the
//! `stalker` binary is a small terminal front end.

pub mod chunk;
pub mod collision;
pub mod components;
pub mod config;
pub mod difficulty;
pub mod maze;
pub mod observer;
pub mod pursuit;
pub mod save;
pub mod session;
pub mod streaming;

pub use chunk::{Chunk, ChunkBuilder, ChunkCoord};
pub use collision::CollisionWorld;
pub use components::{Aabb, Feature, Rotation, Side, WallSegment};
pub use config::WorldConfig;
pub use difficulty::{DifficultyLevel, DifficultyProfile};
pub use maze::{generate, Cell, MazeGrid};
pub use observer::{Intent, Observer};
pub use pursuit::{PursuitAgent, PursuitUpdate, Tension};
pub use save::{SaveError, SaveRecord, SaveStore};
pub use session::{Session, SessionError, SessionState, TickReport};
pub use streaming::{ChunkStreamer, StreamDelta};
