use std::collections::HashMap;

use glam::Vec3;

use crate::chunk::ChunkCoord;
use crate::components::{Aabb, WallSegment};

pub const ENTITY_HEIGHT: f32 = 4.0;

/// Registry of the wall segments of every loaded chunk, keyed by owner.
///
/// Only the streamer writes to it; movement queries only read.
#[derive(Debug)]
pub struct CollisionWorld {
    chunk_world_size: f32,
    segments: HashMap<ChunkCoord, Vec<WallSegment>>,
}

impl CollisionWorld {
    pub fn new(chunk_world_size: f32) -> Self {
        Self {
            chunk_world_size,
            segments: HashMap::new(),
        }
    }

    pub fn register(&mut self, owner: ChunkCoord, segments: &[WallSegment]) {
        self.segments
            .entry(owner)
            .or_default()
            .extend_from_slice(segments);
    }

    /// Drops every segment owned by `owner`. Returns how many were removed.
    pub fn deregister(&mut self, owner: ChunkCoord) -> usize {
        self.segments.remove(&owner).map_or(0, |s| s.len())
    }

    pub fn segment_count(&self) -> usize {
        self.segments.values().map(Vec::len).sum()
    }

    pub fn is_registered(&self, owner: ChunkCoord) -> bool {
        self.segments.contains_key(&owner)
    }

    /// All-or-nothing: the whole move is refused if the entity's box at
    /// `proposed` touches any registered wall.
    pub fn can_move(&self, current: Vec3, proposed: Vec3, radius: f32) -> bool {
        if !proposed.is_finite() {
            return false;
        }
        let body = Aabb::from_center_half_extents(
            proposed,
            Vec3::new(radius, ENTITY_HEIGHT * 0.5, radius),
        );
        let blocked = self.overlaps(&body);
        if blocked {
            log::debug!("move from {current} to {proposed} blocked");
        }
        !blocked
    }

    pub fn overlaps(&self, body: &Aabb) -> bool {
        let center = (body.min + body.max) * 0.5;
        let reach = (body.max.x - body.min.x).hypot(body.max.z - body.min.z) * 0.5;
        self.nearby(center)
            .filter(|seg| {
                let d = (seg.center.x - center.x).hypot(seg.center.z - center.z);
                d <= reach + seg.footprint_radius()
            })
            .any(|seg| seg.aabb().intersects(body))
    }

    // Segments of the chunk containing `pos` and its eight neighbours.
    fn nearby(&self, pos: Vec3) -> impl Iterator<Item = &WallSegment> + '_ {
        let home = ChunkCoord::containing(pos, self.chunk_world_size);
        (-1..=1)
            .flat_map(move |dz| {
                (-1..=1).map(move |dx| {
                    ChunkCoord::new(home.x.saturating_add(dx), home.z.saturating_add(dz))
                })
            })
            .filter_map(move |coord| self.segments.get(&coord))
            .flatten()
    }
}
