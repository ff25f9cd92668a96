use std::collections::{BTreeSet, HashMap};

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::chunk::{Chunk, ChunkBuilder, ChunkCoord};
use crate::collision::CollisionWorld;
use crate::config::WorldConfig;
use crate::maze;

/// Chunks beyond `radius + HYSTERESIS` are evicted.
pub const HYSTERESIS: i32 = 1;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StreamDelta {
    pub added: BTreeSet<ChunkCoord>,
    pub removed: BTreeSet<ChunkCoord>,
}

impl StreamDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Keeps the chunks around the focal point built and their walls registered.
#[derive(Debug)]
pub struct ChunkStreamer {
    radius: i32,
    chunk_cells: usize,
    chunk_world_size: f32,
    world_seed: u64,
    builder: ChunkBuilder,
    chunks: HashMap<ChunkCoord, Chunk>,
    center: Option<ChunkCoord>,
}

impl ChunkStreamer {
    pub fn new(config: &WorldConfig) -> Self {
        let world_seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        log::info!("world seed {world_seed}");
        Self {
            radius: config.load_radius.max(0),
            chunk_cells: config.chunk_cells,
            chunk_world_size: config.chunk_world_size(),
            world_seed,
            builder: ChunkBuilder::new(config),
            chunks: HashMap::new(),
            center: None,
        }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn world_seed(&self) -> u64 {
        self.world_seed
    }

    pub fn chunk_world_size(&self) -> f32 {
        self.chunk_world_size
    }

    pub fn center(&self) -> Option<ChunkCoord> {
        self.center
    }

    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn loaded(&self) -> BTreeSet<ChunkCoord> {
        self.chunks.keys().copied().collect()
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks.values()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Loads every chunk within `radius` of the chunk containing `focus` and
    /// evicts those beyond `radius + HYSTERESIS`. A non-finite focus, or one in
    /// the same chunk as last time, changes nothing.
    pub fn tick(&mut self, focus: Vec3, collision: &mut CollisionWorld) -> StreamDelta {
        let mut delta = StreamDelta::default();
        if !focus.is_finite() {
            log::debug!("skipping stream tick for non-finite focus {focus}");
            return delta;
        }

        let center = ChunkCoord::containing(focus, self.chunk_world_size);
        if self.center == Some(center) {
            return delta;
        }
        self.center = Some(center);

        for dz in -self.radius..=self.radius {
            for dx in -self.radius..=self.radius {
                let coord = ChunkCoord::new(
                    center.x.saturating_add(dx),
                    center.z.saturating_add(dz),
                );
                if self.chunks.contains_key(&coord) {
                    continue;
                }
                let chunk = self.build_chunk(coord);
                collision.register(coord, chunk.segments());
                self.chunks.insert(coord, chunk);
                delta.added.insert(coord);
            }
        }

        let limit = self.radius + HYSTERESIS;
        let stale: Vec<ChunkCoord> = self
            .chunks
            .keys()
            .copied()
            .filter(|coord| coord.chebyshev(center) > limit)
            .collect();
        for coord in stale {
            collision.deregister(coord);
            self.chunks.remove(&coord);
            delta.removed.insert(coord);
        }

        log::debug!(
            "streamed around {center}: +{} -{} ({} loaded)",
            delta.added.len(),
            delta.removed.len(),
            self.chunks.len()
        );
        delta
    }

    /// Drops every chunk and its walls.
    pub fn clear(&mut self, collision: &mut CollisionWorld) {
        for coord in self.chunks.keys() {
            collision.deregister(*coord);
        }
        self.chunks.clear();
        self.center = None;
    }

    fn build_chunk(&self, coord: ChunkCoord) -> Chunk {
        let mut rng = StdRng::seed_from_u64(chunk_seed(self.world_seed, coord));
        let grid = maze::generate(self.chunk_cells, self.chunk_cells, &mut rng);
        let origin = coord.origin(self.chunk_world_size);
        self.builder.build(coord, grid, origin, &mut rng)
    }
}

// splitmix64 finaliser over the seed and both coordinates.
fn chunk_seed(world_seed: u64, coord: ChunkCoord) -> u64 {
    let mut h = world_seed
        ^ (coord.x as u32 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (coord.z as u32 as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F).rotate_left(31);
    h = (h ^ (h >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    h ^ (h >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(radius: i32) -> WorldConfig {
        WorldConfig {
            load_radius: radius,
            seed: Some(42),
            ..WorldConfig::default()
        }
    }

    fn square(center: ChunkCoord, radius: i32) -> BTreeSet<ChunkCoord> {
        let mut set = BTreeSet::new();
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                set.insert(ChunkCoord::new(center.x + dx, center.z + dz));
            }
        }
        set
    }

    #[test]
    fn loads_25_chunks_for_radius_two() {
        let mut collision = CollisionWorld::new(150.0);
        let mut streamer = ChunkStreamer::new(&config(2));
        let delta = streamer.tick(Vec3::new(1.0, 2.0, 1.0), &mut collision);
        let expected = square(ChunkCoord::new(0, 0), 2);
        assert_eq!(delta.added, expected);
        assert!(delta.removed.is_empty());
        assert_eq!(streamer.loaded(), expected);
        for coord in &expected {
            assert!(collision.is_registered(*coord));
        }
    }

    #[test]
    fn same_chunk_twice_is_noop() {
        let mut collision = CollisionWorld::new(150.0);
        let mut streamer = ChunkStreamer::new(&config(1));
        assert!(!streamer.tick(Vec3::new(10.0, 2.0, 10.0), &mut collision).is_empty());
        let walls = collision.segment_count();
        assert!(streamer.tick(Vec3::new(10.0, 2.0, 10.0), &mut collision).is_empty());
        assert!(streamer.tick(Vec3::new(140.0, 2.0, 3.0), &mut collision).is_empty());
        assert_eq!(collision.segment_count(), walls);
    }

    #[test]
    fn hysteresis_band_keeps_neighbours() {
        let mut collision = CollisionWorld::new(150.0);
        let mut streamer = ChunkStreamer::new(&config(1));
        streamer.tick(Vec3::new(75.0, 2.0, 75.0), &mut collision);
        let delta = streamer.tick(Vec3::new(225.0, 2.0, 75.0), &mut collision);
        // Column x = 2 enters, nothing is farther than 2 yet.
        assert_eq!(delta.added.len(), 3);
        assert!(delta.removed.is_empty());
        assert!(streamer.is_loaded(ChunkCoord::new(-1, 0)));

        let delta = streamer.tick(Vec3::new(375.0, 2.0, 75.0), &mut collision);
        let evicted: BTreeSet<_> = (-1..=1).map(|z| ChunkCoord::new(-1, z)).collect();
        assert_eq!(delta.removed, evicted);
        for coord in &evicted {
            assert!(!collision.is_registered(*coord));
        }
    }

    #[test]
    fn invariant_holds_along_a_walk() {
        let mut collision = CollisionWorld::new(150.0);
        let mut streamer = ChunkStreamer::new(&config(1));
        let path = [
            (0.0, 0.0),
            (-160.0, 20.0),
            (-400.0, -90.0),
            (300.0, 310.0),
            (310.0, 300.0),
            (-1.0, -1.0),
        ];
        for (x, z) in path {
            let pos = Vec3::new(x, 2.0, z);
            streamer.tick(pos, &mut collision);
            let center = ChunkCoord::containing(pos, 150.0);
            for coord in streamer.loaded() {
                assert!(coord.chebyshev(center) <= 2);
                assert!(collision.is_registered(coord));
            }
            for coord in square(center, 1) {
                assert!(streamer.is_loaded(coord));
            }
        }
    }

    #[test]
    fn non_finite_focus_is_ignored() {
        let mut collision = CollisionWorld::new(150.0);
        let mut streamer = ChunkStreamer::new(&config(1));
        let delta = streamer.tick(Vec3::new(f32::INFINITY, 2.0, 0.0), &mut collision);
        assert!(delta.is_empty());
        assert!(streamer.is_empty());
    }

    #[test]
    fn far_focus_streams_without_overflow() {
        let mut collision = CollisionWorld::new(150.0);
        let mut streamer = ChunkStreamer::new(&config(1));
        let far = Vec3::new(1.0e12, 2.0, 0.0);
        let delta = streamer.tick(far, &mut collision);
        let edge = ChunkCoord::containing(far, 150.0);
        assert_eq!(edge.x, i32::MAX);
        assert!(delta.added.contains(&edge));
        assert!(streamer.is_loaded(edge));
        assert_eq!(streamer.center(), Some(edge));
        assert!(streamer.tick(far, &mut collision).is_empty());

        let delta = streamer.tick(Vec3::new(1.0, 2.0, 1.0), &mut collision);
        assert!(delta.removed.contains(&edge));
        assert_eq!(streamer.loaded(), square(ChunkCoord::new(0, 0), 1));
    }

    #[test]
    fn reloaded_chunk_has_same_layout() {
        let mut collision = CollisionWorld::new(150.0);
        let mut streamer = ChunkStreamer::new(&config(0));
        streamer.tick(Vec3::new(1.0, 2.0, 1.0), &mut collision);
        let first = streamer.chunk(ChunkCoord::new(0, 0)).map(|c| c.grid().clone());
        streamer.tick(Vec3::new(800.0, 2.0, 1.0), &mut collision);
        assert!(!streamer.is_loaded(ChunkCoord::new(0, 0)));
        streamer.tick(Vec3::new(1.0, 2.0, 1.0), &mut collision);
        let second = streamer.chunk(ChunkCoord::new(0, 0)).map(|c| c.grid().clone());
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn neighbouring_chunks_differ() {
        assert_ne!(chunk_seed(1, ChunkCoord::new(0, 1)), chunk_seed(1, ChunkCoord::new(1, 0)));
        assert_ne!(chunk_seed(1, ChunkCoord::new(0, 0)), chunk_seed(2, ChunkCoord::new(0, 0)));
    }

    #[test]
    fn clear_unregisters_everything() {
        let mut collision = CollisionWorld::new(150.0);
        let mut streamer = ChunkStreamer::new(&config(1));
        streamer.tick(Vec3::ZERO, &mut collision);
        streamer.clear(&mut collision);
        assert!(streamer.is_empty());
        assert_eq!(collision.segment_count(), 0);
        assert!(!streamer.tick(Vec3::ZERO, &mut collision).is_empty());
    }
}
