use glam::Vec3;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{Feature, Rotation, Side, WallSegment};
use crate::config::WorldConfig;
use crate::maze::MazeGrid;

const DOOR_HEIGHT: f32 = 3.0;

/// Integer position of a chunk on the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing `pos`, using floor division so negative positions land
    /// in negative chunks.
    pub fn containing(pos: Vec3, chunk_world_size: f32) -> Self {
        Self {
            x: (pos.x / chunk_world_size).floor() as i32,
            z: (pos.z / chunk_world_size).floor() as i32,
        }
    }

    /// Saturates at `i32::MAX` for coordinates at opposite ends of the grid.
    pub fn chebyshev(self, other: ChunkCoord) -> i32 {
        let d = self.x.abs_diff(other.x).max(self.z.abs_diff(other.z));
        i32::try_from(d).unwrap_or(i32::MAX)
    }

    pub fn origin(self, chunk_world_size: f32) -> Vec3 {
        Vec3::new(self.x as f32 * chunk_world_size, 0.0, self.z as f32 * chunk_world_size)
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// A built chunk. Layout never changes after [`ChunkBuilder::build`].
#[derive(Debug, Clone)]
pub struct Chunk {
    coord: ChunkCoord,
    origin: Vec3,
    grid: MazeGrid,
    segments: Vec<WallSegment>,
    features: Vec<Feature>,
}

impl Chunk {
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn grid(&self) -> &MazeGrid {
        &self.grid
    }

    pub fn segments(&self) -> &[WallSegment] {
        &self.segments
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn save_points(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.features.iter().filter_map(|f| match f {
            Feature::SavePoint { position, .. } => Some(*position),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ChunkBuilder {
    cell_size: f32,
    wall_height: f32,
    wall_thickness: f32,
    door_chance: f32,
    save_point_chance: f32,
    border_passages: bool,
}

impl ChunkBuilder {
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            cell_size: config.cell_size,
            wall_height: config.wall_height,
            wall_thickness: config.wall_thickness,
            door_chance: config.door_chance,
            save_point_chance: config.save_point_chance,
            border_passages: config.border_passages,
        }
    }

    pub fn cell_center(&self, origin: Vec3, x: usize, z: usize) -> Vec3 {
        Vec3::new(
            origin.x + (x as f32 + 0.5) * self.cell_size,
            0.0,
            origin.z + (z as f32 + 0.5) * self.cell_size,
        )
    }

    pub fn build(
        &self,
        coord: ChunkCoord,
        grid: MazeGrid,
        origin: Vec3,
        rng: &mut impl Rng,
    ) -> Chunk {
        let mut segments = Vec::new();
        let mut features = Vec::new();
        let half = self.cell_size * 0.5;
        let wall_size = Vec3::new(self.cell_size, self.wall_height, self.wall_thickness);

        for z in 0..grid.height() {
            for x in 0..grid.width() {
                let cell = grid.cell(x, z);
                let center = self.cell_center(origin, x, z);

                for side in cell.walls() {
                    if self.border_passages && is_border_gap(&grid, x, z, side) {
                        continue;
                    }
                    let (dx, dz) = side.delta();
                    let wall_center = center
                        + Vec3::new(dx as f32 * half, self.wall_height * 0.5, dz as f32 * half);
                    segments.push(WallSegment::new(wall_center, wall_rotation(side), wall_size));
                }

                features.push(Feature::Ceiling {
                    center: center + Vec3::new(0.0, self.wall_height, 0.0),
                });

                if rng.gen::<f32>() < self.door_chance {
                    let sides: Vec<Side> = cell.walls().collect();
                    if let Some(&side) = sides.choose(rng) {
                        let (dx, dz) = side.delta();
                        features.push(Feature::Door {
                            center: center
                                + Vec3::new(dx as f32 * half, DOOR_HEIGHT * 0.5, dz as f32 * half),
                            side,
                            rotation: door_rotation(side),
                        });
                    }
                }
            }
        }

        for z in 0..grid.height() {
            for x in 0..grid.width() {
                if rng.gen::<f32>() < self.save_point_chance {
                    features.push(Feature::SavePoint {
                        position: self.cell_center(origin, x, z),
                        yaw: rng.gen_range(0.0..std::f32::consts::TAU),
                    });
                }
            }
        }

        Chunk {
            coord,
            origin,
            grid,
            segments,
            features,
        }
    }
}

fn wall_rotation(side: Side) -> Rotation {
    match side {
        Side::North | Side::South => Rotation::Deg0,
        Side::East | Side::West => Rotation::Deg90,
    }
}

fn door_rotation(side: Side) -> Rotation {
    match side {
        Side::North => Rotation::Deg0,
        Side::South => Rotation::Deg180,
        Side::East => Rotation::Deg90,
        Side::West => Rotation::Deg270,
    }
}

// The middle cell of each outer edge, on the side facing out of the chunk.
fn is_border_gap(grid: &MazeGrid, x: usize, z: usize, side: Side) -> bool {
    if grid.neighbor(x, z, side).is_some() {
        return false;
    }
    match side {
        Side::North | Side::South => x == grid.width() / 2,
        Side::East | Side::West => z == grid.height() / 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::generate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn builder() -> ChunkBuilder {
        ChunkBuilder::new(&WorldConfig::default())
    }

    #[test]
    fn floor_division_for_negative_positions() {
        assert_eq!(
            ChunkCoord::containing(Vec3::new(-0.1, 2.0, 149.9), 150.0),
            ChunkCoord::new(-1, 0)
        );
        assert_eq!(
            ChunkCoord::containing(Vec3::new(150.0, 0.0, -150.0), 150.0),
            ChunkCoord::new(1, -1)
        );
    }

    #[test]
    fn chebyshev_across_whole_grid() {
        let low = ChunkCoord::new(i32::MIN, 0);
        let high = ChunkCoord::new(i32::MAX, 3);
        assert_eq!(low.chebyshev(high), i32::MAX);
        assert_eq!(ChunkCoord::new(2, -3).chebyshev(ChunkCoord::new(-1, 1)), 4);
    }

    #[test]
    fn one_segment_per_wall_flag() {
        let mut rng = StdRng::seed_from_u64(11);
        let grid = generate(15, 15, &mut rng);
        let flags: usize = (0..15)
            .flat_map(|z| (0..15).map(move |x| (x, z)))
            .map(|(x, z)| grid.cell(x, z).walls().count())
            .sum();
        let chunk = builder().build(ChunkCoord::new(0, 0), grid, Vec3::ZERO, &mut rng);
        assert_eq!(chunk.segments().len(), flags);

        let ceilings = chunk
            .features()
            .iter()
            .filter(|f| matches!(f, Feature::Ceiling { .. }))
            .count();
        assert_eq!(ceilings, 225);
    }

    #[test]
    fn segments_stay_inside_chunk_footprint() {
        let mut rng = StdRng::seed_from_u64(5);
        let coord = ChunkCoord::new(-2, 3);
        let origin = coord.origin(150.0);
        let chunk = builder().build(coord, generate(15, 15, &mut rng), origin, &mut rng);
        assert_eq!(chunk.coord(), coord);
        assert_eq!(chunk.origin(), origin);
        for seg in chunk.segments() {
            let aabb = seg.aabb();
            assert!(aabb.min.x >= origin.x - 0.11 && aabb.max.x <= origin.x + 150.11);
            assert!(aabb.min.z >= origin.z - 0.11 && aabb.max.z <= origin.z + 150.11);
            assert!(aabb.min.y.abs() < 1e-5 && (aabb.max.y - 4.0).abs() < 1e-5);
        }
    }

    #[test]
    fn doors_sit_on_existing_walls() {
        let mut rng = StdRng::seed_from_u64(21);
        let grid = generate(15, 15, &mut rng);
        let chunk = builder().build(ChunkCoord::new(0, 0), grid, Vec3::ZERO, &mut rng);
        let doors: Vec<_> = chunk
            .features()
            .iter()
            .filter_map(|f| match f {
                Feature::Door { center, side, .. } => Some((*center, *side)),
                _ => None,
            })
            .collect();
        assert!(!doors.is_empty());
        for (center, side) in doors {
            // Step back from the wall into the owning cell.
            let (dx, dz) = side.delta();
            let x = (center.x / 10.0 - dx as f32 * 0.5).floor() as usize;
            let z = (center.z / 10.0 - dz as f32 * 0.5).floor() as usize;
            assert!(chunk.grid().cell(x, z).has_wall(side));
        }
    }

    #[test]
    fn border_passages_open_middle_of_each_edge() {
        let config = WorldConfig {
            border_passages: true,
            ..WorldConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(8);
        let grid = generate(15, 15, &mut rng);
        let coord = ChunkCoord::new(0, 0);
        let closed_rng = &mut StdRng::seed_from_u64(1);
        let closed = builder().build(coord, grid.clone(), Vec3::ZERO, closed_rng);
        let open_rng = &mut StdRng::seed_from_u64(1);
        let open = ChunkBuilder::new(&config).build(coord, grid, Vec3::ZERO, open_rng);
        assert_eq!(closed.segments().len() - open.segments().len(), 4);
        let gap = Vec3::new(75.0, 2.0, 0.0);
        assert!(open.segments().iter().all(|s| !s.aabb().contains_point(gap)));
    }

    #[test]
    fn save_points_sit_on_cell_centres() {
        let mut rng = StdRng::seed_from_u64(33);
        let coord = ChunkCoord::new(3, -1);
        let grid = generate(15, 15, &mut rng);
        let chunk = builder().build(coord, grid, coord.origin(150.0), &mut rng);
        let points: Vec<Vec3> = chunk.save_points().collect();
        assert!(!points.is_empty());
        for p in points {
            assert_eq!(p.y, 0.0);
            let local = (p - chunk.origin()) / 10.0 - Vec3::splat(0.5);
            for v in [local.x, local.z] {
                assert!((v - v.round()).abs() < 1e-4, "{p} is off the cell grid");
                assert!((0.0..15.0).contains(&v.round()));
            }
        }
    }
}
