use glam::Vec3;

/// One of the four boundaries of a maze cell.
///
/// Grid `x` grows toward East, grid `z` grows toward South.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Side::North => (0, -1),
            Side::East => (1, 0),
            Side::South => (0, 1),
            Side::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::North => Side::South,
            Side::East => Side::West,
            Side::South => Side::North,
            Side::West => Side::East,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::North => 0,
            Side::East => 1,
            Side::South => 2,
            Side::West => 3,
        }
    }
}

/// Quarter-turn rotation about the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Swaps the horizontal axes of `half_extents` when the rotation is a
    /// quarter turn, giving the world-aligned half extents.
    pub fn apply_to_extents(self, half_extents: Vec3) -> Vec3 {
        match self {
            Rotation::Deg0 | Rotation::Deg180 => half_extents,
            Rotation::Deg90 | Rotation::Deg270 => {
                Vec3::new(half_extents.z, half_extents.y, half_extents.x)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Touching faces count as an intersection.
    pub fn intersects(&self, other: &Aabb) -> bool {
        !(other.max.x < self.min.x
            || other.min.x > self.max.x
            || other.max.y < self.min.y
            || other.min.y > self.max.y
            || other.max.z < self.min.z
            || other.min.z > self.max.z)
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

/// A solid wall generated from one cell boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSegment {
    pub center: Vec3,
    pub rotation: Rotation,
    /// Half extents in the segment's local frame (length along local x).
    pub half_extents: Vec3,
}

impl WallSegment {
    pub fn new(center: Vec3, rotation: Rotation, size: Vec3) -> Self {
        Self {
            center,
            rotation,
            half_extents: size * 0.5,
        }
    }

    pub fn aabb(&self) -> Aabb {
        let half_extents = self.rotation.apply_to_extents(self.half_extents);
        Aabb::from_center_half_extents(self.center, half_extents)
    }

    /// Radius of the horizontal circle enclosing the segment's footprint.
    pub fn footprint_radius(&self) -> f32 {
        self.half_extents.x.hypot(self.half_extents.z)
    }
}

/// Non-colliding extras placed while building a chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Feature {
    Ceiling {
        center: Vec3,
    },
    Door {
        center: Vec3,
        side: Side,
        rotation: Rotation,
    },
    SavePoint {
        position: Vec3,
        yaw: f32,
    },
}

impl Feature {
    pub fn position(&self) -> Vec3 {
        match *self {
            Feature::Ceiling { center } => center,
            Feature::Door { center, .. } => center,
            Feature::SavePoint { position, .. } => position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_sides_cancel_deltas() {
        for side in Side::ALL {
            let (dx, dz) = side.delta();
            let (ox, oz) = side.opposite().delta();
            assert_eq!((dx + ox, dz + oz), (0, 0));
            assert_eq!(side.opposite().opposite(), side);
        }
    }

    #[test]
    fn quarter_turn_swaps_footprint() {
        let size = Vec3::new(10.0, 4.0, 0.2);
        let wall = WallSegment::new(Vec3::new(5.0, 2.0, 0.0), Rotation::Deg90, size);
        let aabb = wall.aabb();
        assert!((aabb.max.x - aabb.min.x - 0.2).abs() < 1e-5);
        assert!((aabb.max.z - aabb.min.z - 10.0).abs() < 1e-5);
        assert!((aabb.max.y - aabb.min.y - 4.0).abs() < 1e-5);
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0));
        let b = Aabb::from_center_half_extents(Vec3::new(2.0, 0.0, 0.0), Vec3::splat(1.0));
        let c = Aabb::from_center_half_extents(Vec3::new(2.5, 0.0, 0.0), Vec3::splat(1.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
