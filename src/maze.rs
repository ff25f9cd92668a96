use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub visited: bool,
    walls: [bool; 4],
}

impl Cell {
    fn walled() -> Self {
        Self {
            visited: false,
            walls: [true; 4],
        }
    }

    pub fn has_wall(&self, side: Side) -> bool {
        self.walls[side.index()]
    }

    pub fn walls(&self) -> impl Iterator<Item = Side> + '_ {
        Side::ALL.into_iter().filter(move |side| self.has_wall(*side))
    }
}

/// Row-major grid of cells produced by [`generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl MazeGrid {
    fn walled(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::walled(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell(&self, x: usize, z: usize) -> &Cell {
        &self.cells[z * self.width + x]
    }

    fn cell_mut(&mut self, x: usize, z: usize) -> &mut Cell {
        &mut self.cells[z * self.width + x]
    }

    pub fn neighbor(&self, x: usize, z: usize, side: Side) -> Option<(usize, usize)> {
        let (dx, dz) = side.delta();
        let nx = x as isize + dx;
        let nz = z as isize + dz;
        if nx < 0 || nz < 0 {
            return None;
        }
        let nx = nx as usize;
        let nz = nz as usize;
        if nx >= self.width || nz >= self.height {
            return None;
        }
        Some((nx, nz))
    }

    /// Number of interior boundaries that are open. Each shared wall is
    /// counted once.
    pub fn passage_count(&self) -> usize {
        let mut open = 0;
        for z in 0..self.height {
            for x in 0..self.width {
                for side in [Side::East, Side::South] {
                    if self.neighbor(x, z, side).is_some() && !self.cell(x, z).has_wall(side) {
                        open += 1;
                    }
                }
            }
        }
        open
    }

    fn open_between(&mut self, x: usize, z: usize, side: Side) {
        if let Some((nx, nz)) = self.neighbor(x, z, side) {
            self.cell_mut(x, z).walls[side.index()] = false;
            self.cell_mut(nx, nz).walls[side.opposite().index()] = false;
        }
    }
}

/// Carves a spanning tree over a `width` × `height` grid with a randomized
/// depth-first walk starting at the centre cell.
///
/// A zero-sized grid is returned empty.
pub fn generate(width: usize, height: usize, rng: &mut impl Rng) -> MazeGrid {
    let mut grid = MazeGrid::walled(width, height);
    if width == 0 || height == 0 {
        return grid;
    }

    let mut current = (width / 2, height / 2);
    grid.cell_mut(current.0, current.1).visited = true;
    let mut stack = Vec::with_capacity(width * height);

    loop {
        let options = unvisited_neighbors(&grid, current.0, current.1);
        if let Some(&side) = options.choose(rng) {
            stack.push(current);
            grid.open_between(current.0, current.1, side);
            if let Some(next) = grid.neighbor(current.0, current.1, side) {
                current = next;
                grid.cell_mut(current.0, current.1).visited = true;
            }
        } else if let Some(prev) = stack.pop() {
            current = prev;
        } else {
            break;
        }
    }

    grid
}

fn unvisited_neighbors(grid: &MazeGrid, x: usize, z: usize) -> Vec<Side> {
    let mut options = Vec::with_capacity(4);
    for side in Side::ALL {
        if let Some((nx, nz)) = grid.neighbor(x, z, side) {
            if !grid.cell(nx, nz).visited {
                options.push(side);
            }
        }
    }
    options
}
