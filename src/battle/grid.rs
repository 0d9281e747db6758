//! Square tactical grid with taxicab distance
//!
//! Movement and weapon range are both costed in tiles, so distance is the sum
//! of absolute coordinate differences.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Tile coordinate inside the arena
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Taxicab distance
    pub fn distance(&self, other: &Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four orthogonally adjacent tiles
    pub fn adjacent(&self) -> [GridPosition; 4] {
        [
            GridPosition::new(self.x + 1, self.y),
            GridPosition::new(self.x - 1, self.y),
            GridPosition::new(self.x, self.y + 1),
            GridPosition::new(self.x, self.y - 1),
        ]
    }
}

/// Bounded rectangular arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatGrid {
    pub width: u32,
    pub height: u32,
}

impl CombatGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn in_bounds(&self, pos: GridPosition) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Tiles within `range` of `center`, centre included.
    ///
    /// Scan order is column by column (x outer, y inner); callers that pick
    /// the first best tile rely on it for stable tie-breaks.
    pub fn cells_in_range(&self, center: GridPosition, range: u32) -> Vec<GridPosition> {
        let r = range.min(self.width + self.height) as i32;
        let mut cells = Vec::new();
        for dx in -r..=r {
            for dy in -r..=r {
                if dx.unsigned_abs() + dy.unsigned_abs() > range {
                    continue;
                }
                let pos = GridPosition::new(center.x + dx, center.y + dy);
                if self.in_bounds(pos) {
                    cells.push(pos);
                }
            }
        }
        cells
    }

    /// Tiles within `distance` of `pos`, excluding `pos` itself
    pub fn neighbors(&self, pos: GridPosition, distance: u32) -> Vec<GridPosition> {
        self.cells_in_range(pos, distance)
            .into_iter()
            .filter(|p| *p != pos)
            .collect()
    }

    /// Greedy step-by-step path from `start` to `end` that sidesteps
    /// occupied tiles. Excludes `start`. Stops early if boxed in.
    pub fn path(
        &self,
        start: GridPosition,
        end: GridPosition,
        occupied: &AHashSet<GridPosition>,
    ) -> Vec<GridPosition> {
        let mut path = Vec::new();
        let mut visited = AHashSet::new();
        visited.insert(start);
        let mut current = start;

        while current != end && path.len() < self.cell_count() {
            let next = current
                .adjacent()
                .into_iter()
                .filter(|p| self.in_bounds(*p))
                .filter(|p| *p == end || !occupied.contains(p))
                .filter(|p| !visited.contains(p))
                .min_by_key(|p| p.distance(&end));

            let Some(next) = next else {
                break;
            };
            visited.insert(next);
            path.push(next);
            current = next;
        }

        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxicab_distance() {
        let a = GridPosition::new(0, 0);
        assert_eq!(a.distance(&GridPosition::new(3, 4)), 7);
        assert_eq!(GridPosition::new(5, 2).distance(&GridPosition::new(2, 5)), 6);
        assert_eq!(a.distance(&a), 0);
    }

    #[test]
    fn test_bounds() {
        let grid = CombatGrid::new(12, 8);
        assert!(grid.in_bounds(GridPosition::new(0, 0)));
        assert!(grid.in_bounds(GridPosition::new(11, 7)));
        assert!(!grid.in_bounds(GridPosition::new(12, 0)));
        assert!(!grid.in_bounds(GridPosition::new(0, 8)));
        assert!(!grid.in_bounds(GridPosition::new(-1, 3)));
    }

    #[test]
    fn test_neighbors_form_diamond() {
        let grid = CombatGrid::new(12, 8);
        let center = GridPosition::new(5, 4);

        assert_eq!(grid.neighbors(center, 1).len(), 4);
        assert_eq!(grid.neighbors(center, 2).len(), 12);
        assert!(!grid.neighbors(center, 2).contains(&center));
        assert_eq!(grid.cells_in_range(center, 2).len(), 13);
    }

    #[test]
    fn test_neighbors_clipped_at_edge() {
        let grid = CombatGrid::new(12, 8);
        let corner = GridPosition::new(0, 0);
        let cells = grid.neighbors(corner, 1);
        assert_eq!(cells.len(), 2);
        assert!(cells.iter().all(|p| grid.in_bounds(*p)));
    }

    #[test]
    fn test_path_straight_line() {
        let grid = CombatGrid::new(12, 8);
        let path = grid.path(
            GridPosition::new(0, 0),
            GridPosition::new(3, 0),
            &AHashSet::new(),
        );
        assert_eq!(path.len(), 3);
        assert_eq!(path.last(), Some(&GridPosition::new(3, 0)));
    }

    #[test]
    fn test_path_sidesteps_blocker() {
        let grid = CombatGrid::new(12, 8);
        let mut occupied = AHashSet::new();
        occupied.insert(GridPosition::new(1, 2));

        let path = grid.path(GridPosition::new(0, 2), GridPosition::new(2, 2), &occupied);

        assert!(!path.contains(&GridPosition::new(1, 2)));
        assert_eq!(path.last(), Some(&GridPosition::new(2, 2)));
        for pair in path.windows(2) {
            assert_eq!(pair[0].distance(&pair[1]), 1);
        }
    }

    #[test]
    fn test_path_to_self_is_empty() {
        let grid = CombatGrid::new(4, 4);
        let p = GridPosition::new(1, 1);
        assert!(grid.path(p, p, &AHashSet::new()).is_empty());
    }
}
