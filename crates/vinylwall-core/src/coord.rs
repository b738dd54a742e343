//! Grid coordinates and the edit-mode neighbor expansion.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A cell address on the shelf grid.
///
/// Rows grow downward, columns grow to the right. The grid is sparse and
/// unbounded: negative rows/columns are perfectly valid, which is what lets
/// a shelf grow upward and to the left of its first spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub row: i32,
    pub col: i32,
}

impl GridCoord {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The four axis neighbors (up, down, left, right). No diagonals.
    pub fn neighbors(self) -> [GridCoord; 4] {
        [
            Self::new(self.row + 1, self.col),
            Self::new(self.row - 1, self.col),
            Self::new(self.row, self.col + 1),
            Self::new(self.row, self.col - 1),
        ]
    }
}

impl From<(i32, i32)> for GridCoord {
    fn from((row, col): (i32, i32)) -> Self {
        Self { row, col }
    }
}

/// Computes the set of empty cells where a new spot may be added.
///
/// Every occupied cell contributes its four axis neighbors; the union is
/// deduplicated and cells that are already occupied are removed. The result
/// is exactly the "add here" placeholder set shown in edit mode.
///
/// Pure and order-independent. An empty input yields an empty output;
/// the expansion cannot bootstrap an empty grid, so shelves are always
/// seeded with at least one spot elsewhere.
pub fn expand(occupied: &HashSet<GridCoord>) -> HashSet<GridCoord> {
    let mut addable = HashSet::with_capacity(occupied.len() * 2);
    for coord in occupied {
        for neighbor in coord.neighbors() {
            if !occupied.contains(&neighbor) {
                addable.insert(neighbor);
            }
        }
    }
    addable
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupied(coords: &[(i32, i32)]) -> HashSet<GridCoord> {
        coords.iter().map(|&c| GridCoord::from(c)).collect()
    }

    #[test]
    fn test_expand_empty_grid() {
        assert!(expand(&HashSet::new()).is_empty());
    }

    #[test]
    fn test_expand_never_emits_occupied() {
        let cells = occupied(&[(0, 0), (0, 1), (1, 1), (5, -3)]);
        let addable = expand(&cells);
        assert!(addable.is_disjoint(&cells));
    }

    #[test]
    fn test_expand_single_cell() {
        let addable = expand(&occupied(&[(0, 0)]));
        let expected = occupied(&[(1, 0), (-1, 0), (0, 1), (0, -1)]);
        assert_eq!(addable, expected);
    }

    #[test]
    fn test_expand_two_cell_row() {
        // Two spots side by side: 6 addable cells, shared neighbors
        // deduplicated, occupied cells excluded.
        let cells = occupied(&[(0, 0), (0, 1)]);
        let addable = expand(&cells);
        let expected = occupied(&[(-1, 0), (1, 0), (0, -1), (-1, 1), (1, 1), (0, 2)]);
        assert_eq!(addable, expected);
        assert_eq!(addable.len(), 6);
    }

    #[test]
    fn test_expand_is_idempotent_on_same_input() {
        let cells = occupied(&[(2, 3), (2, 4), (3, 3)]);
        assert_eq!(expand(&cells), expand(&cells));
    }

    #[test]
    fn test_expand_disconnected_islands() {
        // Two far-apart spots expand independently.
        let cells = occupied(&[(0, 0), (10, 10)]);
        let addable = expand(&cells);
        assert_eq!(addable.len(), 8);
        assert!(addable.contains(&GridCoord::new(0, 1)));
        assert!(addable.contains(&GridCoord::new(10, 9)));
    }
}
