use crate::constants::SPAWN_POINTS;
use crate::types::Direction;

pub(super) fn manhattan(ax: i32, ay: i32, bx: i32, by: i32) -> i32 {
    (ax - bx).abs() + (ay - by).abs()
}

/// Closest spawn point by Manhattan distance; ties keep the earliest
/// entry in the spawn list.
pub(super) fn nearest_spawn(x: i32, y: i32) -> (i32, i32) {
    let mut best = SPAWN_POINTS[0];
    let mut best_dist = manhattan(x, y, best.0, best.1);
    for &(sx, sy) in &SPAWN_POINTS[1..] {
        let dist = manhattan(x, y, sx, sy);
        if dist < best_dist {
            best = (sx, sy);
            best_dist = dist;
        }
    }
    best
}

pub(super) fn direction_toward(from: (i32, i32), to: (i32, i32)) -> Direction {
    if to == (from.0, from.1 - 1) {
        Direction::Up
    } else if to == (from.0 + 1, from.1) {
        Direction::Right
    } else if to == (from.0, from.1 + 1) {
        Direction::Down
    } else if to == (from.0 - 1, from.1) {
        Direction::Left
    } else {
        Direction::Here
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_spawn_prefers_the_earliest_on_ties() {
        // (3, 2) is distance 4 from both (5, 0) and (0, 3); the list
        // order keeps (5, 0).
        assert_eq!(nearest_spawn(3, 2), (5, 0));
        assert_eq!(nearest_spawn(9, 5), (9, 4));
        assert_eq!(nearest_spawn(0, 3), (0, 3));
    }
}
