use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use crate::hazard::HazardGrid;
use crate::poi::PoiRegistry;
use crate::types::{Direction, EdgeState, Hazard};
use crate::walls::WallGrid;

/// How much an agent fears hazardous ground while routing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Intent {
    /// Hunting a ghost to banish; hazards barely matter.
    SeekGhost,
    /// Escorting a victim or fetching one; hazards are expensive.
    Cautious,
}

impl Intent {
    fn multiplier(self) -> i32 {
        match self {
            Intent::SeekGhost => 1,
            Intent::Cautious => 5,
        }
    }
}

/// Dijkstra result rooted at one cell: cheapest known cost and parent
/// link for every reachable cell.
pub(super) struct PathField {
    start: (i32, i32),
    dist: BTreeMap<(i32, i32), i32>,
    parent: BTreeMap<(i32, i32), (i32, i32)>,
}

/// Explores the whole board from `start`. Edges are the traversable
/// ones plus closed doors (one extra point to open on the way); a step
/// into clear ground costs 1, into fog or ghost the hazard severity
/// times the intent multiplier. Equal-cost frontier entries expand in
/// insertion order, so the result is stable for a given board.
pub(super) fn explore(
    start: (i32, i32),
    walls: &WallGrid,
    hazard: &HazardGrid,
    intent: Intent,
) -> PathField {
    let mut dist = BTreeMap::new();
    let mut parent = BTreeMap::new();
    let mut heap: BinaryHeap<Reverse<(i32, u64, (i32, i32))>> = BinaryHeap::new();
    let mut seq: u64 = 0;

    dist.insert(start, 0);
    heap.push(Reverse((0, seq, start)));

    while let Some(Reverse((cost, _, (x, y)))) = heap.pop() {
        if dist.get(&(x, y)) != Some(&cost) {
            continue;
        }
        for dir in Direction::CARDINALS {
            let Some(edge) = walls.get_edge(x, y, dir) else {
                continue;
            };
            let door_toll = if edge == EdgeState::DoorClosed {
                1
            } else if edge.is_traversable() {
                0
            } else {
                continue;
            };
            let (nx, ny) = dir.offset(x, y);
            let step = match hazard.get(nx, ny) {
                Hazard::Clear => 1,
                h => h.severity() * intent.multiplier(),
            };
            let next = cost + step + door_toll;
            if dist.get(&(nx, ny)).is_none_or(|&d| next < d) {
                dist.insert((nx, ny), next);
                parent.insert((nx, ny), (x, y));
                seq += 1;
                heap.push(Reverse((next, seq, (nx, ny))));
            }
        }
    }

    PathField {
        start,
        dist,
        parent,
    }
}

impl PathField {
    pub(super) fn cost_to(&self, cell: (i32, i32)) -> Option<i32> {
        self.dist.get(&cell).copied()
    }

    /// Cells from the first step up to and including `goal`. Empty when
    /// the goal is the start itself or was never reached.
    pub(super) fn path_to(&self, goal: (i32, i32)) -> Vec<(i32, i32)> {
        if goal == self.start {
            return Vec::new();
        }
        let mut path = vec![goal];
        let mut cursor = goal;
        loop {
            match self.parent.get(&cursor) {
                Some(&prev) if prev == self.start => {
                    path.reverse();
                    return path;
                }
                Some(&prev) => {
                    path.push(prev);
                    cursor = prev;
                }
                None => return Vec::new(),
            }
        }
    }
}

/// Cheapest reachable ghost cell; cost ties prefer cells with more
/// ghost neighbors, then the lowest coordinate.
pub(super) fn nearest_ghost(
    field: &PathField,
    hazard: &HazardGrid,
    walls: &WallGrid,
) -> Option<(i32, i32)> {
    let mut best: Option<((i32, i32), i32, usize)> = None;
    for &(x, y) in hazard.ghost_cells() {
        let Some(cost) = field.cost_to((x, y)) else {
            continue;
        };
        let packed = walls
            .neighbors(x, y)
            .iter()
            .filter(|&&(nx, ny)| hazard.get(nx, ny) == Hazard::Ghost)
            .count();
        let replace = match best {
            None => true,
            Some((_, best_cost, best_packed)) => {
                cost < best_cost || (cost == best_cost && packed > best_packed)
            }
        };
        if replace {
            best = Some(((x, y), cost, packed));
        }
    }
    best.map(|(cell, _, _)| cell)
}

/// Cheapest reachable exit cell.
pub(super) fn nearest_exit(field: &PathField, walls: &WallGrid) -> Option<(i32, i32)> {
    let mut best: Option<((i32, i32), i32)> = None;
    for &(x, y) in walls.exits() {
        let Some(cost) = field.cost_to((x, y)) else {
            continue;
        };
        if best.is_none_or(|(_, best_cost)| cost < best_cost) {
            best = Some(((x, y), cost));
        }
    }
    best.map(|(cell, _)| cell)
}

/// Assigns every marker on the board to one of the given agents, each
/// marker going to the strictly cheapest claimant. Cost ties go to the
/// agent holding fewer claims so far, then to the lower agent index.
pub(super) fn claim_pois(
    fields: &[(usize, PathField)],
    pois: &PoiRegistry,
) -> BTreeMap<(i32, i32), usize> {
    let mut claims: BTreeMap<(i32, i32), usize> = BTreeMap::new();
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for cell in pois.marker_cells() {
        let mut best: Option<(i32, usize)> = None;
        for (idx, field) in fields {
            let Some(cost) = field.cost_to(cell) else {
                continue;
            };
            let replace = match best {
                None => true,
                Some((best_cost, best_idx)) => {
                    cost < best_cost
                        || (cost == best_cost
                            && counts.get(idx).copied().unwrap_or(0)
                                < counts.get(&best_idx).copied().unwrap_or(0))
                }
            };
            if replace {
                best = Some((cost, *idx));
            }
        }
        if let Some((_, idx)) = best {
            claims.insert(cell, idx);
            *counts.entry(idx).or_insert(0) += 1;
        }
    }
    claims
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleared_hazard() -> HazardGrid {
        let mut hazard = HazardGrid::new();
        let ghosts: Vec<_> = hazard.ghost_cells().iter().copied().collect();
        for (x, y) in ghosts {
            hazard.set(x, y, Hazard::Clear);
        }
        hazard
    }

    #[test]
    fn open_ground_costs_one_per_step() {
        let walls = WallGrid::new();
        let hazard = cleared_hazard();
        let field = explore((0, 0), &walls, &hazard, Intent::Cautious);
        assert_eq!(field.cost_to((3, 0)), Some(3));
        let path = field.path_to((3, 0));
        assert_eq!(path.len(), 3);
        assert_eq!(*path.last().unwrap(), (3, 0));
    }

    #[test]
    fn costs_never_decrease_along_a_path() {
        let walls = WallGrid::new();
        let hazard = HazardGrid::new();
        let field = explore((0, 0), &walls, &hazard, Intent::Cautious);
        let path = field.path_to((8, 6));
        assert!(!path.is_empty());
        let mut last = 0;
        for cell in path {
            let cost = field.cost_to(cell).unwrap();
            assert!(cost >= last);
            last = cost;
        }
    }

    #[test]
    fn a_closed_door_costs_one_extra_point() {
        let walls = WallGrid::new();
        let hazard = cleared_hazard();
        // The closed door between (4, 1) and (3, 1) is the short way
        // through; one step plus one point to open.
        let field = explore((4, 1), &walls, &hazard, Intent::Cautious);
        assert_eq!(field.cost_to((3, 1)), Some(2));
        assert_eq!(field.path_to((3, 1)), vec![(3, 1)]);
    }

    #[test]
    fn intent_scales_hazard_costs() {
        let walls = WallGrid::new();
        let hazard = HazardGrid::new();
        let bold = explore((2, 1), &walls, &hazard, Intent::SeekGhost);
        let wary = explore((2, 1), &walls, &hazard, Intent::Cautious);
        assert_eq!(bold.cost_to((2, 2)), Some(2));
        assert_eq!(wary.cost_to((2, 2)), Some(10));
    }

    #[test]
    fn a_sealed_cell_yields_an_empty_path() {
        let mut walls = WallGrid::new();
        let hazard = cleared_hazard();
        for dir in Direction::CARDINALS {
            walls.set_edge(4, 4, dir, EdgeState::Intact);
        }
        let field = explore((0, 0), &walls, &hazard, Intent::Cautious);
        assert_eq!(field.cost_to((4, 4)), None);
        assert!(field.path_to((4, 4)).is_empty());
        assert!(field.path_to((0, 0)).is_empty());
    }

    #[test]
    fn nearest_ghost_prefers_packed_clusters_on_ties() {
        let walls = WallGrid::new();
        let mut hazard = cleared_hazard();
        // Two ghosts at distance 2 from (0, 0); (2, 0) sits next to a
        // third ghost, (0, 2) stands alone.
        hazard.set(2, 0, Hazard::Ghost);
        hazard.set(3, 0, Hazard::Ghost);
        hazard.set(0, 2, Hazard::Ghost);
        let field = explore((0, 0), &walls, &hazard, Intent::SeekGhost);
        assert_eq!(nearest_ghost(&field, &hazard, &walls), Some((2, 0)));
    }

    #[test]
    fn claims_spread_across_agents_on_cost_ties() {
        let walls = WallGrid::new();
        let hazard = cleared_hazard();
        let pois = PoiRegistry::new();
        // Markers sit at (4, 2), (1, 5) and (8, 5). Two agents on
        // opposite corners split them instead of one taking all.
        let fields = vec![
            (0, explore((0, 0), &walls, &hazard, Intent::Cautious)),
            (1, explore((9, 7), &walls, &hazard, Intent::Cautious)),
        ];
        let claims = claim_pois(&fields, &pois);
        assert_eq!(claims.len(), 3);
        let to_first = claims.values().filter(|&&idx| idx == 0).count();
        assert!(to_first >= 1);
        assert!(claims.values().any(|&idx| idx == 1));
    }
}
