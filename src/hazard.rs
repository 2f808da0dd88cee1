use std::collections::BTreeSet;

use crate::constants::{HEIGHT, INITIAL_GHOST_CELLS, WIDTH};
use crate::poi::PoiRegistry;
use crate::rng::Rng;
use crate::types::{Direction, EdgeState, Hazard, PoiCell, PoiToken, WallChange};
use crate::walls::{in_bounds, WallGrid};

/// Per-cell haunting layer. The two index sets mirror the matrix so
/// spread passes and goal selection can iterate in a fixed order.
#[derive(Clone, Debug)]
pub struct HazardGrid {
    cells: [[Hazard; WIDTH as usize]; HEIGHT as usize],
    fog_cells: BTreeSet<(i32, i32)>,
    ghost_cells: BTreeSet<(i32, i32)>,
}

impl Default for HazardGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl HazardGrid {
    pub fn new() -> Self {
        let mut grid = Self {
            cells: [[Hazard::Clear; WIDTH as usize]; HEIGHT as usize],
            fog_cells: BTreeSet::new(),
            ghost_cells: BTreeSet::new(),
        };
        for (x, y) in INITIAL_GHOST_CELLS {
            grid.set(x, y, Hazard::Ghost);
        }
        grid
    }

    pub fn get(&self, x: i32, y: i32) -> Hazard {
        if !in_bounds(x, y) {
            return Hazard::Clear;
        }
        self.cells[y as usize][x as usize]
    }

    pub fn set(&mut self, x: i32, y: i32, hazard: Hazard) {
        if !in_bounds(x, y) {
            return;
        }
        let old = self.cells[y as usize][x as usize];
        if old == hazard {
            return;
        }
        match old {
            Hazard::Fog => {
                self.fog_cells.remove(&(x, y));
            }
            Hazard::Ghost => {
                self.ghost_cells.remove(&(x, y));
            }
            Hazard::Clear => {}
        }
        match hazard {
            Hazard::Fog => {
                self.fog_cells.insert((x, y));
            }
            Hazard::Ghost => {
                self.ghost_cells.insert((x, y));
            }
            Hazard::Clear => {}
        }
        self.cells[y as usize][x as usize] = hazard;
    }

    pub fn ghost_cells(&self) -> &BTreeSet<(i32, i32)> {
        &self.ghost_cells
    }

    pub fn fog_cells(&self) -> &BTreeSet<(i32, i32)> {
        &self.fog_cells
    }

    /// Cells whose hazard differs from `before`, row-major.
    pub fn diff(&self, before: &HazardGrid) -> Vec<(i32, i32, Hazard)> {
        let mut out = Vec::new();
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let now = self.get(x, y);
                if now != before.get(x, y) {
                    out.push((x, y, now));
                }
            }
        }
        out
    }

    /// Turns (x, y) into a ghost cell and settles any marker there: a
    /// victim is scared away, a false alarm is resolved, an unrevealed
    /// marker draws first.
    pub fn set_ghost(&mut self, x: i32, y: i32, pois: &mut PoiRegistry, rng: &mut Rng) {
        if !in_bounds(x, y) || self.get(x, y) == Hazard::Ghost {
            return;
        }
        self.set(x, y, Hazard::Ghost);
        match pois.get(x, y) {
            PoiCell::Empty => {}
            PoiCell::Unrevealed => match pois.reveal(x, y, rng) {
                Ok(PoiToken::Victim) => {
                    pois.mark_scared();
                    pois.remove(x, y);
                }
                Ok(PoiToken::FalseAlarm) => pois.resolve_false_alarm(x, y),
                Err(_) => {}
            },
            PoiCell::Victim => {
                pois.mark_scared();
                pois.remove(x, y);
            }
            PoiCell::FalseAlarm => pois.resolve_false_alarm(x, y),
        }
    }

    /// Runs fog-to-ghost conversion to a fixed point: every fog cell with
    /// a ghost neighbor across a traversable edge turns into a ghost,
    /// repeated until a full pass converts nothing.
    pub fn spread(&mut self, walls: &WallGrid, pois: &mut PoiRegistry, rng: &mut Rng) {
        loop {
            let converts: Vec<(i32, i32)> = self
                .fog_cells
                .iter()
                .copied()
                .filter(|&(x, y)| {
                    walls
                        .neighbors(x, y)
                        .iter()
                        .any(|&(nx, ny)| self.get(nx, ny) == Hazard::Ghost)
                })
                .collect();
            if converts.is_empty() {
                return;
            }
            for (x, y) in converts {
                self.set_ghost(x, y, pois, rng);
            }
        }
    }

    /// Ghost surge from an already haunted cell: one ray per cardinal
    /// direction. A ray stops on the first edge it breaks (intact wall to
    /// damaged, damaged to destroyed, closed door torn off, one damage
    /// point each), passes open or gone edges for free, chains through
    /// ghost cells, and haunts the first clear or fog cell it reaches.
    /// Returns the damage dealt; broken edges are pushed onto `wall_log`.
    pub fn surge(
        &mut self,
        x: i32,
        y: i32,
        walls: &mut WallGrid,
        pois: &mut PoiRegistry,
        rng: &mut Rng,
        wall_log: &mut Vec<WallChange>,
        order: u32,
    ) -> i32 {
        let mut damage = 0;
        for dir in Direction::CARDINALS {
            let (mut cx, mut cy) = (x, y);
            loop {
                let Some(edge) = walls.get_edge(cx, cy, dir) else {
                    break;
                };
                let next = match edge {
                    EdgeState::Intact => Some(EdgeState::Damaged),
                    EdgeState::Damaged => Some(EdgeState::Destroyed),
                    EdgeState::DoorClosed => Some(EdgeState::DoorDestroyed),
                    EdgeState::DoorOpen | EdgeState::DoorDestroyed | EdgeState::Destroyed => None,
                };
                if let Some(next) = next {
                    walls.set_edge(cx, cy, dir, next);
                    damage += 1;
                    wall_log.push(WallChange {
                        x: cx,
                        y: cy,
                        direction: dir.index(),
                        status: next.wire(),
                        order,
                    });
                    break;
                }
                if edge == EdgeState::DoorOpen {
                    // Blown off its hinges, but nothing to break through.
                    walls.set_edge(cx, cy, dir, EdgeState::DoorDestroyed);
                    wall_log.push(WallChange {
                        x: cx,
                        y: cy,
                        direction: dir.index(),
                        status: EdgeState::DoorDestroyed.wire(),
                        order,
                    });
                }
                let (nx, ny) = dir.offset(cx, cy);
                if self.get(nx, ny) == Hazard::Ghost {
                    cx = nx;
                    cy = ny;
                } else {
                    self.set_ghost(nx, ny, pois, rng);
                    break;
                }
            }
        }
        damage
    }

    /// End-of-turn hazard step: one random interior draw. A clear cell
    /// fogs up, a fog cell turns ghost, a ghost cell surges. Afterwards
    /// fog spreads to a fixed point. Returns the damage dealt.
    pub fn place_hazard(
        &mut self,
        walls: &mut WallGrid,
        pois: &mut PoiRegistry,
        rng: &mut Rng,
        wall_log: &mut Vec<WallChange>,
        order: u32,
    ) -> i32 {
        let x = rng.int(1, WIDTH - 2);
        let y = rng.int(1, HEIGHT - 2);
        let mut damage = 0;
        match self.get(x, y) {
            Hazard::Clear => self.set(x, y, Hazard::Fog),
            Hazard::Fog => self.set_ghost(x, y, pois, rng),
            Hazard::Ghost => {
                damage = self.surge(x, y, walls, pois, rng, wall_log, order);
            }
        }
        self.spread(walls, pois, rng);
        damage
    }
}
