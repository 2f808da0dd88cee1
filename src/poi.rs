use crate::constants::{FALSE_ALARM_TOKENS, HEIGHT, INITIAL_POI_CELLS, VICTIM_TOKENS, WIDTH};
use crate::hazard::HazardGrid;
use crate::rng::Rng;
use crate::types::{Hazard, PoiCell, PoiChange, PoiToken};
use crate::walls::in_bounds;

/// The hidden token pool ran dry while a marker was being revealed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolExhausted;

/// Point-of-interest layer: unrevealed markers on the board plus the
/// hidden pool of 12 victim and 6 false-alarm tokens they draw from.
///
/// Every token is, at any moment, in exactly one place: the pool, a
/// revealed cell, an agent's arms, or one of the rescued / scared /
/// resolved-false-alarm tallies. Unrevealed markers hold no token.
#[derive(Clone, Debug)]
pub struct PoiRegistry {
    cells: [[PoiCell; WIDTH as usize]; HEIGHT as usize],
    pool: Vec<PoiToken>,
    live: i32,
    rescued: i32,
    scared: i32,
    resolved_false_alarms: i32,
    // Per-turn change buffers, drained into the event log at turn end.
    updates: Vec<(i32, i32, PoiCell, PoiCell)>,
    additions: Vec<(i32, i32)>,
}

impl Default for PoiRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PoiRegistry {
    pub fn new() -> Self {
        let mut cells = [[PoiCell::Empty; WIDTH as usize]; HEIGHT as usize];
        for (x, y) in INITIAL_POI_CELLS {
            cells[y as usize][x as usize] = PoiCell::Unrevealed;
        }
        let mut pool = vec![PoiToken::Victim; VICTIM_TOKENS];
        pool.extend(std::iter::repeat(PoiToken::FalseAlarm).take(FALSE_ALARM_TOKENS));
        Self {
            cells,
            pool,
            live: INITIAL_POI_CELLS.len() as i32,
            rescued: 0,
            scared: 0,
            resolved_false_alarms: 0,
            updates: Vec::new(),
            additions: Vec::new(),
        }
    }

    pub fn get(&self, x: i32, y: i32) -> PoiCell {
        if !in_bounds(x, y) {
            return PoiCell::Empty;
        }
        self.cells[y as usize][x as usize]
    }

    /// Tokens still in play: markers and revealed tokens on the board
    /// plus victims being carried. Drives the replenish-to-three rule.
    pub fn live_count(&self) -> i32 {
        self.live
    }

    pub fn pool_remaining(&self) -> usize {
        self.pool.len()
    }

    pub fn rescued(&self) -> i32 {
        self.rescued
    }

    pub fn scared(&self) -> i32 {
        self.scared
    }

    pub fn resolved_false_alarms(&self) -> i32 {
        self.resolved_false_alarms
    }

    /// Revealed tokens sitting on the board right now.
    pub fn revealed_count(&self) -> i32 {
        let mut count = 0;
        for row in &self.cells {
            for cell in row {
                if matches!(cell, PoiCell::Victim | PoiCell::FalseAlarm) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Coordinates of every marker or revealed token, row-major.
    pub fn marker_cells(&self) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                if self.get(x, y) != PoiCell::Empty {
                    out.push((x, y));
                }
            }
        }
        out
    }

    /// A carried victim reaches an exit and leaves play.
    pub fn mark_rescued(&mut self) {
        self.rescued += 1;
        self.live -= 1;
    }

    /// A victim on the board is scared away; pair with `remove`.
    pub fn mark_scared(&mut self) {
        self.scared += 1;
    }

    /// A carried victim is scared away (its cell was already cleared
    /// when it was picked up).
    pub fn scare_carried(&mut self) {
        self.scared += 1;
        self.live -= 1;
    }

    /// Flips the unrevealed marker at (x, y) by drawing one token
    /// uniformly from the pool. An empty pool resolves the marker on the
    /// spot as a false alarm.
    pub fn reveal(&mut self, x: i32, y: i32, rng: &mut Rng) -> Result<PoiToken, PoolExhausted> {
        if self.pool.is_empty() {
            self.remove(x, y);
            self.resolved_false_alarms += 1;
            return Err(PoolExhausted);
        }
        let token = self.pool.swap_remove(rng.pick_index(self.pool.len()));
        self.record(x, y, token.cell());
        self.cells[y as usize][x as usize] = token.cell();
        Ok(token)
    }

    /// Clears the cell and logs the removal. No-op on an empty cell.
    pub fn remove(&mut self, x: i32, y: i32) {
        if self.get(x, y) == PoiCell::Empty {
            return;
        }
        self.record(x, y, PoiCell::Empty);
        self.cells[y as usize][x as usize] = PoiCell::Empty;
        self.live -= 1;
    }

    /// A victim token leaves the board in an agent's arms. The cell is
    /// cleared but the token stays in play, so it still counts against
    /// the replenishment minimum.
    pub fn mark_carried(&mut self, x: i32, y: i32) {
        if self.get(x, y) == PoiCell::Empty {
            return;
        }
        self.record(x, y, PoiCell::Empty);
        self.cells[y as usize][x as usize] = PoiCell::Empty;
    }

    pub fn resolve_false_alarm(&mut self, x: i32, y: i32) {
        self.remove(x, y);
        self.resolved_false_alarms += 1;
    }

    /// Drops a fresh unrevealed marker on a random interior cell that has
    /// no marker and no agent, clearing any hazard there. Returns false
    /// once the pool is dry.
    pub fn place(
        &mut self,
        hazard: &mut HazardGrid,
        agents: &[(i32, i32)],
        rng: &mut Rng,
    ) -> bool {
        if self.pool.is_empty() {
            return false;
        }
        let (x, y) = loop {
            let x = rng.int(1, WIDTH - 2);
            let y = rng.int(1, HEIGHT - 2);
            if self.get(x, y) == PoiCell::Empty && !agents.contains(&(x, y)) {
                break (x, y);
            }
        };
        hazard.set(x, y, Hazard::Clear);
        self.cells[y as usize][x as usize] = PoiCell::Unrevealed;
        self.live += 1;
        self.additions.push((x, y));
        true
    }

    fn record(&mut self, x: i32, y: i32, new: PoiCell) {
        let old = self.get(x, y);
        self.updates.push((x, y, old, new));
    }

    /// Drains the per-turn buffers into log entries: reveals and removals
    /// at `update_order`, placements at `addition_order`.
    pub fn drain_changes(&mut self, update_order: u32, addition_order: u32) -> Vec<PoiChange> {
        let mut out = Vec::with_capacity(self.updates.len() + self.additions.len());
        for (x, y, old, new) in self.updates.drain(..) {
            out.push(PoiChange {
                x,
                y,
                old_status: old.wire(),
                new_status: new.wire(),
                order: update_order,
            });
        }
        for (x, y) in self.additions.drain(..) {
            out.push(PoiChange {
                x,
                y,
                old_status: PoiCell::Empty.wire(),
                new_status: PoiCell::Unrevealed.wire(),
                order: addition_order,
            });
        }
        out
    }
}
