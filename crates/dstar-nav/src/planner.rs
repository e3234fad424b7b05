//! Incremental shortest-path engine.
//!
//! The planner searches backwards from the goal and keeps two estimates per cell:
//! - `g`: best known distance to the goal.
//! - `rhs`: one-step lookahead, `min(g(n) + 1)` over walkable neighbors (`0` at the goal).
//!
//! Cells where the two disagree sit in the open set, keyed by `min(g, rhs) + h(cell, start)`.
//! A repair pass pops them in priority order until the maps agree again. After a single cell
//! toggles, only cells whose estimates actually move get touched.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{BucketQueue, GridView, PlannerConfig, Position};

/// Distance estimate. Unit cost per step; unknown or unreachable is `Cost::INFINITY`.
pub type Cost = f32;

const INFINITE: Cost = Cost::INFINITY;
const STEP_COST: Cost = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("endpoint {position} is off-grid or blocked")]
    InvalidEndpoint { position: Position },

    #[error("no path from {start} to {goal}")]
    Unreachable { start: Position, goal: Position },
}

/// Work counters for the most recent public planner call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Vertices popped from the open set.
    pub expansions: usize,
    /// Lookahead recomputations on walkable cells.
    pub rhs_updates: usize,
    /// On-demand repairs triggered by a stalled descent.
    pub stall_repairs: usize,
}

/// Manhattan distance; admissible and consistent on a 4-connected unit-cost grid.
pub fn heuristic(a: Position, b: Position) -> Cost {
    a.manhattan(b) as Cost
}

#[derive(Debug, Clone, Default)]
pub struct DStarPlanner {
    config: PlannerConfig,
    g: HashMap<Position, Cost>,
    rhs: HashMap<Position, Cost>,
    open: BucketQueue<Position>,
    start: Position,
    goal: Position,
    initialized: bool,
    stats: SearchStats,
}

impl DStarPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Goal of the active session, if a full plan has run.
    pub fn goal(&self) -> Option<Position> {
        self.initialized.then_some(self.goal)
    }

    pub fn start(&self) -> Option<Position> {
        self.initialized.then_some(self.start)
    }

    pub fn g(&self, pos: Position) -> Cost {
        self.g.get(&pos).copied().unwrap_or(INFINITE)
    }

    pub fn rhs(&self, pos: Position) -> Cost {
        self.rhs.get(&pos).copied().unwrap_or(INFINITE)
    }

    pub fn is_consistent(&self, pos: Position) -> bool {
        self.g(pos) == self.rhs(pos)
    }

    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    pub fn is_open(&self, pos: Position) -> bool {
        self.open.contains(&pos)
    }

    pub fn last_stats(&self) -> SearchStats {
        self.stats
    }

    /// Drops the session; the next call must be a full plan.
    pub fn reset(&mut self) {
        self.g.clear();
        self.rhs.clear();
        self.open.clear();
        self.start = Position::default();
        self.goal = Position::default();
        self.initialized = false;
        self.stats = SearchStats::default();
    }

    /// Full plan from `start` to `goal`. Empty when either endpoint is invalid or no path exists.
    pub fn find_path<G>(&mut self, grid: &G, start: Position, goal: Position) -> Vec<Position>
    where
        G: GridView + ?Sized,
    {
        self.try_find_path(grid, start, goal).unwrap_or_else(|err| {
            debug!(%err, "full plan found no path");
            Vec::new()
        })
    }

    pub fn try_find_path<G>(
        &mut self,
        grid: &G,
        start: Position,
        goal: Position,
    ) -> Result<Vec<Position>, PlanError>
    where
        G: GridView + ?Sized,
    {
        self.stats = SearchStats::default();
        for position in [start, goal] {
            if !grid.is_walkable(position) {
                return Err(PlanError::InvalidEndpoint { position });
            }
        }

        self.start = start;
        self.goal = goal;
        self.g.clear();
        self.rhs.clear();
        self.open.clear();

        for pos in grid.cells() {
            self.g.insert(pos, INFINITE);
            self.rhs.insert(pos, INFINITE);
        }

        self.rhs.insert(goal, 0.0);
        self.open.enqueue(goal, heuristic(goal, start));
        self.initialized = true;

        self.compute_shortest_path(grid);
        debug!(
            %start,
            %goal,
            expansions = self.stats.expansions,
            "full plan converged"
        );

        self.descend(grid)
    }

    /// Repairs the cost maps after the cell at `pos` toggled. No-op before the first full plan.
    ///
    /// Must be called once per change, after the grid has been mutated and before the next one.
    pub fn update_edge<G>(&mut self, grid: &G, pos: Position)
    where
        G: GridView + ?Sized,
    {
        if !self.initialized || !grid.contains(pos) {
            return;
        }
        self.stats = SearchStats::default();

        if grid.is_walkable(pos) {
            self.update_rhs(grid, pos);
        } else {
            self.g.insert(pos, INFINITE);
            self.rhs.insert(pos, INFINITE);
            self.open.remove(&pos);
        }

        for neighbor in pos.neighbors() {
            self.update_rhs(grid, neighbor);
        }

        self.compute_shortest_path(grid);
        debug!(
            %pos,
            walkable = grid.is_walkable(pos),
            expansions = self.stats.expansions,
            rhs_updates = self.stats.rhs_updates,
            "edge repaired"
        );
    }

    /// Re-extracts the path from the current maps.
    ///
    /// A different goal (or an uninitialized planner) falls back to [`find_path`](Self::find_path).
    pub fn reconstruct_path<G>(
        &mut self,
        grid: &G,
        start: Position,
        goal: Position,
    ) -> Vec<Position>
    where
        G: GridView + ?Sized,
    {
        self.try_reconstruct_path(grid, start, goal).unwrap_or_else(|err| {
            debug!(%err, "reconstruction found no path");
            Vec::new()
        })
    }

    pub fn try_reconstruct_path<G>(
        &mut self,
        grid: &G,
        start: Position,
        goal: Position,
    ) -> Result<Vec<Position>, PlanError>
    where
        G: GridView + ?Sized,
    {
        if !self.initialized || goal != self.goal {
            debug!(%goal, "goal changed, running full plan");
            return self.try_find_path(grid, start, goal);
        }
        if self.config.replan_on_start_move && start != self.start {
            debug!(%start, "start moved, running full plan");
            return self.try_find_path(grid, start, goal);
        }

        self.stats = SearchStats::default();
        self.start = start;
        self.descend(grid)
    }

    fn compute_shortest_path<G>(&mut self, grid: &G)
    where
        G: GridView + ?Sized,
    {
        let mut expansions = 0;

        while !self.open.is_empty() {
            if expansions >= self.config.max_expansions {
                warn!(
                    max_expansions = self.config.max_expansions,
                    open = self.open.len(),
                    next_priority = ?self.open.peek_priority(),
                    "expansion cap reached, repair pass incomplete"
                );
                break;
            }
            let Some(u) = self.open.dequeue() else {
                break;
            };

            let g_u = self.g(u);
            let rhs_u = self.rhs(u);
            if u == self.start && g_u == rhs_u {
                break;
            }

            expansions += 1;
            trace!(%u, g = g_u, rhs = rhs_u, "expand");

            if g_u > rhs_u {
                self.g.insert(u, rhs_u);
            } else if g_u < rhs_u {
                self.g.insert(u, INFINITE);
                self.update_rhs(grid, u);
            }

            for neighbor in u.neighbors() {
                if grid.is_walkable(neighbor) {
                    self.update_rhs(grid, neighbor);
                }
            }
        }

        self.stats.expansions += expansions;
    }

    fn update_rhs<G>(&mut self, grid: &G, pos: Position)
    where
        G: GridView + ?Sized,
    {
        if !grid.is_walkable(pos) {
            return;
        }
        self.stats.rhs_updates += 1;

        let rhs = if pos == self.goal {
            0.0
        } else {
            pos.neighbors()
                .into_iter()
                .filter(|n| grid.is_walkable(*n))
                .map(|n| self.g(n) + STEP_COST)
                .fold(INFINITE, Cost::min)
        };
        self.rhs.insert(pos, rhs);

        self.open.remove(&pos);
        let g = self.g(pos);
        if g != rhs {
            self.open.enqueue(pos, g.min(rhs) + heuristic(pos, self.start));
        }
    }

    /// Greedy descent over `g` from the session start to the goal.
    fn descend<G>(&mut self, grid: &G) -> Result<Vec<Position>, PlanError>
    where
        G: GridView + ?Sized,
    {
        let (start, goal) = (self.start, self.goal);
        for position in [start, goal] {
            if !grid.is_walkable(position) {
                return Err(PlanError::InvalidEndpoint { position });
            }
        }
        let unreachable = PlanError::Unreachable { start, goal };

        // Each step strictly lowers `g`, so between repairs no cell repeats.
        let step_cap = grid
            .cells()
            .len()
            .saturating_mul(self.config.max_stall_repairs.saturating_add(1))
            .min(self.config.max_path_steps);

        let mut path = vec![start];
        let mut current = start;
        let mut repairs_left = self.config.max_stall_repairs;
        let mut steps = 0;

        while current != goal {
            if steps >= step_cap {
                warn!(step_cap, "descent step cap reached");
                return Err(unreachable);
            }
            steps += 1;

            if let Some(next) = self.best_neighbor(grid, current) {
                current = next;
                path.push(next);
                continue;
            }

            if repairs_left == 0 {
                return Err(unreachable);
            }
            repairs_left -= 1;
            self.stats.stall_repairs += 1;
            debug!(%current, "descent stalled, repairing");
            self.update_rhs(grid, current);
            self.compute_shortest_path(grid);
        }

        Ok(path)
    }

    /// Walkable neighbor with the smallest finite `g`, if it improves on `current`.
    fn best_neighbor<G>(&self, grid: &G, current: Position) -> Option<Position>
    where
        G: GridView + ?Sized,
    {
        let mut best: Option<(Position, Cost)> = None;
        for neighbor in current.neighbors() {
            if !grid.is_walkable(neighbor) {
                continue;
            }
            let g = self.g(neighbor);
            if !g.is_finite() {
                continue;
            }
            // Strict comparison keeps the first neighbor in enumeration order on ties.
            if best.map_or(true, |(_, best_g)| g < best_g) {
                best = Some((neighbor, g));
            }
        }

        let (next, next_g) = best?;
        (next_g < self.g(current)).then_some(next)
    }
}
