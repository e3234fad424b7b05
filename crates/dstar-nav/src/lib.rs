//! Incremental shortest paths over mutable 4-connected grids.
//!
//! [`DStarPlanner`] plans from an agent's cell to a fixed goal and, when single cells toggle
//! between walkable and blocked, repairs its cost maps in place instead of replanning from
//! scratch. The host owns the [`Grid`] (or any other [`GridView`]) and reports every change by
//! calling [`DStarPlanner::update_edge`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod grid;
pub mod planner;
pub mod queue;

pub use config::PlannerConfig;
pub use error::{GridError, Result};
pub use grid::{CellChange, CellState, Grid, GridView, Position};
pub use planner::{Cost, DStarPlanner, PlanError, SearchStats};
pub use queue::BucketQueue;
