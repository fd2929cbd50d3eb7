//! Classroom Planner - rosters, plans and saved activities on top of
//! `group-kernel`.
//!
//! ## Pieces
//!
//! - [`generator`]: seeded classroom rosters (`small`, `medium`, `large`)
//! - [`plan`]: build an assignment session from templates, custom groups,
//!   balancing and staff leads, and render it for the terminal
//! - [`store`]: activity records saved one JSON file per activity

pub mod generator;
pub mod plan;
pub mod store;

pub use generator::{RosterGenerator, RosterGeneratorConfig};
pub use plan::{PlanConfig, build_session, render};
pub use store::{Activity, ActivityStore, JsonFileStore, MemoryStore, RecordStore};
