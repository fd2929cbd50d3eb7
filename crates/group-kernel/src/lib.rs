//! Group Kernel: roster partitioning for classroom activities.
//!
//! This crate maintains the student groups of one activity's assignment:
//! mutually exclusive groups (or a single whole-class group), a lead staff
//! member per group, template-driven creation, even load-balancing and
//! compatibility-based groupmate suggestions.
//!
//! ## Pipeline
//!
//! ```text
//! Roster ──► TemplateCatalog / create_custom ──► GroupRegistry
//!                                                   │
//!            balance_groups, suggest_groupmates ◄───┤
//!            Command ──► AssignmentSession::apply ──┤
//!                                                   ▼
//!                                snapshot / rehydrate ⇄ AssignmentRecord
//! ```
//!
//! The unassigned pool is always derived from the roster, never stored, so
//! after any sequence of moves, deletions and balancing every student is in
//! exactly one place.

pub mod advisor;
pub mod balancer;
pub mod config;
pub mod drag;
pub mod group;
pub mod health;
pub mod invariants;
pub mod persistence;
pub mod registry;
pub mod roster;
pub mod session;
pub mod templates;

pub use advisor::{Compatibility, CompatibilityRule, explain, suggest_groupmates};
pub use balancer::{balance_groups, balanced_sizes};
pub use config::EngineConfig;
pub use drag::{DragGuard, DropTarget};
pub use group::{Group, GroupEdit, GroupId, GroupType, SizeStatus};
pub use health::Signals;
pub use persistence::{
    AssignmentDetails, AssignmentRecord, GroupAnnotation, GroupAssignment, GroupRecord, rehydrate,
    rehydrate_with, snapshot,
};
pub use registry::{GroupRegistry, MoveOutcome};
pub use roster::{Roster, SkillLevel, Staff, StaffId, Student, StudentId, WorkingStyle};
pub use session::{AssignmentSession, Command, Confirmation, MoveStudentCommand, Outcome};
pub use templates::{GroupTemplate, TemplateCatalog};
