//! Group health signals.
//!
//! Signals are read-only measurements of the registry against the roster,
//! for dashboards and the planner CLI. Nothing here mutates state.

use std::collections::HashMap;

use crate::group::{GroupId, SizeStatus};
use crate::registry::GroupRegistry;
use crate::roster::Roster;

/// Named measurements (e.g. `unassigned`, `size_spread`).
pub type Signals = HashMap<String, f64>;

/// Measure the current registry.
///
/// - `groups`: number of groups
/// - `assigned` / `unassigned`: students in a group / in the pool
/// - `size_spread`: largest minus smallest group
/// - `under_minimum` / `over_capacity`: groups outside their size bounds
/// - `unled_groups`: groups without a lead staff member
pub fn measure(registry: &GroupRegistry, roster: &Roster) -> Signals {
    let sizes: Vec<usize> = registry.iter().map(|g| g.len()).collect();
    let spread = match (sizes.iter().max(), sizes.iter().min()) {
        (Some(max), Some(min)) => max - min,
        _ => 0,
    };
    let count_status = |status: SizeStatus| {
        registry
            .iter()
            .filter(|g| g.size_status() == status)
            .count() as f64
    };

    let mut signals = HashMap::new();
    signals.insert("groups".to_string(), registry.len() as f64);
    signals.insert("assigned".to_string(), registry.assigned_count() as f64);
    signals.insert(
        "unassigned".to_string(),
        registry.unassigned(roster).len() as f64,
    );
    signals.insert("size_spread".to_string(), spread as f64);
    signals.insert(
        "under_minimum".to_string(),
        count_status(SizeStatus::UnderMinimum),
    );
    signals.insert(
        "over_capacity".to_string(),
        count_status(SizeStatus::OverCapacity),
    );
    signals.insert(
        "unled_groups".to_string(),
        registry.iter().filter(|g| g.staff_id.is_none()).count() as f64,
    );
    signals
}

/// Size status for every group, in registry order.
pub fn size_report(registry: &GroupRegistry) -> Vec<(GroupId, SizeStatus)> {
    registry
        .iter()
        .map(|g| (g.id.clone(), g.size_status()))
        .collect()
}
