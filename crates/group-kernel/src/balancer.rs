//! Balancer: even redistribution of every student across the current groups.

use tracing::info;

use crate::registry::GroupRegistry;
use crate::roster::{Roster, StudentId};

/// Target sizes for `total` students over `groups` groups.
///
/// Every group gets `total / groups`; the first `total % groups` get one
/// more. Empty when there are no groups.
pub fn balanced_sizes(total: usize, groups: usize) -> Vec<usize> {
    if groups == 0 {
        return Vec::new();
    }
    let base = total / groups;
    let extra = total % groups;
    (0..groups)
        .map(|i| if i < extra { base + 1 } else { base })
        .collect()
}

/// Redistribute all students evenly across the registry.
///
/// Students are collected group by group in registry order, followed by the
/// unassigned pool in roster order, then dealt out in contiguous runs: group
/// 0 is filled to its target size first, then group 1, and so on. With no
/// groups this is a no-op.
///
/// Returns the resulting group sizes in registry order.
pub fn balance_groups(registry: &mut GroupRegistry, roster: &Roster) -> Vec<usize> {
    if registry.is_empty() {
        return Vec::new();
    }

    let pool = registry.unassigned(roster);
    let mut students: Vec<StudentId> = Vec::with_capacity(registry.assigned_count() + pool.len());
    for group in registry.groups_mut() {
        students.append(&mut group.student_ids);
    }
    students.extend(pool);

    let sizes = balanced_sizes(students.len(), registry.len());
    let mut remaining = students.into_iter();
    for (group, &size) in registry.groups_mut().iter_mut().zip(&sizes) {
        group.student_ids = remaining.by_ref().take(size).collect();
    }

    info!(groups = sizes.len(), students = sizes.iter().sum::<usize>(), ?sizes, "Groups balanced");
    sizes
}
