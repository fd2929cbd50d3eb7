//! Membership invariant checks.
//!
//! - No student appears in more than one group (or twice in one group).
//! - Memberships plus the unassigned pool cover the roster exactly.
//! - Every referenced group id exists in the registry.

use std::collections::HashMap;

use anyhow::{Result, bail};

use crate::group::GroupId;
use crate::registry::GroupRegistry;
use crate::roster::Roster;

/// Fail if any student id is held more than once across all groups.
pub fn check_partition(registry: &GroupRegistry) -> Result<()> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for group in registry.iter() {
        for student in &group.student_ids {
            if let Some(other) = seen.insert(student.as_str(), group.id.as_str()) {
                bail!(
                    "student {} is a member of both {} and {}",
                    student,
                    other,
                    group.id
                );
            }
        }
    }
    Ok(())
}

/// Fail if any group holds a student who is not on the roster.
///
/// Together with [`check_partition`] this makes pool ∪ memberships equal to
/// the roster with no duplicates, since the pool is derived from it.
pub fn check_roster_coverage(registry: &GroupRegistry, roster: &Roster) -> Result<()> {
    for group in registry.iter() {
        if let Some(stranger) = group
            .student_ids
            .iter()
            .find(|id| !roster.contains_student(id))
        {
            bail!("group {} holds {} who is not on the roster", group.id, stranger);
        }
    }

    let covered = registry.assigned_count() + registry.unassigned(roster).len();
    if covered != roster.students.len() {
        bail!(
            "memberships and pool cover {} students but the roster has {}",
            covered,
            roster.students.len()
        );
    }
    Ok(())
}

/// Fail if any referenced group id is missing from the registry.
pub fn check_references<'a>(
    registry: &GroupRegistry,
    referenced: impl IntoIterator<Item = &'a GroupId>,
) -> Result<()> {
    for id in referenced {
        if registry.get(id).is_none() {
            bail!("assignment references unknown group {}", id);
        }
    }
    Ok(())
}

/// Run every membership check against a roster.
pub fn verify(registry: &GroupRegistry, roster: &Roster) -> Result<()> {
    check_partition(registry)?;
    check_roster_coverage(registry, roster)
}
