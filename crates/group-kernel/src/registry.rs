//! Group registry: the authoritative collection of groups for one activity.
//!
//! The registry owns every group and is the only place memberships change.
//! The unassigned pool is never stored; it is derived from the roster on
//! demand, so releasing a group's members is just removing the group.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::group::{Group, GroupEdit, GroupId, GroupType, create_group_mti};
use crate::roster::{Roster, StudentId};
use crate::templates::GroupTemplate;

/// Result of a transfer request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The student changed place. `None` on either side is the unassigned pool.
    Moved {
        from: Option<GroupId>,
        to: Option<GroupId>,
    },
    /// The student was already where the move asked for.
    Unchanged,
    /// The target group does not exist; nothing was modified.
    UnknownGroup(GroupId),
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

/// Ordered, in-memory collection of groups.
#[derive(Debug, Clone)]
pub struct GroupRegistry {
    groups: Vec<Group>,
    config: EngineConfig,
    /// Seed for deterministic group ids within this editing session.
    session_key: String,
    next_sequence: u64,
}

impl GroupRegistry {
    /// Create an empty registry with a random session key.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_session_key(config, Uuid::new_v4().to_string())
    }

    /// Create an empty registry whose generated ids derive from `session_key`.
    pub fn with_session_key(config: EngineConfig, session_key: impl Into<String>) -> Self {
        Self {
            groups: Vec::new(),
            config,
            session_key: session_key.into(),
            next_sequence: 0,
        }
    }

    /// Build a registry around existing groups (used when rehydrating).
    pub(crate) fn from_groups(config: EngineConfig, groups: Vec<Group>) -> Self {
        let mut registry = Self::new(config);
        registry.next_sequence = groups.len() as u64;
        registry.groups = groups;
        registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn next_group_id(&mut self) -> GroupId {
        loop {
            let id = create_group_mti(&self.session_key, self.next_sequence);
            self.next_sequence += 1;
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Stamp out an empty group from a template.
    ///
    /// Name, color, type and target skills are copied; size bounds come from
    /// the suggested size (`max = suggested + 2`, `min = max(1, suggested - 1)`
    /// with the default sizing config).
    pub fn create_from_template(&mut self, template: &GroupTemplate) -> GroupId {
        let id = self.next_group_id();
        let bounds = self.config.template_sizing.bounds(template.suggested_size);
        let mut group = Group::new(
            id.clone(),
            template.name.clone(),
            template.color.clone(),
            template.group_type,
            bounds,
        );
        group.target_skills = template.target_skills.clone();

        info!(
            group = %id,
            template = %template.id,
            min_size = bounds.0,
            max_size = bounds.1,
            "Group created from template"
        );
        self.groups.push(group);
        id
    }

    /// Create an empty "Group N" with the next palette color.
    pub fn create_custom(&mut self) -> GroupId {
        let id = self.next_group_id();
        let index = self.groups.len();
        let custom = &self.config.custom_group;
        let group = Group::new(
            id.clone(),
            format!("{} {}", custom.name_prefix, index + 1),
            self.config.palette_color(index),
            GroupType::Mixed,
            (custom.min_size, custom.max_size),
        );

        info!(group = %id, name = %group.name, "Custom group created");
        self.groups.push(group);
        id
    }

    /// Merge descriptive fields into a group and bump `updated_at`.
    ///
    /// Returns `None` when the group does not exist.
    pub fn edit(&mut self, group_id: &str, edit: GroupEdit) -> Option<&Group> {
        let group = self.groups.iter_mut().find(|g| g.id == group_id)?;
        edit.apply_to(group);
        group.updated_at = Utc::now();
        debug!(group = %group.id, name = %group.name, "Group edited");
        Some(group)
    }

    /// Remove a group, releasing its members to the unassigned pool.
    ///
    /// Returns the released student ids so cached pool views can refresh,
    /// or `None` when the group does not exist.
    pub fn delete(&mut self, group_id: &str) -> Option<Vec<StudentId>> {
        let index = self.groups.iter().position(|g| g.id == group_id)?;
        let group = self.groups.remove(index);
        info!(
            group = %group.id,
            released = group.student_ids.len(),
            "Group deleted"
        );
        Some(group.student_ids)
    }

    /// Groups of the given type, in registry order.
    pub fn list_by_type(&self, group_type: GroupType) -> Vec<&Group> {
        self.groups
            .iter()
            .filter(|g| g.group_type == group_type)
            .collect()
    }

    /// Move a student to a group, or to the unassigned pool with `None`.
    ///
    /// The student is taken out of every group before being appended to the
    /// target, so a stale caller can never leave a duplicate behind. An
    /// unknown target is rejected before anything is touched.
    pub fn move_student(&mut self, student_id: &str, to_group: Option<&str>) -> MoveOutcome {
        if let Some(target) = to_group {
            if self.get(target).is_none() {
                debug!(student = %student_id, group = %target, "Move rejected: unknown group");
                return MoveOutcome::UnknownGroup(target.to_string());
            }
            // Already a member of the target and nowhere else: keep its position.
            let holders: Vec<&str> = self
                .groups
                .iter()
                .filter(|g| g.contains(student_id))
                .map(|g| g.id.as_str())
                .collect();
            if holders == [target] {
                return MoveOutcome::Unchanged;
            }
        } else if self.group_of(student_id).is_none() {
            return MoveOutcome::Unchanged;
        }

        let mut from = None;
        for group in &mut self.groups {
            if group.remove_member(student_id) && from.is_none() {
                from = Some(group.id.clone());
            }
        }

        if let Some(target) = to_group
            && let Some(group) = self.groups.iter_mut().find(|g| g.id == target)
        {
            group.push_member(student_id.to_string());
        }

        debug!(student = %student_id, ?from, to = ?to_group, "Student moved");
        MoveOutcome::Moved {
            from,
            to: to_group.map(str::to_string),
        }
    }

    /// Roster students in no group, in roster order.
    pub fn unassigned(&self, roster: &Roster) -> Vec<StudentId> {
        roster
            .student_ids()
            .filter(|id| self.group_of(id).is_none())
            .cloned()
            .collect()
    }

    /// The group currently holding a student.
    pub fn group_of(&self, student_id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.contains(student_id))
    }

    pub fn get(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    /// Groups in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub(crate) fn groups_mut(&mut self) -> &mut [Group] {
        &mut self.groups
    }

    pub fn group_ids(&self) -> Vec<GroupId> {
        self.groups.iter().map(|g| g.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total students across all groups.
    pub fn assigned_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    /// Drop every group (whole-class mode has no sub-groups).
    pub fn clear(&mut self) -> Vec<StudentId> {
        let released: Vec<StudentId> = self
            .groups
            .drain(..)
            .flat_map(|g| g.student_ids)
            .collect();
        if !released.is_empty() {
            info!(released = released.len(), "All groups cleared");
        }
        released
    }
}
