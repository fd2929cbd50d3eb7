//! Persistence adapter: registry ⇄ Assignment record.
//!
//! The Assignment record is what gets attached to a schedule Activity and
//! read by display renderers. Records use camelCase JSON field names.
//!
//! Older saved data carries each group's membership twice, as `studentIds`
//! and as a legacy `students` array. Internally a [`Group`] has exactly one
//! list; [`GroupRecord`] writes both on the way out and reconciles them on
//! the way in.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::group::{Group, GroupId, GroupType};
use crate::invariants;
use crate::registry::GroupRegistry;
use crate::roster::{Roster, StaffId, StudentId};

fn default_group_type() -> GroupType {
    GroupType::Mixed
}

fn default_min_size() -> usize {
    1
}

fn default_max_size() -> usize {
    6
}

/// Wire shape of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub id: GroupId,
    #[serde(alias = "label")]
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<StaffId>,
    #[serde(default)]
    pub student_ids: Vec<StudentId>,
    /// Legacy mirror of `student_ids`.
    #[serde(default)]
    pub students: Vec<StudentId>,
    #[serde(default = "default_group_type")]
    pub group_type: GroupType,
    #[serde(default = "default_min_size")]
    pub min_size: usize,
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    #[serde(default)]
    pub target_skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl GroupRecord {
    /// Canonical membership: `studentIds`, or the legacy `students` array
    /// when `studentIds` is empty. Duplicates are dropped, first wins.
    pub fn members(&self) -> Vec<StudentId> {
        let source = if self.student_ids.is_empty() {
            &self.students
        } else {
            &self.student_ids
        };
        let mut seen = HashSet::new();
        source
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect()
    }

    pub fn into_group(self) -> Group {
        let student_ids = self.members();
        let now = Utc::now();
        let created_at = self.created_at.unwrap_or(now);
        Group {
            id: self.id,
            name: self.name,
            color: self.color,
            staff_id: self.staff_id,
            student_ids,
            group_type: self.group_type,
            min_size: self.min_size,
            max_size: self.max_size,
            target_skills: self.target_skills,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        }
    }
}

impl From<&Group> for GroupRecord {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.clone(),
            name: group.name.clone(),
            color: group.color.clone(),
            staff_id: group.staff_id.clone(),
            student_ids: group.student_ids.clone(),
            students: group.student_ids.clone(),
            group_type: group.group_type,
            min_size: group.min_size,
            max_size: group.max_size,
            target_skills: group.target_skills.clone(),
            created_at: Some(group.created_at),
            updated_at: Some(group.updated_at),
        }
    }
}

/// Free-text display details attached to a group for one activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAnnotation {
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Per-group display record with a snapshot of the lead staff member.
///
/// Staff ids that are no longer on the roster leave the snapshot fields
/// empty instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAssignment {
    pub group_id: GroupId,
    pub group_name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<StaffId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_role: Option<String>,
    #[serde(default)]
    pub student_ids: Vec<StudentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Assignment record attached to a schedule Activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub is_whole_class: bool,
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
    /// Lighter reference form; resolved with [`rehydrate_with`].
    #[serde(default)]
    pub group_ids: Vec<GroupId>,
    #[serde(default)]
    pub staff_ids: Vec<StaffId>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub group_assignments: Vec<GroupAssignment>,
}

impl AssignmentRecord {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid assignment record JSON")
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing assignment record")
    }

    /// Every group id the record refers to.
    pub fn referenced_group_ids(&self) -> impl Iterator<Item = &GroupId> {
        self.group_ids
            .iter()
            .chain(self.group_assignments.iter().map(|a| &a.group_id))
    }

    /// Location/notes per group, taken from the display records.
    pub fn annotations(&self) -> HashMap<GroupId, GroupAnnotation> {
        self.group_assignments
            .iter()
            .filter(|a| a.location.is_some() || a.notes.is_some())
            .map(|a| {
                (
                    a.group_id.clone(),
                    GroupAnnotation {
                        location: a.location.clone(),
                        notes: a.notes.clone(),
                    },
                )
            })
            .collect()
    }
}

/// Activity-level fields saved alongside the groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentDetails {
    pub is_whole_class: bool,
    pub staff_ids: Vec<StaffId>,
    pub notes: String,
    pub annotations: HashMap<GroupId, GroupAnnotation>,
}

/// Build the display record for one group.
pub fn group_assignment(
    group: &Group,
    roster: &Roster,
    annotation: Option<&GroupAnnotation>,
) -> GroupAssignment {
    let lead = group
        .staff_id
        .as_deref()
        .and_then(|id| roster.staff_member(id));
    GroupAssignment {
        group_id: group.id.clone(),
        group_name: group.name.clone(),
        color: group.color.clone(),
        staff_id: group.staff_id.clone(),
        staff_name: lead.map(|s| s.name.clone()),
        staff_role: lead.map(|s| s.role.clone()),
        student_ids: group.student_ids.clone(),
        location: annotation.and_then(|a| a.location.clone()),
        notes: annotation.and_then(|a| a.notes.clone()),
    }
}

/// Serialize the registry into an Assignment record.
///
/// Membership invariants are checked first; a registry that violates them
/// is not saved. Whole-class records carry no groups.
pub fn snapshot(
    registry: &GroupRegistry,
    roster: &Roster,
    details: &AssignmentDetails,
) -> Result<AssignmentRecord> {
    let mut record = AssignmentRecord {
        is_whole_class: details.is_whole_class,
        staff_ids: details.staff_ids.clone(),
        notes: details.notes.clone(),
        ..Default::default()
    };

    if details.is_whole_class {
        debug!("Snapshot in whole-class mode");
        return Ok(record);
    }

    invariants::verify(registry, roster).context("refusing to save inconsistent groups")?;

    record.groups = registry.iter().map(GroupRecord::from).collect();
    record.group_ids = registry.group_ids();
    record.group_assignments = registry
        .iter()
        .map(|g| group_assignment(g, roster, details.annotations.get(&g.id)))
        .collect();

    invariants::check_references(registry, record.referenced_group_ids())?;

    info!(
        groups = record.groups.len(),
        staff = record.staff_ids.len(),
        "Assignment snapshot taken"
    );
    Ok(record)
}

/// Rebuild a registry from a record that carries full group bodies.
pub fn rehydrate(record: &AssignmentRecord, config: EngineConfig) -> Result<GroupRegistry> {
    rehydrate_with(record, &[], config)
}

/// Rebuild a registry, resolving `groupIds` against `library` when the
/// record does not carry the group bodies itself.
pub fn rehydrate_with(
    record: &AssignmentRecord,
    library: &[GroupRecord],
    config: EngineConfig,
) -> Result<GroupRegistry> {
    if record.is_whole_class {
        return Ok(GroupRegistry::from_groups(config, Vec::new()));
    }

    let mut bodies: Vec<GroupRecord> = record.groups.clone();
    for id in &record.group_ids {
        if bodies.iter().any(|g| &g.id == id) {
            continue;
        }
        let Some(body) = library.iter().find(|g| &g.id == id) else {
            bail!("assignment references group {} with no stored body", id);
        };
        bodies.push(body.clone());
    }

    let mut seen = HashSet::new();
    for body in &bodies {
        if !seen.insert(body.id.as_str()) {
            bail!("assignment contains group {} twice", body.id);
        }
    }

    let groups: Vec<Group> = bodies.into_iter().map(GroupRecord::into_group).collect();
    let registry = GroupRegistry::from_groups(config, groups);

    invariants::check_partition(&registry).context("saved groups overlap")?;
    invariants::check_references(&registry, record.referenced_group_ids())?;

    info!(groups = registry.len(), "Assignment rehydrated");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupEdit;
    use crate::roster::{Staff, Student};

    fn roster() -> Roster {
        Roster::new(
            ["a", "b", "c", "d"]
                .iter()
                .map(|id| Student::new(*id, id.to_uppercase()))
                .collect(),
            vec![Staff::new("t1", "Ms. Rivera", "teacher")],
        )
    }

    fn populated_registry() -> (GroupRegistry, GroupId, GroupId) {
        let mut registry = GroupRegistry::with_session_key(EngineConfig::default(), "persist");
        let g1 = registry.create_custom();
        let g2 = registry.create_custom();
        registry.edit(&g1, GroupEdit::lead(Some("t1".to_string())));
        registry.edit(&g2, GroupEdit::rename("Quiet Table"));
        registry.move_student("a", Some(&g1));
        registry.move_student("b", Some(&g1));
        registry.move_student("c", Some(&g2));
        (registry, g1, g2)
    }

    fn details() -> AssignmentDetails {
        AssignmentDetails {
            staff_ids: vec!["t1".to_string()],
            notes: "Bring picture cards".to_string(),
            ..Default::default()
        }
    }

    fn member_set(group: &Group) -> HashSet<String> {
        group.student_ids.iter().cloned().collect()
    }

    #[test]
    fn test_round_trip() {
        let (registry, _, _) = populated_registry();
        let record = snapshot(&registry, &roster(), &details()).unwrap();
        let json = record.to_json_pretty().unwrap();
        let restored =
            rehydrate(&AssignmentRecord::from_json_str(&json).unwrap(), EngineConfig::default())
                .unwrap();

        assert_eq!(restored.len(), registry.len());
        for (original, back) in registry.iter().zip(restored.iter()) {
            assert_eq!(back.id, original.id);
            assert_eq!(back.name, original.name);
            assert_eq!(back.color, original.color);
            assert_eq!(back.staff_id, original.staff_id);
            assert_eq!(member_set(back), member_set(original));
        }
    }

    #[test]
    fn test_wire_shape_mirrors_legacy_students() {
        let (registry, g1, _) = populated_registry();
        let record = snapshot(&registry, &roster(), &details()).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["isWholeClass"], false);
        assert_eq!(json["staffIds"][0], "t1");
        assert_eq!(json["groupIds"][0], g1.as_str());
        let group = &json["groups"][0];
        assert_eq!(group["studentIds"], group["students"]);
        assert_eq!(group["staffId"], "t1");
    }

    #[test]
    fn test_legacy_students_field_is_read() {
        let json = r##"{
            "isWholeClass": false,
            "groups": [
                {"id": "g-old", "label": "Blue Table", "color": "#00F", "students": ["a", "b", "a"]}
            ]
        }"##;
        let record = AssignmentRecord::from_json_str(json).unwrap();
        let registry = rehydrate(&record, EngineConfig::default()).unwrap();
        let group = registry.get("g-old").unwrap();
        assert_eq!(group.name, "Blue Table");
        assert_eq!(group.student_ids, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(group.group_type, GroupType::Mixed);
        assert_eq!(group.created_at, group.updated_at);
    }

    #[test]
    fn test_whole_class_has_no_groups() {
        let (registry, _, _) = populated_registry();
        let record = snapshot(
            &registry,
            &roster(),
            &AssignmentDetails {
                is_whole_class: true,
                ..details()
            },
        )
        .unwrap();
        assert!(record.is_whole_class);
        assert!(record.groups.is_empty());
        assert!(record.group_assignments.is_empty());
        assert_eq!(record.notes, "Bring picture cards");

        let restored = rehydrate(&record, EngineConfig::default()).unwrap();
        assert!(restored.is_empty());
    }

    #[test]
    fn test_group_assignments_snapshot_lead_and_annotations() {
        let (registry, g1, g2) = populated_registry();
        let mut details = details();
        details.annotations.insert(
            g1.clone(),
            GroupAnnotation {
                location: Some("Sensory room".to_string()),
                notes: None,
            },
        );
        let record = snapshot(&registry, &roster(), &details).unwrap();

        let first = &record.group_assignments[0];
        assert_eq!(first.group_id, g1);
        assert_eq!(first.staff_name.as_deref(), Some("Ms. Rivera"));
        assert_eq!(first.staff_role.as_deref(), Some("teacher"));
        assert_eq!(first.location.as_deref(), Some("Sensory room"));

        let second = &record.group_assignments[1];
        assert_eq!(second.group_id, g2);
        assert!(second.staff_name.is_none());

        assert_eq!(record.annotations().len(), 1);
    }

    #[test]
    fn test_missing_staff_degrades_gracefully() {
        let mut registry = GroupRegistry::with_session_key(EngineConfig::default(), "persist");
        let g = registry.create_custom();
        registry.edit(&g, GroupEdit::lead(Some("retired".to_string())));
        let record = snapshot(&registry, &roster(), &details()).unwrap();
        let display = &record.group_assignments[0];
        assert_eq!(display.staff_id.as_deref(), Some("retired"));
        assert!(display.staff_name.is_none());
    }

    #[test]
    fn test_snapshot_refuses_overlapping_groups() {
        let (mut registry, _, _) = populated_registry();
        registry.groups_mut()[1].push_member("a".to_string());
        assert!(snapshot(&registry, &roster(), &details()).is_err());
    }

    #[test]
    fn test_group_ids_resolved_from_library() {
        let (registry, g1, g2) = populated_registry();
        let library: Vec<GroupRecord> = registry.iter().map(GroupRecord::from).collect();
        let record = AssignmentRecord {
            group_ids: vec![g2.clone(), g1.clone()],
            ..Default::default()
        };

        let restored = rehydrate_with(&record, &library, EngineConfig::default()).unwrap();
        assert_eq!(restored.group_ids(), vec![g2, g1]);

        assert!(rehydrate(&record, EngineConfig::default()).is_err());
    }

    #[test]
    fn test_dangling_group_assignment_rejected() {
        let (registry, _, _) = populated_registry();
        let mut record = snapshot(&registry, &roster(), &details()).unwrap();
        record.group_assignments[0].group_id = "group_gone".to_string();
        let err = rehydrate(&record, EngineConfig::default()).unwrap_err();
        assert!(err.to_string().contains("group_gone"));
    }

    #[test]
    fn test_rehydrated_registry_generates_fresh_ids() {
        let (registry, _, _) = populated_registry();
        let record = snapshot(&registry, &roster(), &details()).unwrap();
        let mut restored = rehydrate(&record, EngineConfig::default()).unwrap();
        let new_id = restored.create_custom();
        assert_eq!(restored.len(), 3);
        assert_eq!(restored.get(&new_id).unwrap().name, "Group 3");
    }
}
