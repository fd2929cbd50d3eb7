//! Group types: the units a roster is partitioned into.

use std::fmt;

use chrono::{DateTime, Utc};
use mti::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roster::{StaffId, StudentId};

/// Unique identifier for a group (`group_01h455vb4pex5vsknk084sn02q`).
pub type GroupId = String;

/// Namespace UUID for deterministic group IDs (MTI v5).
const GROUP_NAMESPACE: Uuid = Uuid::from_bytes([
    0x3c, 0x51, 0x0e, 0x97, 0x6d, 0x2a, 0x4b, 0x18, 0x9f, 0x40, 0x7a, 0xe2, 0x13, 0xc8, 0x55, 0x61,
]);

/// Create a deterministic MTI-based group ID.
///
/// The same `(session_key, sequence)` pair always produces the same id, so a
/// replayed editing session yields identical registries.
pub(crate) fn create_group_mti(session_key: &str, sequence: u64) -> GroupId {
    let name = format!("{}:group:{}", session_key, sequence);
    let v5_uuid = Uuid::new_v5(&GROUP_NAMESPACE, name.as_bytes());
    let prefix = TypeIdPrefix::try_from("group").expect("group is a valid prefix");
    let suffix = TypeIdSuffix::from(v5_uuid);
    MagicTypeId::new(prefix, suffix).to_string()
}

/// Kind of support a group provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    Academic,
    Therapy,
    Behavior,
    Social,
    Mixed,
}

impl GroupType {
    pub const ALL: [GroupType; 5] = [
        GroupType::Academic,
        GroupType::Therapy,
        GroupType::Behavior,
        GroupType::Social,
        GroupType::Mixed,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "academic" => Some(GroupType::Academic),
            "therapy" => Some(GroupType::Therapy),
            "behavior" | "behaviour" => Some(GroupType::Behavior),
            "social" => Some(GroupType::Social),
            "mixed" => Some(GroupType::Mixed),
            _ => None,
        }
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroupType::Academic => "academic",
            GroupType::Therapy => "therapy",
            GroupType::Behavior => "behavior",
            GroupType::Social => "social",
            GroupType::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

/// A student group within one activity's assignment.
///
/// `student_ids` is ordered but has set semantics: the registry never lets
/// an id appear twice, here or in any other group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub color: String,
    /// Lead staff member, if one is assigned.
    pub staff_id: Option<StaffId>,
    pub student_ids: Vec<StudentId>,
    pub group_type: GroupType,
    pub min_size: usize,
    pub max_size: usize,
    pub target_skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// Create an empty group.
    pub fn new(
        id: GroupId,
        name: impl Into<String>,
        color: impl Into<String>,
        group_type: GroupType,
        (min_size, max_size): (usize, usize),
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            color: color.into(),
            staff_id: None,
            student_ids: Vec::new(),
            group_type,
            min_size,
            max_size,
            target_skills: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn contains(&self, student_id: &str) -> bool {
        self.student_ids.iter().any(|s| s == student_id)
    }

    pub fn len(&self) -> usize {
        self.student_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.student_ids.is_empty()
    }

    /// Where the current size sits relative to the group's bounds.
    pub fn size_status(&self) -> SizeStatus {
        let len = self.len();
        if len < self.min_size {
            SizeStatus::UnderMinimum
        } else if len > self.max_size {
            SizeStatus::OverCapacity
        } else {
            SizeStatus::WithinRange
        }
    }

    /// Remove a member; returns whether it was present.
    pub(crate) fn remove_member(&mut self, student_id: &str) -> bool {
        let before = self.student_ids.len();
        self.student_ids.retain(|s| s != student_id);
        self.student_ids.len() != before
    }

    /// Append a member unless already present.
    pub(crate) fn push_member(&mut self, student_id: StudentId) {
        if !self.contains(&student_id) {
            self.student_ids.push(student_id);
        }
    }
}

/// Size of a group against its min/max bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeStatus {
    UnderMinimum,
    WithinRange,
    OverCapacity,
}

/// A partial update to a group's descriptive fields.
///
/// Absent fields are left untouched. `staff_id: Some(None)` clears the lead.
/// Membership is not editable here; use a move instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupEdit {
    pub name: Option<String>,
    pub color: Option<String>,
    pub staff_id: Option<Option<StaffId>>,
    pub group_type: Option<GroupType>,
    pub min_size: Option<usize>,
    pub max_size: Option<usize>,
    pub target_skills: Option<Vec<String>>,
}

impl GroupEdit {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn recolor(color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            ..Default::default()
        }
    }

    pub fn lead(staff_id: Option<StaffId>) -> Self {
        Self {
            staff_id: Some(staff_id),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge present fields into `group`.
    pub(crate) fn apply_to(self, group: &mut Group) {
        if let Some(name) = self.name {
            group.name = name;
        }
        if let Some(color) = self.color {
            group.color = color;
        }
        if let Some(staff_id) = self.staff_id {
            group.staff_id = staff_id;
        }
        if let Some(group_type) = self.group_type {
            group.group_type = group_type;
        }
        if let Some(min_size) = self.min_size {
            group.min_size = min_size;
        }
        if let Some(max_size) = self.max_size {
            group.max_size = max_size;
        }
        if let Some(target_skills) = self.target_skills {
            group.target_skills = target_skills;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_group() -> Group {
        Group::new(
            create_group_mti("test", 0),
            "Readers",
            "#4F86F7",
            GroupType::Academic,
            (2, 4),
        )
    }

    #[test]
    fn test_group_ids_deterministic() {
        assert_eq!(create_group_mti("a", 1), create_group_mti("a", 1));
        assert_ne!(create_group_mti("a", 1), create_group_mti("a", 2));
        assert_ne!(create_group_mti("a", 1), create_group_mti("b", 1));
        assert!(create_group_mti("a", 1).starts_with("group_"));
    }

    #[test]
    fn test_push_member_keeps_set_semantics() {
        let mut group = sample_group();
        group.push_member("s1".to_string());
        group.push_member("s1".to_string());
        assert_eq!(group.student_ids, vec!["s1".to_string()]);
        assert!(group.remove_member("s1"));
        assert!(!group.remove_member("s1"));
    }

    #[test]
    fn test_size_status() {
        let mut group = sample_group();
        assert_eq!(group.size_status(), SizeStatus::UnderMinimum);
        for s in ["a", "b", "c"] {
            group.push_member(s.to_string());
        }
        assert_eq!(group.size_status(), SizeStatus::WithinRange);
        for s in ["d", "e"] {
            group.push_member(s.to_string());
        }
        assert_eq!(group.size_status(), SizeStatus::OverCapacity);
    }

    #[test]
    fn test_edit_merges_only_present_fields() {
        let mut group = sample_group();
        group.staff_id = Some("t1".to_string());

        GroupEdit::rename("Phonics").apply_to(&mut group);
        assert_eq!(group.name, "Phonics");
        assert_eq!(group.color, "#4F86F7");
        assert_eq!(group.staff_id.as_deref(), Some("t1"));

        GroupEdit::lead(None).apply_to(&mut group);
        assert_eq!(group.staff_id, None);
        assert_eq!(group.name, "Phonics");
    }

    #[test]
    fn test_group_type_parse() {
        assert_eq!(GroupType::parse("Therapy"), Some(GroupType::Therapy));
        assert_eq!(GroupType::parse("behaviour"), Some(GroupType::Behavior));
        assert_eq!(GroupType::parse("recess"), None);
        for t in GroupType::ALL {
            assert_eq!(GroupType::parse(&t.to_string()), Some(t));
        }
    }
}
