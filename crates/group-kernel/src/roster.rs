//! Roster types: the students and staff an activity can draw from.
//!
//! The roster is supplied by the student/staff management side of the
//! application and is read-only to the engine.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a student.
pub type StudentId = String;

/// Unique identifier for a staff member.
pub type StaffId = String;

/// Ordered skill scale used for proximity matching.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum SkillLevel {
    Emerging,
    #[default]
    Developing,
    Proficient,
    Advanced,
}

impl SkillLevel {
    /// Position on the scale (emerging = 0 .. advanced = 3).
    pub fn index(self) -> usize {
        match self {
            SkillLevel::Emerging => 0,
            SkillLevel::Developing => 1,
            SkillLevel::Proficient => 2,
            SkillLevel::Advanced => 3,
        }
    }

    /// All levels in ascending order.
    pub const ALL: [SkillLevel; 4] = [
        SkillLevel::Emerging,
        SkillLevel::Developing,
        SkillLevel::Proficient,
        SkillLevel::Advanced,
    ];
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SkillLevel::Emerging => "emerging",
            SkillLevel::Developing => "developing",
            SkillLevel::Proficient => "proficient",
            SkillLevel::Advanced => "advanced",
        };
        f.write_str(name)
    }
}

/// How a student works best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkingStyle {
    Independent,
    Collaborative,
    Guided,
    NeedsSupport,
}

impl WorkingStyle {
    pub const ALL: [WorkingStyle; 4] = [
        WorkingStyle::Independent,
        WorkingStyle::Collaborative,
        WorkingStyle::Guided,
        WorkingStyle::NeedsSupport,
    ];
}

impl fmt::Display for WorkingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkingStyle::Independent => "independent",
            WorkingStyle::Collaborative => "collaborative",
            WorkingStyle::Guided => "guided",
            WorkingStyle::NeedsSupport => "needs-support",
        };
        f.write_str(name)
    }
}

/// A student on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    /// Missing levels are treated as `developing` when matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_level: Option<SkillLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_style: Option<WorkingStyle>,
    #[serde(default)]
    pub preferred_partners: BTreeSet<StudentId>,
    #[serde(default)]
    pub avoid_partners: BTreeSet<StudentId>,
}

impl Student {
    pub fn new(id: impl Into<StudentId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            skill_level: None,
            working_style: None,
            preferred_partners: BTreeSet::new(),
            avoid_partners: BTreeSet::new(),
        }
    }

    pub fn with_skill(mut self, level: SkillLevel) -> Self {
        self.skill_level = Some(level);
        self
    }

    pub fn with_style(mut self, style: WorkingStyle) -> Self {
        self.working_style = Some(style);
        self
    }

    pub fn prefers(mut self, partner: impl Into<StudentId>) -> Self {
        self.preferred_partners.insert(partner.into());
        self
    }

    pub fn avoids(mut self, partner: impl Into<StudentId>) -> Self {
        self.avoid_partners.insert(partner.into());
        self
    }

    /// Skill level with the `developing` default applied.
    pub fn effective_skill(&self) -> SkillLevel {
        self.skill_level.unwrap_or_default()
    }
}

/// A staff member who can lead a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    pub role: String,
}

impl Staff {
    pub fn new(id: impl Into<StaffId>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: role.into(),
        }
    }
}

/// The students and staff available for one activity.
///
/// Lookups for ids that are not on the roster return `None`; callers render
/// nothing for them rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub staff: Vec<Staff>,
}

impl Roster {
    pub fn new(students: Vec<Student>, staff: Vec<Staff>) -> Self {
        Self { students, staff }
    }

    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn staff_member(&self, id: &str) -> Option<&Staff> {
        self.staff.iter().find(|s| s.id == id)
    }

    pub fn contains_student(&self, id: &str) -> bool {
        self.student(id).is_some()
    }

    /// Student ids in roster order.
    pub fn student_ids(&self) -> impl Iterator<Item = &StudentId> {
        self.students.iter().map(|s| &s.id)
    }
}
