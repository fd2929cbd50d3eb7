//! Assignment session: one activity's editing state and its command reducer.
//!
//! Every mutation the UI can request is a [`Command`] value applied through
//! [`AssignmentSession::apply`]. The session owns the registry outright;
//! display code only ever gets shared borrows.

use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::advisor;
use crate::balancer;
use crate::config::EngineConfig;
use crate::group::{GroupEdit, GroupId};
use crate::persistence::{self, AssignmentDetails, AssignmentRecord, GroupAnnotation};
use crate::registry::{GroupRegistry, MoveOutcome};
use crate::roster::{Roster, StaffId, StudentId};
use crate::templates::TemplateCatalog;

/// Move one student to a group, or back to the pool with `to_group: None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveStudentCommand {
    pub student_id: StudentId,
    pub to_group: Option<GroupId>,
}

impl MoveStudentCommand {
    pub fn to_group(student_id: impl Into<StudentId>, group_id: impl Into<GroupId>) -> Self {
        Self {
            student_id: student_id.into(),
            to_group: Some(group_id.into()),
        }
    }

    pub fn to_pool(student_id: impl Into<StudentId>) -> Self {
        Self {
            student_id: student_id.into(),
            to_group: None,
        }
    }
}

/// Whether the user has confirmed a destructive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Unconfirmed,
}

/// A requested change to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MoveStudent(MoveStudentCommand),
    CreateFromTemplate { template_id: String },
    CreateCustom,
    EditGroup { group_id: GroupId, edit: GroupEdit },
    DeleteGroup {
        group_id: GroupId,
        confirmation: Confirmation,
    },
    Balance,
    SetWholeClass(bool),
    SetStaff(Vec<StaffId>),
    SetNotes(String),
    Annotate {
        group_id: GroupId,
        annotation: GroupAnnotation,
    },
}

/// What a command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(GroupId),
    Edited(GroupId),
    Deleted {
        group_id: GroupId,
        released: Vec<StudentId>,
    },
    Moved(MoveOutcome),
    Balanced(Vec<usize>),
    Updated,
    /// Nothing changed; the reason is for display and logs.
    Ignored(String),
}

impl Outcome {
    fn ignored(reason: impl Into<String>) -> Self {
        Outcome::Ignored(reason.into())
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Outcome::Ignored(_))
    }
}

/// Editing state for one activity's assignment.
#[derive(Debug, Clone)]
pub struct AssignmentSession {
    pub(crate) roster: Roster,
    pub(crate) registry: GroupRegistry,
    catalog: TemplateCatalog,
    details: AssignmentDetails,
    /// Student currently being dragged, cleared when the drag ends.
    pub(crate) dragged: Option<StudentId>,
}

impl AssignmentSession {
    /// Start a fresh session with no groups.
    pub fn new(roster: Roster, catalog: TemplateCatalog, config: EngineConfig) -> Self {
        Self::with_registry(roster, catalog, GroupRegistry::new(config))
    }

    /// Start a session around an existing registry.
    pub fn with_registry(roster: Roster, catalog: TemplateCatalog, registry: GroupRegistry) -> Self {
        Self {
            roster,
            registry,
            catalog,
            details: AssignmentDetails::default(),
            dragged: None,
        }
    }

    /// Restore a session from a saved Assignment record.
    ///
    /// Members who have since left the roster are dropped from their groups
    /// so the restored session satisfies the roster invariants.
    pub fn load(
        roster: Roster,
        catalog: TemplateCatalog,
        record: &AssignmentRecord,
        config: EngineConfig,
    ) -> Result<Self> {
        let mut registry =
            persistence::rehydrate(record, config).context("restoring assignment groups")?;

        let strangers: Vec<StudentId> = registry
            .iter()
            .flat_map(|g| g.student_ids.iter())
            .filter(|id| !roster.contains_student(id))
            .cloned()
            .collect();
        for id in &strangers {
            warn!(student = %id, "Dropping saved member no longer on the roster");
            registry.move_student(id, None);
        }

        let mut session = Self::with_registry(roster, catalog, registry);
        session.details = AssignmentDetails {
            is_whole_class: record.is_whole_class,
            staff_ids: record.staff_ids.clone(),
            notes: record.notes.clone(),
            annotations: record.annotations(),
        };
        Ok(session)
    }

    /// Snapshot the session into an Assignment record.
    pub fn save(&self) -> Result<AssignmentRecord> {
        persistence::snapshot(&self.registry, &self.roster, &self.details)
    }

    /// Apply one command. Commands run to completion; nothing is left half
    /// applied.
    pub fn apply(&mut self, command: Command) -> Outcome {
        debug!(?command, "Applying command");
        match command {
            Command::MoveStudent(cmd) => self.move_student(cmd),
            Command::CreateFromTemplate { template_id } => {
                match self.catalog.instantiate(&template_id, &mut self.registry) {
                    Some(id) => Outcome::Created(id),
                    None => Outcome::ignored(format!("unknown template {}", template_id)),
                }
            }
            Command::CreateCustom => Outcome::Created(self.registry.create_custom()),
            Command::EditGroup { group_id, edit } => {
                if edit.is_empty() {
                    return Outcome::ignored("empty edit");
                }
                match self.registry.edit(&group_id, edit) {
                    Some(_) => Outcome::Edited(group_id),
                    None => Outcome::ignored(format!("unknown group {}", group_id)),
                }
            }
            Command::DeleteGroup {
                group_id,
                confirmation,
            } => {
                if confirmation != Confirmation::Confirmed {
                    return Outcome::ignored("deletion not confirmed");
                }
                match self.registry.delete(&group_id) {
                    Some(released) => {
                        self.details.annotations.remove(&group_id);
                        Outcome::Deleted { group_id, released }
                    }
                    None => Outcome::ignored(format!("unknown group {}", group_id)),
                }
            }
            Command::Balance => {
                if self.registry.is_empty() {
                    return Outcome::ignored("no groups to balance into");
                }
                Outcome::Balanced(balancer::balance_groups(&mut self.registry, &self.roster))
            }
            Command::SetWholeClass(whole_class) => {
                if self.details.is_whole_class == whole_class {
                    return Outcome::ignored("mode unchanged");
                }
                info!(whole_class, "Assignment mode changed");
                self.details.is_whole_class = whole_class;
                Outcome::Updated
            }
            Command::SetStaff(staff_ids) => {
                self.details.staff_ids = staff_ids;
                Outcome::Updated
            }
            Command::SetNotes(notes) => {
                self.details.notes = notes;
                Outcome::Updated
            }
            Command::Annotate {
                group_id,
                annotation,
            } => {
                if self.registry.get(&group_id).is_none() {
                    return Outcome::ignored(format!("unknown group {}", group_id));
                }
                self.details.annotations.insert(group_id, annotation);
                Outcome::Updated
            }
        }
    }

    fn move_student(&mut self, cmd: MoveStudentCommand) -> Outcome {
        if !self.roster.contains_student(&cmd.student_id) {
            debug!(student = %cmd.student_id, "Move ignored: not on roster");
            return Outcome::ignored(format!("student {} is not on the roster", cmd.student_id));
        }
        match self
            .registry
            .move_student(&cmd.student_id, cmd.to_group.as_deref())
        {
            MoveOutcome::UnknownGroup(id) => Outcome::ignored(format!("unknown group {}", id)),
            outcome => Outcome::Moved(outcome),
        }
    }

    /// Compatible groupmates for a student from the pool.
    ///
    /// Empty for a student who is not on the roster.
    pub fn suggest_groupmates(&self, student_id: &str) -> Vec<StudentId> {
        self.roster
            .student(student_id)
            .map(|student| advisor::suggest_groupmates(student, &self.registry, &self.roster))
            .unwrap_or_default()
    }

    pub fn unassigned(&self) -> Vec<StudentId> {
        self.registry.unassigned(&self.roster)
    }

    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn is_whole_class(&self) -> bool {
        self.details.is_whole_class
    }

    pub fn staff_ids(&self) -> &[StaffId] {
        &self.details.staff_ids
    }

    pub fn notes(&self) -> &str {
        &self.details.notes
    }

    pub fn annotations(&self) -> &HashMap<GroupId, GroupAnnotation> {
        &self.details.annotations
    }

    /// The student being dragged, if a drag is in progress.
    pub fn dragged_student(&self) -> Option<&str> {
        self.dragged.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{Staff, Student};

    fn roster() -> Roster {
        Roster::new(
            ["a", "b", "c", "d", "e", "f", "g"]
                .iter()
                .map(|id| Student::new(*id, id.to_uppercase()))
                .collect(),
            vec![Staff::new("t1", "Ms. Rivera", "teacher")],
        )
    }

    fn session() -> AssignmentSession {
        AssignmentSession::with_registry(
            roster(),
            TemplateCatalog::builtin(),
            GroupRegistry::with_session_key(EngineConfig::default(), "session"),
        )
    }

    fn created(outcome: Outcome) -> GroupId {
        match outcome {
            Outcome::Created(id) => id,
            other => panic!("expected Created, got {:?}", other),
        }
    }

    #[test]
    fn test_move_command() {
        let mut session = session();
        let g = created(session.apply(Command::CreateCustom));

        let outcome = session.apply(Command::MoveStudent(MoveStudentCommand::to_group("a", &g)));
        assert!(matches!(outcome, Outcome::Moved(MoveOutcome::Moved { .. })));
        assert_eq!(session.unassigned().len(), 6);

        let outcome = session.apply(Command::MoveStudent(MoveStudentCommand::to_pool("a")));
        assert!(matches!(outcome, Outcome::Moved(MoveOutcome::Moved { to: None, .. })));
        assert_eq!(session.unassigned().len(), 7);
    }

    #[test]
    fn test_move_of_unknown_student_ignored() {
        let mut session = session();
        let g = created(session.apply(Command::CreateCustom));
        let outcome = session.apply(Command::MoveStudent(MoveStudentCommand::to_group("zz", &g)));
        assert!(outcome.is_ignored());
        assert!(session.registry().get(&g).unwrap().is_empty());
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut session = session();
        let g = created(session.apply(Command::CreateCustom));
        session.apply(Command::MoveStudent(MoveStudentCommand::to_group("a", &g)));
        session.apply(Command::MoveStudent(MoveStudentCommand::to_group("b", &g)));

        let outcome = session.apply(Command::DeleteGroup {
            group_id: g.clone(),
            confirmation: Confirmation::Unconfirmed,
        });
        assert!(outcome.is_ignored());
        assert!(session.registry().get(&g).is_some());

        let outcome = session.apply(Command::DeleteGroup {
            group_id: g.clone(),
            confirmation: Confirmation::Confirmed,
        });
        assert_eq!(
            outcome,
            Outcome::Deleted {
                group_id: g.clone(),
                released: vec!["a".to_string(), "b".to_string()]
            }
        );
        let pool = session.unassigned();
        assert!(pool.contains(&"a".to_string()) && pool.contains(&"b".to_string()));
    }

    #[test]
    fn test_balance_command() {
        let mut session = session();
        for _ in 0..3 {
            session.apply(Command::CreateCustom);
        }
        assert_eq!(session.apply(Command::Balance), Outcome::Balanced(vec![3, 2, 2]));
    }

    #[test]
    fn test_balance_without_groups_ignored() {
        let mut session = session();
        assert!(session.apply(Command::Balance).is_ignored());
    }

    #[test]
    fn test_template_command() {
        let mut session = session();
        let g = created(session.apply(Command::CreateFromTemplate {
            template_id: "social-skills".to_string(),
        }));
        assert_eq!(session.registry().get(&g).unwrap().name, "Social Skills");
        assert!(
            session
                .apply(Command::CreateFromTemplate {
                    template_id: "nope".to_string()
                })
                .is_ignored()
        );
    }

    #[test]
    fn test_edit_command() {
        let mut session = session();
        let g = created(session.apply(Command::CreateCustom));
        let outcome = session.apply(Command::EditGroup {
            group_id: g.clone(),
            edit: GroupEdit::lead(Some("t1".to_string())),
        });
        assert_eq!(outcome, Outcome::Edited(g.clone()));
        assert_eq!(
            session.registry().get(&g).unwrap().staff_id.as_deref(),
            Some("t1")
        );
        assert!(
            session
                .apply(Command::EditGroup {
                    group_id: g,
                    edit: GroupEdit::default(),
                })
                .is_ignored()
        );
    }

    #[test]
    fn test_suggestions_for_unknown_student_are_empty() {
        let session = session();
        assert!(session.suggest_groupmates("zz").is_empty());
        assert_eq!(session.suggest_groupmates("a").len(), 6);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let mut session = session();
        let g = created(session.apply(Command::CreateCustom));
        session.apply(Command::MoveStudent(MoveStudentCommand::to_group("c", &g)));
        session.apply(Command::SetStaff(vec!["t1".to_string()]));
        session.apply(Command::SetNotes("Outdoor if dry".to_string()));
        session.apply(Command::Annotate {
            group_id: g.clone(),
            annotation: GroupAnnotation {
                location: Some("Garden".to_string()),
                notes: None,
            },
        });

        let record = session.save().unwrap();
        let loaded = AssignmentSession::load(
            roster(),
            TemplateCatalog::builtin(),
            &record,
            EngineConfig::default(),
        )
        .unwrap();

        assert_eq!(loaded.registry().get(&g).unwrap().student_ids, vec!["c".to_string()]);
        assert_eq!(loaded.staff_ids(), ["t1".to_string()]);
        assert_eq!(loaded.notes(), "Outdoor if dry");
        assert_eq!(
            loaded.annotations()[&g].location.as_deref(),
            Some("Garden")
        );
        assert!(!loaded.is_whole_class());
    }

    #[test]
    fn test_load_drops_members_who_left_the_roster() {
        let mut session = session();
        let g = created(session.apply(Command::CreateCustom));
        session.apply(Command::MoveStudent(MoveStudentCommand::to_group("a", &g)));
        session.apply(Command::MoveStudent(MoveStudentCommand::to_group("g", &g)));
        let record = session.save().unwrap();

        let mut smaller = roster();
        smaller.students.retain(|s| s.id != "g");
        let loaded = AssignmentSession::load(
            smaller,
            TemplateCatalog::builtin(),
            &record,
            EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(loaded.registry().get(&g).unwrap().student_ids, vec!["a".to_string()]);
        crate::invariants::verify(loaded.registry(), loaded.roster()).unwrap();
    }

    #[test]
    fn test_whole_class_toggle_keeps_groups_in_session() {
        let mut session = session();
        session.apply(Command::CreateCustom);
        assert_eq!(session.apply(Command::SetWholeClass(true)), Outcome::Updated);
        assert!(session.apply(Command::SetWholeClass(true)).is_ignored());

        let record = session.save().unwrap();
        assert!(record.is_whole_class);
        assert!(record.groups.is_empty());
        assert_eq!(session.registry().len(), 1);
    }
}
