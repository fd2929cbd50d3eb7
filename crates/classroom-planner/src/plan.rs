//! Plan builder: turns a roster and a handful of choices into an edited
//! assignment session, the same way a teacher would click through it.

use std::fmt::Write as _;

use anyhow::{Result, bail};
use tracing::{debug, info};

use group_kernel::health;
use group_kernel::{
    AssignmentSession, Command, EngineConfig, GroupEdit, Outcome, Roster, TemplateCatalog,
};

/// Choices for one planning run.
#[derive(Debug, Clone, Default)]
pub struct PlanConfig {
    /// Template ids to instantiate, in order.
    pub templates: Vec<String>,
    /// Number of custom groups to add after the templates.
    pub custom_groups: usize,
    /// Distribute everyone evenly once the groups exist.
    pub balance: bool,
    /// Lead each group with a staff member, round robin over the roster staff.
    pub assign_leads: bool,
    pub whole_class: bool,
    pub notes: Option<String>,
}

/// Build a session from `plan`.
///
/// Unknown template ids are an error here rather than being skipped, since
/// they come straight from the command line.
pub fn build_session(
    roster: Roster,
    catalog: TemplateCatalog,
    config: EngineConfig,
    plan: &PlanConfig,
) -> Result<AssignmentSession> {
    for id in &plan.templates {
        if catalog.get(id).is_none() {
            let known: Vec<&str> = catalog.iter().map(|t| t.id.as_str()).collect();
            bail!("unknown template {:?} (known: {})", id, known.join(", "));
        }
    }

    let mut session = AssignmentSession::new(roster, catalog, config);

    for template_id in &plan.templates {
        session.apply(Command::CreateFromTemplate {
            template_id: template_id.clone(),
        });
    }
    for _ in 0..plan.custom_groups {
        session.apply(Command::CreateCustom);
    }

    if plan.assign_leads {
        let staff: Vec<String> = session.roster().staff.iter().map(|s| s.id.clone()).collect();
        if !staff.is_empty() {
            for (i, group_id) in session.registry().group_ids().into_iter().enumerate() {
                let lead = staff[i % staff.len()].clone();
                session.apply(Command::EditGroup {
                    group_id,
                    edit: GroupEdit::lead(Some(lead)),
                });
            }
        }
        session.apply(Command::SetStaff(staff));
    }

    if plan.balance {
        match session.apply(Command::Balance) {
            Outcome::Balanced(sizes) => info!(?sizes, "Groups balanced"),
            other => debug!(?other, "Balance skipped"),
        }
    }

    if let Some(notes) = &plan.notes {
        session.apply(Command::SetNotes(notes.clone()));
    }
    if plan.whole_class {
        session.apply(Command::SetWholeClass(true));
    }

    info!(
        groups = session.registry().len(),
        unassigned = session.unassigned().len(),
        whole_class = session.is_whole_class(),
        "Plan built"
    );
    Ok(session)
}

/// Human-readable summary of the session: groups, pool, signals and a
/// groupmate suggestion for each pooled student.
pub fn render(session: &AssignmentSession) -> String {
    let mut out = String::new();
    let roster = session.roster();
    let name_of = |id: &str| {
        roster
            .student(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    if session.is_whole_class() {
        let _ = writeln!(out, "Whole class ({} students)", roster.students.len());
    }

    for group in session.registry().iter() {
        let lead = group
            .staff_id
            .as_deref()
            .and_then(|id| roster.staff_member(id))
            .map(|s| s.name.as_str())
            .unwrap_or("no lead");
        let _ = writeln!(
            out,
            "{} [{}] {} {}/{}..{} ({})",
            group.name,
            group.group_type,
            group.color,
            group.len(),
            group.min_size,
            group.max_size,
            lead
        );
        for id in &group.student_ids {
            let _ = writeln!(out, "  - {}", name_of(id));
        }
    }

    let pool = session.unassigned();
    let _ = writeln!(out, "\nUnassigned ({}):", pool.len());
    for id in &pool {
        let suggestions: Vec<String> = session
            .suggest_groupmates(id)
            .iter()
            .map(|s| name_of(s))
            .collect();
        if suggestions.is_empty() {
            let _ = writeln!(out, "  - {}", name_of(id));
        } else {
            let _ = writeln!(
                out,
                "  - {} (works well with: {})",
                name_of(id),
                suggestions.join(", ")
            );
        }
    }

    let signals = health::measure(session.registry(), roster);
    let mut keys: Vec<&String> = signals.keys().collect();
    keys.sort();
    let _ = writeln!(out, "\nSignals:");
    for key in keys {
        let _ = writeln!(out, "  {}: {}", key, signals[key]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{RosterGenerator, RosterGeneratorConfig};

    fn roster() -> Roster {
        RosterGenerator::new(RosterGeneratorConfig::medium(), 42).generate()
    }

    #[test]
    fn test_balanced_plan_places_everyone() {
        let plan = PlanConfig {
            templates: vec!["reading-circle".to_string(), "math-centers".to_string()],
            custom_groups: 1,
            balance: true,
            assign_leads: true,
            ..Default::default()
        };
        let session = build_session(
            roster(),
            TemplateCatalog::builtin(),
            EngineConfig::default(),
            &plan,
        )
        .unwrap();

        assert_eq!(session.registry().len(), 3);
        assert!(session.unassigned().is_empty());
        let sizes: Vec<usize> = session.registry().iter().map(|g| g.len()).collect();
        assert_eq!(sizes, vec![4, 4, 4]);
        assert!(session.registry().iter().all(|g| g.staff_id.is_some()));
        assert_eq!(session.staff_ids().len(), 3);
    }

    #[test]
    fn test_unknown_template_is_rejected() {
        let plan = PlanConfig {
            templates: vec!["knitting".to_string()],
            ..Default::default()
        };
        let err = build_session(
            roster(),
            TemplateCatalog::builtin(),
            EngineConfig::default(),
            &plan,
        )
        .unwrap_err();
        assert!(err.to_string().contains("knitting"));
    }

    #[test]
    fn test_unbalanced_plan_leaves_pool() {
        let plan = PlanConfig {
            custom_groups: 2,
            ..Default::default()
        };
        let session = build_session(
            roster(),
            TemplateCatalog::builtin(),
            EngineConfig::default(),
            &plan,
        )
        .unwrap();
        assert_eq!(session.unassigned().len(), 12);

        let text = render(&session);
        assert!(text.contains("Group 1"));
        assert!(text.contains("Group 2"));
        assert!(text.contains("Unassigned (12)"));
        assert!(text.contains("unassigned: 12"));
    }

    #[test]
    fn test_whole_class_plan_saves_without_groups() {
        let plan = PlanConfig {
            templates: vec!["social-skills".to_string()],
            balance: true,
            whole_class: true,
            ..Default::default()
        };
        let session = build_session(
            roster(),
            TemplateCatalog::builtin(),
            EngineConfig::default(),
            &plan,
        )
        .unwrap();
        let record = session.save().unwrap();
        assert!(record.is_whole_class);
        assert!(record.groups.is_empty());
        assert!(render(&session).starts_with("Whole class (12 students)"));
    }
}
