//! Compatibility advisor: heuristic groupmate suggestions.
//!
//! For a querying student, each candidate from the unassigned pool is run
//! through a fixed rule order and the first rule that applies decides:
//!
//! 1. candidate is a preferred partner → include
//! 2. candidate is an avoided partner → exclude
//! 3. both work collaboratively → include
//! 4. skill levels at most one step apart → include, otherwise exclude
//!
//! Only the querying student's preferences are consulted. A candidate who
//! avoids the querying student can still be suggested.

use crate::registry::GroupRegistry;
use crate::roster::{Roster, Student, StudentId, WorkingStyle};

/// Maximum skill-scale distance still considered compatible.
pub const MAX_SKILL_DISTANCE: usize = 1;

/// The rule that decided a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatibilityRule {
    PreferredPartner,
    AvoidedPartner,
    BothCollaborative,
    SkillProximity { distance: usize },
}

/// Verdict for one candidate, with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compatibility {
    pub include: bool,
    pub rule: CompatibilityRule,
}

/// Decide whether `candidate` is a suitable groupmate for `student`.
pub fn explain(student: &Student, candidate: &Student) -> Compatibility {
    if student.preferred_partners.contains(&candidate.id) {
        return Compatibility {
            include: true,
            rule: CompatibilityRule::PreferredPartner,
        };
    }
    if student.avoid_partners.contains(&candidate.id) {
        return Compatibility {
            include: false,
            rule: CompatibilityRule::AvoidedPartner,
        };
    }
    if student.working_style == Some(WorkingStyle::Collaborative)
        && candidate.working_style == Some(WorkingStyle::Collaborative)
    {
        return Compatibility {
            include: true,
            rule: CompatibilityRule::BothCollaborative,
        };
    }
    let distance = student
        .effective_skill()
        .index()
        .abs_diff(candidate.effective_skill().index());
    Compatibility {
        include: distance <= MAX_SKILL_DISTANCE,
        rule: CompatibilityRule::SkillProximity { distance },
    }
}

/// Compatible groupmates for `student` among the unassigned pool.
///
/// Excludes the student itself; results keep roster order. Pool ids that
/// are not on the roster are skipped.
pub fn suggest_groupmates(
    student: &Student,
    registry: &GroupRegistry,
    roster: &Roster,
) -> Vec<StudentId> {
    registry
        .unassigned(roster)
        .into_iter()
        .filter(|id| *id != student.id)
        .filter(|id| {
            roster
                .student(id)
                .is_some_and(|candidate| explain(student, candidate).include)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::roster::SkillLevel;

    fn registry() -> GroupRegistry {
        GroupRegistry::with_session_key(EngineConfig::default(), "advisor")
    }

    #[test]
    fn test_preferred_beats_avoid_for_same_student() {
        let x = Student::new("x", "X").prefers("y").avoids("y");
        let y = Student::new("y", "Y").with_skill(SkillLevel::Advanced);
        let verdict = explain(&x, &y);
        assert!(verdict.include);
        assert_eq!(verdict.rule, CompatibilityRule::PreferredPartner);
    }

    #[test]
    fn test_avoid_excludes_even_if_collaborative() {
        let x = Student::new("x", "X")
            .with_style(WorkingStyle::Collaborative)
            .avoids("y");
        let y = Student::new("y", "Y").with_style(WorkingStyle::Collaborative);
        let verdict = explain(&x, &y);
        assert!(!verdict.include);
        assert_eq!(verdict.rule, CompatibilityRule::AvoidedPartner);
    }

    #[test]
    fn test_collaborative_pair_ignores_skill_gap() {
        let x = Student::new("x", "X")
            .with_style(WorkingStyle::Collaborative)
            .with_skill(SkillLevel::Emerging);
        let y = Student::new("y", "Y")
            .with_style(WorkingStyle::Collaborative)
            .with_skill(SkillLevel::Advanced);
        assert_eq!(explain(&x, &y).rule, CompatibilityRule::BothCollaborative);
        assert!(explain(&x, &y).include);
    }

    #[test]
    fn test_skill_proximity_with_default_level() {
        let x = Student::new("x", "X"); // developing by default
        let near = Student::new("p", "P").with_skill(SkillLevel::Proficient);
        let far = Student::new("a", "A").with_skill(SkillLevel::Advanced);
        assert!(explain(&x, &near).include);
        let verdict = explain(&x, &far);
        assert!(!verdict.include);
        assert_eq!(verdict.rule, CompatibilityRule::SkillProximity { distance: 2 });
    }

    #[test]
    fn test_rule_evaluation_is_per_querying_student() {
        let x = Student::new("x", "X")
            .with_skill(SkillLevel::Emerging)
            .prefers("y");
        let y = Student::new("y", "Y").with_skill(SkillLevel::Advanced);
        let z = Student::new("z", "Z").avoids("y");
        let roster = Roster::new(vec![x.clone(), y, z], Vec::new());

        let suggestions = suggest_groupmates(&x, &registry(), &roster);
        assert!(suggestions.contains(&"y".to_string()));
    }

    #[test]
    fn test_suggestions_exclude_self_and_grouped_students() {
        let x = Student::new("x", "X");
        let roster = Roster::new(
            vec![
                x.clone(),
                Student::new("a", "A"),
                Student::new("b", "B"),
                Student::new("c", "C").with_skill(SkillLevel::Advanced),
            ],
            Vec::new(),
        );
        let mut registry = registry();
        let g = registry.create_custom();
        registry.move_student("b", Some(&g));

        let suggestions = suggest_groupmates(&x, &registry, &roster);
        assert_eq!(suggestions, vec!["a".to_string()]);
    }
}
