//! Roster generator.
//!
//! Generates random but plausible classroom rosters for demos and tests.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use group_kernel::roster::{Roster, SkillLevel, Staff, Student, WorkingStyle};

const FIRST_NAMES: [&str; 24] = [
    "Ava", "Ben", "Cora", "Dev", "Eli", "Fatima", "Gabe", "Hana", "Isaac", "Jade", "Kai", "Lena",
    "Milo", "Nia", "Owen", "Priya", "Quinn", "Rosa", "Sami", "Theo", "Uma", "Vic", "Wren", "Yusuf",
];

const STAFF: [(&str, &str); 5] = [
    ("Ms. Rivera", "teacher"),
    ("Mr. Okafor", "paraprofessional"),
    ("Ms. Chen", "speech-language pathologist"),
    ("Mr. Haddad", "occupational therapist"),
    ("Ms. Lindqvist", "behavior specialist"),
];

/// Configuration for generating rosters.
#[derive(Debug, Clone)]
pub struct RosterGeneratorConfig {
    /// Number of students.
    pub num_students: usize,
    /// Number of staff members (capped at the built-in staff list).
    pub num_staff: usize,
    /// Fraction of students with no recorded skill level.
    pub missing_skill_fraction: f64,
    /// Fraction of students with no recorded working style.
    pub missing_style_fraction: f64,
    /// Chance that a given student lists a preferred partner.
    pub preference_probability: f64,
    /// Chance that a given student lists a partner to avoid.
    pub avoid_probability: f64,
}

impl Default for RosterGeneratorConfig {
    fn default() -> Self {
        Self::medium()
    }
}

impl RosterGeneratorConfig {
    /// Small self-contained classroom.
    pub fn small() -> Self {
        Self {
            num_students: 6,
            num_staff: 2,
            missing_skill_fraction: 0.1,
            missing_style_fraction: 0.1,
            preference_probability: 0.3,
            avoid_probability: 0.2,
        }
    }

    pub fn medium() -> Self {
        Self {
            num_students: 12,
            num_staff: 3,
            missing_skill_fraction: 0.15,
            missing_style_fraction: 0.15,
            preference_probability: 0.4,
            avoid_probability: 0.25,
        }
    }

    /// Large resource room with more missing metadata.
    pub fn large() -> Self {
        Self {
            num_students: 20,
            num_staff: 4,
            missing_skill_fraction: 0.25,
            missing_style_fraction: 0.2,
            preference_probability: 0.5,
            avoid_probability: 0.3,
        }
    }

    pub fn parse(size: &str) -> Option<Self> {
        match size.to_lowercase().as_str() {
            "small" => Some(Self::small()),
            "medium" => Some(Self::medium()),
            "large" => Some(Self::large()),
            _ => None,
        }
    }
}

/// Generator for rosters.
pub struct RosterGenerator {
    config: RosterGeneratorConfig,
    rng: ChaCha8Rng,
}

impl RosterGenerator {
    /// Create a new generator with the given config and seed.
    pub fn new(config: RosterGeneratorConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate a roster.
    pub fn generate(&mut self) -> Roster {
        let mut students = self.generate_students();
        self.link_partners(&mut students);
        let staff = self.generate_staff();
        Roster::new(students, staff)
    }

    fn generate_students(&mut self) -> Vec<Student> {
        (0..self.config.num_students)
            .map(|i| {
                let base = FIRST_NAMES[i % FIRST_NAMES.len()];
                // Repeat names get an initial so they stay distinguishable
                let name = if i < FIRST_NAMES.len() {
                    base.to_string()
                } else {
                    format!("{} {}.", base, (b'A' + (i / FIRST_NAMES.len()) as u8 % 26) as char)
                };

                let mut student = Student::new(format!("s{:02}", i + 1), name);
                if !self.rng.random_bool(self.config.missing_skill_fraction) {
                    student.skill_level =
                        Some(SkillLevel::ALL[self.rng.random_range(0..SkillLevel::ALL.len())]);
                }
                if !self.rng.random_bool(self.config.missing_style_fraction) {
                    student.working_style =
                        Some(WorkingStyle::ALL[self.rng.random_range(0..WorkingStyle::ALL.len())]);
                }
                student
            })
            .collect()
    }

    /// Give some students a preferred and/or avoided partner, never themselves
    /// and never the same partner for both.
    fn link_partners(&mut self, students: &mut [Student]) {
        let n = students.len();
        if n < 2 {
            return;
        }
        let ids: Vec<String> = students.iter().map(|s| s.id.clone()).collect();

        for (i, student) in students.iter_mut().enumerate() {
            let mut others: Vec<usize> = (0..n).filter(|&j| j != i).collect();
            others.shuffle(&mut self.rng);
            let mut picks = others.into_iter();

            if self.rng.random_bool(self.config.preference_probability)
                && let Some(j) = picks.next()
            {
                student.preferred_partners.insert(ids[j].clone());
            }
            if self.rng.random_bool(self.config.avoid_probability)
                && let Some(j) = picks.next()
            {
                student.avoid_partners.insert(ids[j].clone());
            }
        }
    }

    fn generate_staff(&mut self) -> Vec<Staff> {
        STAFF
            .iter()
            .take(self.config.num_staff)
            .enumerate()
            .map(|(i, (name, role))| Staff::new(format!("t{:02}", i + 1), *name, *role))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_small() {
        let mut roster_gen = RosterGenerator::new(RosterGeneratorConfig::small(), 42);
        let roster = roster_gen.generate();
        assert_eq!(roster.students.len(), 6);
        assert_eq!(roster.staff.len(), 2);
    }

    #[test]
    fn test_generate_large() {
        let mut roster_gen = RosterGenerator::new(RosterGeneratorConfig::large(), 42);
        let roster = roster_gen.generate();
        assert_eq!(roster.students.len(), 20);
        assert_eq!(roster.staff.len(), 4);
    }

    #[test]
    fn test_deterministic() {
        let config = RosterGeneratorConfig::medium();
        let roster1 = RosterGenerator::new(config.clone(), 123).generate();
        let roster2 = RosterGenerator::new(config, 123).generate();
        assert_eq!(roster1, roster2);
    }

    #[test]
    fn test_unique_ids_and_no_self_links() {
        let mut config = RosterGeneratorConfig::large();
        config.num_students = 30;
        config.preference_probability = 1.0;
        config.avoid_probability = 1.0;
        let roster = RosterGenerator::new(config, 7).generate();

        let mut ids: Vec<&String> = roster.students.iter().map(|s| &s.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 30);

        for student in &roster.students {
            assert!(!student.preferred_partners.contains(&student.id));
            assert!(!student.avoid_partners.contains(&student.id));
            assert!(student.preferred_partners.is_disjoint(&student.avoid_partners));
            assert_eq!(student.preferred_partners.len(), 1);
            assert_eq!(student.avoid_partners.len(), 1);
        }
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(RosterGeneratorConfig::parse("Large").unwrap().num_students, 20);
        assert!(RosterGeneratorConfig::parse("huge").is_none());
    }
}
