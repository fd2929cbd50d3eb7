//! Template catalog: named group archetypes used to stamp out new groups.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::group::{GroupId, GroupType};
use crate::registry::GroupRegistry;

/// A reusable group archetype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub group_type: GroupType,
    pub suggested_size: usize,
    pub color: String,
    #[serde(default)]
    pub target_skills: Vec<String>,
}

impl GroupTemplate {
    fn builtin(
        id: &str,
        name: &str,
        description: &str,
        group_type: GroupType,
        suggested_size: usize,
        color: &str,
        target_skills: &[&str],
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            group_type,
            suggested_size,
            color: color.to_string(),
            target_skills: target_skills.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Read-only list of templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateCatalog {
    templates: Vec<GroupTemplate>,
}

impl TemplateCatalog {
    pub fn new(templates: Vec<GroupTemplate>) -> Self {
        Self { templates }
    }

    /// The catalog shipped with the application: at least one archetype for
    /// every group type except `mixed`.
    pub fn builtin() -> Self {
        Self::new(vec![
            GroupTemplate::builtin(
                "reading-circle",
                "Reading Circle",
                "Guided reading with leveled texts",
                GroupType::Academic,
                4,
                "#4F86F7",
                &["decoding", "fluency", "comprehension"],
            ),
            GroupTemplate::builtin(
                "math-centers",
                "Math Centers",
                "Hands-on number sense and operations stations",
                GroupType::Academic,
                5,
                "#5BC67A",
                &["counting", "number-sense", "operations"],
            ),
            GroupTemplate::builtin(
                "speech-language",
                "Speech & Language",
                "Small-group articulation and expressive language work",
                GroupType::Therapy,
                3,
                "#C45BC6",
                &["articulation", "expressive-language"],
            ),
            GroupTemplate::builtin(
                "fine-motor",
                "Fine Motor Lab",
                "Occupational therapy activities for grip and coordination",
                GroupType::Therapy,
                3,
                "#3FB8AF",
                &["grip", "hand-eye-coordination"],
            ),
            GroupTemplate::builtin(
                "calm-corner",
                "Calm Corner",
                "Self-regulation practice with visual supports",
                GroupType::Behavior,
                2,
                "#F25F5C",
                &["self-regulation", "coping-strategies"],
            ),
            GroupTemplate::builtin(
                "social-skills",
                "Social Skills",
                "Turn-taking, sharing, and conversation games",
                GroupType::Social,
                4,
                "#F7A84F",
                &["turn-taking", "conversation", "cooperation"],
            ),
        ])
    }

    /// Parse a catalog from a JSON array of templates.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid template catalog JSON")
    }

    /// Stamp out a new group from the template with the given id.
    ///
    /// Returns `None` for an unknown template id.
    pub fn instantiate(&self, template_id: &str, registry: &mut GroupRegistry) -> Option<GroupId> {
        let template = self.get(template_id)?;
        Some(registry.create_from_template(template))
    }

    pub fn get(&self, id: &str) -> Option<&GroupTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupTemplate> {
        self.templates.iter()
    }

    pub fn by_type(&self, group_type: GroupType) -> impl Iterator<Item = &GroupTemplate> {
        self.templates
            .iter()
            .filter(move |t| t.group_type == group_type)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
