//! Activity records on disk.
//!
//! An activity owns at most one assignment. Stores are constructed
//! explicitly and handed to whoever needs them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use group_kernel::{AssignmentRecord, AssignmentSession, EngineConfig, Roster, TemplateCatalog};

/// A classroom activity and its saved assignment, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub assignment: Option<AssignmentRecord>,
}

impl Activity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            assignment: None,
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write activity to {}", path.display()))?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read activity from {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("invalid activity JSON in {}", path.display()))
    }
}

/// Keyed storage for activity records.
pub trait RecordStore {
    fn put(&mut self, activity: &Activity) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<Activity>>;
    fn remove(&mut self, id: &str) -> Result<bool>;
    /// Stored activity ids in ascending order.
    fn ids(&self) -> Result<Vec<String>>;
}

fn check_id(id: &str) -> Result<()> {
    if id.is_empty()
        || !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        bail!("invalid activity id {:?}", id);
    }
    Ok(())
}

/// One `<id>.json` file per activity under a root directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create store directory {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        check_id(id)?;
        Ok(self.root.join(format!("{}.json", id)))
    }
}

impl RecordStore for JsonFileStore {
    fn put(&mut self, activity: &Activity) -> Result<()> {
        let path = self.path_for(&activity.id)?;
        activity.save(&path)?;
        debug!(activity = %activity.id, path = %path.display(), "Activity written");
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Activity>> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Ok(None);
        }
        Activity::load(&path).map(Some)
    }

    fn remove(&mut self, id: &str) -> Result<bool> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)
            .with_context(|| format!("failed to remove {}", path.display()))?;
        Ok(true)
    }

    fn ids(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.root)
            .with_context(|| format!("failed to list {}", self.root.display()))?;
        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json")
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<String, Activity>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn put(&mut self, activity: &Activity) -> Result<()> {
        check_id(&activity.id)?;
        self.records.insert(activity.id.clone(), activity.clone());
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Activity>> {
        Ok(self.records.get(id).cloned())
    }

    fn remove(&mut self, id: &str) -> Result<bool> {
        Ok(self.records.remove(id).is_some())
    }

    fn ids(&self) -> Result<Vec<String>> {
        Ok(self.records.keys().cloned().collect())
    }
}

/// Saves and reopens assignment sessions against a record store.
pub struct ActivityStore {
    store: Box<dyn RecordStore>,
}

impl ActivityStore {
    pub fn new(store: impl RecordStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn activity(&self, id: &str) -> Result<Option<Activity>> {
        self.store.get(id)
    }

    pub fn activity_ids(&self) -> Result<Vec<String>> {
        self.store.ids()
    }

    /// Snapshot the session into the activity, creating the activity if needed.
    pub fn save_session(
        &mut self,
        activity_id: &str,
        name: &str,
        session: &AssignmentSession,
    ) -> Result<Activity> {
        let record = session
            .save()
            .with_context(|| format!("failed to snapshot assignment for {}", activity_id))?;

        let mut activity = self
            .store
            .get(activity_id)?
            .unwrap_or_else(|| Activity::new(activity_id, name));
        activity.name = name.to_string();
        activity.assignment = Some(record);
        self.store.put(&activity)?;

        info!(
            activity = %activity_id,
            groups = activity.assignment.as_ref().map_or(0, |a| a.groups.len()),
            "Assignment saved"
        );
        Ok(activity)
    }

    /// Reopen the activity's assignment for editing.
    ///
    /// An activity without a saved assignment opens as a fresh session.
    pub fn open_session(
        &self,
        activity_id: &str,
        roster: Roster,
        catalog: TemplateCatalog,
        config: EngineConfig,
    ) -> Result<AssignmentSession> {
        let Some(activity) = self.store.get(activity_id)? else {
            bail!("unknown activity {}", activity_id);
        };
        match activity.assignment {
            Some(record) => AssignmentSession::load(roster, catalog, &record, config)
                .with_context(|| format!("failed to open assignment for {}", activity_id)),
            None => Ok(AssignmentSession::new(roster, catalog, config)),
        }
    }

    pub fn remove(&mut self, activity_id: &str) -> Result<bool> {
        self.store.remove(activity_id)
    }
}
