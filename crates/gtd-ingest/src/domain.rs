//! Core domain types for the normalized planning model.
//!
//! Tasks and projects keep the ids assigned by their source system;
//! nothing here generates identifiers. Relations between entities are
//! stored as ids and resolved by an explicit reconciliation pass over a
//! fully materialized [`DataSet`], which sidesteps construction-order
//! problems when the two collections are loaded independently.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Task lifecycle state in the GTD workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Captured but not yet processed
    Inbox,
    /// Ready to be worked on now
    NextAction,
    /// Blocked on someone or something external
    WaitingFor,
    /// Deferred without a date
    Someday,
    /// Completed
    Done,
    /// No longer relevant
    Cancelled,
}

/// Project lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Being actively worked
    Active,
    /// Parked for later
    Someday,
    /// Outcome reached
    Completed,
    /// Abandoned
    Dropped,
}

/// Urgency x importance classification bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EisenhowerQuadrant {
    /// Do first
    UrgentImportant,
    /// Schedule
    NotUrgentImportant,
    /// Delegate or batch
    UrgentNotImportant,
    /// Drop candidates
    NotUrgentNotImportant,
}

/// A single actionable (or reference) item from any source.
///
/// `project` and `next_action_for` hold project ids, not owned
/// sub-objects; they are only trustworthy after [`DataSet::reconcile`]
/// has run over the set the task belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Source-assigned identifier, unique within its originating export
    pub id: String,
    /// Short title
    pub description: String,
    /// Free-form notes
    #[serde(default)]
    pub notes: String,
    /// Current GTD state
    pub status: TaskStatus,
    /// Where/with-what the task applies (label, location, ...)
    #[serde(default)]
    pub context: Option<String>,
    /// Optional deadline
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Eisenhower classification
    pub quadrant: EisenhowerQuadrant,
    /// Whether this item needs action (vs. pure reference material)
    pub is_actionable: bool,
    /// When the item was created in the source system
    pub creation_date: DateTime<Utc>,
    /// Owning project id, if any
    #[serde(default)]
    pub project: Option<String>,
    /// Projects for which this task is the designated next action
    #[serde(default)]
    pub next_action_for: Vec<String>,
}

impl Task {
    /// Create a task with inbox defaults. Loaders fill in the rest.
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            notes: String::new(),
            status: TaskStatus::Inbox,
            context: None,
            due_date: None,
            quadrant: EisenhowerQuadrant::NotUrgentNotImportant,
            is_actionable: true,
            creation_date: Utc::now(),
            project: None,
            next_action_for: Vec::new(),
        }
    }
}

/// A multi-step outcome grouping member tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Source-assigned identifier
    pub id: String,
    /// Project name
    pub name: String,
    /// Desired outcome, free text
    #[serde(default)]
    pub outcome: String,
    /// Current lifecycle state
    pub status: ProjectStatus,
    /// When the project was created
    pub creation_date: DateTime<Utc>,
    /// Ids of member tasks (membership, not ownership)
    #[serde(default)]
    pub tasks: Vec<String>,
}

impl Project {
    /// Create an active project with no members.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            outcome: String::new(),
            status: ProjectStatus::Active,
            creation_date: Utc::now(),
            tasks: Vec::new(),
        }
    }

    /// Register a task as a member. Inserting the same id twice is a
    /// no-op, which keeps reconciliation idempotent.
    pub fn add_task(&mut self, task_id: &str) {
        if !self.tasks.iter().any(|t| t == task_id) {
            self.tasks.push(task_id.to_string());
        }
    }
}

/// A stored reference that did not resolve against the loaded set.
///
/// Gaps are dropped, never raised: the loaded graph stays usable and
/// the caller decides whether to log them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceGap {
    /// Id of the entity holding the reference
    pub from: String,
    /// The id that failed to resolve
    pub to: String,
    /// Relation field the reference was dropped from
    pub field: &'static str,
}

/// One independently loaded graph of tasks and projects, keyed by id.
///
/// Every load builds a fresh `DataSet`; there is no long-lived shared
/// instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    /// All tasks, keyed by id
    pub tasks: BTreeMap<String, Task>,
    /// All projects, keyed by id
    pub projects: BTreeMap<String, Project>,
}

impl DataSet {
    /// Build the id-keyed maps from flat collections. Later duplicates
    /// of an id win, matching last-write semantics of the store.
    pub fn from_parts(tasks: Vec<Task>, projects: Vec<Project>) -> Self {
        Self {
            tasks: tasks.into_iter().map(|t| (t.id.clone(), t)).collect(),
            projects: projects.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    /// Resolve every stored relation against the loaded maps.
    ///
    /// Single-valued references that dangle become `None`; dangling ids
    /// in list-valued relations are removed. A resolved `task.project`
    /// is mirrored into that project's member set, so afterwards
    /// `task.project == Some(p)` implies `projects[p].tasks` contains
    /// the task id. Idempotent and total: no amount of dangling input
    /// makes this fail.
    pub fn reconcile(&mut self) -> Vec<ReferenceGap> {
        let mut gaps = Vec::new();
        let project_ids: BTreeSet<String> = self.projects.keys().cloned().collect();
        let task_ids: BTreeSet<String> = self.tasks.keys().cloned().collect();

        // (project id, task id) edges to mirror once borrows are released
        let mut memberships: Vec<(String, String)> = Vec::new();

        for task in self.tasks.values_mut() {
            let from = task.id.clone();
            if let Some(pid) = task.project.take() {
                if project_ids.contains(&pid) {
                    memberships.push((pid.clone(), from.clone()));
                    task.project = Some(pid);
                } else {
                    gaps.push(ReferenceGap {
                        from: from.clone(),
                        to: pid,
                        field: "project",
                    });
                }
            }
            task.next_action_for.retain(|pid| {
                let live = project_ids.contains(pid);
                if !live {
                    gaps.push(ReferenceGap {
                        from: from.clone(),
                        to: pid.clone(),
                        field: "next_action_for",
                    });
                }
                live
            });
        }

        for project in self.projects.values_mut() {
            let from = project.id.clone();
            project.tasks.retain(|tid| {
                let live = task_ids.contains(tid);
                if !live {
                    gaps.push(ReferenceGap {
                        from: from.clone(),
                        to: tid.clone(),
                        field: "tasks",
                    });
                }
                live
            });
        }

        for (pid, tid) in memberships {
            if let Some(project) = self.projects.get_mut(&pid) {
                project.add_task(&tid);
            }
        }

        gaps
    }
}

/// Parse an export timestamp: RFC3339 datetimes, naive datetimes, or
/// bare ISO dates (anchored at midnight UTC).
pub fn parse_export_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&ndt));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn task_in(project: Option<&str>, id: &str) -> Task {
        let mut task = Task::new(id, format!("task {}", id));
        task.project = project.map(String::from);
        task
    }

    #[test]
    fn add_task_is_idempotent() {
        let mut project = Project::new("p1", "Home");
        project.add_task("t1");
        project.add_task("t1");
        assert_eq!(project.tasks, vec!["t1".to_string()]);
    }

    #[test]
    fn reconcile_drops_dangling_project_reference() {
        let mut set = DataSet::from_parts(vec![task_in(Some("ghost"), "t1")], vec![]);
        let gaps = set.reconcile();

        assert_eq!(set.tasks["t1"].project, None);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].to, "ghost");
        assert_eq!(gaps[0].field, "project");
    }

    #[test]
    fn reconcile_mirrors_membership_onto_project() {
        let set_tasks = vec![task_in(Some("p1"), "t1")];
        let mut set = DataSet::from_parts(set_tasks, vec![Project::new("p1", "Home")]);
        let gaps = set.reconcile();

        assert!(gaps.is_empty());
        assert_eq!(set.tasks["t1"].project.as_deref(), Some("p1"));
        assert!(set.projects["p1"].tasks.contains(&"t1".to_string()));
    }

    #[test]
    fn reconcile_prunes_list_valued_references() {
        let mut task = task_in(None, "t1");
        task.next_action_for = vec!["p1".to_string(), "ghost".to_string()];
        let mut project = Project::new("p1", "Home");
        project.tasks = vec!["t1".to_string(), "gone".to_string()];

        let mut set = DataSet::from_parts(vec![task], vec![project]);
        let gaps = set.reconcile();

        assert_eq!(set.tasks["t1"].next_action_for, vec!["p1".to_string()]);
        assert_eq!(set.projects["p1"].tasks, vec!["t1".to_string()]);
        assert_eq!(gaps.len(), 2);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let mut task = task_in(Some("p1"), "t1");
        task.next_action_for = vec!["ghost".to_string()];
        let mut set = DataSet::from_parts(vec![task], vec![Project::new("p1", "Home")]);

        set.reconcile();
        let after_first = set.clone();
        let gaps = set.reconcile();

        assert_eq!(set, after_first);
        assert!(gaps.is_empty());
    }

    #[test]
    fn parse_export_date_accepts_all_source_shapes() {
        assert!(parse_export_date("2024-03-01").is_some());
        assert!(parse_export_date("2024-03-01T10:30:00").is_some());
        assert!(parse_export_date("2024-03-01T10:30:00+02:00").is_some());
        assert!(parse_export_date("2024-03-01T10:30:00Z").is_some());
        assert!(parse_export_date("not a date").is_none());
    }

    #[test]
    fn bare_date_anchors_at_midnight_utc() {
        let parsed = parse_export_date("2024-03-01").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T00:00:00+00:00");
    }

    proptest! {
        /// Reconciliation must hold up under arbitrary dangling ids and
        /// leave the bidirectional invariant intact.
        #[test]
        fn reconcile_never_leaves_dangling_edges(
            task_ids in proptest::collection::vec("[a-z]{1,4}", 0..8),
            project_ids in proptest::collection::vec("[a-z]{1,4}", 0..4),
            refs in proptest::collection::vec("[a-z]{1,4}", 0..8),
        ) {
            let tasks: Vec<Task> = task_ids
                .iter()
                .enumerate()
                .map(|(i, id)| {
                    let mut t = Task::new(id.clone(), "t");
                    t.project = refs.get(i).cloned();
                    t.next_action_for = refs.clone();
                    t
                })
                .collect();
            let projects: Vec<Project> = project_ids
                .iter()
                .map(|id| {
                    let mut p = Project::new(id.clone(), "p");
                    p.tasks = refs.clone();
                    p
                })
                .collect();

            let mut set = DataSet::from_parts(tasks, projects);
            set.reconcile();

            for task in set.tasks.values() {
                if let Some(pid) = &task.project {
                    prop_assert!(set.projects.contains_key(pid));
                    prop_assert!(set.projects[pid].tasks.contains(&task.id));
                }
                for pid in &task.next_action_for {
                    prop_assert!(set.projects.contains_key(pid));
                }
            }
            for project in set.projects.values() {
                for tid in &project.tasks {
                    prop_assert!(set.tasks.contains_key(tid));
                }
            }

            // Running it again must change nothing.
            let snapshot = set.clone();
            set.reconcile();
            prop_assert_eq!(set, snapshot);
        }
    }
}
