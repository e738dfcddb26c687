//! In-memory job status tracking.
//!
//! One job per upload. Consumers poll by identifier; terminal states never
//! regress and per-language outputs accumulate as they complete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub state: JobState,
    pub progress: f64,
    pub message: String,
    /// Per-language artifact paths, accumulated as each track completes.
    pub outputs: HashMap<String, String>,
    pub updated_at: DateTime<Utc>,
}

impl JobStatus {
    fn pending() -> Self {
        Self {
            state: JobState::Pending,
            progress: 0.0,
            message: "Queued".to_string(),
            outputs: HashMap::new(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default)]
pub struct JobTracker {
    jobs: RwLock<HashMap<String, JobStatus>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending job and return its identifier.
    pub fn create(&self) -> String {
        let id = Uuid::new_v4().simple().to_string()[..12].to_string();
        self.jobs
            .write()
            .expect("job tracker lock poisoned")
            .insert(id.clone(), JobStatus::pending());
        id
    }

    /// Update a job's state. Updates after a terminal state are ignored, so
    /// succeeded/failed never regress.
    pub fn update(&self, id: &str, state: JobState, progress: f64, message: &str) {
        let mut jobs = self.jobs.write().expect("job tracker lock poisoned");
        if let Some(status) = jobs.get_mut(id) {
            if status.state.is_terminal() {
                return;
            }
            status.state = state;
            status.progress = progress.clamp(0.0, 1.0);
            status.message = message.to_string();
            status.updated_at = Utc::now();
        }
    }

    /// Record one completed per-language artifact.
    pub fn add_output(&self, id: &str, lang: &str, artifact: &str) {
        let mut jobs = self.jobs.write().expect("job tracker lock poisoned");
        if let Some(status) = jobs.get_mut(id) {
            status.outputs.insert(lang.to_string(), artifact.to_string());
            status.updated_at = Utc::now();
        }
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.jobs
            .read()
            .expect("job tracker lock poisoned")
            .get(id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_starts_pending() {
        let tracker = JobTracker::new();
        let id = tracker.create();
        let status = tracker.get(&id).unwrap();
        assert_eq!(status.state, JobState::Pending);
        assert_eq!(status.progress, 0.0);
        assert!(status.outputs.is_empty());
    }

    #[test]
    fn test_state_progression() {
        let tracker = JobTracker::new();
        let id = tracker.create();
        tracker.update(&id, JobState::Running, 0.5, "translating");
        let status = tracker.get(&id).unwrap();
        assert_eq!(status.state, JobState::Running);
        assert_eq!(status.progress, 0.5);
        assert_eq!(status.message, "translating");
    }

    #[test]
    fn test_terminal_states_never_regress() {
        let tracker = JobTracker::new();
        let id = tracker.create();
        tracker.update(&id, JobState::Succeeded, 1.0, "done");
        tracker.update(&id, JobState::Running, 0.3, "late update");
        let status = tracker.get(&id).unwrap();
        assert_eq!(status.state, JobState::Succeeded);
        assert_eq!(status.progress, 1.0);
    }

    #[test]
    fn test_outputs_accumulate() {
        let tracker = JobTracker::new();
        let id = tracker.create();
        tracker.add_output(&id, "ko", "tasks/x/vtt/sub_ko.vtt");
        tracker.add_output(&id, "en", "tasks/x/vtt/sub_en.vtt");
        let status = tracker.get(&id).unwrap();
        assert_eq!(status.outputs.len(), 2);
        assert!(status.outputs.contains_key("ko"));
    }

    #[test]
    fn test_progress_is_clamped() {
        let tracker = JobTracker::new();
        let id = tracker.create();
        tracker.update(&id, JobState::Running, 1.7, "overshoot");
        assert_eq!(tracker.get(&id).unwrap().progress, 1.0);
    }

    #[test]
    fn test_unknown_job() {
        let tracker = JobTracker::new();
        assert!(tracker.get("missing").is_none());
    }
}
