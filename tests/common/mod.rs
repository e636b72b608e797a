//! In-memory collaborator fixtures for integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use learning_engine::error::SourceError;
use learning_engine::sources::{
    ContentSource, LearnerDirectory, ProfileStore, ResponseHistorySource, SubjectCatalog,
};
use learning_engine::types::{ContentItem, LearningProfile, ResponseEvent, SubjectInfo};
use learning_engine::{EngineConfig, LearningEngine, Sources};

#[derive(Default)]
pub struct World {
    pub events: Mutex<Vec<ResponseEvent>>,
    pub ages: Mutex<HashMap<String, u8>>,
    pub profiles: Mutex<HashMap<String, LearningProfile>>,
    pub content: Mutex<Vec<ContentItem>>,
    pub subjects: Mutex<Vec<SubjectInfo>>,
    /// Simulates the history store being unreachable.
    pub history_down: Mutex<bool>,
}

impl ResponseHistorySource for World {
    fn fetch_response_history(
        &self,
        learner_id: &str,
        subject_id: Option<&str>,
        since: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<Vec<ResponseEvent>, SourceError> {
        if *self.history_down.lock().unwrap() {
            return Err(SourceError::new("responseHistory", "connection refused"));
        }
        let mut events: Vec<ResponseEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.learner_id == learner_id)
            .filter(|e| subject_id.map_or(true, |s| e.subject_id == s))
            .filter(|e| since.map_or(true, |t| e.timestamp >= t))
            .cloned()
            .collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events.truncate(limit);
        Ok(events)
    }
}

impl LearnerDirectory for World {
    fn fetch_learner_age(&self, learner_id: &str) -> Result<Option<u8>, SourceError> {
        Ok(self.ages.lock().unwrap().get(learner_id).copied())
    }
}

impl ProfileStore for World {
    fn fetch_learning_profile(
        &self,
        learner_id: &str,
    ) -> Result<Option<LearningProfile>, SourceError> {
        Ok(self.profiles.lock().unwrap().get(learner_id).cloned())
    }

    fn upsert_learning_profile(&self, profile: &LearningProfile) -> Result<(), SourceError> {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.learner_id.clone(), profile.clone());
        Ok(())
    }
}

impl ContentSource for World {
    fn fetch_age_appropriate_candidates(
        &self,
        _learner_id: &str,
        subject_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ContentItem>, SourceError> {
        let mut items: Vec<ContentItem> = self
            .content
            .lock()
            .unwrap()
            .iter()
            .filter(|i| subject_id.map_or(true, |s| i.subject_id == s))
            .cloned()
            .collect();
        items.truncate(limit);
        Ok(items)
    }
}

impl SubjectCatalog for World {
    fn fetch_known_subjects(&self) -> Result<Vec<SubjectInfo>, SourceError> {
        Ok(self.subjects.lock().unwrap().clone())
    }
}

pub fn engine_with(world: Arc<World>) -> LearningEngine {
    let sources = Sources {
        history: world.clone(),
        learners: world.clone(),
        profiles: world.clone(),
        content: world.clone(),
        subjects: world,
    };
    LearningEngine::new(EngineConfig::default(), sources).unwrap()
}

pub fn subject(id: &str, name: &str) -> SubjectInfo {
    SubjectInfo {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn event(
    learner: &str,
    subject: &str,
    question: &str,
    correct: bool,
    secs: Option<f64>,
    age: chrono::Duration,
) -> ResponseEvent {
    ResponseEvent {
        learner_id: learner.to_string(),
        question_id: question.to_string(),
        subject_id: subject.to_string(),
        difficulty: 3,
        is_correct: correct,
        response_secs: secs,
        timestamp: Utc::now() - age,
    }
}

pub fn item(id: &str, subject: &str, difficulty: u8) -> ContentItem {
    ContentItem {
        id: id.to_string(),
        subject_id: subject.to_string(),
        prompt: format!("What about {id}?"),
        choices: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        correct_answer: "a".to_string(),
        difficulty,
        base_reward: difficulty as u32 * 10,
        age_min: 5,
        age_max: 14,
        created_at: Utc::now() - Duration::days(30),
    }
}
