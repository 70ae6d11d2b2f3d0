use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use super::owned_by;
use crate::database::models::{
    decode_rows, Exercise, ExerciseSummary, NewWorkoutSession, NewWorkoutSet, RowId, SessionDetail, SessionPatch,
    WorkoutSession, WorkoutSet, WorkoutSetDetail, EXERCISES, WORKOUT_SESSIONS, WORKOUT_SETS,
};
use crate::database::{Direction, Gateway, GatewayError, Query};
use crate::types::{integer, number, Numeric};

/// A finished workout as logged by the client.
///
/// Form clients send numbers as text, so numeric fields go through `Numeric`;
/// timestamps are handed to the store as written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionDraft {
    #[serde(default)]
    pub routine_id: Option<RowId>,
    #[serde(default)]
    pub day_number: Option<Numeric>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<Numeric>,
    #[serde(default)]
    pub rating: Option<Numeric>,
    #[serde(default)]
    pub exercises: Vec<LoggedExercise>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggedExercise {
    #[serde(default)]
    pub exercise_id: Option<RowId>,
    #[serde(default)]
    pub sets: Vec<LoggedSet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggedSet {
    #[serde(default)]
    pub reps: Option<Numeric>,
    #[serde(default)]
    pub weight: Option<Numeric>,
    #[serde(default)]
    pub completed: bool,
}

/// Body of a session update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub day_number: Option<Numeric>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<Numeric>,
    #[serde(default)]
    pub rating: Option<Numeric>,
}

impl SessionChanges {
    pub fn into_patch(self) -> SessionPatch {
        SessionPatch {
            name: self.name,
            day_number: integer(self.day_number.as_ref()),
            started_at: self.started_at,
            ended_at: self.ended_at,
            notes: self.notes,
            duration_minutes: integer(self.duration_minutes.as_ref()),
            rating: integer(self.rating.as_ref()),
        }
    }
}

/// Completed sets only, numbered by their position within the exercise
fn completed_sets(session: &RowId, exercises: &[LoggedExercise]) -> Vec<NewWorkoutSet> {
    exercises
        .iter()
        .flat_map(|exercise| {
            exercise
                .sets
                .iter()
                .enumerate()
                .filter(|(_, set)| set.completed)
                .map(|(index, set)| NewWorkoutSet {
                    session_id: session.clone(),
                    exercise_id: exercise.exercise_id.clone(),
                    set_number: index as i64 + 1,
                    reps: integer(set.reps.as_ref()),
                    weight: number(set.weight.as_ref()),
                    completed: true,
                })
        })
        .collect()
}

pub struct SessionService {
    store: Arc<dyn Gateway>,
}

impl SessionService {
    pub fn new(store: Arc<dyn Gateway>) -> Self {
        Self { store }
    }

    /// Owner's sessions, most recent start first, with their sets
    pub async fn list(&self, owner: Uuid) -> Result<Vec<SessionDetail>, GatewayError> {
        self.load(owned_by(owner).order("started_at", Direction::Desc)).await
    }

    /// The `limit` most recent sessions, for progress analysis
    pub async fn recent(&self, owner: Uuid, limit: usize) -> Result<Vec<SessionDetail>, GatewayError> {
        self.load(owned_by(owner).order("started_at", Direction::Desc).limit(limit))
            .await
    }

    pub async fn create(&self, owner: Uuid, draft: SessionDraft) -> Result<WorkoutSession, GatewayError> {
        let header = NewWorkoutSession {
            user_id: owner,
            routine_id: draft.routine_id,
            day_number: integer(draft.day_number.as_ref()),
            name: draft.name,
            started_at: draft.started_at,
            ended_at: draft.ended_at,
            notes: draft.notes,
            duration_minutes: integer(draft.duration_minutes.as_ref()),
            rating: integer(draft.rating.as_ref()),
        };
        let row = self
            .store
            .insert_one(WORKOUT_SESSIONS, serde_json::to_value(&header)?)
            .await?;
        let session: WorkoutSession = serde_json::from_value(row)?;

        let sets = completed_sets(&session.id, &draft.exercises);
        if !sets.is_empty() {
            let rows = sets
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<Vec<_>, _>>()?;
            self.store.insert(WORKOUT_SETS, rows).await?;
        }

        tracing::info!("saved session {} with {} completed set(s)", session.id, sets.len());
        Ok(session)
    }

    /// Patch an owned session; `None` when no such row exists
    pub async fn update(
        &self,
        owner: Uuid,
        id: &str,
        patch: SessionPatch,
    ) -> Result<Option<WorkoutSession>, GatewayError> {
        let query = owned_by(owner).eq("id", id);
        let row = if patch.is_empty() {
            self.store.select_first(WORKOUT_SESSIONS, &query).await?
        } else {
            self.store
                .update(WORKOUT_SESSIONS, &query, serde_json::to_value(&patch)?)
                .await?
                .into_iter()
                .next()
        };
        Ok(row.map(serde_json::from_value).transpose()?)
    }

    pub async fn delete(&self, owner: Uuid, id: &str) -> Result<(), GatewayError> {
        self.store
            .delete(WORKOUT_SESSIONS, &owned_by(owner).eq("id", id))
            .await?;
        Ok(())
    }

    async fn load(&self, query: Query) -> Result<Vec<SessionDetail>, GatewayError> {
        let sessions: Vec<WorkoutSession> = decode_rows(self.store.select(WORKOUT_SESSIONS, &query).await?)?;
        if sessions.is_empty() {
            return Ok(Vec::new());
        }

        let query = Query::new()
            .in_list("session_id", sessions.iter().map(|s| &s.id))
            .order("set_number", Direction::Asc);
        let sets: Vec<WorkoutSet> = decode_rows(self.store.select(WORKOUT_SETS, &query).await?)?;

        let mut exercise_ids: Vec<&RowId> = sets.iter().filter_map(|s| s.exercise_id.as_ref()).collect();
        exercise_ids.sort_by(|a, b| a.0.cmp(&b.0));
        exercise_ids.dedup();
        let names: HashMap<RowId, ExerciseSummary> = if exercise_ids.is_empty() {
            HashMap::new()
        } else {
            let rows = self
                .store
                .select(EXERCISES, &Query::new().in_list("id", exercise_ids))
                .await?;
            decode_rows::<Exercise>(rows)?
                .iter()
                .map(|e| (e.id.clone(), e.summary()))
                .collect()
        };

        let mut sets_by_session: HashMap<RowId, Vec<WorkoutSetDetail>> = HashMap::new();
        for set in sets {
            let exercise = set.exercise_id.as_ref().and_then(|id| names.get(id)).cloned();
            sets_by_session
                .entry(set.session_id.clone())
                .or_default()
                .push(WorkoutSetDetail { set, exercise });
        }

        Ok(sessions
            .into_iter()
            .map(|session| SessionDetail {
                workout_sets: sets_by_session.remove(&session.id).unwrap_or_default(),
                session,
            })
            .collect())
    }
}
