use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub const PROFILES: &str = "profiles";
pub const ROUTINES: &str = "routines";
pub const ROUTINE_DAYS: &str = "routine_days";
pub const ROUTINE_EXERCISES: &str = "routine_exercises";
pub const EXERCISES: &str = "exercises";
pub const WORKOUT_SESSIONS: &str = "workout_sessions";
pub const WORKOUT_SETS: &str = "workout_sets";

/// Store row id. Numeric keys are carried as their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RowId(pub String);

impl<'de> Deserialize<'de> for RowId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Unsigned(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => RowId(s),
            Raw::Int(n) => RowId(n.to_string()),
            Raw::Unsigned(n) => RowId(n.to_string()),
        })
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        RowId(s.to_string())
    }
}

impl From<RowId> for Value {
    fn from(id: RowId) -> Self {
        Value::String(id.0)
    }
}

impl From<&RowId> for Value {
    fn from(id: &RowId) -> Self {
        Value::String(id.0.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub fitness_level: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ----- routines -----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Routine {
    pub id: RowId,
    pub user_id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub days_per_week: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewRoutine {
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_per_week: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineDay {
    pub id: RowId,
    pub routine_id: RowId,
    #[serde(default)]
    pub day_number: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewRoutineDay {
    pub routine_id: RowId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineExercise {
    pub id: RowId,
    pub routine_day_id: RowId,
    pub exercise_id: RowId,
    #[serde(default)]
    pub sets: Option<i64>,
    #[serde(default)]
    pub reps: Option<i64>,
    #[serde(default)]
    pub rest_seconds: Option<i64>,
    #[serde(default)]
    pub target_weight: Option<f64>,
    #[serde(default)]
    pub order_index: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewRoutineExercise {
    pub routine_day_id: RowId,
    pub exercise_id: RowId,
    pub sets: i64,
    pub reps: i64,
    pub rest_seconds: i64,
    pub target_weight: f64,
    pub order_index: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Routine with its days and linked exercises, shaped like an embedded select
#[derive(Debug, Clone, Serialize)]
pub struct RoutineDetail {
    #[serde(flatten)]
    pub routine: Routine,
    pub routine_days: Vec<RoutineDayDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutineDayDetail {
    #[serde(flatten)]
    pub day: RoutineDay,
    pub routine_exercises: Vec<RoutineExerciseDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutineExerciseDetail {
    #[serde(flatten)]
    pub link: RoutineExercise,
    pub exercise: Option<ExerciseSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExerciseSummary {
    pub name: Option<String>,
    pub muscle_group: Option<String>,
}

// ----- exercises -----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: RowId,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub muscle_group: Option<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Exercise {
    pub fn summary(&self) -> ExerciseSummary {
        ExerciseSummary {
            name: self.name.clone(),
            muscle_group: self.muscle_group.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewExercise {
    pub user_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// Editable exercise columns; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExercisePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl ExercisePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.muscle_group.is_none()
            && self.equipment.is_none()
            && self.description.is_none()
            && self.video_url.is_none()
    }
}

// ----- sessions -----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: RowId,
    pub user_id: Uuid,
    #[serde(default)]
    pub routine_id: Option<RowId>,
    #[serde(default)]
    pub day_number: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewWorkoutSession {
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routine_id: Option<RowId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
}

/// Editable session columns; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
}

impl SessionPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.day_number.is_none()
            && self.started_at.is_none()
            && self.ended_at.is_none()
            && self.notes.is_none()
            && self.duration_minutes.is_none()
            && self.rating.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub id: RowId,
    pub session_id: RowId,
    #[serde(default)]
    pub exercise_id: Option<RowId>,
    #[serde(default)]
    pub set_number: Option<i64>,
    #[serde(default)]
    pub reps: Option<i64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewWorkoutSet {
    pub session_id: RowId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<RowId>,
    pub set_number: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub completed: bool,
}

/// Session with its logged sets, shaped like an embedded select
#[derive(Debug, Clone, Serialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: WorkoutSession,
    pub workout_sets: Vec<WorkoutSetDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutSetDetail {
    #[serde(flatten)]
    pub set: WorkoutSet,
    pub exercise: Option<ExerciseSummary>,
}

/// Decode store rows into a typed model
pub fn decode_rows<T: serde::de::DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, serde_json::Error> {
    rows.into_iter().map(serde_json::from_value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_ids_accept_numbers_and_text() {
        let numeric: RowId = serde_json::from_value(json!(42)).unwrap();
        let text: RowId = serde_json::from_value(json!("a1")).unwrap();
        assert_eq!(numeric.to_string(), "42");
        assert_eq!(serde_json::to_value(&text).unwrap(), json!("a1"));
    }

    #[test]
    fn unknown_columns_survive_a_round_trip() {
        let row = json!({
            "id": 7,
            "user_id": "6f1c1f2e-8c36-4b7a-9a55-0a0b8f7c2d11",
            "name": "Push Pull Legs",
            "is_active": true
        });
        let routine: Routine = serde_json::from_value(row).unwrap();
        let back = serde_json::to_value(&routine).unwrap();
        assert_eq!(back["is_active"], true);
        assert_eq!(back["id"], "7");
    }

    #[test]
    fn empty_session_patch_is_detected() {
        assert!(SessionPatch::default().is_empty());
        let patch: SessionPatch = serde_json::from_value(json!({"rating": 4})).unwrap();
        assert!(!patch.is_empty());
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"rating": 4}));
    }
}
