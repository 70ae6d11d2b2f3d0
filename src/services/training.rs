//! Daily plan formatting and RPE-based load adjustments.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::models::{RoutineDayDetail, RoutineDetail, RowId};
use crate::types::Numeric;

pub const NO_ROUTINE_MESSAGE: &str = "No tienes rutinas activas. ¡Crea una con el Coach IA!";
const UNKNOWN_EXERCISE: &str = "Ejercicio desconocido";

/// Load change in kg suggested after a set
pub const LOAD_STEP_KG: f64 = 2.5;

/// Verdict on a reported RPE
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffortAssessment {
    pub message: &'static str,
    pub suggested_adjustment: f64,
}

/// RPE 6 or less adds load, 9 or more removes it; anything else (NaN included) keeps it
pub fn assess_effort(rpe: f64) -> EffortAssessment {
    if rpe <= 6.0 {
        EffortAssessment {
            message: "¡Demasiado fácil! El Coach sugiere subir 2.5kg en la próxima sesión.",
            suggested_adjustment: LOAD_STEP_KG,
        }
    } else if rpe >= 9.0 {
        EffortAssessment {
            message: "Entrenamiento intenso. Quizás sea mejor bajar 2.5kg para mantener la técnica perfecta.",
            suggested_adjustment: -LOAD_STEP_KG,
        }
    } else {
        EffortAssessment {
            message: "¡Buen esfuerzo!",
            suggested_adjustment: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub exercise_id: Option<Value>,
    #[serde(default)]
    pub rpe: Option<Numeric>,
    #[serde(default)]
    pub weight: Option<Numeric>,
    #[serde(default)]
    pub reps: Option<Numeric>,
    #[serde(default)]
    pub session_id: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResponse {
    pub success: bool,
    pub message: &'static str,
    pub suggested_adjustment: f64,
    pub analysis_preview: String,
}

impl FeedbackResponse {
    pub fn for_rpe(rpe: f64) -> Self {
        let assessment = assess_effort(rpe);
        Self {
            success: true,
            message: assessment.message,
            suggested_adjustment: assessment.suggested_adjustment,
            analysis_preview: format!("RPE {} detectado.", rpe),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodayExercise {
    pub id: RowId,
    pub exercise_id: RowId,
    pub name: String,
    pub sets: Option<i64>,
    pub reps: Option<i64>,
    pub weight: f64,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TodayPlan {
    NoRoutine {
        message: &'static str,
        exercises: Vec<TodayExercise>,
    },
    Planned {
        routine_name: Option<String>,
        day_name: Option<String>,
        exercises: Vec<TodayExercise>,
    },
}

impl TodayPlan {
    /// Day 1 of the routine, or its first day when none is numbered 1
    pub fn from_routine(routine: Option<&RoutineDetail>) -> Self {
        let Some(routine) = routine else {
            return TodayPlan::NoRoutine {
                message: NO_ROUTINE_MESSAGE,
                exercises: Vec::new(),
            };
        };

        let day = routine
            .routine_days
            .iter()
            .find(|d| d.day.day_number == Some(1))
            .or_else(|| routine.routine_days.first());

        TodayPlan::Planned {
            routine_name: routine.routine.name.clone(),
            day_name: day.and_then(|d| d.day.name.clone()),
            exercises: day.map(exercises_of).unwrap_or_default(),
        }
    }
}

fn exercises_of(day: &RoutineDayDetail) -> Vec<TodayExercise> {
    day.routine_exercises
        .iter()
        .map(|entry| TodayExercise {
            id: entry.link.id.clone(),
            exercise_id: entry.link.exercise_id.clone(),
            name: entry
                .exercise
                .as_ref()
                .and_then(|e| e.name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNKNOWN_EXERCISE.to_string()),
            sets: entry.link.sets,
            reps: entry.link.reps,
            weight: entry.link.target_weight.unwrap_or(0.0),
            notes: entry.link.notes.clone().unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{ExerciseSummary, RoutineExerciseDetail};
    use serde_json::json;

    #[test]
    fn rpe_thresholds() {
        assert_eq!(assess_effort(5.0).suggested_adjustment, 2.5);
        assert_eq!(assess_effort(6.0).suggested_adjustment, 2.5);
        assert_eq!(assess_effort(9.0).suggested_adjustment, -2.5);
        assert_eq!(assess_effort(10.0).suggested_adjustment, -2.5);

        let steady = assess_effort(7.0);
        assert_eq!(steady.suggested_adjustment, 0.0);
        assert_eq!(steady.message, "¡Buen esfuerzo!");

        assert_eq!(assess_effort(f64::NAN).message, "¡Buen esfuerzo!");
    }

    #[test]
    fn preview_prints_whole_numbers_plainly() {
        assert_eq!(FeedbackResponse::for_rpe(8.0).analysis_preview, "RPE 8 detectado.");
        assert_eq!(FeedbackResponse::for_rpe(7.5).analysis_preview, "RPE 7.5 detectado.");
    }

    fn routine(days: serde_json::Value) -> RoutineDetail {
        let routine = serde_json::from_value(json!({
            "id": "r1",
            "user_id": "6f1c1f2e-8c36-4b7a-9a55-0a0b8f7c2d11",
            "name": "Full Body"
        }))
        .unwrap();
        let routine_days = days
            .as_array()
            .unwrap()
            .iter()
            .map(|d| RoutineDayDetail {
                day: serde_json::from_value(d.clone()).unwrap(),
                routine_exercises: vec![RoutineExerciseDetail {
                    link: serde_json::from_value(json!({
                        "id": format!("link-{}", d["id"].as_str().unwrap()),
                        "routine_day_id": d["id"],
                        "exercise_id": 7,
                        "sets": 4,
                        "reps": 8
                    }))
                    .unwrap(),
                    exercise: Some(ExerciseSummary {
                        name: Some("Zancadas".into()),
                        muscle_group: None,
                    }),
                }],
            })
            .collect();
        RoutineDetail { routine, routine_days }
    }

    #[test]
    fn no_routine_means_an_empty_plan() {
        let value = serde_json::to_value(TodayPlan::from_routine(None)).unwrap();
        assert_eq!(value, json!({"message": NO_ROUTINE_MESSAGE, "exercises": []}));
    }

    #[test]
    fn day_one_is_preferred() {
        let detail = routine(json!([
            {"id": "d2", "routine_id": "r1", "day_number": 2, "name": "Empuje"},
            {"id": "d1", "routine_id": "r1", "day_number": 1, "name": "Tirón"}
        ]));

        let value = serde_json::to_value(TodayPlan::from_routine(Some(&detail))).unwrap();
        assert_eq!(value["routine_name"], "Full Body");
        assert_eq!(value["day_name"], "Tirón");
        assert_eq!(
            value["exercises"][0],
            json!({
                "id": "link-d1",
                "exercise_id": "7",
                "name": "Zancadas",
                "sets": 4,
                "reps": 8,
                "weight": 0.0,
                "notes": ""
            })
        );
    }

    #[test]
    fn first_day_is_the_fallback() {
        let detail = routine(json!([{"id": "d3", "routine_id": "r1", "day_number": 3, "name": "Pierna"}]));
        let value = serde_json::to_value(TodayPlan::from_routine(Some(&detail))).unwrap();
        assert_eq!(value["day_name"], "Pierna");

        let empty = routine(json!([]));
        let value = serde_json::to_value(TodayPlan::from_routine(Some(&empty))).unwrap();
        assert_eq!(value["exercises"], json!([]));
        assert!(value["day_name"].is_null());
    }
}
