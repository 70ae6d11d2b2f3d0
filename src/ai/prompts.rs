//! Prompt templates. Pure functions of their typed inputs.

use serde::Serialize;
use serde_json::Value;

use crate::database::models::{Profile, SessionDetail};

pub const CHAT_SYSTEM_PROMPT: &str = r#"Eres Gymy, el coach de fitness experto de GymAI. Respondes SIEMPRE en español, con tono motivador, claro y profesional. No das diagnósticos médicos.

REGLA DE ORO: responde SIEMPRE con un objeto JSON con exactamente dos campos, "content" y "suggested_routine".

1. Si el usuario pide una rutina (ej: "necesito rutina de 5 días"):
   - Diseña una rutina COMPLETA para el número de días solicitado.
   - El array "days" DEBE tener un objeto por cada día (5 días = 5 objetos).
   - "content" es un saludo motivador que presenta la rutina.
2. Si el usuario solo conversa:
   - "content" es tu respuesta.
   - "suggested_routine" es null.

ESTRUCTURA JSON:
{
  "content": "...",
  "suggested_routine": {
    "name": "...",
    "goal": "...",
    "days_per_week": 5,
    "days": [
      { "day_number": 1, "name": "...", "exercises": [{ "name": "...", "sets": 3, "reps": "12", "target_weight": 50, "notes": "..." }] }
    ]
  }
}"#;

pub const ROUTINE_SYSTEM_PROMPT: &str =
    "Eres un experto en fitness que genera planes de entrenamiento estructurados y completos en JSON.";

/// Parameters of a generated routine
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineBrief {
    pub goal: String,
    pub level: String,
    pub days: u32,
    pub equipment: String,
}

pub fn routine_prompt(brief: &RoutineBrief) -> String {
    let RoutineBrief {
        goal,
        level,
        days,
        equipment,
    } = brief;

    format!(
        r#"Actúa como un entrenador de élite. Diseña una rutina de entrenamiento de ALTA DENSIDAD completa para {days} DÍAS INDEPENDIENTES.

PARÁMETROS:
- Objetivo: {goal}
- Nivel: {level}
- Días de entrenamiento: {days}
- Equipo: {equipment}

REQUISITOS CRÍTICOS:
1. El array "days" DEBE tener exactamente {days} objetos, uno por cada día de entrenamiento.
2. Cada día lleva un "day_number" correlativo (1, 2, 3...).
3. Cada día tiene un enfoque distinto según el objetivo.
4. Cada día DEBE incluir de 6 a 8 ejercicios con "name", "sets", "reps" (ej: "10-12"), "target_weight" (kg, numérico) y "notes".

ESTRUCTURA JSON OBLIGATORIA:
{{
  "name": "Nombre motivador de la rutina",
  "goal": "{goal}",
  "days_per_week": {days},
  "days": [
    {{
      "day_number": 1,
      "name": "Enfoque del día",
      "exercises": [
        {{ "name": "Ejercicio", "sets": 3, "reps": "12", "target_weight": 40, "notes": "...", "muscle_group": "..." }}
      ]
    }}
  ]
}}"#
    )
}

#[derive(Serialize)]
struct SessionSummary<'a> {
    fecha: Option<&'a str>,
    sets: Vec<SetSummary>,
}

#[derive(Serialize)]
struct SetSummary {
    exercise_id: Option<String>,
    weight: Option<f64>,
    reps: Option<i64>,
    completed: Option<bool>,
}

/// Session history as the compact JSON embedded in the analysis prompt
pub fn history_json(history: &[SessionDetail]) -> Value {
    let summaries: Vec<SessionSummary> = history
        .iter()
        .map(|detail| SessionSummary {
            fecha: detail.session.started_at.as_deref(),
            sets: detail
                .workout_sets
                .iter()
                .map(|s| SetSummary {
                    exercise_id: s.set.exercise_id.as_ref().map(ToString::to_string),
                    weight: s.set.weight,
                    reps: s.set.reps,
                    completed: s.set.completed,
                })
                .collect(),
        })
        .collect();

    serde_json::to_value(summaries).unwrap_or(Value::Null)
}

pub fn progress_prompt(profile: &Profile, history: &[SessionDetail]) -> String {
    let goal = profile.goal.as_deref().unwrap_or("General");
    let level = profile.fitness_level.as_deref().unwrap_or("Principiante");

    format!(
        r#"Actúa como un coach de fitness experto. Analiza estos datos de entrenamiento.
Perfil: Objetivo {goal}, Nivel {level}.
Datos: {history}

Responde ÚNICAMENTE en JSON:
{{
  "status": "progressing" | "stalled" | "inconsistent",
  "analysis": "...",
  "safety_warning": "...",
  "suggestion": "...",
  "recommended_changes": [],
  "automatic_apply_available": true
}}"#,
        history = history_json(history)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{WorkoutSession, WorkoutSet, WorkoutSetDetail};
    use serde_json::{json, Map};
    use uuid::Uuid;

    fn brief(days: u32) -> RoutineBrief {
        RoutineBrief {
            goal: "Hipertrofia".into(),
            level: "Intermedio".into(),
            days,
            equipment: "Mancuernas".into(),
        }
    }

    #[test]
    fn routine_prompt_pins_the_day_count() {
        let prompt = routine_prompt(&brief(5));
        assert!(prompt.contains("exactamente 5 objetos"));
        assert!(prompt.contains("\"days_per_week\": 5"));
        assert!(prompt.contains("Equipo: Mancuernas"));
        assert!(prompt.contains("de 6 a 8 ejercicios"));
    }

    #[test]
    fn progress_prompt_embeds_profile_and_sets() {
        let profile = Profile {
            id: Uuid::new_v4(),
            goal: Some("Fuerza".into()),
            fitness_level: None,
            extra: Map::new(),
        };
        let session: WorkoutSession = serde_json::from_value(json!({
            "id": "s1",
            "user_id": profile.id,
            "started_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        let set: WorkoutSet = serde_json::from_value(json!({
            "id": "w1", "session_id": "s1", "exercise_id": 9, "weight": 80.0, "reps": 5, "completed": true
        }))
        .unwrap();
        let history = vec![SessionDetail {
            session,
            workout_sets: vec![WorkoutSetDetail { set, exercise: None }],
        }];

        let prompt = progress_prompt(&profile, &history);
        assert!(prompt.contains("Objetivo Fuerza, Nivel Principiante"));
        assert!(prompt.contains("\"fecha\":\"2024-05-01T10:00:00Z\""));
        assert_eq!(history_json(&history)[0]["sets"][0]["exercise_id"], "9");
    }
}
