use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use super::exercises::ExerciseService;
use super::owned_by;
use crate::database::models::{
    decode_rows, Exercise, ExerciseSummary, NewRoutine, NewRoutineDay, NewRoutineExercise, Routine, RoutineDay,
    RoutineDayDetail, RoutineDetail, RoutineExercise, RoutineExerciseDetail, RowId, EXERCISES, ROUTINES,
    ROUTINE_DAYS, ROUTINE_EXERCISES,
};
use crate::database::{Direction, Gateway, GatewayError, Query};
use crate::types::{integer, number_or, Numeric};

/// Body of a routine creation: the header plus optional days and exercises.
///
/// Plans suggested by the coach are posted back in this shape, so numeric
/// fields accept text as well as numbers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutineDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub days_per_week: Option<Numeric>,
    #[serde(default)]
    pub days: Option<Vec<DayDraft>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DayDraft {
    #[serde(default)]
    pub day_number: Option<Numeric>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub exercises: Option<Vec<ExerciseDraft>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExerciseDraft {
    #[serde(default)]
    pub exercise_id: Option<RowId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub muscle_group: Option<String>,
    #[serde(default)]
    pub sets: Option<Numeric>,
    #[serde(default)]
    pub reps: Option<Numeric>,
    #[serde(default)]
    pub rest_seconds: Option<Numeric>,
    #[serde(default)]
    pub target_weight: Option<Numeric>,
    #[serde(default)]
    pub order_index: Option<Numeric>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ExerciseDraft {
    /// Link row with defaults for absent, zero or non-numeric values
    fn link(&self, day: &RowId, exercise: RowId, position: usize) -> NewRoutineExercise {
        NewRoutineExercise {
            routine_day_id: day.clone(),
            exercise_id: exercise,
            sets: number_or(self.sets.as_ref(), 3.0).round() as i64,
            reps: number_or(self.reps.as_ref(), 10.0).round() as i64,
            rest_seconds: number_or(self.rest_seconds.as_ref(), 60.0).round() as i64,
            target_weight: number_or(self.target_weight.as_ref(), 0.0),
            order_index: integer(self.order_index.as_ref())
                .filter(|n| *n != 0)
                .unwrap_or(position as i64),
            notes: self.notes.clone(),
        }
    }
}

pub struct RoutineService {
    store: Arc<dyn Gateway>,
    exercises: ExerciseService,
}

impl RoutineService {
    pub fn new(store: Arc<dyn Gateway>) -> Self {
        Self {
            exercises: ExerciseService::new(store.clone()),
            store,
        }
    }

    /// Owner's routines, newest first, with days and exercises
    pub async fn list(&self, owner: Uuid) -> Result<Vec<RoutineDetail>, GatewayError> {
        let query = owned_by(owner).order("created_at", Direction::Desc);
        let routines: Vec<Routine> = decode_rows(self.store.select(ROUTINES, &query).await?)?;
        self.expand(routines).await
    }

    pub async fn get(&self, owner: Uuid, id: &str) -> Result<Option<RoutineDetail>, GatewayError> {
        let query = owned_by(owner).eq("id", id);
        let Some(row) = self.store.select_first(ROUTINES, &query).await? else {
            return Ok(None);
        };
        let routine: Routine = serde_json::from_value(row)?;
        Ok(self.expand(vec![routine]).await?.pop())
    }

    /// The routine named by `id`, or the owner's newest one
    pub async fn current(&self, owner: Uuid, id: Option<&str>) -> Result<Option<RoutineDetail>, GatewayError> {
        let mut query = owned_by(owner).order("created_at", Direction::Desc);
        if let Some(id) = id {
            query = query.eq("id", id);
        }
        let Some(row) = self.store.select_first(ROUTINES, &query).await? else {
            return Ok(None);
        };
        let routine: Routine = serde_json::from_value(row)?;
        Ok(self.expand(vec![routine]).await?.pop())
    }

    /// Insert the header, then each day and its exercise links.
    ///
    /// Only the header insert is fatal. A day that fails is skipped with its
    /// exercises; an exercise that cannot be resolved or linked is skipped.
    pub async fn create(&self, owner: Uuid, draft: RoutineDraft) -> Result<Routine, GatewayError> {
        let header = NewRoutine {
            user_id: owner,
            name: draft.name,
            goal: draft.goal,
            days_per_week: integer(draft.days_per_week.as_ref()),
        };
        let row = self
            .store
            .insert_one(ROUTINES, serde_json::to_value(&header)?)
            .await?;
        let routine: Routine = serde_json::from_value(row)?;

        for day in draft.days.unwrap_or_default() {
            let new_day = NewRoutineDay {
                routine_id: routine.id.clone(),
                day_number: integer(day.day_number.as_ref()),
                name: day.name,
            };
            let day_id = match self.insert_day(&new_day).await {
                Ok(id) => id,
                Err(e) => {
                    tracing::error!("failed to create day {:?} of routine {}: {}", new_day.day_number, routine.id, e);
                    continue;
                }
            };

            for (position, exercise) in day.exercises.unwrap_or_default().iter().enumerate() {
                let Some(exercise_id) = self.resolve_exercise(owner, exercise).await else {
                    continue;
                };
                let link = exercise.link(&day_id, exercise_id, position);
                if let Err(e) = self.insert_link(&link).await {
                    tracing::error!("failed to link exercise to day {}: {}", day_id, e);
                }
            }
        }

        tracing::info!("created routine {} for {}", routine.id, owner);
        Ok(routine)
    }

    /// Delete by id and owner; deleting a missing routine is not an error
    pub async fn delete(&self, owner: Uuid, id: &str) -> Result<(), GatewayError> {
        let removed = self.store.delete(ROUTINES, &owned_by(owner).eq("id", id)).await?;
        tracing::debug!("deleted {} routine row(s) with id {}", removed.len(), id);
        Ok(())
    }

    async fn insert_day(&self, day: &NewRoutineDay) -> Result<RowId, GatewayError> {
        let row = self
            .store
            .insert_one(ROUTINE_DAYS, serde_json::to_value(day)?)
            .await?;
        let day: RoutineDay = serde_json::from_value(row)?;
        Ok(day.id)
    }

    async fn insert_link(&self, link: &NewRoutineExercise) -> Result<(), GatewayError> {
        self.store
            .insert_one(ROUTINE_EXERCISES, serde_json::to_value(link)?)
            .await?;
        Ok(())
    }

    async fn resolve_exercise(&self, owner: Uuid, draft: &ExerciseDraft) -> Option<RowId> {
        if let Some(id) = draft.exercise_id.as_ref().filter(|id| !id.0.is_empty()) {
            return Some(id.clone());
        }
        let name = draft.name.as_deref().filter(|n| !n.is_empty())?;

        match self
            .exercises
            .find_or_create(owner, name, draft.muscle_group.as_deref(), draft.notes.as_deref())
            .await
        {
            Ok(exercise) => Some(exercise.id),
            Err(e) => {
                tracing::warn!("skipping exercise '{}': {}", name, e);
                None
            }
        }
    }

    /// Attach days, exercise links and exercise names to each routine
    async fn expand(&self, routines: Vec<Routine>) -> Result<Vec<RoutineDetail>, GatewayError> {
        if routines.is_empty() {
            return Ok(Vec::new());
        }

        let query = Query::new()
            .in_list("routine_id", routines.iter().map(|r| &r.id))
            .order("day_number", Direction::Asc);
        let days: Vec<RoutineDay> = decode_rows(self.store.select(ROUTINE_DAYS, &query).await?)?;

        let links: Vec<RoutineExercise> = if days.is_empty() {
            Vec::new()
        } else {
            let query = Query::new()
                .in_list("routine_day_id", days.iter().map(|d| &d.id))
                .order("order_index", Direction::Asc);
            decode_rows(self.store.select(ROUTINE_EXERCISES, &query).await?)?
        };

        let names = self.exercise_names(links.iter().map(|l| &l.exercise_id)).await?;

        let mut links_by_day: HashMap<RowId, Vec<RoutineExerciseDetail>> = HashMap::new();
        for link in links {
            let exercise = names.get(&link.exercise_id).cloned();
            links_by_day
                .entry(link.routine_day_id.clone())
                .or_default()
                .push(RoutineExerciseDetail { link, exercise });
        }

        let mut days_by_routine: HashMap<RowId, Vec<RoutineDayDetail>> = HashMap::new();
        for day in days {
            let routine_exercises = links_by_day.remove(&day.id).unwrap_or_default();
            days_by_routine
                .entry(day.routine_id.clone())
                .or_default()
                .push(RoutineDayDetail { day, routine_exercises });
        }

        Ok(routines
            .into_iter()
            .map(|routine| RoutineDetail {
                routine_days: days_by_routine.remove(&routine.id).unwrap_or_default(),
                routine,
            })
            .collect())
    }

    async fn exercise_names<'a>(
        &self,
        ids: impl Iterator<Item = &'a RowId>,
    ) -> Result<HashMap<RowId, ExerciseSummary>, GatewayError> {
        let mut ids: Vec<&RowId> = ids.collect();
        ids.sort_by(|a, b| a.0.cmp(&b.0));
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = self.store.select(EXERCISES, &Query::new().in_list("id", ids)).await?;
        let exercises: Vec<Exercise> = decode_rows(rows)?;
        Ok(exercises.iter().map(|e| (e.id.clone(), e.summary())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use serde_json::json;

    fn service() -> (Arc<MemoryStore>, RoutineService) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), RoutineService::new(store))
    }

    fn draft(value: serde_json::Value) -> RoutineDraft {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn created_routines_read_back_with_children() {
        let (_, service) = service();
        let owner = Uuid::new_v4();

        let routine = service
            .create(
                owner,
                draft(json!({
                    "name": "Torso / Pierna",
                    "goal": "Hipertrofia",
                    "days_per_week": "2",
                    "days": [
                        {"day_number": 1, "name": "Torso", "exercises": [
                            {"name": "Press Banca", "sets": 4, "reps": "8"},
                            {"name": "Remo", "reps": "10-12", "target_weight": 40}
                        ]},
                        {"day_number": 2, "name": "Pierna", "exercises": [{"name": "Sentadilla"}]}
                    ]
                })),
            )
            .await
            .unwrap();
        assert_eq!(routine.days_per_week, Some(2));

        let detail = service.get(owner, &routine.id.to_string()).await.unwrap().unwrap();
        assert_eq!(detail.routine_days.len(), 2);
        assert_eq!(detail.routine_days[0].day.name.as_deref(), Some("Torso"));

        let torso = &detail.routine_days[0].routine_exercises;
        assert_eq!(torso.len(), 2);
        assert_eq!(torso[0].link.sets, Some(4));
        assert_eq!(torso[0].link.reps, Some(8));
        assert_eq!(torso[1].link.sets, Some(3));
        assert_eq!(torso[1].link.reps, Some(10));
        assert_eq!(torso[1].link.rest_seconds, Some(60));
        assert_eq!(torso[1].link.target_weight, Some(40.0));
        assert_eq!(torso[1].link.order_index, Some(1));
        assert_eq!(torso[0].exercise.as_ref().unwrap().name.as_deref(), Some("Press Banca"));
    }

    #[tokio::test]
    async fn known_exercises_are_reused() {
        let (store, service) = service();
        let owner = Uuid::new_v4();
        store
            .seed(EXERCISES, vec![json!({"id": "ex-1", "user_id": owner, "name": "Peso Muerto"})])
            .await;

        service
            .create(
                owner,
                draft(json!({"name": "R", "days": [{"day_number": 1, "exercises": [
                    {"name": "peso muerto"},
                    {"exercise_id": "ex-1", "name": "ignorado"}
                ]}]})),
            )
            .await
            .unwrap();

        assert_eq!(store.rows(EXERCISES).await.len(), 1);
        let links = store.rows(ROUTINE_EXERCISES).await;
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|l| l["exercise_id"] == "ex-1"));
    }

    #[tokio::test]
    async fn unnamed_exercises_without_ids_are_skipped() {
        let (store, service) = service();
        service
            .create(
                Uuid::new_v4(),
                draft(json!({"name": "R", "days": [{"day_number": 1, "exercises": [{"sets": 3}]}]})),
            )
            .await
            .unwrap();

        assert_eq!(store.rows(ROUTINE_DAYS).await.len(), 1);
        assert!(store.rows(ROUTINE_EXERCISES).await.is_empty());
    }

    #[tokio::test]
    async fn list_is_newest_first_and_scoped() {
        let (_, service) = service();
        let owner = Uuid::new_v4();
        service.create(owner, draft(json!({"name": "Vieja"}))).await.unwrap();
        service.create(owner, draft(json!({"name": "Nueva"}))).await.unwrap();
        service.create(Uuid::new_v4(), draft(json!({"name": "Ajena"}))).await.unwrap();

        let names: Vec<_> = service
            .list(owner)
            .await
            .unwrap()
            .into_iter()
            .filter_map(|d| d.routine.name)
            .collect();
        assert_eq!(names, vec!["Nueva", "Vieja"]);

        let current = service.current(owner, None).await.unwrap().unwrap();
        assert_eq!(current.routine.name.as_deref(), Some("Nueva"));
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_owner_scoped() {
        let (_, service) = service();
        let owner = Uuid::new_v4();
        let routine = service.create(owner, draft(json!({"name": "R"}))).await.unwrap();
        let id = routine.id.to_string();

        service.delete(Uuid::new_v4(), &id).await.unwrap();
        assert!(service.get(owner, &id).await.unwrap().is_some());

        service.delete(owner, &id).await.unwrap();
        service.delete(owner, &id).await.unwrap();
        assert!(service.get(owner, &id).await.unwrap().is_none());
    }
}
