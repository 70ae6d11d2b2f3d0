use std::sync::Arc;

use uuid::Uuid;

use super::owned_by;
use crate::database::models::{decode_rows, Exercise, ExercisePatch, NewExercise, EXERCISES};
use crate::database::{Direction, Gateway, GatewayError};

const DEFAULT_MUSCLE_GROUP: &str = "General";
const DEFAULT_DESCRIPTION: &str = "Generado por IA";

pub struct ExerciseService {
    store: Arc<dyn Gateway>,
}

impl ExerciseService {
    pub fn new(store: Arc<dyn Gateway>) -> Self {
        Self { store }
    }

    /// Owner's exercise catalogue, alphabetical
    pub async fn list(&self, owner: Uuid) -> Result<Vec<Exercise>, GatewayError> {
        let query = owned_by(owner).order("name", Direction::Asc);
        Ok(decode_rows(self.store.select(EXERCISES, &query).await?)?)
    }

    pub async fn create(&self, exercise: NewExercise) -> Result<Exercise, GatewayError> {
        let row = self
            .store
            .insert_one(EXERCISES, serde_json::to_value(&exercise)?)
            .await?;
        Ok(serde_json::from_value(row)?)
    }

    pub async fn update(&self, owner: Uuid, id: &str, patch: ExercisePatch) -> Result<(), GatewayError> {
        if patch.is_empty() {
            return Ok(());
        }
        let query = owned_by(owner).eq("id", id);
        self.store
            .update(EXERCISES, &query, serde_json::to_value(&patch)?)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, owner: Uuid, id: &str) -> Result<(), GatewayError> {
        self.store.delete(EXERCISES, &owned_by(owner).eq("id", id)).await?;
        Ok(())
    }

    /// Case-insensitive name match within the owner's catalogue
    pub async fn find_by_name(&self, owner: Uuid, name: &str) -> Result<Option<Exercise>, GatewayError> {
        let query = owned_by(owner).ilike("name", name);
        match self.store.select_first(EXERCISES, &query).await? {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    /// Reuse an exercise with the same name or add one to the catalogue
    pub async fn find_or_create(
        &self,
        owner: Uuid,
        name: &str,
        muscle_group: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Exercise, GatewayError> {
        match self.find_by_name(owner, name).await {
            Ok(Some(existing)) => return Ok(existing),
            Ok(None) => {}
            Err(e) => tracing::warn!("exercise lookup for '{}' failed, creating: {}", name, e),
        }

        let non_empty = |s: Option<&str>| s.filter(|s| !s.is_empty()).map(str::to_string);
        tracing::debug!("adding '{}' to the catalogue of {}", name, owner);
        self.create(NewExercise {
            user_id: owner,
            name: name.to_string(),
            muscle_group: Some(non_empty(muscle_group).unwrap_or_else(|| DEFAULT_MUSCLE_GROUP.to_string())),
            equipment: None,
            description: Some(non_empty(notes).unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string())),
            video_url: None,
        })
        .await
    }
}
