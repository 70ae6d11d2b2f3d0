use std::sync::Arc;

use uuid::Uuid;

use crate::database::models::{Profile, PROFILES};
use crate::database::{Gateway, GatewayError, Query};

pub struct ProfileService {
    store: Arc<dyn Gateway>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn Gateway>) -> Self {
        Self { store }
    }

    /// The caller's profile row; a missing row is an error, not a default
    pub async fn get(&self, owner: Uuid) -> Result<Profile, GatewayError> {
        let query = Query::new().eq("id", owner.to_string());
        match self.store.select_first(PROFILES, &query).await? {
            Some(row) => Ok(serde_json::from_value(row)?),
            None => Err(GatewayError::Rejected {
                status: 406,
                message: "JSON object requested, multiple (or no) rows returned".to_string(),
            }),
        }
    }
}
