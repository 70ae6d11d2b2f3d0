// Ownership-scoped data access over the store gateway.
pub mod exercises;
pub mod profiles;
pub mod routines;
pub mod sessions;
pub mod training;

use uuid::Uuid;

use crate::database::Query;

pub use exercises::ExerciseService;
pub use profiles::ProfileService;
pub use routines::RoutineService;
pub use sessions::SessionService;

/// Rows belonging to `owner`
pub(crate) fn owned_by(owner: Uuid) -> Query {
    Query::new().eq("user_id", owner.to_string())
}
