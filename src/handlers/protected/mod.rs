// handlers/protected/mod.rs - Endpoints behind the bearer-token guard
//
// Every handler here receives `Extension<AuthUser>` and scopes its store
// access to that identity.
pub mod ai;
pub mod exercises;
pub mod routines;
pub mod sessions;
pub mod training;
