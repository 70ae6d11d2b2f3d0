// Database gateway: the hosted store (tables + auth) behind two traits,
// with a Supabase implementation and an in-memory one.
pub mod gateway;
pub mod memory;
pub mod models;
pub mod query_builder;
pub mod supabase;

pub use gateway::{AuthProvider, AuthSession, Gateway, GatewayError, Identity};
pub use memory::MemoryStore;
pub use query_builder::{Direction, Query};
pub use supabase::SupabaseClient;
