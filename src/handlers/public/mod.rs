// handlers/public/mod.rs - Endpoints reachable without a session
pub mod auth;
pub mod root;

pub use root::get as root_get;
