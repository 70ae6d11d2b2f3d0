// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth): liveness probe and /api/auth/*
// Protected (bearer token resolved by the auth service): everything else under /api/*
pub mod public;
pub mod protected;
