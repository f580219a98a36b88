//! `licwarden-api` — HTTP surface over the allocation, registry and report
//! services.

pub mod app;
