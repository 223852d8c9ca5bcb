#![forbid(unsafe_code)]
//! Persistence for task progress and finished task results.

pub mod repository;
pub mod sqlite;
