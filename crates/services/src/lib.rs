#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod exercise;
pub mod progress_service;

pub use mastery_core::Clock;

pub use app_services::AppServices;
pub use config::ServicesConfig;
pub use error::{AppServicesError, ConfigError, ExerciseError, ProgressServiceError};
pub use exercise::{Exercise, ExerciseAnswer, ExerciseLoopService};
pub use progress_service::{ProgressService, TaskReport};
