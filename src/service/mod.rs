//! Service layer for the sports league
//!
//! This module contains the application state, health checks and the HTTP
//! surface of the production service.

pub mod app;
pub mod health;
pub mod http;

pub use app::{AppState, ServiceError};
pub use health::{HealthCheck, HealthStatus};
pub use http::{create_router, HttpServerConfig, LeagueServer};
