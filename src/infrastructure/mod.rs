//! Infrastructure layer - Cache backends, model artifacts, observability

pub mod cache;
pub mod model;
pub mod observability;
pub mod services;
