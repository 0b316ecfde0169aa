pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::MediatorConfig;

pub use crate::core::{HandlerModule, HandlerRegistry, Mediator, Pipeline, PublishReport, RegistryBuilder};
pub use crate::domain::model::{TypeIdentity, ValidationFailure, ValidationResult};
pub use crate::domain::ports::{Notification, NotificationHandler, Request, RequestHandler, Validator};
pub use crate::utils::error::{MediatorError, Result};
