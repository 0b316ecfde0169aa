pub mod behaviors;
pub mod mediator;
pub mod pipeline;
pub mod registry;
pub mod validation;

pub use mediator::{Mediator, PublishFailure, PublishReport};
pub use pipeline::{BoxResponse, DispatchContext, Next, Pipeline, PipelineBehavior};
pub use registry::{HandlerModule, HandlerRegistry, RegistryBuilder};
pub use crate::utils::error::Result;
