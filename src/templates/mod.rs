//! Message templates: references for sending, definitions for review,
//! and the management endpoint.

mod model;
mod service;

#[cfg(test)]
mod templates_tests;

pub use model::{
    ComponentDefinition, ComponentType, Currency, DateTime, MAX_TEMPLATE_NAME_CHARS,
    MAX_TEXT_PARAMETER_CHARS, MediaParameter, Template, TemplateCategory, TemplateComponent,
    TemplateInfo, TemplateLanguage, TemplateParameter, TemplateRequest, TemplateStatus,
};
pub use service::{TemplateCreated, Templates};
