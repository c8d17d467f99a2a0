//! Template references, definitions and management records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::messages::MediaSource;

/// Longest template name, in characters.
pub const MAX_TEMPLATE_NAME_CHARS: usize = 512;
/// Longest text parameter, in characters.
pub const MAX_TEXT_PARAMETER_CHARS: usize = 32_768;

fn check_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("template.name", "must not be empty"));
    }
    if name.chars().count() > MAX_TEMPLATE_NAME_CHARS {
        return Err(Error::validation(
            "template.name",
            format!("must be at most {MAX_TEMPLATE_NAME_CHARS} characters"),
        ));
    }
    Ok(name.to_lowercase())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateLanguage {
    /// Locale code such as `en_US`
    pub code: String,
}

/// A reference to an approved template, filled with parameters.
///
/// This is the `template` object of a template message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub language: TemplateLanguage,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<TemplateComponent>,
}

impl Template {
    /// Creates a template reference with no parameters.
    ///
    /// The name is trimmed and lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the name is blank or longer than
    /// [`MAX_TEMPLATE_NAME_CHARS`], or the language code is blank.
    pub fn new(name: &str, language_code: &str) -> Result<Self> {
        let template = Self {
            name: check_name(name)?,
            language: TemplateLanguage {
                code: language_code.trim().to_string(),
            },
            components: Vec::new(),
        };
        template.validate()?;
        Ok(template)
    }

    /// Adds a component.
    #[must_use]
    pub fn with_component(mut self, component: TemplateComponent) -> Self {
        self.components.push(component);
        self
    }

    /// Checks name, language and parameter limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        check_name(&self.name)?;
        if self.language.code.trim().is_empty() {
            return Err(Error::validation("template.language", "code must not be empty"));
        }

        for parameter in self.components.iter().flat_map(|c| &c.parameters) {
            if let TemplateParameter::Text { text } = parameter {
                let len = text.chars().count();
                if len > MAX_TEXT_PARAMETER_CHARS {
                    return Err(Error::validation(
                        "template.parameters.text",
                        format!("must be at most {MAX_TEXT_PARAMETER_CHARS} characters, got {len}"),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Header,
    Body,
    Footer,
    Button,
}

/// Parameters for one part of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateComponent {
    #[serde(rename = "type")]
    pub kind: ComponentType,
    /// Button kind (`quick_reply`, `url`) for button components
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    /// Button position for button components
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default)]
    pub parameters: Vec<TemplateParameter>,
}

impl TemplateComponent {
    #[must_use]
    pub const fn header(parameters: Vec<TemplateParameter>) -> Self {
        Self {
            kind: ComponentType::Header,
            sub_type: None,
            index: None,
            parameters,
        }
    }

    #[must_use]
    pub const fn body(parameters: Vec<TemplateParameter>) -> Self {
        Self {
            kind: ComponentType::Body,
            sub_type: None,
            index: None,
            parameters,
        }
    }

    #[must_use]
    pub fn button(sub_type: impl Into<String>, index: u32, parameters: Vec<TemplateParameter>) -> Self {
        Self {
            kind: ComponentType::Button,
            sub_type: Some(sub_type.into()),
            index: Some(index),
            parameters,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub fallback_value: String,
    /// ISO 4217 code
    pub code: String,
    /// Amount times 1000
    pub amount_1000: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTime {
    pub fallback_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaParameter {
    #[serde(flatten)]
    pub source: MediaSource,
}

/// A value substituted into a template placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemplateParameter {
    Text { text: String },
    Currency { currency: Currency },
    DateTime { date_time: DateTime },
    Image { image: MediaParameter },
    Video { video: MediaParameter },
    Document { document: MediaParameter },
    /// Quick-reply button payload
    Payload { payload: String },
}

impl TemplateParameter {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text { text: value.into() }
    }

    #[must_use]
    pub const fn image(source: MediaSource) -> Self {
        Self::Image {
            image: MediaParameter { source },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateCategory {
    Authentication,
    Marketing,
    Utility,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateStatus {
    Approved,
    Pending,
    Rejected,
    Disabled,
    InAppeal,
    PendingDeletion,
    Deleted,
    LimitExceeded,
    Paused,
    #[serde(other)]
    Unknown,
}

/// One component of a template definition submitted for review.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentDefinition {
    /// `HEADER`, `BODY`, `FOOTER` or `BUTTONS`
    #[serde(rename = "type")]
    pub kind: String,
    /// Header format (`TEXT`, `IMAGE`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Value>,
}

impl ComponentDefinition {
    /// A `BODY` component with the given text.
    #[must_use]
    pub fn body(text: impl Into<String>) -> Self {
        Self {
            kind: "BODY".to_string(),
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

/// Body of `POST {business_account_id}/message_templates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRequest {
    pub name: String,
    pub category: TemplateCategory,
    pub language: String,
    pub components: Vec<ComponentDefinition>,
}

impl TemplateRequest {
    /// Creates a definition. The name is trimmed and lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the name is blank, too long, or
    /// contains anything but letters, digits and underscores, or if the
    /// language is blank.
    pub fn new(
        name: &str,
        category: TemplateCategory,
        language: &str,
        components: Vec<ComponentDefinition>,
    ) -> Result<Self> {
        let name = check_name(name)?;
        if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(Error::validation(
                "template.name",
                "may only contain letters, numbers, and underscores",
            ));
        }
        if language.trim().is_empty() {
            return Err(Error::validation("template.language", "must not be empty"));
        }

        Ok(Self {
            name,
            category,
            language: language.trim().to_string(),
            components,
        })
    }
}

/// A template as listed by the management API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub status: TemplateStatus,
    #[serde(default)]
    pub category: Option<TemplateCategory>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub components: Vec<Value>,
    #[serde(default)]
    pub rejected_reason: Option<String>,
}

impl TemplateInfo {
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status == TemplateStatus::Approved
    }
}
