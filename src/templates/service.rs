//! Operations on `{business_account_id}/message_templates`.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::messages::{MessageResponse, Messages};
use crate::time::{Sleeper, TokioSleeper};
use crate::transport::{HttpClient, RequestSpec, Transport};

use super::model::{Template, TemplateInfo, TemplateRequest};

/// Template management for one business account.
///
/// Obtained from [`WhatsAppClient::templates`](crate::WhatsAppClient::templates).
#[derive(Debug)]
pub struct Templates<'a, H, S = TokioSleeper> {
    transport: &'a Transport<H, S>,
    business_account_id: &'a str,
    phone_number_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct TemplateList {
    #[serde(default)]
    data: Vec<TemplateInfo>,
}

#[derive(Debug, Deserialize)]
struct SuccessFlag {
    #[serde(default)]
    success: bool,
}

/// Reply to a template creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateCreated {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl<'a, H, S> Templates<'a, H, S> {
    pub(crate) const fn new(
        transport: &'a Transport<H, S>,
        business_account_id: &'a str,
        phone_number_id: &'a str,
    ) -> Self {
        Self {
            transport,
            business_account_id,
            phone_number_id,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/message_templates", self.business_account_id)
    }
}

impl<H: HttpClient, S: Sleeper> Templates<'_, H, S> {
    /// Lists the account's templates (first page).
    ///
    /// # Errors
    ///
    /// Returns the transport error, or [`Error::Decode`] for an unexpected
    /// reply.
    pub async fn list(&self) -> Result<Vec<TemplateInfo>> {
        let list: TemplateList = self
            .transport
            .execute_as(RequestSpec::get(self.endpoint()), "template list")
            .await?;
        Ok(list.data)
    }

    /// Submits a template for review.
    ///
    /// # Errors
    ///
    /// Returns the transport error, or [`Error::Decode`] for an unexpected
    /// reply.
    pub async fn create(&self, request: &TemplateRequest) -> Result<TemplateCreated> {
        let body =
            serde_json::to_value(request).map_err(|e| Error::validation("template", e.to_string()))?;
        let created: TemplateCreated = self
            .transport
            .execute_as(RequestSpec::post(self.endpoint()).with_json(body), "template creation")
            .await?;

        tracing::info!(name = %request.name, id = %created.id, "Template submitted");
        Ok(created)
    }

    /// Deletes every language of the template called `name`.
    ///
    /// Returns the API's `success` flag; `false` is not an error.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] for a blank name, otherwise the transport
    /// error.
    pub async fn delete(&self, name: &str) -> Result<bool> {
        if name.trim().is_empty() {
            return Err(Error::validation("template.name", "must not be empty"));
        }

        let spec = RequestSpec::delete(self.endpoint()).with_query("name", name.trim());
        let flag: SuccessFlag = self.transport.execute_as(spec, "template deletion").await?;
        Ok(flag.success)
    }

    /// Sends `template` to `to` from the client's phone number.
    ///
    /// # Errors
    ///
    /// See [`Messages::send_template`].
    pub async fn send(&self, to: &str, template: Template) -> Result<MessageResponse> {
        Messages::new(self.transport, self.phone_number_id)
            .send_template(to, template)
            .await
    }
}
