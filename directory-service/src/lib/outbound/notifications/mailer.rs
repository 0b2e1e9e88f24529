use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::MailConfig;
use crate::provisioning::errors::NotificationError;
use crate::provisioning::models::NotificationTemplate;
use crate::provisioning::models::Recipient;
use crate::provisioning::ports::NotificationSender;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Template-based mail API client.
///
/// Rendering happens on the provider side; this adapter only names the
/// template and supplies its variables.
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    sender: MailAddress,
    user_welcome_template: String,
    doctor_welcome_template: String,
}

#[derive(Debug, Clone, Serialize)]
struct MailAddress {
    email: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct SendTemplateRequest<'a> {
    from: &'a MailAddress,
    to: Vec<MailAddress>,
    template_uuid: &'a str,
    template_variables: &'a serde_json::Value,
}

impl HttpMailer {
    /// # Errors
    /// * `Build` - API key missing or HTTP client could not be constructed
    pub fn new(config: &MailConfig) -> Result<Self, NotificationError> {
        if config.api_key.trim().is_empty() {
            return Err(NotificationError::Build(
                "mail api key is required".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| NotificationError::Build(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            sender: MailAddress {
                email: config.from_email.clone(),
                name: config.from_name.clone(),
            },
            user_welcome_template: config.user_welcome_template.clone(),
            doctor_welcome_template: config.doctor_welcome_template.clone(),
        })
    }

    fn template_id(&self, template: NotificationTemplate) -> &str {
        match template {
            NotificationTemplate::UserWelcome => &self.user_welcome_template,
            NotificationTemplate::DoctorWelcome => &self.doctor_welcome_template,
        }
    }
}

/// Provider's explanation for a rejection, or why it could not be read.
fn rejection_reason<E: fmt::Display>(body: Result<String, E>) -> String {
    match body {
        Ok(body) => body,
        Err(e) => format!("response body unreadable: {}", e),
    }
}

#[async_trait]
impl NotificationSender for HttpMailer {
    async fn send(
        &self,
        template: NotificationTemplate,
        recipient: &Recipient,
        variables: &serde_json::Value,
    ) -> Result<u16, NotificationError> {
        let payload = SendTemplateRequest {
            from: &self.sender,
            to: vec![MailAddress {
                email: recipient.email.as_str().to_string(),
                name: recipient.name.clone(),
            }],
            template_uuid: self.template_id(template),
            template_variables: variables,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = rejection_reason(response.text().await);
            tracing::warn!(
                status = status.as_u16(),
                ?template,
                "Mail API rejected notification"
            );
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                reason,
            });
        }

        Ok(status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: &str) -> MailConfig {
        MailConfig {
            api_url: "http://127.0.0.1:9/api/send".to_string(),
            api_key: api_key.to_string(),
            from_email: "no-reply@directory.local".to_string(),
            from_name: "Clinical Directory".to_string(),
            user_welcome_template: "user-welcome".to_string(),
            doctor_welcome_template: "doctor-welcome".to_string(),
        }
    }

    #[test]
    fn test_requires_api_key() {
        assert!(matches!(
            HttpMailer::new(&config("  ")),
            Err(NotificationError::Build(_))
        ));
    }

    #[test]
    fn test_template_ids_follow_configuration() {
        let mailer = HttpMailer::new(&config("key")).unwrap();
        assert_eq!(
            mailer.template_id(NotificationTemplate::UserWelcome),
            "user-welcome"
        );
        assert_eq!(
            mailer.template_id(NotificationTemplate::DoctorWelcome),
            "doctor-welcome"
        );
    }

    #[test]
    fn test_rejection_reason_keeps_body_read_failures() {
        assert_eq!(
            rejection_reason(Ok::<_, String>("quota exceeded".to_string())),
            "quota exceeded"
        );
        assert_eq!(
            rejection_reason(Err::<String, _>("connection reset")),
            "response body unreadable: connection reset"
        );
    }

    #[test]
    fn test_payload_shape() {
        let sender = MailAddress {
            email: "no-reply@directory.local".to_string(),
            name: "Clinical Directory".to_string(),
        };
        let variables = serde_json::json!({ "username": "drgrey" });
        let payload = SendTemplateRequest {
            from: &sender,
            to: vec![MailAddress {
                email: "a@x.com".to_string(),
                name: "drgrey".to_string(),
            }],
            template_uuid: "user-welcome",
            template_variables: &variables,
        };

        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body["to"][0]["email"], "a@x.com");
        assert_eq!(body["template_uuid"], "user-welcome");
        assert_eq!(body["template_variables"]["username"], "drgrey");
    }
}
