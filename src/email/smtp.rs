//! SMTP dispatcher backed by lettre.

use super::{EmailError, InviteEmailContent, InviteNotification, NotificationDispatcher, invite_link};
use crate::core::config::{Config, SmtpConfig};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};

pub struct SmtpDispatcher {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    from_name: Option<String>,
    base_url: String,
}

impl SmtpDispatcher {
    pub fn new(smtp: &SmtpConfig, config: &Config) -> Result<Self, EmailError> {
        let mut builder = if smtp.use_tls {
            let tls_params = TlsParameters::new(smtp.host.clone())
                .map_err(|e| EmailError::InvalidConfig(format!("TLS configuration error: {e}")))?;

            // Port 465 uses implicit TLS (SMTPS), other ports use STARTTLS
            if smtp.port == 465 {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
                    .map_err(|e| EmailError::InvalidConfig(format!("SMTP relay error: {e}")))?
                    .port(smtp.port)
                    .tls(Tls::Wrapper(tls_params))
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
                    .map_err(|e| EmailError::InvalidConfig(format!("SMTP relay error: {e}")))?
                    .port(smtp.port)
                    .tls(Tls::Required(tls_params))
            }
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host).port(smtp.port)
        };

        if let (Some(user), Some(pass)) = (smtp.username.clone(), smtp.password.clone()) {
            builder = builder.credentials(Credentials::new(user, pass));
        }

        Ok(Self {
            transport: builder.build(),
            from_address: config.email_from_address.clone(),
            from_name: config.email_from_name.clone(),
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl NotificationDispatcher for SmtpDispatcher {
    async fn send(&self, invite: &InviteNotification) -> Result<(), EmailError> {
        let accept_link = invite_link(&self.base_url, &invite.token, invite.project_id);
        let content =
            InviteEmailContent::new(&invite.project_name, &invite.inviter_name, &accept_link);

        let from = match &self.from_name {
            Some(name) => format!("{} <{}>", name, self.from_address),
            None => self.from_address.clone(),
        };

        let message = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| EmailError::InvalidConfig(format!("invalid from address: {e}")))?,
            )
            .to(invite
                .to_address
                .parse()
                .map_err(|e| EmailError::SendFailed(format!("invalid recipient address: {e}")))?)
            .subject(content.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(content.text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(content.html),
                    ),
            )
            .map_err(|e| EmailError::SendFailed(format!("failed to build email: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        Ok(())
    }
}
