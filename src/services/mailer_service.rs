//! services/mailer_service.rs

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::smtp_config::SmtpConfig;

/// Transporte de correo que consume el worker de despacho.
/// Es un trait object para poder sustituirlo por un mock en tests.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(
        &self,
        to_email: &str,
        to_name: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<()>;
}

pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    send_timeout: Duration,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let from: Mailbox = format!("{} <{}>", config.from_name, config.user)
            .parse()
            .context("Invalid from address")?;

        let tls_params = TlsParameters::new(config.host.clone())?;
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.pass.clone()))
            .tls(Tls::Required(tls_params))
            .build();

        Ok(SmtpMailer {
            mailer,
            from,
            send_timeout: Duration::from_secs(30),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(
        &self,
        to_email: &str,
        to_name: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<()> {
        let to: Mailbox = if to_name.trim().is_empty() {
            to_email.parse().context("Invalid recipient address")?
        } else {
            format!("{} <{}>", to_name, to_email)
                .parse()
                .context("Invalid recipient address")?
        };

        let html_part = SinglePart::builder()
            .header(ContentType::parse("text/html; charset=utf-8")?)
            .body(html_body.to_string());

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .singlepart(html_part)?;

        // El timeout acota la latencia del relay; pasado el límite el envío
        // cuenta como fallo.
        tokio::time::timeout(self.send_timeout, self.mailer.send(message))
            .await
            .context("SMTP send timed out")??;

        Ok(())
    }
}
