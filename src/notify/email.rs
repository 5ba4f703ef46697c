use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{NotificationEvent, Notifier};

pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailNotifier {
    /// Build from SMTP_HOST / SMTP_USER / SMTP_PASS / NOTIFY_EMAIL_FROM.
    /// Returns `None` (channel disabled) when any of them is missing or
    /// unusable, so a dev setup without SMTP still runs.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?;
        let user = std::env::var("SMTP_USER").ok()?;
        let pass = std::env::var("SMTP_PASS").ok()?;
        let from_addr = std::env::var("NOTIFY_EMAIL_FROM").ok()?;

        let relay = match AsyncSmtpTransport::<Tokio1Executor>::relay(&host) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "invalid SMTP_HOST, email channel disabled");
                return None;
            }
        };
        let from: Mailbox = match from_addr.parse() {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, "invalid NOTIFY_EMAIL_FROM, email channel disabled");
                return None;
            }
        };

        let mailer = relay.credentials(Credentials::new(user, pass)).build();
        Some(Self { mailer, from })
    }

    fn render(ev: &NotificationEvent) -> (&str, String, String) {
        match ev {
            NotificationEvent::MonitoringActivated {
                to_email,
                edital_identifier,
                source_url,
                keywords,
                ..
            } => (
                to_email.as_str(),
                format!("Edital Watch: monitoramento de \"{edital_identifier}\" ativo"),
                format!(
                    "Seu monitoramento está ativo.\n\n\
                     Edital: {edital_identifier}\n\
                     Palavras-chave monitoradas: {}\n\
                     Fonte: {source_url}\n",
                    keywords.join(", ")
                ),
            ),
            NotificationEvent::OccurrenceFound {
                to_email,
                edital_identifier,
                source_url,
                matched_keywords,
                ts,
                ..
            } => (
                to_email.as_str(),
                format!("Edital Watch: nova ocorrência no edital \"{edital_identifier}\""),
                format!(
                    "Encontramos novas ocorrências no diário monitorado.\n\n\
                     Edital: {edital_identifier}\n\
                     Palavras-chave encontradas: {}\n\
                     Fonte: {source_url}\n\
                     Detectado em: {}\n",
                    matched_keywords.join(", "),
                    ts.to_rfc3339()
                ),
            ),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, ev: &NotificationEvent) -> Result<()> {
        let (to, subject, body) = Self::render(ev);
        let to: Mailbox = to.parse().context("parse recipient address")?;

        let msg = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body)
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }
}
