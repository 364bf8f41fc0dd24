//! Outgoing e-mail.
//!
//! Providers:
//! - `console`: logs the message instead of sending (development)
//! - `graph`: sends through Microsoft Graph with client-credentials auth
//!
//! Sending is always a side effect of some core mutation that already
//! committed, so callers log failures and move on instead of propagating.

use base64::Engine;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::EmailConfig;
use domain::models::Ticket;

const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

/// A file attached to an outgoing message.
#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub nome: String,
    pub tipo_mime: String,
    pub conteudo: Vec<u8>,
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub body_html: String,
    pub attachments: Vec<EmailAttachment>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Email service for ticket lifecycle mail.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    client: reqwest::Client,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            config: Arc::new(config),
            client,
            token: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Address of the IT team, when configured.
    pub fn ti_address(&self) -> Option<&str> {
        (!self.config.ti_address.is_empty()).then_some(self.config.ti_address.as_str())
    }

    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                to = ?message.to,
                subject = %message.subject,
                "Email service disabled, skipping send"
            );
            return Ok(());
        }

        match self.config.provider.as_str() {
            "console" => {
                info!(
                    to = ?message.to,
                    subject = %message.subject,
                    attachments = message.attachments.len(),
                    "[console email] {}",
                    message.body_html
                );
                Ok(())
            }
            "graph" => self.send_graph(message).await,
            provider => {
                error!(provider = %provider, "Unknown email provider");
                Err(EmailError::NotConfigured)
            }
        }
    }

    async fn send_graph(&self, message: EmailMessage) -> Result<(), EmailError> {
        let token = self.access_token().await?;

        let recipients: Vec<_> = message
            .to
            .iter()
            .map(|addr| json!({"emailAddress": {"address": addr}}))
            .collect();
        let attachments: Vec<_> = message
            .attachments
            .iter()
            .map(|a| {
                json!({
                    "@odata.type": "#microsoft.graph.fileAttachment",
                    "name": a.nome,
                    "contentType": a.tipo_mime,
                    "contentBytes": base64::engine::general_purpose::STANDARD.encode(&a.conteudo),
                })
            })
            .collect();

        let body = json!({
            "message": {
                "subject": message.subject,
                "body": {"contentType": "HTML", "content": message.body_html},
                "toRecipients": recipients,
                "attachments": attachments,
            },
            "saveToSentItems": true,
        });

        let url = format!(
            "https://graph.microsoft.com/v1.0/users/{}/sendMail",
            self.config.sender
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(EmailError::SendFailed(format!("{}: {}", status, detail)));
        }
        Ok(())
    }

    /// Client-credentials token, cached until shortly before expiry.
    async fn access_token(&self) -> Result<String, EmailError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        let url = format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            self.config.tenant_id
        );
        let response = self
            .client
            .post(&url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("scope", GRAPH_SCOPE),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await
            .map_err(|e| EmailError::AuthFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EmailError::AuthFailed(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| EmailError::AuthFailed(e.to_string()))?;
        let value = payload["access_token"]
            .as_str()
            .ok_or_else(|| EmailError::AuthFailed("missing access_token".into()))?
            .to_string();
        let expires_in = payload["expires_in"].as_u64().unwrap_or(3600);

        // Renew a minute early so an in-flight send never carries a token
        // that expires mid-request.
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + Duration::from_secs(expires_in.saturating_sub(60)),
        });
        Ok(value)
    }
}

/// Body of the mail announcing a newly opened ticket.
pub fn build_ticket_opened(ticket: &Ticket) -> (String, String) {
    let subject = format!("Chamado {} aberto - {}", ticket.codigo, ticket.problema);
    let body = format!(
        r#"<html><body style="font-family: Arial, sans-serif;">
<h2>Novo chamado aberto</h2>
<table cellpadding="6" style="border-collapse: collapse;">
  <tr><td><b>Código</b></td><td>{codigo}</td></tr>
  <tr><td><b>Protocolo</b></td><td>{protocolo}</td></tr>
  <tr><td><b>Solicitante</b></td><td>{solicitante} ({cargo})</td></tr>
  <tr><td><b>Unidade</b></td><td>{unidade}</td></tr>
  <tr><td><b>Problema</b></td><td>{problema}</td></tr>
  <tr><td><b>Descrição</b></td><td>{descricao}</td></tr>
</table>
<p>Acompanhe o andamento pelo protocolo acima.</p>
</body></html>"#,
        codigo = ticket.codigo,
        protocolo = ticket.protocolo,
        solicitante = ticket.solicitante,
        cargo = ticket.cargo,
        unidade = ticket.unidade,
        problema = ticket.problema,
        descricao = ticket.descricao.as_deref().unwrap_or("-"),
    );
    (subject, body)
}

/// Body of the mail announcing a status change.
pub fn build_status_updated(ticket: &Ticket, anterior: &str) -> (String, String) {
    let subject = format!(
        "Chamado {} atualizado: {}",
        ticket.codigo,
        ticket.status.as_str()
    );
    let body = format!(
        r#"<html><body style="font-family: Arial, sans-serif;">
<h2>Chamado atualizado</h2>
<p>O chamado <b>{codigo}</b> ({problema}) mudou de status:</p>
<p style="font-size: 16px;">{anterior} &rarr; <b>{novo}</b></p>
</body></html>"#,
        codigo = ticket.codigo,
        problema = ticket.problema,
        anterior = anterior,
        novo = ticket.status.as_str(),
    );
    (subject, body)
}
