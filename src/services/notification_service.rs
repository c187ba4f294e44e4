use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::error::Result;
use crate::models::application::ApplicationStatus;

/// A single outbound bot message.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    pub parse_mode: Option<&'static str>,
    pub reply_markup: Option<JsonValue>,
}

/// Delivery channel for bot messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, message: OutgoingMessage) -> Result<()>;
}

/// Which status template to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Interview,
    Accepted,
    Rejected,
    RejectedImmediately,
    Generic,
}

impl From<ApplicationStatus> for TemplateKind {
    fn from(status: ApplicationStatus) -> Self {
        match status {
            ApplicationStatus::Interview => TemplateKind::Interview,
            ApplicationStatus::Accepted => TemplateKind::Accepted,
            ApplicationStatus::Rejected => TemplateKind::Rejected,
            ApplicationStatus::RejectedImmediately => TemplateKind::RejectedImmediately,
            ApplicationStatus::Pending => TemplateKind::Generic,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdminContact {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StatusFields {
    pub vacancy_title: String,
    pub comment: Option<String>,
    pub admin: Option<AdminContact>,
}

/// Escapes the characters legacy Telegram Markdown treats as entity markers.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Renders the applicant-facing status message.
pub fn render_status_message(kind: TemplateKind, fields: &StatusFields) -> String {
    let title = escape_markdown(&fields.vacancy_title);
    let mut message = match kind {
        TemplateKind::Interview => format!(
            "Hurmatli foydalanuvchi, *{}* lavozimiga yuborgan arizangiz ma'qullandi va siz suhbatga taklif qilindingiz. Maktab ma'muriyati tez orada siz bilan bog'lanadi.",
            title
        ),
        TemplateKind::Accepted => format!(
            "Hurmatli foydalanuvchi, tabriklaymiz! *{}* lavozimiga yuborgan arizangiz qabul qilindi.",
            title
        ),
        TemplateKind::Rejected => format!(
            "Hurmatli foydalanuvchi, afsuski, *{}* lavozimiga yuborgan arizangiz rad etildi. Keyingi arizalaringizda omad tilaymiz.",
            title
        ),
        TemplateKind::RejectedImmediately => format!(
            "Hurmatli foydalanuvchi, afsuski, *{}* lavozimiga yuborgan arizangiz dastlabki ko'rib chiqishda rad etildi. Keyingi arizalaringizda omad tilaymiz.",
            title
        ),
        TemplateKind::Generic => {
            "Arizangiz holati yangilandi. Batafsil ma'lumot uchun ilovani oching.".to_string()
        }
    };

    if let Some(comment) = fields.comment.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        message.push_str(&format!(
            "\n\n*Administrator izohi:* {}",
            escape_markdown(comment)
        ));
    }

    if kind != TemplateKind::Generic {
        message.push_str(&format!("\n\n*Vakansiya:* {}", title));
        if let Some(admin) = &fields.admin {
            let name = escape_markdown(
                format!("{} {}", admin.first_name, admin.last_name).trim(),
            );
            match admin.phone_number.as_deref().filter(|p| !p.is_empty()) {
                Some(phone) => message.push_str(&format!(
                    "\n*Administrator:* {} ({})",
                    name,
                    escape_markdown(phone)
                )),
                None => message.push_str(&format!("\n*Administrator:* {}", name)),
            }
        }
    }

    message
}

pub fn render_new_application_message(
    vacancy_title: &str,
    school_name: &str,
    applicant_name: &str,
) -> String {
    format!(
        "Yangi ariza: *{}* ({}).\nNomzod: {}\nArizani ko'rib chiqish uchun administrator panelini oching.",
        escape_markdown(vacancy_title),
        escape_markdown(school_name),
        escape_markdown(applicant_name)
    )
}

#[derive(Clone)]
pub struct NotificationService {
    notifier: Arc<dyn Notifier>,
}

impl NotificationService {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Sends a status message to an applicant. Errors are returned, not retried.
    pub async fn notify(
        &self,
        recipient: i64,
        kind: TemplateKind,
        fields: &StatusFields,
    ) -> Result<()> {
        let text = render_status_message(kind, fields);
        self.notifier
            .send_message(OutgoingMessage {
                chat_id: recipient,
                text,
                parse_mode: Some("Markdown"),
                reply_markup: None,
            })
            .await
    }

    /// Tells every admin of a school about a fresh application.
    /// Returns the chat ids that could not be reached.
    pub async fn notify_new_application(
        &self,
        admin_chat_ids: &[i64],
        vacancy_title: &str,
        school_name: &str,
        applicant_name: &str,
    ) -> Vec<i64> {
        let text = render_new_application_message(vacancy_title, school_name, applicant_name);
        let mut failed = Vec::new();
        for &chat_id in admin_chat_ids {
            let res = self
                .notifier
                .send_message(OutgoingMessage {
                    chat_id,
                    text: text.clone(),
                    parse_mode: Some("Markdown"),
                    reply_markup: None,
                })
                .await;
            if let Err(e) = res {
                tracing::warn!(chat_id, error = %e, "failed to notify admin about new application");
                failed.push(chat_id);
            }
        }
        failed
    }

    /// Plain message with an inline button that opens the mini-app.
    pub async fn send_web_app_invite(
        &self,
        chat_id: i64,
        text: &str,
        button_text: &str,
        web_app_url: &str,
    ) -> Result<()> {
        let reply_markup = serde_json::json!({
            "inline_keyboard": [[
                {
                    "text": button_text,
                    "web_app": { "url": web_app_url }
                }
            ]]
        });
        self.notifier
            .send_message(OutgoingMessage {
                chat_id,
                text: text.to_string(),
                parse_mode: None,
                reply_markup: Some(reply_markup),
            })
            .await
    }

    pub async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.notifier
            .send_message(OutgoingMessage {
                chat_id,
                text: text.to_string(),
                parse_mode: None,
                reply_markup: None,
            })
            .await
    }
}
