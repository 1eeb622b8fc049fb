//! Blogsmith Mail - Deliver blog drafts by email
//!
//! Builds the outgoing message for a draft and relays it through a
//! transactional email API.
//!
//! Author: hephaex@gmail.com

use async_trait::async_trait;
use blogsmith_core::Result;
use blogsmith_export::Attachment;

pub mod mailjet;

pub use mailjet::MailjetMailer;

// ============================================================================
// Addresses
// ============================================================================

/// Whether `address` is worth handing to the mail provider
///
/// Only a shape check: a non-empty local part and domain around a single `@`.
pub fn is_deliverable_address(address: &str) -> bool {
    let address = address.trim();
    if address.chars().any(char::is_whitespace) {
        return false;
    }
    match address.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

// ============================================================================
// Messages
// ============================================================================

/// An email ready for delivery
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
    pub attachments: Vec<Attachment>,
}

impl OutgoingMail {
    /// Message carrying a generated blog post
    pub fn blog(
        to: impl Into<String>,
        topic: &str,
        blog: &str,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self {
            to: to.into().trim().to_string(),
            subject: format!("Your AI blog: {topic}"),
            text: blog.to_string(),
            html: paragraphs_html(blog),
            attachments,
        }
    }
}

/// One `<p>` element per line
fn paragraphs_html(text: &str) -> String {
    text.lines()
        .map(|line| format!("<p>{}</p>", escape_html(line)))
        .collect()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Mailer Trait
// ============================================================================

/// Provider response for an accepted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailReceipt {
    /// HTTP status returned by the provider
    pub status: u16,
    /// Provider message identifier, when reported
    pub message_id: Option<String>,
}

/// Trait for mail transports
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a message
    async fn send(&self, mail: &OutgoingMail) -> Result<MailReceipt>;

    /// Transport name for logging
    fn name(&self) -> &str;
}
