//! Blog drafting handler
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use blogsmith_core::{BlogDraft, SourceRef};
use blogsmith_export::render_attachments;
use blogsmith_mail::{is_deliverable_address, OutgoingMail};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use utoipa::ToSchema;

/// Draft request body
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BlogDraftRequest {
    /// Topic to write about
    #[serde(default)]
    #[schema(example = "Lease extensions for flat owners")]
    pub topic: Option<String>,

    /// Address to email the PDF and DOCX to
    #[serde(default)]
    #[schema(example = "reader@example.com")]
    pub email: Option<String>,
}

/// Index record used as context
#[derive(Debug, Serialize, ToSchema)]
pub struct SourceResponse {
    #[schema(example = "record-3")]
    pub id: String,
    #[schema(example = "lease-extension-guide.pdf")]
    pub label: String,
    #[schema(example = 0.83)]
    pub score: f32,
}

impl From<SourceRef> for SourceResponse {
    fn from(source: SourceRef) -> Self {
        Self {
            id: source.id,
            label: source.label,
            score: source.score,
        }
    }
}

/// Draft response body
#[derive(Debug, Serialize, ToSchema)]
pub struct BlogDraftResponse {
    /// Requested topic
    pub topic: String,

    /// Generated blog post
    pub blog: String,

    /// Index records the post was grounded in
    pub sources: Vec<SourceResponse>,

    /// Processing time in milliseconds
    #[schema(example = 4200)]
    pub processing_time_ms: u64,

    /// Whether the draft was handed to the mail provider
    pub emailed: bool,
}

/// Draft a blog post grounded in the embedding index
#[utoipa::path(
    post,
    path = "/api/blog-draft",
    tag = "draft",
    request_body = BlogDraftRequest,
    responses(
        (status = 200, description = "Draft generated", body = BlogDraftResponse),
        (status = 400, description = "Missing topic", body = crate::error::ApiError),
        (status = 500, description = "Blog generation failed", body = crate::error::ApiError),
        (status = 503, description = "Index not loaded", body = crate::error::ApiError)
    )
)]
pub async fn blog_draft_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BlogDraftRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable draft request body");
            BlogDraftRequest::default()
        }
    };

    let topic = match req.topic.as_deref().map(str::trim) {
        Some(topic) if !topic.is_empty() => topic.to_string(),
        _ => return Err(AppError::BadRequest("Missing topic".to_string())),
    };

    let drafter = state.drafter.clone().ok_or(AppError::Unavailable)?;

    let draft = drafter.draft(&topic).await.map_err(|err| {
        state.metrics.drafts_failed.fetch_add(1, Ordering::Relaxed);
        AppError::from(err)
    })?;
    state.metrics.drafts_generated.fetch_add(1, Ordering::Relaxed);

    let emailed = match req.email.as_deref() {
        Some(address) if is_deliverable_address(address) => {
            email_draft(&state, address, &draft).await
        }
        Some(address) => {
            tracing::warn!(address, "Ignoring undeliverable email address");
            false
        }
        None => false,
    };

    Ok(Json(BlogDraftResponse {
        topic: draft.topic,
        blog: draft.blog,
        sources: draft.sources.into_iter().map(SourceResponse::from).collect(),
        processing_time_ms: draft.processing_time_ms,
        emailed,
    }))
}

/// Render and send the draft. Failures are logged and reported as `false`.
async fn email_draft(state: &AppState, address: &str, draft: &BlogDraft) -> bool {
    let Some(mailer) = state.mailer.clone() else {
        tracing::warn!("Email requested but mail delivery is not configured");
        return false;
    };

    let topic = draft.topic.clone();
    let blog = draft.blog.clone();
    let rendered =
        tokio::task::spawn_blocking(move || render_attachments(&topic, &blog)).await;

    let attachments = match rendered {
        Ok(Ok(attachments)) => attachments,
        Ok(Err(err)) => {
            tracing::error!(error = %err, "Attachment rendering failed");
            state.metrics.emails_failed.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        Err(err) => {
            tracing::error!(error = %err, "Attachment rendering task panicked");
            state.metrics.emails_failed.fetch_add(1, Ordering::Relaxed);
            return false;
        }
    };

    let mail = OutgoingMail::blog(address, &draft.topic, &draft.blog, attachments);
    match mailer.send(&mail).await {
        Ok(receipt) => {
            tracing::info!(
                mailer = mailer.name(),
                status = receipt.status,
                "Draft emailed"
            );
            state.metrics.emails_sent.fetch_add(1, Ordering::Relaxed);
            true
        }
        Err(err) => {
            tracing::error!(mailer = mailer.name(), error = %err, "Email delivery failed");
            state.metrics.emails_failed.fetch_add(1, Ordering::Relaxed);
            false
        }
    }
}
