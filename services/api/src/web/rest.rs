//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the generation and download endpoints and the
//! master definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    body::Body,
    extract::{Form, Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use url::Url;
use utoipa::{OpenApi, ToSchema};
use yaydoc_core::domain::{ExitOutcome, GenerationRequest};
use yaydoc_core::ports::PortError;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        generate_handler,
        download_handler,
    ),
    components(
        schemas(GenerateForm, GenerateResponse)
    ),
    tags(
        (name = "Yaydoc API", description = "Generate documentation archives from git repositories and download them.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The form submitted to start a generation job.
///
/// Missing fields deserialize as empty and are rejected by validation.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct GenerateForm {
    pub email: String,
    pub author: String,
    pub git_url: String,
    pub doc_theme: String,
    pub doc_path: String,
    pub project_name: String,
    pub version: String,
}

impl From<GenerateForm> for GenerationRequest {
    fn from(form: GenerateForm) -> Self {
        GenerationRequest {
            email: form.email,
            author: form.author,
            git_url: form.git_url,
            doc_theme: form.doc_theme,
            doc_path: form.doc_path,
            project_name: form.project_name,
            version: form.version,
        }
    }
}

/// The response payload sent after a generation job succeeded.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponse {
    pub email: String,
    pub unique_id: String,
    pub download_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Generate documentation for a git repository.
///
/// Runs the generator to completion before responding. The returned
/// `download_url` serves the archive once this call has succeeded.
#[utoipa::path(
    post,
    path = "/generate",
    request_body(content = GenerateForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Documentation generated", body = GenerateResponse),
        (status = 400, description = "Missing or malformed request fields"),
        (status = 502, description = "The generator exited unsuccessfully"),
        (status = 504, description = "The generator exceeded its time limit"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn generate_handler(
    State(app_state): State<Arc<AppState>>,
    Form(form): Form<GenerateForm>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let completed = app_state
        .jobs
        .run(form.into())
        .await
        .map_err(port_error_response)?;

    let unique_id = completed.id.to_string();
    info!(job_id = %unique_id, email = %completed.email, "Generation job completed");

    let response = GenerateResponse {
        download_url: download_url(&completed.email, &unique_id)?,
        email: completed.email,
        unique_id,
        started_at: completed.started_at,
        finished_at: completed.finished_at,
    };
    Ok((StatusCode::OK, Json(response)))
}

/// Download a generated documentation archive.
#[utoipa::path(
    get,
    path = "/download/{email}/{unique_id}",
    responses(
        (status = 200, description = "The zip archive, sent as an attachment"),
        (status = 400, description = "Email or id is not a safe path segment"),
        (status = 404, description = "No archive exists for this email and id"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("email" = String, Path, description = "Email the job was requested with."),
        ("unique_id" = String, Path, description = "Job id returned by /generate.")
    )
)]
pub async fn download_handler(
    State(app_state): State<Arc<AppState>>,
    Path((email, unique_id)): Path<(String, String)>,
) -> Result<Response, (StatusCode, String)> {
    let path = app_state
        .artifacts
        .locate(&email, &unique_id)
        .map_err(port_error_response)?;
    let artifact = app_state
        .artifacts
        .open(&path)
        .await
        .map_err(port_error_response)?;

    let file_name = artifact
        .path
        .file_name()
        .unwrap_or("documentation.zip")
        .to_string();
    let headers = [
        (CONTENT_TYPE, "application/zip".to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ),
        (CONTENT_LENGTH, artifact.size.to_string()),
    ];

    Ok((headers, Body::from_stream(artifact.content)).into_response())
}

/// Builds `/download/<email>/<unique_id>` with each segment percent-encoded.
fn download_url(email: &str, unique_id: &str) -> Result<String, (StatusCode, String)> {
    let internal = || {
        error!("Failed to build download URL for {}", email);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };
    let mut url = Url::parse("http://localhost/").map_err(|_| internal())?;
    url.path_segments_mut()
        .map_err(|_| internal())?
        .extend(["download", email, unique_id]);
    Ok(url.path().to_string())
}

//=========================================================================================
// Error Mapping
//=========================================================================================

fn port_error_response(err: PortError) -> (StatusCode, String) {
    match err {
        PortError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        PortError::PathTraversal(msg) => {
            warn!("Rejected download path: {}", msg);
            (StatusCode::BAD_REQUEST, "Invalid email or id".to_string())
        }
        PortError::NotFound(_) => (StatusCode::NOT_FOUND, "Artifact not found".to_string()),
        PortError::GenerationFailed {
            job_id,
            outcome: outcome @ ExitOutcome::TimedOut(_),
        } => {
            error!(job_id = %job_id, "Generation job {}", outcome);
            (
                StatusCode::GATEWAY_TIMEOUT,
                format!("Generation job {} {}", job_id, outcome),
            )
        }
        PortError::GenerationFailed { job_id, outcome } => {
            error!(job_id = %job_id, "Generation job {}", outcome);
            (
                StatusCode::BAD_GATEWAY,
                format!("Generation job {} failed: {}", job_id, outcome),
            )
        }
        PortError::Unexpected(msg) => {
            error!("Unexpected error: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}
