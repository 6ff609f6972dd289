//! File upload and download handlers.
//!
//! ```text
//! POST /api/v1/uploads?filename=thesis.pdf   (raw request body)
//! GET  /api/v1/uploads/{fileRef}
//! ```

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, get, post, web};
use futures_util::StreamExt;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{Error, FileRef, MAX_UPLOAD_BYTES};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::UploadResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_file_ref};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadParams {
    /// Original file name; its extension decides whether the upload is
    /// accepted.
    pub filename: String,
}

/// Read at most one byte past the limit so the service can reject oversize
/// bodies without buffering them whole.
async fn read_capped(mut payload: web::Payload) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|err| Error::invalid_request(format!("upload aborted: {err}")))?;
        let room = (MAX_UPLOAD_BYTES + 1).saturating_sub(bytes.len());
        bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
        if bytes.len() > MAX_UPLOAD_BYTES {
            break;
        }
    }
    Ok(bytes)
}

fn content_type_for(file_ref: &FileRef) -> &'static str {
    let extension = file_ref
        .as_str()
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}

/// Store an attachment or avatar and return its reference.
///
/// The logged-in user, if any, is recorded as the uploader. Only that user
/// can attach the file; anonymous uploads are reserved for registration.
#[utoipa::path(
    post,
    path = "/api/v1/uploads",
    params(UploadParams),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "Empty, oversize, or disallowed file", body = Error)
    ),
    tags = ["uploads"],
    operation_id = "uploadFile",
    security([])
)]
#[post("/uploads")]
pub async fn upload(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<UploadParams>,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let uploader = session.user_id()?;
    let bytes = read_capped(payload).await?;
    let file_ref = state
        .uploads
        .upload(uploader, &params.filename, bytes)
        .await?;
    Ok(HttpResponse::Created().json(UploadResponse { file_ref }))
}

/// Download a stored file as an attachment. Public, like project detail.
#[utoipa::path(
    get,
    path = "/api/v1/uploads/{fileRef}",
    params(("fileRef" = String, Path, description = "Stored file reference")),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid reference", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["uploads"],
    operation_id = "downloadFile",
    security([])
)]
#[get("/uploads/{file_ref}")]
pub async fn download(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let file_ref = parse_file_ref(path.into_inner(), FieldName::new("fileRef"))?;
    let bytes = state.uploads.download(&file_ref).await?;
    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(file_ref.to_string())],
    };
    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&file_ref))
        .insert_header(disposition)
        .body(bytes))
}
