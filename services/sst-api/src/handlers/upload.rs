//! Multipart upload and render.
//!
//! `POST /upload` takes two file parts, `map` (base image) and `zip`
//! (archive with one `.grid` entry), saves them into a per-request
//! workspace and returns the rendered heatmap as `image/png`.

use axum::{
    body::Body,
    extract::{Extension, Multipart},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncWriteExt, ReadBuf};
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::render::RenderJob;
use crate::state::AppState;
use crate::workspace::RequestWorkspace;

/// Multipart field holding the base map.
pub const MAP_FIELD: &str = "map";
/// Multipart field holding the grid archive.
pub const ZIP_FIELD: &str = "zip";
/// Response header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const OUTPUT_FILE: &str = "heatmap.png";

/// POST /upload - Render a heatmap from an uploaded base map and grid archive
pub async fn upload_handler(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Multipart,
) -> Response {
    let start = Instant::now();
    counter!("sst_render_requests_total").increment(1);

    let result = handle_upload(state, multipart).await;
    histogram!("sst_render_duration_ms").record(start.elapsed().as_millis() as f64);

    match result {
        Ok(response) => response,
        Err(e) => {
            counter!(
                "sst_render_failures_total",
                "status" => e.http_status_code().to_string()
            )
            .increment(1);
            e.into_response()
        }
    }
}

/// Rendered PNG read back from the workspace.
///
/// Owns the workspace so the directory outlives the response body and is
/// removed once the body has been sent or dropped.
struct WorkspaceFile {
    file: tokio::fs::File,
    _workspace: RequestWorkspace,
}

impl AsyncRead for WorkspaceFile {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().file).poll_read(cx, buf)
    }
}

async fn handle_upload(state: Arc<AppState>, mut multipart: Multipart) -> ApiResult<Response> {
    // Dropped on every error path, which removes the uploaded files
    let workspace = RequestWorkspace::create(&state.config.work_dir)?;
    let request_id = workspace.id();
    info!(request_id = %request_id, "Received upload");

    let mut map_path: Option<PathBuf> = None;
    let mut zip_path: Option<PathBuf> = None;
    let mut seen_map = false;
    let mut seen_zip = false;

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let seen = match name.as_str() {
            MAP_FIELD => &mut seen_map,
            ZIP_FIELD => &mut seen_zip,
            _ => {
                warn!(request_id = %request_id, field = %name, "Ignoring unknown upload field");
                continue;
            }
        };
        if *seen {
            return Err(ApiError::DuplicateInput(name));
        }
        *seen = true;

        let path = workspace.file(&name);
        let mut file = tokio::fs::File::create(&path).await?;
        let mut written = 0usize;
        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;

        info!(
            request_id = %request_id,
            field = %name,
            file_name = ?field.file_name(),
            bytes = written,
            "Saved upload field"
        );

        // An empty part is what browsers send for an unselected file input
        if written == 0 {
            continue;
        }
        if name == MAP_FIELD {
            map_path = Some(path);
        } else {
            zip_path = Some(path);
        }
    }

    let job = RenderJob {
        map_path: map_path.ok_or_else(|| ApiError::MissingInput(MAP_FIELD.to_string()))?,
        zip_path: zip_path.ok_or_else(|| ApiError::MissingInput(ZIP_FIELD.to_string()))?,
    };

    let out_path = workspace.file(OUTPUT_FILE);
    let render_state = state.clone();
    let render_path = out_path.clone();
    tokio::task::spawn_blocking(move || job.render_to_file(&render_state.config, &render_path))
        .await??;

    let file = tokio::fs::File::open(&out_path).await?;
    let len = file.metadata().await?.len();
    info!(request_id = %request_id, bytes = len, "Returning heatmap");

    let body = Body::from_stream(ReaderStream::new(WorkspaceFile {
        file,
        _workspace: workspace,
    }));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/png")
        .header(header::CONTENT_LENGTH, len)
        .header(REQUEST_ID_HEADER, request_id.to_string())
        .body(body)
        .map_err(|e| ApiError::Internal(e.to_string()))
}
