//! File upload endpoint
//!
//! POST /upload-file with a multipart form:
//! - `file` (required): the file content, with a client filename
//! - `destDir` (optional): destination directory, created if missing
//! - `destFilename` (optional): name to store the file under

use std::path::{Component, Path, PathBuf};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Router,
};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the upload router with the given body bound
pub fn router(max_body_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(upload_file).fallback(|| async { AppError::MethodNotAllowed("POST") }),
        )
        .layer(DefaultBodyLimit::max(max_body_bytes))
}

/// Fields collected from one upload form
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<(String, Bytes)>,
    dest_dir: Option<String>,
    dest_filename: Option<String>,
}

async fn upload_file(State(state): State<AppState>, mut multipart: Multipart) -> Result<String> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let client_name = field.file_name().map(|s| s.to_string());
                let data = field.bytes().await.map_err(malformed)?;
                // A part without a filename is a plain value, not a file
                match client_name {
                    Some(client_name) => {
                        tracing::debug!(filename = %client_name, bytes = data.len(), "Received file field");
                        form.file = Some((client_name, data));
                    }
                    None => tracing::debug!("Ignoring file field without a filename"),
                }
            }
            "destDir" => form.dest_dir = non_empty(field.text().await.map_err(malformed)?),
            "destFilename" => {
                form.dest_filename = non_empty(field.text().await.map_err(malformed)?)
            }
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    let (client_name, data) = form.file.ok_or_else(|| {
        AppError::BadRequest("Error retrieving file from form data.".to_string())
    })?;

    let dest_dir = form
        .dest_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| state.config().upload.default_dir.clone());
    let dest_path = resolve_destination(
        &dest_dir,
        form.dest_filename.as_deref(),
        &client_name,
    )?;

    let parent = dest_path.parent().unwrap_or(&dest_dir);
    tokio::fs::create_dir_all(parent).await.map_err(|e| {
        AppError::Internal(format!(
            "Error creating destination directory {}: {}",
            parent.display(),
            e
        ))
    })?;

    let mut file = tokio::fs::File::create(&dest_path).await.map_err(|e| {
        AppError::Internal(format!(
            "Error creating file {} on server: {}",
            dest_path.display(),
            e
        ))
    })?;

    let mut source: &[u8] = &data;
    tokio::io::copy(&mut source, &mut file)
        .await
        .map_err(|e| AppError::Internal(format!("Error saving file: {}", e)))?;
    file.flush()
        .await
        .map_err(|e| AppError::Internal(format!("Error saving file: {}", e)))?;

    tracing::info!(
        path = %dest_path.display(),
        bytes = data.len(),
        "File uploaded"
    );

    Ok(format!(
        "File successfully uploaded to: {}\n",
        dest_path.display()
    ))
}

/// Work out where the upload is stored.
///
/// An explicit `dest_filename` is kept as a path relative to `dest_dir`:
/// root and drive prefixes are dropped and `..` is refused. Otherwise the
/// client's filename is reduced to its last path component.
fn resolve_destination(
    dest_dir: &Path,
    dest_filename: Option<&str>,
    client_name: &str,
) -> Result<PathBuf> {
    let relative = match dest_filename {
        Some(name) => {
            let mut relative = PathBuf::new();
            for component in Path::new(name).components() {
                match component {
                    Component::Normal(part) => relative.push(part),
                    Component::ParentDir => {
                        return Err(AppError::BadRequest(format!(
                            "Invalid destination filename: {:?}",
                            name
                        )))
                    }
                    Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
                }
            }
            relative
        }
        None => Path::new(client_name)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_default(),
    };

    if relative.as_os_str().is_empty() {
        return Err(AppError::BadRequest(
            "Error retrieving file from form data.".to_string(),
        ));
    }

    Ok(dest_dir.join(relative))
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn malformed(e: axum::extract::multipart::MultipartError) -> AppError {
    tracing::debug!("Multipart error: {}", e);
    AppError::BadRequest("Error parsing form data.".to_string())
}
