use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::materials::{MaterialLink, MaterialsError, MaterialsResult};

/// File name a material is stored under: the URL's last path segment when it
/// is a `.pdf`, otherwise `lecture_<index>.pdf`.
pub fn file_name_for(link: &MaterialLink, index: usize) -> String {
    link.url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| name.to_lowercase().ends_with(".pdf"))
        .map(str::to_string)
        .unwrap_or_else(|| format!("lecture_{index}.pdf"))
}

/// Fetches a PDF; non-PDF responses are `Ok(None)`.
async fn fetch_pdf(client: &reqwest::Client, link: &MaterialLink) -> MaterialsResult<Option<Vec<u8>>> {
    let response = client
        .get(link.url.clone())
        .send()
        .await
        .map_err(|e| MaterialsError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(MaterialsError::Network(format!("{} returned {status}", link.url)));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_lowercase();
    if !content_type.contains("pdf") && !link.url.path().to_lowercase().ends_with(".pdf") {
        tracing::warn!("{} does not look like a pdf ({content_type})", link.url);
        return Ok(None);
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| MaterialsError::Network(e.to_string()))?;
    Ok(Some(bytes.to_vec()))
}

/// Downloads one week's materials into `week_dir`. Existing files are kept,
/// failed downloads are logged and skipped. Returns the written paths.
#[tracing::instrument(skip(client, links))]
pub async fn download_week(
    client: &reqwest::Client,
    week_dir: &Path,
    links: &[MaterialLink],
    delay: Duration,
) -> MaterialsResult<Vec<PathBuf>> {
    tokio::fs::create_dir_all(week_dir).await?;
    let mut written = Vec::new();

    for (i, link) in links.iter().enumerate() {
        let path = week_dir.join(file_name_for(link, i + 1));
        if tokio::fs::try_exists(&path).await? {
            tracing::info!("already exists: {}", path.display());
            continue;
        }

        match fetch_pdf(client, link).await {
            Ok(Some(bytes)) => {
                tokio::fs::write(&path, bytes).await?;
                tracing::info!("downloaded {}", path.display());
                written.push(path);
                tokio::time::sleep(delay).await;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("error downloading {}: {e}", link.url),
        }
    }

    Ok(written)
}
