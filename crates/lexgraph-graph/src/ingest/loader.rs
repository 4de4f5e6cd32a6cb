//! Loading documents from disk and over HTTP.
//!
//! PDFs go through pdf-extract (behind the `pdf` feature), wrapped in
//! `spawn_blocking` since extraction is synchronous and CPU-bound.
//! Everything else is read as UTF-8 text.

use std::path::Path;
use std::time::Duration;

use lexgraph_core::error::{LexGraphError, LexGraphResult};

/// Browser-like User-Agent; some publishers reject unknown clients.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Download timeout.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Name used when a URL has no usable file name.
pub const DEFAULT_DOWNLOAD_NAME: &str = "downloaded_document";

/// Extracted text plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    /// File name used as the source name in the graph.
    pub name: String,
    /// Detected type: `.pdf`, `.html` or `.txt`.
    pub file_type: String,
    pub text: String,
}

/// File extensions picked up by folder ingestion.
pub fn folder_extensions() -> &'static [&'static str] {
    if cfg!(feature = "pdf") {
        &["txt", "pdf"]
    } else {
        &["txt"]
    }
}

/// Read a local document.
pub async fn load_file(path: &Path) -> LexGraphResult<LoadedDocument> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(LexGraphError::document_not_found(path.display().to_string()));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let is_pdf = has_extension(&name, "pdf");

    let bytes = tokio::fs::read(path).await?;
    let text = if is_pdf {
        pdf_text(bytes).await?
    } else {
        decode_text(bytes, &name)?
    };

    Ok(LoadedDocument {
        file_type: (if is_pdf { ".pdf" } else { ".txt" }).to_string(),
        name,
        text,
    })
}

/// Build the HTTP client used for downloads.
pub fn download_client() -> LexGraphResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| LexGraphError::Internal(format!("Failed to build HTTP client: {}", e)))
}

/// Download a document and extract its text.
pub async fn download(client: &reqwest::Client, url: &str) -> LexGraphResult<LoadedDocument> {
    let parsed = url::Url::parse(url)
        .map_err(|e| LexGraphError::validation(format!("Invalid URL '{}': {}", url, e)))?;

    let response = client
        .get(parsed.clone())
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                LexGraphError::network_timeout(format!("Timed out downloading from URL: {}", e))
            } else {
                LexGraphError::network(format!("Error downloading from URL: {}", e))
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(LexGraphError::network(format!(
            "Error downloading from URL: HTTP {} for {}",
            status, url
        )));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_lowercase();

    let bytes = response
        .bytes()
        .await
        .map_err(|e| LexGraphError::network(format!("Failed to read response body: {}", e)))?;

    let base_name = url_file_name(&parsed);
    let file_type = detect_file_type(&content_type, &base_name, url);
    let name = with_extension(&base_name, file_type);

    tracing::info!("Downloaded {} ({} bytes) as {}", url, bytes.len(), name);

    let text = if file_type == ".pdf" {
        pdf_text(bytes.to_vec()).await?
    } else {
        String::from_utf8_lossy(&bytes).into_owned()
    };

    Ok(LoadedDocument {
        name,
        file_type: file_type.to_string(),
        text,
    })
}

/// Last path segment of a URL, or the default name.
fn url_file_name(url: &url::Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.to_string())
}

fn detect_file_type(content_type: &str, file_name: &str, url: &str) -> &'static str {
    if content_type.contains("pdf") || has_extension(file_name, "pdf") {
        ".pdf"
    } else if has_extension(file_name, "txt") {
        ".txt"
    } else if has_extension(file_name, "html") || has_extension(file_name, "htm") {
        ".html"
    } else if url.to_lowercase().contains("pdf") {
        ".pdf"
    } else {
        ".txt"
    }
}

/// Swap whatever extension `name` has for `file_type`.
fn with_extension(name: &str, file_type: &str) -> String {
    if name.to_lowercase().ends_with(file_type) {
        return name.to_string();
    }
    let stem = name.split('.').next().unwrap_or(name);
    format!("{}{}", stem, file_type)
}

fn has_extension(name: &str, extension: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

fn decode_text(bytes: Vec<u8>, name: &str) -> LexGraphResult<String> {
    String::from_utf8(bytes)
        .map_err(|e| LexGraphError::document(format!("'{}' is not valid UTF-8 text: {}", name, e)))
}

#[cfg(feature = "pdf")]
async fn pdf_text(bytes: Vec<u8>) -> LexGraphResult<String> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| LexGraphError::internal(format!("PDF extraction task failed: {}", e)))?
        .map_err(|e| LexGraphError::document(format!("PDF extraction failed: {}", e)))
}

#[cfg(not(feature = "pdf"))]
async fn pdf_text(_bytes: Vec<u8>) -> LexGraphResult<String> {
    Err(LexGraphError::document(
        "PDF support is disabled; enable the `pdf` feature",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.txt");
        std::fs::write(&path, "4.1 Approval from DPO is required.").unwrap();

        let doc = load_file(&path).await.unwrap();
        assert_eq!(doc.name, "policy.txt");
        assert_eq!(doc.file_type, ".txt");
        assert_eq!(doc.text, "4.1 Approval from DPO is required.");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.txt")).await.unwrap_err();
        assert_eq!(err.code().as_str(), "DOC_001");
    }

    #[tokio::test]
    async fn test_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let err = load_file(&path).await.unwrap_err();
        assert_eq!(err.code().as_str(), "DOC_002");
    }

    #[test]
    fn test_url_file_name() {
        let url = url::Url::parse("https://example.org/acts/penal_code.pdf?download=1").unwrap();
        assert_eq!(url_file_name(&url), "penal_code.pdf");

        let url = url::Url::parse("https://example.org/").unwrap();
        assert_eq!(url_file_name(&url), DEFAULT_DOWNLOAD_NAME);
    }

    #[test]
    fn test_detect_file_type() {
        assert_eq!(detect_file_type("application/pdf", "act", "https://x.org/act"), ".pdf");
        assert_eq!(detect_file_type("text/plain", "policy.TXT", "https://x.org/policy.TXT"), ".txt");
        assert_eq!(detect_file_type("text/html", "index.htm", "https://x.org/index.htm"), ".html");
        assert_eq!(
            detect_file_type("application/octet-stream", "download", "https://x.org/pdf/download"),
            ".pdf"
        );
        assert_eq!(detect_file_type("", "notes", "https://x.org/notes"), ".txt");
    }

    #[test]
    fn test_with_extension() {
        assert_eq!(with_extension("penal_code.pdf", ".pdf"), "penal_code.pdf");
        assert_eq!(with_extension("download.php", ".pdf"), "download.pdf");
        assert_eq!(with_extension(DEFAULT_DOWNLOAD_NAME, ".txt"), "downloaded_document.txt");
    }

    #[tokio::test]
    async fn test_download_rejects_invalid_url() {
        let client = download_client().unwrap();
        let err = download(&client, "not a url").await.unwrap_err();
        assert_eq!(err.code().as_str(), "VAL_001");
    }
}
