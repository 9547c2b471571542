/// Image export: artifact lookup, blob materialization, save trigger
use std::fmt;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, BlobPropertyBag, Element, HtmlAnchorElement, HtmlCanvasElement,
    HtmlImageElement, Response, Url,
};

use crate::target::download_filename;

// Import JS bridge functions
#[wasm_bindgen(module = "/popup.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn createTab(url: &str) -> Result<(), JsValue>;
}

/// How long the object URL stays valid after the anchor click, so the
/// save dialog can still read it.
const REVOKE_DELAY_MS: i32 = 15_000;

/// Longer window for the fallback path, where the user may keep the
/// opened tab around.
const FALLBACK_REVOKE_DELAY_MS: i32 = 60_000;

/// Export failure, tagged by stage so the UI can distinguish the
/// artifact-related cases from the later pipeline ones.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportError {
    /// Neither a canvas nor a data-URI img in the display container
    MissingArtifact,
    /// The artifact serialized to an empty data URL
    EmptyData,
    /// Blob materialization or both save paths failed
    Pipeline(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::MissingArtifact => {
                write!(f, "No QR artifact (canvas or img) found to download")
            }
            ExportError::EmptyData => write!(f, "Empty data URL read from QR artifact"),
            ExportError::Pipeline(detail) => write!(f, "{}", detail),
        }
    }
}

/// The rendered QR artifact found in the display container, resolved
/// once per export attempt.
pub enum Artifact {
    Canvas(HtmlCanvasElement),
    Image(HtmlImageElement),
    Missing,
}

/// Look for a canvas first, then an image whose src is a data URI.
pub fn resolve_artifact(container: &Element) -> Artifact {
    if let Ok(Some(canvas)) = container.query_selector("canvas") {
        if let Ok(canvas) = canvas.dyn_into::<HtmlCanvasElement>() {
            return Artifact::Canvas(canvas);
        }
    }
    if let Ok(Some(img)) = container.query_selector("img") {
        if let Ok(img) = img.dyn_into::<HtmlImageElement>() {
            if is_image_data_url(&img.src()) {
                return Artifact::Image(img);
            }
        }
    }
    Artifact::Missing
}

pub fn is_image_data_url(src: &str) -> bool {
    src.starts_with("data:image")
}

/// Serialize the artifact to a PNG data URL.
pub fn extract_data_url(artifact: &Artifact) -> Result<String, ExportError> {
    let data_url = match artifact {
        Artifact::Canvas(canvas) => canvas
            .to_data_url_with_type("image/png")
            .map_err(|e| ExportError::Pipeline(format!("Canvas serialization failed: {:?}", e)))?,
        Artifact::Image(img) => img.src(),
        Artifact::Missing => return Err(ExportError::MissingArtifact),
    };
    if data_url.is_empty() {
        return Err(ExportError::EmptyData);
    }
    Ok(data_url)
}

/// Fetch the data URL and rewrap the result as an image/png blob; the
/// source blob's type is not reliable across browsers.
async fn materialize_blob_url(data_url: &str) -> Result<String, String> {
    let window = web_sys::window().ok_or_else(|| "Window not available".to_string())?;

    let response: Response = JsFuture::from(window.fetch_with_str(data_url))
        .await
        .map_err(|e| format!("Fetch of data URL failed: {:?}", e))?
        .dyn_into()
        .map_err(|_| "Fetch did not return a Response".to_string())?;
    if !response.ok() {
        return Err(format!("Fetch of data URL failed: status {}", response.status()));
    }

    let blob: Blob = JsFuture::from(
        response
            .blob()
            .map_err(|e| format!("Failed to read blob: {:?}", e))?,
    )
    .await
    .map_err(|e| format!("Failed to read blob: {:?}", e))?
    .dyn_into()
    .map_err(|_| "Response body is not a Blob".to_string())?;

    let options = BlobPropertyBag::new();
    options.set_type("image/png");
    let parts = js_sys::Array::of1(&blob);
    let typed = Blob::new_with_blob_sequence_and_options(&parts, &options)
        .map_err(|e| format!("Failed to rewrap blob: {:?}", e))?;

    Url::create_object_url_with_blob(&typed)
        .map_err(|e| format!("Failed to create object URL: {:?}", e))
}

/// Synthesize an invisible anchor, click it, detach it.
fn trigger_anchor_download(blob_url: &str, filename: &str) -> Result<(), String> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| "Document not available".to_string())?;
    let body = document
        .body()
        .ok_or_else(|| "Document body not available".to_string())?;

    let link: HtmlAnchorElement = document
        .create_element("a")
        .map_err(|e| format!("Failed to create link: {:?}", e))?
        .dyn_into()
        .map_err(|_| "Created element is not an anchor".to_string())?;
    link.set_href(blob_url);
    link.set_download(filename);

    // Attaching first matters on Firefox
    body.append_child(&link)
        .map_err(|e| format!("Failed to attach link: {:?}", e))?;
    link.click();
    body.remove_child(&link)
        .map_err(|e| format!("Failed to detach link: {:?}", e))?;

    Ok(())
}

/// Revoke the object URL later; the browser may still be reading it.
fn schedule_revoke(blob_url: String, delay_ms: i32) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::once_into_js(move || {
        if Url::revoke_object_url(&blob_url).is_ok() {
            log::debug!("Object URL revoked");
        }
    });
    if window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            delay_ms,
        )
        .is_err()
    {
        log::warn!("Failed to schedule object URL revocation");
    }
}

/// Run the full export pipeline for whatever artifact is currently in
/// `container`. The target URL only contributes the filename.
pub async fn export_artifact(container: &Element, target: &str) -> Result<(), ExportError> {
    let artifact = resolve_artifact(container);
    let data_url = extract_data_url(&artifact)?;
    let filename = download_filename(target);

    let blob_url = materialize_blob_url(&data_url)
        .await
        .map_err(ExportError::Pipeline)?;
    log::info!("Object URL created for {}", filename);

    match trigger_anchor_download(&blob_url, &filename) {
        Ok(()) => {
            log::info!("Download triggered via link");
            schedule_revoke(blob_url, REVOKE_DELAY_MS);
            Ok(())
        }
        Err(link_err) => {
            // Last resort: open the blob in a new tab
            log::warn!("Link download failed ({}), opening in a new tab", link_err);
            match createTab(&blob_url).await {
                Ok(()) => {
                    schedule_revoke(blob_url, FALLBACK_REVOKE_DELAY_MS);
                    Ok(())
                }
                Err(tab_err) => {
                    let _ = Url::revoke_object_url(&blob_url);
                    Err(ExportError::Pipeline(format!(
                        "Failed to open blob in a new tab: {:?}",
                        tab_err
                    )))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_error_messages_are_distinct() {
        let missing = ExportError::MissingArtifact.to_string();
        let empty = ExportError::EmptyData.to_string();
        let pipeline = ExportError::Pipeline("Fetch of data URL failed".to_string()).to_string();

        assert!(missing.contains("No QR artifact"));
        assert!(empty.contains("Empty data URL"));
        assert_eq!(pipeline, "Fetch of data URL failed");
        assert_ne!(missing, empty);
    }

    #[test]
    fn test_is_image_data_url() {
        assert!(is_image_data_url("data:image/png;base64,iVBORw0KGgo="));
        assert!(is_image_data_url("data:image/gif;base64,R0lGOD"));
        assert!(!is_image_data_url("https://example.com/qr.png"));
        assert!(!is_image_data_url("data:text/plain,hello"));
        assert!(!is_image_data_url(""));
    }
}
