/// Popup UI for the Tab QR extension

use yew::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use patternfly_yew::prelude::*;
use web_sys::{Element, HtmlInputElement};
use crate::export;
use crate::render;
use crate::settings::{self, QrSettings, SIZE_MAX, SIZE_MIN};
use crate::target::is_encodable_url;

// Import JS bridge functions
#[wasm_bindgen(module = "/popup.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getActiveTabUrl() -> Result<JsValue, JsValue>;
}

#[function_component(App)]
pub fn app() -> Html {
    let settings = use_state(QrSettings::default);
    let current_url = use_state(String::new);
    let url_display = use_state(|| "Loading...".to_string());
    let can_download = use_state(|| false);

    let container_ref = use_node_ref();
    let fg_ref = use_node_ref();
    let bg_ref = use_node_ref();
    let size_ref = use_node_ref();

    // Load persisted settings and the active tab URL on mount
    {
        let settings = settings.clone();
        let current_url = current_url.clone();
        let url_display = url_display.clone();
        let can_download = can_download.clone();
        let container_ref = container_ref.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                let loaded = match load_stored_settings().await {
                    Ok(loaded) => loaded,
                    Err(e) => {
                        report_error(&url_display, Some(&e), "Failed to load stored settings");
                        return;
                    }
                };
                settings.set(loaded.clone());

                match fetch_active_tab_url().await {
                    Ok(Some(url)) => {
                        current_url.set(url.clone());
                        url_display.set(url.clone());
                        if is_encodable_url(&url) {
                            render_qr(&container_ref, &url, &loaded, &can_download, &url_display);
                        } else {
                            show_qr_error(
                                &container_ref,
                                &can_download,
                                "URL not valid for a QR code (must be http, https, or ftp).",
                            );
                        }
                    }
                    Ok(None) => {
                        log::warn!("Could not determine the active tab URL");
                        url_display.set("URL unavailable.".to_string());
                        show_qr_error(&container_ref, &can_download, "No URL to encode.");
                    }
                    Err(e) => {
                        report_error(&url_display, Some(&e), "Failed to query the active tab");
                    }
                }
            });
            || ()
        });
    }

    // Foreground color handler
    let on_fg_input = {
        let settings = settings.clone();
        let current_url = current_url.clone();
        let url_display = url_display.clone();
        let can_download = can_download.clone();
        let container_ref = container_ref.clone();

        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                let mut next = (*settings).clone();
                next.fg_color = input.value();
                settings.set(next.clone());
                render_qr(&container_ref, &current_url, &next, &can_download, &url_display);
                persist_in_background(next, url_display.clone());
            }
        })
    };

    // Background color handler
    let on_bg_input = {
        let settings = settings.clone();
        let current_url = current_url.clone();
        let url_display = url_display.clone();
        let can_download = can_download.clone();
        let container_ref = container_ref.clone();

        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                let mut next = (*settings).clone();
                next.bg_color = input.value();
                settings.set(next.clone());
                render_qr(&container_ref, &current_url, &next, &can_download, &url_display);
                persist_in_background(next, url_display.clone());
            }
        })
    };

    // Size handler: out-of-bounds values are rejected and the input is
    // reset to the current accepted size
    let on_size_change = {
        let settings = settings.clone();
        let current_url = current_url.clone();
        let url_display = url_display.clone();
        let can_download = can_download.clone();
        let container_ref = container_ref.clone();

        Callback::from(move |e: Event| {
            let Some(input) = e.target_dyn_into::<HtmlInputElement>() else {
                return;
            };
            let mut next = (*settings).clone();
            let accepted = input
                .value()
                .trim()
                .parse::<u32>()
                .is_ok_and(|size| next.set_size(size));
            if accepted {
                settings.set(next.clone());
                render_qr(&container_ref, &current_url, &next, &can_download, &url_display);
                persist_in_background(next, url_display.clone());
            } else {
                log::warn!(
                    "Rejected size {:?}: must be between {} and {}",
                    input.value(),
                    SIZE_MIN,
                    SIZE_MAX
                );
                input.set_value(&next.size.to_string());
            }
        })
    };

    // Regenerate handler: re-read all three controls, render, persist
    let on_regenerate = {
        let settings = settings.clone();
        let current_url = current_url.clone();
        let url_display = url_display.clone();
        let can_download = can_download.clone();
        let container_ref = container_ref.clone();
        let fg_ref = fg_ref.clone();
        let bg_ref = bg_ref.clone();
        let size_ref = size_ref.clone();

        Callback::from(move |_: MouseEvent| {
            let (Some(fg_input), Some(bg_input), Some(size_input)) = (
                fg_ref.cast::<HtmlInputElement>(),
                bg_ref.cast::<HtmlInputElement>(),
                size_ref.cast::<HtmlInputElement>(),
            ) else {
                report_error(&url_display, None, "Settings inputs missing from the document");
                return;
            };

            let mut next = (*settings).clone();
            next.fg_color = fg_input.value();
            next.bg_color = bg_input.value();
            let size_accepted = size_input
                .value()
                .trim()
                .parse::<u32>()
                .is_ok_and(|size| next.set_size(size));
            if !size_accepted {
                size_input.set_value(&next.size.to_string());
            }

            settings.set(next.clone());
            render_qr(&container_ref, &current_url, &next, &can_download, &url_display);
            persist_in_background(next, url_display.clone());
        })
    };

    // Download handler
    let on_download = {
        let current_url = current_url.clone();
        let url_display = url_display.clone();
        let can_download = can_download.clone();
        let container_ref = container_ref.clone();

        Callback::from(move |_: MouseEvent| {
            let Some(container) = container_ref.cast::<Element>() else {
                report_error(&url_display, None, "QR container missing from the document");
                return;
            };
            let url = (*current_url).clone();
            let url_display = url_display.clone();
            let can_download = can_download.clone();
            let container_ref = container_ref.clone();

            spawn_local(async move {
                match export::export_artifact(&container, &url).await {
                    Ok(()) => {}
                    Err(e @ export::ExportError::MissingArtifact) => {
                        report_error(&url_display, Some(&e.to_string()), "Download failed");
                        show_qr_error(&container_ref, &can_download, "No QR code found to download.");
                    }
                    Err(e @ export::ExportError::EmptyData) => {
                        report_error(&url_display, Some(&e.to_string()), "Download failed");
                        show_qr_error(&container_ref, &can_download, "Empty image data.");
                    }
                    // The artifact is still intact, so keep it on screen and
                    // leave the download action enabled for a retry
                    Err(export::ExportError::Pipeline(detail)) => {
                        report_error(&url_display, Some(&detail), "Download failed");
                    }
                }
            });
        })
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Tab QR"}</h1>

            <p class="url-display">{(*url_display).clone()}</p>

            <div class="qrcode-container" ref={container_ref.clone()}></div>

            <div class="settings-row">
                <label class="setting-label">{"Foreground"}
                    <input
                        ref={fg_ref}
                        type="color"
                        value={settings.fg_color.clone()}
                        oninput={on_fg_input}
                    />
                </label>
                <label class="setting-label">{"Background"}
                    <input
                        ref={bg_ref}
                        type="color"
                        value={settings.bg_color.clone()}
                        oninput={on_bg_input}
                    />
                </label>
                <label class="setting-label">{"Size (px)"}
                    <input
                        ref={size_ref}
                        type="number"
                        min={SIZE_MIN.to_string()}
                        max={SIZE_MAX.to_string()}
                        value={settings.size.to_string()}
                        onchange={on_size_change}
                    />
                </label>
            </div>

            <div class="flex-column-gap">
                <Button onclick={on_regenerate} variant={ButtonVariant::Secondary} block={true}>
                    {"Regenerate"}
                </Button>
                <Button onclick={on_download} disabled={!*can_download} variant={ButtonVariant::Primary} block={true}>
                    {"Download PNG"}
                </Button>
            </div>

            <p class="footer-popup">
                {"Tab QR v0.1.0"}
            </p>
        </div>
    }
}

// Helper functions

/// Central failure sink: log the detail, show the generic marker.
fn report_error(url_display: &UseStateHandle<String>, error: Option<&str>, context: &str) {
    match error {
        Some(detail) => log::error!("{}: {}", context, detail),
        None => log::error!("{}", context),
    }
    url_display.set("Error. (See console)".to_string());
}

/// Replace the QR display with an inline error message and disable the
/// download action.
fn show_qr_error(container_ref: &NodeRef, can_download: &UseStateHandle<bool>, message: &str) {
    if let Some(container) = container_ref.cast::<Element>() {
        container.set_inner_html(&format!("<p class=\"qr-error\">{}</p>", message));
    }
    can_download.set(false);
}

/// Render the QR code for `url`, enabling the download action on
/// success. A missing or non-encodable URL is a silent no-op; the
/// loader already surfaced that condition.
fn render_qr(
    container_ref: &NodeRef,
    url: &str,
    settings: &QrSettings,
    can_download: &UseStateHandle<bool>,
    url_display: &UseStateHandle<String>,
) {
    if url.is_empty() || !is_encodable_url(url) {
        log::warn!("Skipping QR render: URL invalid or missing");
        return;
    }
    let Some(container) = container_ref.cast::<Element>() else {
        report_error(url_display, None, "QR container missing from the document");
        return;
    };

    log::info!(
        "Rendering QR for {} [size: {}, fg: {}, bg: {}]",
        url,
        settings.size,
        settings.fg_color,
        settings.bg_color
    );
    match render::draw_into(&container, url, settings) {
        Ok(()) => {
            can_download.set(true);
        }
        Err(e) => {
            report_error(url_display, Some(&e), "QR generation failed");
            show_qr_error(container_ref, can_download, "QR generation failed.");
        }
    }
}

/// Fire-and-forget settings write; failures are reported, not retried.
fn persist_in_background(settings: QrSettings, url_display: UseStateHandle<String>) {
    spawn_local(async move {
        if let Err(e) = persist_settings(&settings).await {
            report_error(&url_display, Some(&e), "Failed to save settings");
        }
    });
}

async fn load_stored_settings() -> Result<QrSettings, String> {
    let fg_color = get_stored_string(settings::KEY_FG_COLOR).await?;
    let bg_color = get_stored_string(settings::KEY_BG_COLOR).await?;
    let size = get_stored_string(settings::KEY_SIZE).await?;
    Ok(QrSettings::from_stored(fg_color, bg_color, size))
}

async fn get_stored_string(key: &str) -> Result<Option<String>, String> {
    let value = getStorage(key)
        .await
        .map_err(|e| format!("Failed to read {} from storage: {:?}", key, e))?;
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| format!("Failed to parse stored {}: {:?}", key, e))
}

async fn persist_settings(settings: &QrSettings) -> Result<(), String> {
    setStorage(settings::KEY_FG_COLOR, JsValue::from_str(&settings.fg_color))
        .await
        .map_err(|e| format!("Failed to store foreground color: {:?}", e))?;
    setStorage(settings::KEY_BG_COLOR, JsValue::from_str(&settings.bg_color))
        .await
        .map_err(|e| format!("Failed to store background color: {:?}", e))?;
    // Size goes to storage as a numeric string
    setStorage(settings::KEY_SIZE, JsValue::from_str(&settings.size.to_string()))
        .await
        .map_err(|e| format!("Failed to store size: {:?}", e))?;
    Ok(())
}

async fn fetch_active_tab_url() -> Result<Option<String>, String> {
    let value = getActiveTabUrl()
        .await
        .map_err(|e| format!("Tab query failed: {:?}", e))?;
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    value
        .as_string()
        .map(Some)
        .ok_or_else(|| "Tab query returned a non-string URL".to_string())
}
