/// Target URL validation and download filename derivation
use url::Url;

/// Fallback filename stem when the target URL is invalid or missing
const FALLBACK_STEM: &str = "qrcode_page";

/// Fallback stem when a scheme-valid URL has no extractable hostname
const PARSE_ERROR_STEM: &str = "qrcode_error_url";

/// Whether a target string can be encoded into a QR code.
///
/// Only http, https and ftp URLs are accepted; anything else
/// (javascript:, about:, file:, malformed, empty) is rejected.
pub fn is_encodable_url(target: &str) -> bool {
    if target.is_empty() {
        return false;
    }
    match Url::parse(target) {
        Ok(url) => matches!(url.scheme(), "http" | "https" | "ftp"),
        Err(_) => false,
    }
}

/// Derive the suggested download filename for a target URL.
///
/// A scheme-valid target contributes its hostname with dots replaced
/// by underscores; an invalid or missing target gets a fixed stem.
///
/// Examples:
/// - https://sub.example.co.uk/path → qrcode-sub_example_co_uk.png
/// - chrome://settings → qrcode-qrcode_page.png
pub fn download_filename(target: &str) -> String {
    let stem = if is_encodable_url(target) {
        match Url::parse(target).ok().and_then(|url| {
            url.host_str().map(|host| host.replace('.', "_"))
        }) {
            Some(host) => host,
            None => PARSE_ERROR_STEM.to_string(),
        }
    } else {
        FALLBACK_STEM.to_string()
    };

    format!("qrcode-{}.png", stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_schemes_are_encodable() {
        assert!(is_encodable_url("https://example.com"));
        assert!(is_encodable_url("http://example.com/path?q=1"));
        assert!(is_encodable_url("ftp://files.example.com"));
    }

    #[test]
    fn test_other_schemes_are_rejected() {
        assert!(!is_encodable_url("javascript:alert(1)"));
        assert!(!is_encodable_url("about:blank"));
        assert!(!is_encodable_url("chrome://settings"));
        assert!(!is_encodable_url("file:///etc/hosts"));
        assert!(!is_encodable_url("data:text/plain,hello"));
    }

    #[test]
    fn test_malformed_targets_are_rejected() {
        assert!(!is_encodable_url(""));
        assert!(!is_encodable_url("not a url"));
        assert!(!is_encodable_url("https://"));
        assert!(!is_encodable_url("://missing-scheme"));
    }

    #[test]
    fn test_filename_uses_full_hostname() {
        assert_eq!(
            download_filename("https://sub.example.co.uk/path"),
            "qrcode-sub_example_co_uk.png"
        );
        assert_eq!(
            download_filename("https://openai.com"),
            "qrcode-openai_com.png"
        );
        assert_eq!(
            download_filename("http://localhost:3000"),
            "qrcode-localhost.png"
        );
    }

    #[test]
    fn test_filename_fallback_for_invalid_target() {
        assert_eq!(download_filename(""), "qrcode-qrcode_page.png");
        assert_eq!(download_filename("about:blank"), "qrcode-qrcode_page.png");
        assert_eq!(
            download_filename("javascript:alert(1)"),
            "qrcode-qrcode_page.png"
        );
    }
}
