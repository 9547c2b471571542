/// QR style settings: defaults, persisted-field merge, size bounds
use serde::{Deserialize, Serialize};

/// Storage keys, one per field (each independently optional in storage)
pub const KEY_FG_COLOR: &str = "qrSettings_fgColor";
pub const KEY_BG_COLOR: &str = "qrSettings_bgColor";
pub const KEY_SIZE: &str = "qrSettings_size";

pub const SIZE_MIN: u32 = 100;
pub const SIZE_MAX: u32 = 400;

pub const DEFAULT_FG_COLOR: &str = "#000000";
pub const DEFAULT_BG_COLOR: &str = "#ffffff";
pub const DEFAULT_SIZE: u32 = 180;

/// Style settings for the rendered QR code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrSettings {
    pub fg_color: String,
    pub bg_color: String,
    pub size: u32,
}

impl QrSettings {
    /// Merge persisted fields over defaults. Missing fields keep their
    /// defaults; the size is persisted as a numeric string and ignored
    /// if it does not parse or falls outside [SIZE_MIN, SIZE_MAX].
    pub fn from_stored(
        fg_color: Option<String>,
        bg_color: Option<String>,
        size: Option<String>,
    ) -> QrSettings {
        let mut settings = QrSettings::default();
        if let Some(fg) = fg_color {
            settings.fg_color = fg;
        }
        if let Some(bg) = bg_color {
            settings.bg_color = bg;
        }
        if let Some(stored_size) = size.and_then(|s| s.parse::<u32>().ok()) {
            if size_in_bounds(stored_size) {
                settings.size = stored_size;
            }
        }
        settings
    }

    /// Set the size if it is within bounds. Returns whether the value
    /// was accepted; a rejected value leaves the settings untouched.
    pub fn set_size(&mut self, size: u32) -> bool {
        if size_in_bounds(size) {
            self.size = size;
            true
        } else {
            false
        }
    }
}

impl Default for QrSettings {
    fn default() -> Self {
        QrSettings {
            fg_color: DEFAULT_FG_COLOR.to_string(),
            bg_color: DEFAULT_BG_COLOR.to_string(),
            size: DEFAULT_SIZE,
        }
    }
}

pub fn size_in_bounds(size: u32) -> bool {
    (SIZE_MIN..=SIZE_MAX).contains(&size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_stored() {
        let settings = QrSettings::from_stored(None, None, None);

        assert_eq!(settings.fg_color, "#000000");
        assert_eq!(settings.bg_color, "#ffffff");
        assert_eq!(settings.size, 180);
        assert_eq!(settings, QrSettings::default());
    }

    #[test]
    fn test_partial_stored_overrides_only_that_field() {
        let settings = QrSettings::from_stored(None, None, Some("240".to_string()));

        assert_eq!(settings.fg_color, "#000000");
        assert_eq!(settings.bg_color, "#ffffff");
        assert_eq!(settings.size, 240);
    }

    #[test]
    fn test_all_fields_stored() {
        let settings = QrSettings::from_stored(
            Some("#ff0000".to_string()),
            Some("#00ff00".to_string()),
            Some("300".to_string()),
        );

        assert_eq!(settings.fg_color, "#ff0000");
        assert_eq!(settings.bg_color, "#00ff00");
        assert_eq!(settings.size, 300);
    }

    #[test]
    fn test_unparsable_stored_size_keeps_default() {
        let settings = QrSettings::from_stored(None, None, Some("large".to_string()));
        assert_eq!(settings.size, DEFAULT_SIZE);
    }

    #[test]
    fn test_out_of_bounds_stored_size_keeps_default() {
        let too_small = QrSettings::from_stored(None, None, Some("10".to_string()));
        let too_large = QrSettings::from_stored(None, None, Some("5000".to_string()));

        assert_eq!(too_small.size, DEFAULT_SIZE);
        assert_eq!(too_large.size, DEFAULT_SIZE);
    }

    #[test]
    fn test_set_size_accepts_in_bounds() {
        let mut settings = QrSettings::default();

        assert!(settings.set_size(SIZE_MIN));
        assert_eq!(settings.size, SIZE_MIN);
        assert!(settings.set_size(SIZE_MAX));
        assert_eq!(settings.size, SIZE_MAX);
    }

    #[test]
    fn test_set_size_rejects_out_of_bounds() {
        let mut settings = QrSettings::default();

        assert!(!settings.set_size(SIZE_MIN - 1));
        assert_eq!(settings.size, DEFAULT_SIZE);
        assert!(!settings.set_size(SIZE_MAX + 1));
        assert_eq!(settings.size, DEFAULT_SIZE);
    }

    #[test]
    fn test_serialization() {
        let settings = QrSettings {
            fg_color: "#123456".to_string(),
            bg_color: "#abcdef".to_string(),
            size: 220,
        };

        let json = serde_json::to_string(&settings).unwrap();
        let deserialized: QrSettings = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized, settings);
    }
}
