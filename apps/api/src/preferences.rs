//! UI preferences: presentation settings that live outside the resume document.

use serde::{Deserialize, Serialize};

use crate::render::Locale;

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 2.0;
pub const MIN_SIDEBAR_WIDTH: u32 = 240;
pub const MAX_SIDEBAR_WIDTH: u32 = 720;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiPreferences {
    pub locale: Locale,
    pub zoom: f32,
    pub dark_mode: bool,
    /// Editor panel width in CSS pixels.
    pub sidebar_width: u32,
}

impl Default for UiPreferences {
    fn default() -> Self {
        UiPreferences {
            locale: Locale::En,
            zoom: 1.0,
            dark_mode: false,
            sidebar_width: 420,
        }
    }
}

impl UiPreferences {
    /// Pulls out-of-range values back into range. A non-finite zoom resets to 1.
    pub fn clamped(mut self) -> Self {
        self.zoom = if self.zoom.is_finite() {
            self.zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            1.0
        };
        self.sidebar_width = self.sidebar_width.clamp(MIN_SIDEBAR_WIDTH, MAX_SIDEBAR_WIDTH);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_take_defaults() {
        let prefs: UiPreferences = serde_json::from_value(json!({"locale": "pt"})).unwrap();
        assert_eq!(prefs.locale, Locale::Pt);
        assert_eq!(prefs.zoom, 1.0);
        assert_eq!(prefs.sidebar_width, 420);
    }

    #[test]
    fn test_clamped() {
        let prefs = UiPreferences {
            zoom: 7.5,
            sidebar_width: 10,
            ..UiPreferences::default()
        }
        .clamped();
        assert_eq!(prefs.zoom, MAX_ZOOM);
        assert_eq!(prefs.sidebar_width, MIN_SIDEBAR_WIDTH);

        let nan = UiPreferences {
            zoom: f32::NAN,
            ..UiPreferences::default()
        };
        assert_eq!(nan.clamped().zoom, 1.0);
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let value = serde_json::to_value(UiPreferences::default()).unwrap();
        assert_eq!(
            value,
            json!({"locale": "en", "zoom": 1.0, "darkMode": false, "sidebarWidth": 420})
        );
    }
}
