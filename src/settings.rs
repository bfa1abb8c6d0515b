//! Widget settings and preferences
//!
//! Persisted separately from checklist state, under its own storage key.

use serde::{Deserialize, Serialize};

use crate::storage::KeyValueStore;

/// Round length bounds (seconds)
pub const MIN_ROUND_SECONDS: u32 = 5;
pub const MAX_ROUND_SECONDS: u32 = 120;

/// Widget settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Sticky Carrot mini-game enabled
    pub sticky_carrot: bool,
    /// Mini-game sound off
    pub game_muted: bool,
    /// Mini-game round length
    pub round_seconds: u32,
    /// Arrow-key brush movement (px)
    pub brush_step: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sticky_carrot: false,
            game_muted: false,
            round_seconds: 20,
            brush_step: 10.0,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "gcc_settings";

    /// Round length in milliseconds, clamped to sane bounds
    pub fn round_ms(&self) -> u32 {
        self.round_seconds.clamp(MIN_ROUND_SECONDS, MAX_ROUND_SECONDS) * 1000
    }

    /// Brush step, falling back to the default for non-positive values
    pub fn effective_brush_step(&self) -> f32 {
        if self.brush_step.is_finite() && self.brush_step > 0.0 {
            self.brush_step
        } else {
            Self::default().brush_step
        }
    }

    /// Load settings, falling back to defaults
    pub fn load(storage: &impl KeyValueStore) -> Self {
        if let Some(json) = storage.get(Self::STORAGE_KEY) {
            if let Ok(settings) = serde_json::from_str(&json) {
                log::info!("Loaded settings from storage");
                return settings;
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings (best-effort)
    pub fn save(&self, storage: &mut impl KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => match storage.set(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Could not save settings: {}", e),
            },
            Err(e) => log::warn!("Could not encode settings: {}", e),
        }
    }
}

/// Resolved feature switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    pub sticky_carrot: bool,
}

impl FeatureFlags {
    /// Combine the persisted setting, the build-time flag and a URL override
    ///
    /// Any one source set to `"1"` (or the setting being true) enables the game.
    pub fn resolve(settings: &Settings, build_flag: Option<&str>, url_flag: Option<&str>) -> Self {
        Self {
            sticky_carrot: settings.sticky_carrot || flag_on(build_flag) || flag_on(url_flag),
        }
    }

    /// Resolve using the flag baked in at compile time
    pub fn from_build(settings: &Settings, url_flag: Option<&str>) -> Self {
        Self::resolve(settings, option_env!("VITE_FEATURE_STICKYACARROT"), url_flag)
    }
}

fn flag_on(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim() == "1")
}

/// What the Settings toggle tells the user after flipping `sticky_carrot`
///
/// `flags` is the state resolved with the updated settings, so a build or
/// URL override that keeps the game on is reported as such.
pub fn sticky_carrot_notice(settings: &Settings, flags: FeatureFlags) -> &'static str {
    match (settings.sticky_carrot, flags.sticky_carrot) {
        (true, _) => "Sticky Carrot enabled. Reload to play.",
        (false, true) => "Sticky Carrot setting off, but this build or page link still enables it.",
        (false, false) => "Sticky Carrot disabled.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FailureMode, MemoryStore};

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(!s.sticky_carrot);
        assert_eq!(s.round_ms(), 20_000);
    }

    #[test]
    fn test_round_ms_clamped() {
        let mut s = Settings::default();
        s.round_seconds = 0;
        assert_eq!(s.round_ms(), MIN_ROUND_SECONDS * 1000);
        s.round_seconds = 10_000;
        assert_eq!(s.round_ms(), MAX_ROUND_SECONDS * 1000);
    }

    #[test]
    fn test_brush_step_fallback() {
        let mut s = Settings::default();
        s.brush_step = -3.0;
        assert_eq!(s.effective_brush_step(), 10.0);
        s.brush_step = f32::NAN;
        assert_eq!(s.effective_brush_step(), 10.0);
        s.brush_step = 4.0;
        assert_eq!(s.effective_brush_step(), 4.0);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut storage = MemoryStore::new();
        let settings = Settings {
            sticky_carrot: true,
            game_muted: true,
            round_seconds: 30,
            brush_step: 8.0,
        };
        settings.save(&mut storage);
        assert_eq!(Settings::load(&storage), settings);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let storage = MemoryStore::with_entries([(Settings::STORAGE_KEY, r#"{"sticky_carrot":true}"#)]);
        let settings = Settings::load(&storage);
        assert!(settings.sticky_carrot);
        assert_eq!(settings.round_seconds, 20);
    }

    #[test]
    fn test_corrupt_or_unavailable_uses_defaults() {
        let storage = MemoryStore::with_entries([(Settings::STORAGE_KEY, "{{")]);
        assert_eq!(Settings::load(&storage), Settings::default());

        let mut storage = MemoryStore::new();
        storage.set_failure_mode(FailureMode::Unavailable);
        Settings::default().save(&mut storage);
        assert_eq!(Settings::load(&storage), Settings::default());
    }

    #[test]
    fn test_flags_resolve() {
        let off = Settings::default();
        assert!(!FeatureFlags::resolve(&off, None, None).sticky_carrot);
        assert!(!FeatureFlags::resolve(&off, Some("0"), Some("true")).sticky_carrot);
        assert!(FeatureFlags::resolve(&off, Some("1"), None).sticky_carrot);
        assert!(FeatureFlags::resolve(&off, None, Some("1")).sticky_carrot);

        let on = Settings {
            sticky_carrot: true,
            ..Settings::default()
        };
        assert!(FeatureFlags::resolve(&on, None, None).sticky_carrot);
    }

    #[test]
    fn test_notice_reports_resolved_state() {
        let off = Settings::default();
        let on = Settings {
            sticky_carrot: true,
            ..Settings::default()
        };

        let flags = FeatureFlags::resolve(&on, None, None);
        assert_eq!(sticky_carrot_notice(&on, flags), "Sticky Carrot enabled. Reload to play.");

        let flags = FeatureFlags::resolve(&off, None, None);
        assert_eq!(sticky_carrot_notice(&off, flags), "Sticky Carrot disabled.");

        // URL or build override keeps the launcher after a reload
        for flags in [
            FeatureFlags::resolve(&off, None, Some("1")),
            FeatureFlags::resolve(&off, Some("1"), None),
        ] {
            assert_ne!(sticky_carrot_notice(&off, flags), "Sticky Carrot disabled.");
        }
    }
}
