//! Persisted render settings.
//!
//! Seven booleans, one per line, in a fixed order: texture mapping, normal
//! mapping, shadow mapping, deferred shading, then the active flags of the
//! flashlight, user light and moonlight. The format round-trips exactly.
//!
//! Loading is deliberately forgiving: a missing, short or corrupt file is
//! logged, noted in the diagnostic log, and answered with defaults. Saving
//! surfaces I/O errors to the caller.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::diagnostics::DiagnosticLog;
use crate::errors::Result;

/// The settings that survive across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedSettings {
    pub texture_mapping: bool,
    pub normal_mapping: bool,
    pub shadow_mapping: bool,
    pub deferred_shading: bool,
    pub flashlight_active: bool,
    pub userlight_active: bool,
    pub moonlight_active: bool,
}

impl Default for SavedSettings {
    fn default() -> Self {
        Self {
            texture_mapping: false,
            normal_mapping: true,
            shadow_mapping: true,
            deferred_shading: true,
            flashlight_active: false,
            userlight_active: true,
            moonlight_active: true,
        }
    }
}

impl SavedSettings {
    /// Field values in on-disk order.
    #[must_use]
    fn fields(&self) -> [bool; 7] {
        [
            self.texture_mapping,
            self.normal_mapping,
            self.shadow_mapping,
            self.deferred_shading,
            self.flashlight_active,
            self.userlight_active,
            self.moonlight_active,
        ]
    }

    #[must_use]
    fn from_fields(values: [bool; 7]) -> Self {
        Self {
            texture_mapping: values[0],
            normal_mapping: values[1],
            shadow_mapping: values[2],
            deferred_shading: values[3],
            flashlight_active: values[4],
            userlight_active: values[5],
            moonlight_active: values[6],
        }
    }
}

/// Writes `settings` to `path`, one boolean per line.
///
/// # Errors
///
/// Returns the underlying I/O error if the file cannot be written.
pub fn save_settings(path: &Path, settings: &SavedSettings) -> Result<()> {
    let mut text = String::new();
    for value in settings.fields() {
        let _ = writeln!(text, "{value}");
    }
    fs::write(path, text)?;
    log::debug!("saved settings to {}", path.display());
    Ok(())
}

/// Reads settings from `path`, falling back to defaults on any failure.
///
/// Failures are logged and appended to `diagnostics`; they never propagate.
#[must_use]
pub fn load_settings(path: &Path, diagnostics: &mut DiagnosticLog) -> SavedSettings {
    match try_load(path) {
        Ok(settings) => settings,
        Err(reason) => {
            let message = format!("settings load failed ({}): {reason}", path.display());
            log::warn!("{message}");
            diagnostics.push(message);
            SavedSettings::default()
        }
    }
}

fn try_load(path: &Path) -> std::result::Result<SavedSettings, String> {
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let mut values = [false; 7];
    let mut lines = text.lines();
    for (index, slot) in values.iter_mut().enumerate() {
        let line = lines.next().ok_or_else(|| {
            format!("expected 7 values, file ends after line {index}")
        })?;
        *slot = line
            .trim()
            .to_ascii_lowercase()
            .parse::<bool>()
            .map_err(|_| format!("line {}: not a boolean: {line:?}", index + 1))?;
    }
    Ok(SavedSettings::from_fields(values))
}
