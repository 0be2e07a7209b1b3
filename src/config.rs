//! TOML configuration for the input system.
//!
//! ```toml
//! queue_capacity = 2048
//! default_modes = ["controller", "keyboard"]
//!
//! [auto_switch]
//! to_physical_on_connect = true
//! to_virtual_on_disconnect = true
//! clear_keyboard_on_disconnect = true
//!
//! [mouse]
//! enabled = true        # omit to use the platform default
//! hide_cursor = true
//! warp_cursor = true
//! ```
//!
//! Every field is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mode::InputMode;
use crate::queue::DEFAULT_QUEUE_CAPACITY;

/// Mode names accepted in `default_modes`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeName {
    Controller,
    Touchscreen,
    Keyboard,
    Mouse,
}

impl From<ModeName> for InputMode {
    fn from(name: ModeName) -> Self {
        match name {
            ModeName::Controller => InputMode::CONTROLLER,
            ModeName::Touchscreen => InputMode::TOUCHSCREEN,
            ModeName::Keyboard => InputMode::KEYBOARD,
            ModeName::Mouse => InputMode::MOUSE,
        }
    }
}

/// Reactions to peripherals coming and going.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSwitch {
    /// A physical controller connecting replaces an active virtual one.
    pub to_physical_on_connect: bool,
    /// Losing the last physical controller falls back to the virtual one.
    pub to_virtual_on_disconnect: bool,
    /// Losing the last keyboard turns keyboard mode off.
    pub clear_keyboard_on_disconnect: bool,
}

impl Default for AutoSwitch {
    fn default() -> Self {
        Self {
            to_physical_on_connect: true,
            to_virtual_on_disconnect: true,
            clear_keyboard_on_disconnect: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseConfig {
    /// Force mouse availability on or off; `None` means desktop targets only.
    pub enabled: Option<bool>,
    pub hide_cursor: bool,
    pub warp_cursor: bool,
}

impl Default for MouseConfig {
    fn default() -> Self {
        Self {
            enabled: None,
            hide_cursor: true,
            warp_cursor: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub queue_capacity: usize,
    pub default_modes: Vec<ModeName>,
    pub auto_switch: AutoSwitch,
    pub mouse: MouseConfig,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            default_modes: Vec::new(),
            auto_switch: AutoSwitch::default(),
            mouse: MouseConfig::default(),
        }
    }
}

impl InputConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: InputConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::info!("loaded input config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::InvalidCapacity(self.queue_capacity));
        }
        Ok(())
    }

    /// `default_modes` folded into one mode set.
    pub fn initial_mode(&self) -> InputMode {
        self.default_modes
            .iter()
            .fold(InputMode::empty(), |mode, name| mode | InputMode::from(*name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = InputConfig::from_toml_str("").unwrap();
        assert_eq!(config, InputConfig::default());
        assert_eq!(config.queue_capacity, 2048);
        assert!(config.auto_switch.to_physical_on_connect);
        assert_eq!(config.initial_mode(), InputMode::empty());
    }

    #[test]
    fn full_document() {
        let config = InputConfig::from_toml_str(
            r#"
            queue_capacity = 64
            default_modes = ["controller", "mouse"]

            [auto_switch]
            to_virtual_on_disconnect = false

            [mouse]
            enabled = false
            warp_cursor = false
            "#,
        )
        .unwrap();
        assert_eq!(config.queue_capacity, 64);
        assert_eq!(
            config.initial_mode(),
            InputMode::CONTROLLER | InputMode::MOUSE
        );
        assert!(config.auto_switch.to_physical_on_connect);
        assert!(!config.auto_switch.to_virtual_on_disconnect);
        assert_eq!(config.mouse.enabled, Some(false));
        assert!(config.mouse.hide_cursor);
        assert!(!config.mouse.warp_cursor);
    }

    #[test]
    fn rejects_zero_capacity() {
        let err = InputConfig::from_toml_str("queue_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCapacity(0)));
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = InputConfig::from_toml_str(r#"default_modes = ["joystick"]"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = InputConfig::load("/nonexistent/kobold-input.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
