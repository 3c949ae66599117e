//! Recorder configuration

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::Path;
use steplog_core::{Error, Result, Selector};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Clicks inside any of these are the recorder's own controls and are skipped
    pub ignore_within: Vec<Selector>,
    /// `change` events on these count as a selection
    pub selection_targets: Vec<Selector>,
    /// chrono format for action timestamps (local time)
    pub time_format: String,
    /// Bound of the queue behind `ChannelSource`
    pub channel_capacity: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            ignore_within: vec![Selector::class("action-recorder-controls")],
            selection_targets: vec![
                Selector::tag("select"),
                Selector::role("listbox"),
                Selector::role("combobox"),
            ],
            time_format: "%H:%M:%S".to_string(),
            channel_capacity: 10000,
        }
    }
}

impl RecorderConfig {
    /// Load from a JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            Error::config(format!("cannot parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.check_time_format()?;
        if self.channel_capacity == 0 {
            return Err(Error::config("channel_capacity must be at least 1"));
        }
        Ok(())
    }

    /// Whether `time_format` can be rendered by chrono
    pub fn check_time_format(&self) -> Result<()> {
        if self.time_format.trim().is_empty() {
            return Err(Error::config("time_format must not be empty"));
        }
        if StrftimeItems::new(&self.time_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::config(format!(
                "time_format '{}' is not a valid strftime pattern",
                self.time_format
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use steplog_core::ErrorCode;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r##"{{"ignore_within": [".toolbar", "#recorder"]}}"##).unwrap();

        let config = RecorderConfig::load(file.path()).unwrap();
        assert_eq!(config.ignore_within, vec![Selector::class("toolbar"), Selector::id("recorder")]);
        assert_eq!(config.selection_targets.len(), 3);
        assert_eq!(config.time_format, "%H:%M:%S");
    }

    #[test]
    fn invalid_selector_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"selection_targets": ["div p"]}}"#).unwrap();

        let err = RecorderConfig::load(file.path()).unwrap_err();
        assert_eq!(err.code, ErrorCode::Config);
    }

    #[test]
    fn bad_time_format_rejected() {
        let config = RecorderConfig {
            time_format: "%H:%Q".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(RecorderConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_capacity_rejected() {
        let config = RecorderConfig {
            channel_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
