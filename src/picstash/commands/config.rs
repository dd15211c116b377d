use crate::commands::{CmdMessage, CmdResult};
use crate::config::{PicstashConfig, KEYS};
use crate::error::{PicstashError, Result};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

pub fn run(config_dir: &Path, action: ConfigAction) -> Result<CmdResult> {
    let mut config = PicstashConfig::load(config_dir)?;
    let mut result = CmdResult::default();

    match action {
        ConfigAction::ShowAll => {}
        ConfigAction::ShowKey(key) => {
            if config.get(&key).is_none() {
                return Err(PicstashError::Config(format!(
                    "Unknown config key: {} (known: {})",
                    key,
                    KEYS.join(", ")
                )));
            }
        }
        ConfigAction::Set(key, value) => {
            config.set(&key, &value)?;
            config.save(config_dir)?;
            result.add_message(CmdMessage::success(format!(
                "{} set to {}",
                key,
                config.get(&key).unwrap_or_default()
            )));
        }
    }

    Ok(result.with_config(config))
}
