use colored::Colorize;
use picstash::api::{CmdMessage, MessageLevel};
use picstash::config::{PicstashConfig, KEYS};
use picstash::locator::Locator;
use std::path::PathBuf;

pub fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

/// One locator per line, undecorated, so the output can be piped.
pub fn print_locators(locators: &[Locator]) {
    for locator in locators {
        println!("{}", locator);
    }
}

pub fn print_paths(paths: &[PathBuf]) {
    for path in paths {
        println!("{}", path.display());
    }
}

pub fn print_config(config: &PicstashConfig, key: Option<&str>) {
    match key {
        Some(key) => println!("{}", config.get(key).unwrap_or_default()),
        None => {
            for key in KEYS {
                let value = config.get(key).unwrap_or_default();
                println!("{} = {}", key.bold(), value);
            }
        }
    }
}
