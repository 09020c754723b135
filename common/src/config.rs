//! Process-wide settings loaded once from `config.toml`: relay host/port,
//! log level, and the relay's own signed pre-key material.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    server_ip: String,
    server_port: String,
    private_key_server: String,
    public_key_server: String,
    log_level: String,
}

impl Config {
    pub fn get_server_ip(&self) -> String {
        self.server_ip.clone()
    }

    pub fn get_server_port(&self) -> String {
        self.server_port.clone()
    }

    pub fn get_log_level(&self) -> String {
        self.log_level.clone()
    }

    pub fn get_private_key_server(&self) -> String {
        self.private_key_server.clone()
    }

    pub fn get_public_key_server(&self) -> String {
        self.public_key_server.clone()
    }

    fn config_path() -> &'static str {
        if Path::new("/.dockerenv").exists() {
            "/app/config/config.toml"
        } else {
            "config/config.toml"
        }
    }

    fn load() -> Config {
        let content = std::fs::read_to_string(Self::config_path())
            .expect("failed to read config.toml");
        toml::from_str(&content).expect("failed to parse config.toml")
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::load);
