// Welcome configuration model
// One entry per guild, loaded once at startup and never mutated afterwards

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use poise::serenity_prelude as serenity;
use serde::{Deserialize, Serialize};

use crate::utils::config::ConfigError;

/// Settings for one kind of notification (welcome or farewell)
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationConfig {
    /// Whether the notification is sent at all
    pub activate: bool,
    /// Channel the embed is posted in
    pub channel: Option<serenity::ChannelId>,
    /// Append the live member count to the description
    pub show_member_count: bool,
    /// Use the member's avatar as embed thumbnail
    pub show_profile_picture: bool,
    /// Free text shown in an extra "Infos" field
    pub custom_info: Option<String>,
}

#[allow(dead_code)]
impl NotificationConfig {
    pub fn activate(mut self, activate: bool) -> Self {
        self.activate = activate;
        self
    }

    pub fn channel(mut self, channel: impl Into<serenity::ChannelId>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn show_member_count(mut self, show: bool) -> Self {
        self.show_member_count = show;
        self
    }

    pub fn show_profile_picture(mut self, show: bool) -> Self {
        self.show_profile_picture = show;
        self
    }

    pub fn custom_info(mut self, info: impl Into<String>) -> Self {
        self.custom_info = Some(info.into());
        self
    }
}

/// Guild (Server) specific configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Display name used instead of the guild's own name
    pub name: Option<String>,
    pub welcome: NotificationConfig,
    pub farewell: NotificationConfig,
}

#[allow(dead_code)]
impl ServerConfig {
    pub fn set_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_welcome_config(
        mut self,
        build: impl FnOnce(NotificationConfig) -> NotificationConfig,
    ) -> Self {
        self.welcome = build(self.welcome);
        self
    }

    pub fn set_farewell_config(
        mut self,
        build: impl FnOnce(NotificationConfig) -> NotificationConfig,
    ) -> Self {
        self.farewell = build(self.farewell);
        self
    }
}

/// All configured servers, keyed by guild ID
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct WelcomeConfig {
    #[serde(default)]
    servers: HashMap<u64, ServerConfig>,
}

impl WelcomeConfig {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure a server. The callback receives a blank `ServerConfig`.
    #[allow(dead_code)]
    pub fn add_server(
        mut self,
        id: impl Into<serenity::GuildId>,
        build: impl FnOnce(ServerConfig) -> ServerConfig,
    ) -> Self {
        let id: serenity::GuildId = id.into();
        self.servers.insert(id.get(), build(ServerConfig::default()));
        self
    }

    pub fn server(&self, guild_id: serenity::GuildId) -> Option<&ServerConfig> {
        self.servers.get(&guild_id.get())
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Load the configuration file. A missing file is a configuration error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ConfigError::MissingFile(path.to_path_buf()),
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        Self::from_json(&raw)
    }
}
