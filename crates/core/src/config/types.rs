use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sounds: SoundsConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("sounds.db")
}

/// Clip storage and bulk description import locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SoundsConfig {
    /// Directory holding the audio clips.
    #[serde(default = "default_sound_directory")]
    pub directory: PathBuf,
    /// One-time description import file (`name,ext,description` lines).
    #[serde(default = "default_import_file")]
    pub import_file: PathBuf,
    /// Where the import file is moved once consumed.
    #[serde(default = "default_import_archive")]
    pub import_archive: PathBuf,
}

impl Default for SoundsConfig {
    fn default() -> Self {
        Self {
            directory: default_sound_directory(),
            import_file: default_import_file(),
            import_archive: default_import_archive(),
        }
    }
}

fn default_sound_directory() -> PathBuf {
    PathBuf::from("sounds")
}

fn default_import_file() -> PathBuf {
    PathBuf::from("update.txt")
}

fn default_import_archive() -> PathBuf {
    PathBuf::from("completed-update.txt")
}

/// Command router settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandsConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

fn default_prefix() -> String {
    "-".to_string()
}

/// Interactive search pagination settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Follow-up text that reveals the next page (case-insensitive).
    #[serde(default = "default_continuation_keyword")]
    pub continuation_keyword: String,
    /// How long a session waits for a follow-up (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Channel messages observed before a session gives up (default: 20).
    #[serde(default = "default_max_observed_messages")]
    pub max_observed_messages: u32,
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            continuation_keyword: default_continuation_keyword(),
            timeout_secs: default_timeout_secs(),
            max_observed_messages: default_max_observed_messages(),
        }
    }
}

fn default_continuation_keyword() -> String {
    "next".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_observed_messages() -> u32 {
    20
}

/// What the host process knows about its environment
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HostConfig {
    /// Guild ids that get a playback queue at startup.
    #[serde(default)]
    pub guilds: Vec<String>,
}

/// Identity used by the console host for every stdin line
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_console_guild")]
    pub guild_id: String,
    #[serde(default = "default_console_channel")]
    pub channel_id: String,
    #[serde(default = "default_console_user")]
    pub user_id: String,
    /// Voice channel the console user is "connected" to.
    #[serde(default)]
    pub voice_channel: Option<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            guild_id: default_console_guild(),
            channel_id: default_console_channel(),
            user_id: default_console_user(),
            voice_channel: None,
        }
    }
}

fn default_console_guild() -> String {
    "console".to_string()
}

fn default_console_channel() -> String {
    "console".to_string()
}

fn default_console_user() -> String {
    "console".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[database]
path = "bot.db"

[sounds]
directory = "clips"
import_file = "descriptions.txt"
import_archive = "descriptions.done"

[commands]
prefix = "!"

[search]
continuation_keyword = "more"
timeout_secs = 5
max_observed_messages = 3

[host]
guilds = ["g1"]

[console]
guild_id = "g1"
voice_channel = "general"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.sounds.directory, PathBuf::from("clips"));
        assert_eq!(config.sounds.import_file, PathBuf::from("descriptions.txt"));
        assert_eq!(config.search.timeout(), Duration::from_secs(5));
        assert_eq!(config.search.max_observed_messages, 3);
        assert_eq!(config.console.guild_id, "g1");
        assert_eq!(config.console.channel_id, "console");
        assert_eq!(config.console.voice_channel.as_deref(), Some("general"));
    }

    #[test]
    fn test_search_defaults() {
        let search = SearchConfig::default();
        assert_eq!(search.continuation_keyword, "next");
        assert_eq!(search.timeout_secs, 30);
        assert_eq!(search.max_observed_messages, 20);
    }

    #[test]
    fn test_sounds_defaults() {
        let sounds = SoundsConfig::default();
        assert_eq!(sounds.import_file, PathBuf::from("update.txt"));
        assert_eq!(sounds.import_archive, PathBuf::from("completed-update.txt"));
    }
}
