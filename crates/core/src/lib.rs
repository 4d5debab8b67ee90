pub mod catalog;
pub mod commands;
pub mod config;
pub mod playback;
pub mod search;
pub mod sync;
pub mod testing;

pub use catalog::{CatalogError, Clip, SoundCatalog, SqliteSoundCatalog, DEFAULT_DESCRIPTION};
pub use commands::{CommandError, MessageContext, SoundCommand, SoundCommands, VoiceLookup};
pub use config::{
    load_config, load_config_from_str, validate_config, CommandsConfig, Config, ConfigError,
    ConsoleConfig, DatabaseConfig, HostConfig, SearchConfig, SoundsConfig,
};
pub use playback::{
    AudioQueue, GuildQueues, PlayOutcome, PlayRequest, PlaybackDispatcher, PlaybackError,
    QueueError,
};
pub use search::{SearchEngine, SearchError, SearchReply, SessionKey};
pub use sync::{sync_catalog, ImportReport, SyncError, SyncReport};
