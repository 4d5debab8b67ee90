//! Sound commands - typed commands plus the facade that runs them.
//!
//! The host strips its prefix, hands the rest to [`SoundCommand::parse`]
//! and executes the result with [`SoundCommands`]. Every outcome, failures
//! included, becomes a reply string for the chat.

pub mod args;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::error;

use crate::catalog::{CatalogError, SoundCatalog};
use crate::playback::{PlayOutcome, PlaybackDispatcher, PlaybackError};
use crate::search::{SearchEngine, SearchError, SessionKey};

const ALIAS_USAGE: &str = r#"alias add "*alias*" "*filename*" | alias remove "*alias*""#;
const ALIAS_ADD_USAGE: &str = r#"alias add "*alias*" "*filename*""#;
const ALIAS_REMOVE_USAGE: &str = r#"alias remove "*alias*""#;
const DESCRIPTION_USAGE: &str = r#"description "*description*" "*filename*""#;

/// Looks up the voice channel a user is connected to.
#[async_trait]
pub trait VoiceLookup: Send + Sync {
    async fn voice_channel(&self, guild_id: &str, user_id: &str) -> Option<String>;
}

/// Where a message came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContext {
    /// `None` for direct messages.
    pub guild_id: Option<String>,
    pub channel_id: String,
    pub author_id: String,
}

impl MessageContext {
    fn session_key(&self) -> SessionKey {
        SessionKey::new(self.author_id.as_str(), self.channel_id.as_str())
    }
}

/// Errors for command parsing and execution.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Malformed arguments, usage: {usage}")]
    MalformedInput { usage: &'static str },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// A parsed sound command, prefix already removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundCommand {
    AliasAdd { alias: String, filename: String },
    AliasRemove { alias: String },
    SetDescription { description: String, filename: String },
    ClearData,
    DbSize,
    MostPlayed,
    MostPlayedDetailed,
    Search { query: String },
    /// Anything else is treated as a clip name or alias.
    Play { name: String },
}

impl SoundCommand {
    /// Parse command text. Keywords are case-insensitive.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let text = text.trim();
        let (word, rest) = split_word(text);

        let command = match word.to_ascii_lowercase().as_str() {
            "alias" => {
                let (action, rest) = split_word(rest);
                match action.to_ascii_lowercase().as_str() {
                    "add" => {
                        let [alias, filename] = args::exact_fields::<2>(rest).ok_or(
                            CommandError::MalformedInput {
                                usage: ALIAS_ADD_USAGE,
                            },
                        )?;
                        SoundCommand::AliasAdd {
                            alias: alias.to_string(),
                            filename: filename.to_string(),
                        }
                    }
                    "remove" => {
                        let [alias] = args::exact_fields::<1>(rest).ok_or(
                            CommandError::MalformedInput {
                                usage: ALIAS_REMOVE_USAGE,
                            },
                        )?;
                        SoundCommand::AliasRemove {
                            alias: alias.to_string(),
                        }
                    }
                    _ => return Err(CommandError::MalformedInput { usage: ALIAS_USAGE }),
                }
            }
            "description" => {
                let (description, filename) = args::description_and_filename(rest).ok_or(
                    CommandError::MalformedInput {
                        usage: DESCRIPTION_USAGE,
                    },
                )?;
                SoundCommand::SetDescription {
                    description: description.to_string(),
                    filename: filename.to_string(),
                }
            }
            "cleardata" => SoundCommand::ClearData,
            "dbsize" => SoundCommand::DbSize,
            "mostplayed" => SoundCommand::MostPlayed,
            "mostplayeddetailed" => SoundCommand::MostPlayedDetailed,
            "search" => SoundCommand::Search {
                query: rest.to_string(),
            },
            _ => SoundCommand::Play {
                name: text.to_string(),
            },
        };
        Ok(command)
    }
}

fn split_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (text, ""),
    }
}

/// Runs sound commands against the catalog, search engine and dispatcher.
pub struct SoundCommands {
    catalog: Arc<dyn SoundCatalog>,
    search: SearchEngine,
    dispatcher: PlaybackDispatcher,
    voice: Arc<dyn VoiceLookup>,
    prefix: String,
}

impl SoundCommands {
    pub fn new(
        catalog: Arc<dyn SoundCatalog>,
        search: SearchEngine,
        dispatcher: PlaybackDispatcher,
        voice: Arc<dyn VoiceLookup>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            search,
            dispatcher,
            voice,
            prefix: prefix.into(),
        }
    }

    /// Handle one raw chat message.
    ///
    /// The message is first offered to pending search sessions, then run as
    /// a command if it carries the prefix. Returns the replies to send.
    pub async fn handle_message(&self, ctx: &MessageContext, text: &str) -> Vec<String> {
        let mut replies = Vec::new();

        match self
            .search
            .observe(&ctx.channel_id, &ctx.author_id, text)
        {
            Ok(Some(page)) => replies.push(page.text),
            Ok(None) => {}
            Err(e) => replies.push(self.error_reply(&CommandError::from(e))),
        }

        if let Some(command_text) = text.strip_prefix(self.prefix.as_str()) {
            let result = match SoundCommand::parse(command_text) {
                Ok(command) => self.execute(ctx, command).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(Some(reply)) => replies.push(reply),
                Ok(None) => {}
                Err(e) => replies.push(self.error_reply(&e)),
            }
        }

        replies
    }

    /// Execute a parsed command. `Ok(None)` means nothing to say.
    pub async fn execute(
        &self,
        ctx: &MessageContext,
        command: SoundCommand,
    ) -> Result<Option<String>, CommandError> {
        let reply = match command {
            SoundCommand::AliasAdd { alias, filename } => {
                self.catalog.add_alias(&alias, &filename)?;
                format!("Alias \"{}\" added for \"{}\"!", alias, filename)
            }
            SoundCommand::AliasRemove { alias } => {
                self.catalog.remove_alias(&alias)?;
                format!("Removed alias \"{}\" from db!", alias)
            }
            SoundCommand::SetDescription {
                description,
                filename,
            } => {
                self.catalog.set_description(&filename, &description)?;
                format!(
                    "Description of \"{}\" changed to \"{}\"!",
                    filename, description
                )
            }
            SoundCommand::ClearData => {
                self.catalog.reset_play_counts()?;
                "Sound data cleared!".to_string()
            }
            SoundCommand::DbSize => self.catalog.count_clips()?.to_string(),
            SoundCommand::MostPlayed => {
                format!("Most Played Sound Clips:\n{}", self.search.most_played()?)
            }
            SoundCommand::MostPlayedDetailed => format!(
                "Most Played Sound Clips:\n{}",
                self.search.most_played_detailed()?
            ),
            SoundCommand::Search { query } => self.search.search(ctx.session_key(), &query)?.text,
            SoundCommand::Play { name } => return self.play(ctx, &name).await,
        };
        Ok(Some(reply))
    }

    async fn play(&self, ctx: &MessageContext, name: &str) -> Result<Option<String>, CommandError> {
        // Playback needs a guild; direct messages are ignored.
        let Some(guild_id) = ctx.guild_id.as_deref() else {
            return Ok(None);
        };

        let voice_channel = self.voice.voice_channel(guild_id, &ctx.author_id).await;
        match self
            .dispatcher
            .play(voice_channel.as_deref(), guild_id, &ctx.author_id, name)?
        {
            PlayOutcome::Queued(_) | PlayOutcome::Unmatched => Ok(None),
        }
    }

    /// User-facing text for a failed command.
    pub fn error_reply(&self, err: &CommandError) -> String {
        match err {
            CommandError::MalformedInput { usage } => {
                format!("Invalid arguments! usage: {}{}", self.prefix, usage)
            }
            CommandError::Catalog(CatalogError::NotFound(name))
            | CommandError::Search(SearchError::Catalog(CatalogError::NotFound(name)))
            | CommandError::Playback(PlaybackError::Catalog(CatalogError::NotFound(name))) => {
                format!("Error: \"{}\" not found!", name)
            }
            CommandError::Catalog(CatalogError::AliasConflict { alias, filename }) => {
                format!("Error: Alias \"{}\" already used by {}", alias, filename)
            }
            CommandError::Playback(PlaybackError::NoChannel) => {
                "Please connect to a channel first!".to_string()
            }
            CommandError::Playback(PlaybackError::FileMissing { .. }) => {
                "Sound file not found, sorry about that! I deleted the command from the list to make you feel better.".to_string()
            }
            other => {
                error!("Sound command failed: {}", other);
                "Something went wrong, please try again later.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SqliteSoundCatalog;
    use crate::config::SearchConfig;
    use crate::playback::GuildQueues;
    use crate::testing::MockVoiceLookup;
    use tempfile::TempDir;

    struct Harness {
        commands: SoundCommands,
        catalog: Arc<SqliteSoundCatalog>,
        queues: GuildQueues,
        voice: MockVoiceLookup,
        sound_dir: TempDir,
    }

    impl Harness {
        fn new() -> Self {
            let catalog = Arc::new(SqliteSoundCatalog::in_memory().unwrap());
            catalog.insert_clip("airhorn.mp3", "loud").unwrap();
            catalog.add_alias("horn", "airhorn.mp3").unwrap();

            let sound_dir = TempDir::new().unwrap();
            let queues = GuildQueues::new();
            queues.init_guilds(["g1"]);
            let voice = MockVoiceLookup::new();

            let dyn_catalog = Arc::clone(&catalog) as Arc<dyn SoundCatalog>;
            let commands = SoundCommands::new(
                Arc::clone(&dyn_catalog),
                SearchEngine::new(Arc::clone(&dyn_catalog), SearchConfig::default()),
                PlaybackDispatcher::new(dyn_catalog, Arc::new(queues.clone()), sound_dir.path()),
                Arc::new(voice.clone()),
                "-",
            );

            Self {
                commands,
                catalog,
                queues,
                voice,
                sound_dir,
            }
        }

        async fn send(&self, text: &str) -> Vec<String> {
            self.commands.handle_message(&ctx(), text).await
        }
    }

    fn ctx() -> MessageContext {
        MessageContext {
            guild_id: Some("g1".to_string()),
            channel_id: "general".to_string(),
            author_id: "alice".to_string(),
        }
    }

    #[test]
    fn test_parse_alias_commands() {
        assert_eq!(
            SoundCommand::parse(r#"alias add "horn" "airhorn.mp3""#).unwrap(),
            SoundCommand::AliasAdd {
                alias: "horn".to_string(),
                filename: "airhorn.mp3".to_string()
            }
        );
        assert_eq!(
            SoundCommand::parse(r#"ALIAS Remove "horn""#).unwrap(),
            SoundCommand::AliasRemove {
                alias: "horn".to_string()
            }
        );
    }

    #[test]
    fn test_parse_malformed_alias() {
        let err = SoundCommand::parse(r#"alias add "horn""#).unwrap_err();
        assert!(matches!(
            err,
            CommandError::MalformedInput {
                usage: ALIAS_ADD_USAGE
            }
        ));

        let err = SoundCommand::parse("alias rename x").unwrap_err();
        assert!(matches!(err, CommandError::MalformedInput { usage: ALIAS_USAGE }));
    }

    #[test]
    fn test_parse_description() {
        assert_eq!(
            SoundCommand::parse(r#"description "A "very" loud, horn" "airhorn.mp3""#).unwrap(),
            SoundCommand::SetDescription {
                description: r#"A "very" loud, horn"#.to_string(),
                filename: "airhorn.mp3".to_string()
            }
        );
        assert!(SoundCommand::parse(r#"description "only text""#).is_err());
    }

    #[test]
    fn test_parse_simple_and_play() {
        assert_eq!(SoundCommand::parse("DbSize").unwrap(), SoundCommand::DbSize);
        assert_eq!(
            SoundCommand::parse("mostplayeddetailed").unwrap(),
            SoundCommand::MostPlayedDetailed
        );
        assert_eq!(
            SoundCommand::parse("search loud horn").unwrap(),
            SoundCommand::Search {
                query: "loud horn".to_string()
            }
        );
        assert_eq!(
            SoundCommand::parse(" Horn ").unwrap(),
            SoundCommand::Play {
                name: "Horn".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_alias_add_and_remove_replies() {
        let h = Harness::new();

        assert_eq!(
            h.send(r#"-alias add "air" "airhorn.mp3""#).await,
            vec![r#"Alias "air" added for "airhorn.mp3"!"#]
        );
        assert_eq!(
            h.send(r#"-alias add "air" "airhorn.mp3""#).await,
            vec![r#"Error: Alias "air" already used by airhorn.mp3"#]
        );
        assert_eq!(
            h.send(r#"-alias add "x" "ghost.mp3""#).await,
            vec![r#"Error: "ghost.mp3" not found!"#]
        );
        assert_eq!(
            h.send(r#"-alias remove "air""#).await,
            vec![r#"Removed alias "air" from db!"#]
        );
        assert_eq!(
            h.send(r#"-alias remove "air""#).await,
            vec![r#"Error: "air" not found!"#]
        );
    }

    #[tokio::test]
    async fn test_malformed_reply_includes_prefix() {
        let h = Harness::new();
        assert_eq!(
            h.send("-alias add horn").await,
            vec![r#"Invalid arguments! usage: -alias add "*alias*" "*filename*""#]
        );
    }

    #[tokio::test]
    async fn test_description_and_dbsize() {
        let h = Harness::new();

        assert_eq!(
            h.send(r#"-description "Very, very loud" "airhorn.mp3""#).await,
            vec![r#"Description of "airhorn.mp3" changed to "Very, very loud"!"#]
        );
        assert_eq!(
            h.catalog.get_clip("airhorn.mp3").unwrap().description,
            "Very, very loud"
        );
        assert_eq!(h.send("-dbsize").await, vec!["1"]);
    }

    #[tokio::test]
    async fn test_play_and_cleardata() {
        let h = Harness::new();
        std::fs::write(h.sound_dir.path().join("airhorn.mp3"), b"ID3").unwrap();
        h.voice.connect("g1", "alice", "voice-1");

        assert!(h.send("-HORN").await.is_empty());
        assert_eq!(h.queues.len("g1"), 1);
        assert_eq!(
            h.send("-mostplayed").await,
            vec!["Most Played Sound Clips:\n```1. airhorn.mp3: 1 time\n```"]
        );

        assert_eq!(h.send("-cleardata").await, vec!["Sound data cleared!"]);
        assert_eq!(h.catalog.get_clip("airhorn.mp3").unwrap().play_count, 0);
    }

    #[tokio::test]
    async fn test_play_without_voice_channel() {
        let h = Harness::new();
        assert_eq!(
            h.send("-horn").await,
            vec!["Please connect to a channel first!"]
        );
    }

    #[tokio::test]
    async fn test_play_missing_file_reply() {
        let h = Harness::new();
        h.voice.connect("g1", "alice", "voice-1");

        let replies = h.send("-horn").await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].starts_with("Sound file not found"));
        assert!(h.catalog.resolve("horn").is_err());
    }

    #[tokio::test]
    async fn test_play_in_direct_message_is_ignored() {
        let h = Harness::new();
        h.voice.connect("g1", "alice", "voice-1");
        let dm = MessageContext {
            guild_id: None,
            ..ctx()
        };

        assert!(h.commands.handle_message(&dm, "-horn").await.is_empty());
        assert!(h.catalog.resolve("horn").is_ok());
    }

    #[tokio::test]
    async fn test_unprefixed_chatter_is_ignored() {
        let h = Harness::new();
        assert!(h.send("horn").await.is_empty());
    }

    #[tokio::test]
    async fn test_search_pagination_through_messages() {
        let h = Harness::new();
        for i in 0..12 {
            h.catalog
                .insert_clip(&format!("beep{:02}.wav", i), "beep")
                .unwrap();
        }

        let first = h.send("-search BEEP").await;
        assert_eq!(first.len(), 1);
        assert!(first[0].starts_with("12 records found! Type `next` for next page:"));

        let second = h.send("next").await;
        assert_eq!(second.len(), 1);
        assert!(second[0].contains("11. beep10.wav: beep"));

        assert!(h.send("next").await.is_empty());
    }
}
