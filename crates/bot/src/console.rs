//! Stdin/stdout stand-in for a chat client.
//!
//! Every input line is a message from the configured console user in the
//! configured channel. A line starting with `@name ` is sent as user `name`
//! instead, which makes it possible to interleave other users' messages
//! with a pending search.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use soundboard_core::{ConsoleConfig, MessageContext, SoundCommands, VoiceLookup};

/// Voice presence for the console: every user sits in the configured
/// voice channel of the console guild, or nowhere if none is configured.
pub struct ConsoleVoice {
    guild_id: String,
    channel: Option<String>,
}

impl ConsoleVoice {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            guild_id: config.guild_id.clone(),
            channel: config.voice_channel.clone(),
        }
    }
}

#[async_trait]
impl VoiceLookup for ConsoleVoice {
    async fn voice_channel(&self, guild_id: &str, _user_id: &str) -> Option<String> {
        if guild_id == self.guild_id {
            self.channel.clone()
        } else {
            None
        }
    }
}

/// Feeds console lines to the command layer and prints the replies.
pub struct ConsoleSession {
    commands: SoundCommands,
    guild_id: String,
    channel_id: String,
    user_id: String,
}

impl ConsoleSession {
    pub fn new(commands: SoundCommands, config: &ConsoleConfig) -> Self {
        Self {
            commands,
            guild_id: config.guild_id.clone(),
            channel_id: config.channel_id.clone(),
            user_id: config.user_id.clone(),
        }
    }

    /// Split an optional `@user ` override off a line.
    fn author_and_text<'a>(&'a self, line: &'a str) -> (&'a str, &'a str) {
        if let Some(rest) = line.strip_prefix('@') {
            if let Some((user, text)) = rest.split_once(' ') {
                if !user.is_empty() {
                    return (user, text);
                }
            }
        }
        (self.user_id.as_str(), line)
    }

    /// Process lines until `input` is exhausted.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = BufReader::new(input).lines();
        while let Some(line) = lines.next_line().await? {
            let (author, text) = self.author_and_text(&line);
            let ctx = MessageContext {
                guild_id: Some(self.guild_id.clone()),
                channel_id: self.channel_id.clone(),
                author_id: author.to_string(),
            };

            for reply in self.commands.handle_message(&ctx, text).await {
                output.write_all(reply.as_bytes()).await?;
                output.write_all(b"\n").await?;
            }
            output.flush().await?;
        }
        Ok(())
    }
}
