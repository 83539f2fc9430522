// Welcome / farewell notifications
// Decides whether a membership event deserves an embed, builds it and sends it

use poise::serenity_prelude as serenity;
use tracing::{debug, warn};

use crate::models::welcome::{NotificationConfig, ServerConfig, WelcomeConfig};
use crate::utils::config::ConfigError;
use crate::utils::i18n::Localizer;
use crate::Error;

/// Avatar thumbnail served by the Discord CDN
pub fn avatar_url(user_id: serenity::UserId, avatar_hash: &str) -> String {
    format!(
        "https://cdn.discordapp.com/avatars/{}/{}.webp?size=512",
        user_id, avatar_hash
    )
}

/// Channel kinds that accept messages
pub fn is_text_based(kind: serenity::ChannelType) -> bool {
    matches!(
        kind,
        serenity::ChannelType::Text
            | serenity::ChannelType::News
            | serenity::ChannelType::Voice
            | serenity::ChannelType::Stage
            | serenity::ChannelType::PublicThread
            | serenity::ChannelType::PrivateThread
            | serenity::ChannelType::NewsThread
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Welcome,
    Farewell,
}

impl NotificationKind {
    fn settings(self, server: &ServerConfig) -> &NotificationConfig {
        match self {
            Self::Welcome => &server.welcome,
            Self::Farewell => &server.farewell,
        }
    }

    fn title_key(self) -> &'static str {
        match self {
            Self::Welcome => "welcome-title",
            Self::Farewell => "farewell-title",
        }
    }

    fn no_channel_key(self) -> &'static str {
        match self {
            Self::Welcome => "welcome-no-channel",
            Self::Farewell => "farewell-no-channel",
        }
    }

    fn channel_not_found_key(self) -> &'static str {
        match self {
            Self::Welcome => "welcome-channel-not-found",
            Self::Farewell => "farewell-channel-not-found",
        }
    }

    fn channel_not_text_key(self) -> &'static str {
        match self {
            Self::Welcome => "welcome-channel-not-text",
            Self::Farewell => "farewell-channel-not-text",
        }
    }
}

/// The member a join/leave event is about
#[derive(Debug, Clone)]
pub struct MemberEvent {
    pub guild_id: serenity::GuildId,
    pub user_id: serenity::UserId,
    pub username: String,
    pub avatar: Option<String>,
}

impl MemberEvent {
    pub fn new(guild_id: serenity::GuildId, user: &serenity::User) -> Self {
        Self {
            guild_id,
            user_id: user.id,
            username: user.name.clone(),
            avatar: user.avatar.as_ref().map(|hash| hash.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GuildInfo {
    pub name: String,
    pub member_count: u64,
}

#[derive(Debug, Clone)]
pub struct ChannelInfo {
    pub id: serenity::ChannelId,
    pub kind: serenity::ChannelType,
}

/// Rendered embed content, independent of the Discord builder types
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub thumbnail: Option<String>,
    /// (name, value) pairs, rendered as non-inline fields
    pub fields: Vec<(String, String)>,
}

impl Notification {
    pub fn to_embed(&self) -> serenity::CreateEmbed {
        let mut embed = serenity::CreateEmbed::new()
            .color(self.color)
            .title(&self.title)
            .description(&self.description)
            .timestamp(serenity::Timestamp::now());

        if let Some(url) = &self.thumbnail {
            embed = embed.thumbnail(url);
        }

        for (name, value) in &self.fields {
            embed = embed.field(name, value, false);
        }

        embed
    }
}

/// What the platform has to provide for a notification to go out
#[allow(async_fn_in_trait)]
pub trait Platform {
    /// Name from local state only, used for log lines
    fn cached_guild_name(&self, guild_id: serenity::GuildId) -> Option<String>;

    /// Name and live member count, may hit the network
    async fn guild_info(&self, guild_id: serenity::GuildId) -> Result<GuildInfo, Error>;

    /// `Ok(None)` when the channel does not exist in that guild
    async fn fetch_channel(
        &self,
        guild_id: serenity::GuildId,
        channel_id: serenity::ChannelId,
    ) -> Result<Option<ChannelInfo>, Error>;

    /// Profile accent color, which requires a fresh user fetch
    async fn fetch_accent_color(&self, user_id: serenity::UserId) -> Result<Option<u32>, Error>;

    async fn send_notification(
        &self,
        channel_id: serenity::ChannelId,
        notification: &Notification,
    ) -> Result<(), Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotConfigured,
    Disabled,
    NoChannel,
    ChannelNotFound,
    NotTextBased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    Skipped(SkipReason),
}

/// Join/leave handler, holding the read-only configuration
#[derive(Debug)]
pub struct Welcome {
    config: WelcomeConfig,
    l10n: Localizer,
    embed_color: u32,
}

impl Welcome {
    pub fn new(config: WelcomeConfig, l10n: Localizer, embed_color: u32) -> Result<Self, ConfigError> {
        if config.is_empty() {
            return Err(ConfigError::NoServers);
        }

        Ok(Self {
            config,
            l10n,
            embed_color,
        })
    }

    pub fn config(&self) -> &WelcomeConfig {
        &self.config
    }

    pub fn l10n(&self) -> &Localizer {
        &self.l10n
    }

    pub async fn handle_join<P: Platform>(&self, platform: &P, event: &MemberEvent) -> Result<Outcome, Error> {
        self.notify(platform, NotificationKind::Welcome, event).await
    }

    pub async fn handle_leave<P: Platform>(&self, platform: &P, event: &MemberEvent) -> Result<Outcome, Error> {
        self.notify(platform, NotificationKind::Farewell, event).await
    }

    async fn notify<P: Platform>(
        &self,
        platform: &P,
        kind: NotificationKind,
        event: &MemberEvent,
    ) -> Result<Outcome, Error> {
        let Some(server) = self.config.server(event.guild_id) else {
            let guild_id = event.guild_id.to_string();
            debug!("{}", self.l10n.tr("guild-not-configured", &[("guild", guild_id.as_str())]));
            return Ok(Outcome::Skipped(SkipReason::NotConfigured));
        };

        let settings = kind.settings(server);
        if !settings.activate {
            return Ok(Outcome::Skipped(SkipReason::Disabled));
        }

        // Warnings only need a name, never fetch the guild for them
        let label = platform
            .cached_guild_name(event.guild_id)
            .unwrap_or_else(|| event.guild_id.to_string());

        let Some(channel_id) = settings.channel else {
            warn!(guild_id = %event.guild_id, "{}", self.l10n.tr(kind.no_channel_key(), &[("guild", label.as_str())]));
            return Ok(Outcome::Skipped(SkipReason::NoChannel));
        };

        let Some(channel) = platform.fetch_channel(event.guild_id, channel_id).await? else {
            warn!(guild_id = %event.guild_id, %channel_id, "{}", self.l10n.tr(kind.channel_not_found_key(), &[("guild", label.as_str())]));
            return Ok(Outcome::Skipped(SkipReason::ChannelNotFound));
        };

        if !is_text_based(channel.kind) {
            warn!(guild_id = %event.guild_id, %channel_id, "{}", self.l10n.tr(kind.channel_not_text_key(), &[("guild", label.as_str())]));
            return Ok(Outcome::Skipped(SkipReason::NotTextBased));
        }

        let guild = platform.guild_info(event.guild_id).await?;
        let accent = platform.fetch_accent_color(event.user_id).await?;
        let notification = self.compose(kind, server, &guild, event, accent);

        platform.send_notification(channel.id, &notification).await?;
        Ok(Outcome::Sent)
    }

    /// Build the embed content for an event that passed every check
    pub fn compose(
        &self,
        kind: NotificationKind,
        server: &ServerConfig,
        guild: &GuildInfo,
        event: &MemberEvent,
        accent: Option<u32>,
    ) -> Notification {
        let settings = kind.settings(server);

        let mut description = match kind {
            NotificationKind::Welcome => {
                let name = server.name.as_deref().unwrap_or(&guild.name);
                self.l10n.tr("welcome-description", &[("guild", name)])
            }
            NotificationKind::Farewell => self.l10n.t("farewell-description"),
        };

        if settings.show_member_count {
            description.push('\n');
            let count = guild.member_count.to_string();
            description.push_str(&self.l10n.tr("member-count", &[("count", count.as_str())]));
        }

        let thumbnail = if settings.show_profile_picture {
            event
                .avatar
                .as_deref()
                .map(|hash| avatar_url(event.user_id, hash))
        } else {
            None
        };

        let fields = settings
            .custom_info
            .iter()
            .filter(|info| !info.is_empty())
            .map(|info| (self.l10n.t("infos"), info.clone()))
            .collect();

        Notification {
            title: self.l10n.tr(kind.title_key(), &[("user", event.username.as_str())]),
            description,
            color: accent.unwrap_or(self.embed_color),
            thumbnail,
            fields,
        }
    }
}
