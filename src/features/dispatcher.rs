// Gateway event dispatcher
// Routes member join/leave events to the welcome handler

use poise::serenity_prelude as serenity;
use tracing::{debug, info};

use crate::features::welcome::{ChannelInfo, GuildInfo, MemberEvent, Notification, Platform};
use crate::{Data, Error};

/// `Platform` backed by the live serenity client
pub struct SerenityPlatform<'a> {
    ctx: &'a serenity::Context,
}

impl<'a> SerenityPlatform<'a> {
    pub fn new(ctx: &'a serenity::Context) -> Self {
        Self { ctx }
    }
}

/// Keep only channels that belong to the guild being notified
pub fn guild_channel_info(
    channel: serenity::Channel,
    guild_id: serenity::GuildId,
) -> Option<ChannelInfo> {
    match channel {
        serenity::Channel::Guild(channel) if channel.guild_id == guild_id => Some(ChannelInfo {
            id: channel.id,
            kind: channel.kind,
        }),
        _ => None,
    }
}

/// Discord answered 404 for the requested resource
pub fn is_not_found(error: &::serenity::Error) -> bool {
    matches!(
        error,
        ::serenity::Error::Http(::serenity::http::HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404
    )
}

impl Platform for SerenityPlatform<'_> {
    fn cached_guild_name(&self, guild_id: serenity::GuildId) -> Option<String> {
        guild_id.name(self.ctx)
    }

    async fn guild_info(&self, guild_id: serenity::GuildId) -> Result<GuildInfo, Error> {
        // Cache first, the guard must not live across the HTTP call
        let cached = self.ctx.cache.guild(guild_id).map(|guild| GuildInfo {
            name: guild.name.clone(),
            member_count: guild.member_count,
        });
        if let Some(info) = cached {
            return Ok(info);
        }

        debug!("Guild {} not cached, fetching with counts", guild_id);
        let guild = self.ctx.http.get_guild_with_counts(guild_id).await?;
        Ok(GuildInfo {
            name: guild.name,
            member_count: guild.approximate_member_count.unwrap_or_default(),
        })
    }

    async fn fetch_channel(
        &self,
        guild_id: serenity::GuildId,
        channel_id: serenity::ChannelId,
    ) -> Result<Option<ChannelInfo>, Error> {
        match self.ctx.http.get_channel(channel_id).await {
            Ok(channel) => Ok(guild_channel_info(channel, guild_id)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch_accent_color(&self, user_id: serenity::UserId) -> Result<Option<u32>, Error> {
        let user = self.ctx.http.get_user(user_id).await?;
        Ok(user.accent_colour.map(|colour| colour.0))
    }

    async fn send_notification(
        &self,
        channel_id: serenity::ChannelId,
        notification: &Notification,
    ) -> Result<(), Error> {
        channel_id
            .send_message(
                &self.ctx.http,
                serenity::CreateMessage::new().embed(notification.to_embed()),
            )
            .await?;
        Ok(())
    }
}

fn guild_label(ctx: &serenity::Context, guild_id: serenity::GuildId) -> String {
    guild_id.name(ctx).unwrap_or_else(|| guild_id.to_string())
}

/// Poise event handler
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    let welcome = &data.welcome;

    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!("Logged in as {}", data_about_bot.user.name);
            info!("{}", welcome.l10n().t("ready"));
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            let guild = guild_label(ctx, new_member.guild_id);
            debug!(
                "{}",
                welcome.l10n().tr(
                    "member-joined",
                    &[("user", new_member.user.name.as_str()), ("guild", guild.as_str())]
                )
            );

            let member = MemberEvent::new(new_member.guild_id, &new_member.user);
            let outcome = welcome
                .handle_join(&SerenityPlatform::new(ctx), &member)
                .await?;
            debug!(guild_id = %member.guild_id, user_id = %member.user_id, ?outcome, "Welcome handled");
        }
        serenity::FullEvent::GuildMemberRemoval { guild_id, user, .. } => {
            let guild = guild_label(ctx, *guild_id);
            debug!(
                "{}",
                welcome
                    .l10n()
                    .tr("member-left", &[("user", user.name.as_str()), ("guild", guild.as_str())])
            );

            let member = MemberEvent::new(*guild_id, user);
            let outcome = welcome
                .handle_leave(&SerenityPlatform::new(ctx), &member)
                .await?;
            debug!(guild_id = %member.guild_id, user_id = %member.user_id, ?outcome, "Farewell handled");
        }
        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn guild_channel(guild_id: &str, kind: u8) -> serenity::Channel {
        serde_json::from_value(json!({
            "id": "200",
            "type": kind,
            "guild_id": guild_id,
            "name": "welcome",
            "position": 0,
            "permission_overwrites": [],
            "nsfw": false,
            "flags": 0,
            "available_tags": [],
            "applied_tags": []
        }))
        .unwrap()
    }

    #[test]
    fn test_channel_in_guild() {
        let info = guild_channel_info(guild_channel("100", 0), serenity::GuildId::new(100)).unwrap();
        assert_eq!(info.id, serenity::ChannelId::new(200));
        assert_eq!(info.kind, serenity::ChannelType::Text);
    }

    #[test]
    fn test_category_is_still_resolved() {
        // Text capability is decided by the handler, not here
        let info = guild_channel_info(guild_channel("100", 4), serenity::GuildId::new(100)).unwrap();
        assert_eq!(info.kind, serenity::ChannelType::Category);
    }

    #[test]
    fn test_channel_of_another_guild() {
        assert!(guild_channel_info(guild_channel("101", 0), serenity::GuildId::new(100)).is_none());
    }

    #[test]
    fn test_private_channel() {
        let channel: serenity::Channel = serde_json::from_value(json!({
            "id": "200",
            "type": 1,
            "recipients": [{
                "id": "300",
                "username": "alice",
                "discriminator": "0",
                "avatar": null
            }]
        }))
        .unwrap();

        assert!(guild_channel_info(channel, serenity::GuildId::new(100)).is_none());
    }

    #[test]
    fn test_other_errors_are_not_not_found() {
        assert!(!is_not_found(&::serenity::Error::Other("gateway closed")));
    }
}
