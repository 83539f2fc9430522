use poise::serenity_prelude as serenity;

use crate::models::welcome::NotificationConfig;
use crate::utils::config::colors;
use crate::utils::i18n::Localizer;
use crate::{Context, Error};

/// Show the welcome and farewell settings of this server
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    ephemeral
)]
pub async fn welcome(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let l10n = data.welcome.l10n();

    // guild_only
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    let server = match data.welcome.config().server(guild_id) {
        Some(server) => server,
        None => {
            ctx.say(l10n.t("config-not-configured")).await?;
            return Ok(());
        }
    };

    let mut title = l10n.t("config-title");
    if let Some(name) = &server.name {
        title = format!("{} · {}", title, name);
    }

    let embed = serenity::CreateEmbed::new()
        .title(title)
        .field(l10n.t("config-welcome"), describe(l10n, &server.welcome), true)
        .field(l10n.t("config-farewell"), describe(l10n, &server.farewell), true)
        .color(colors::INFO);

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;

    Ok(())
}

fn yes_no(l10n: &Localizer, value: bool) -> String {
    if value {
        l10n.t("config-yes")
    } else {
        l10n.t("config-no")
    }
}

/// One line per setting, for an embed field
fn describe(l10n: &Localizer, settings: &NotificationConfig) -> String {
    let channel = settings
        .channel
        .map(|id| format!("<#{}>", id))
        .unwrap_or_else(|| l10n.t("config-not-set"));

    let mut lines = vec![
        format!("**{}:** {}", l10n.t("config-active"), yes_no(l10n, settings.activate)),
        format!("**{}:** {}", l10n.t("config-channel"), channel),
        format!(
            "**{}:** {}",
            l10n.t("config-member-count"),
            yes_no(l10n, settings.show_member_count)
        ),
        format!(
            "**{}:** {}",
            l10n.t("config-profile-picture"),
            yes_no(l10n, settings.show_profile_picture)
        ),
    ];

    if let Some(info) = settings.custom_info.as_deref().filter(|info| !info.is_empty()) {
        lines.push(format!("**{}:** {}", l10n.t("infos"), info));
    }

    lines.join("\n")
}
