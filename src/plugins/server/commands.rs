use std::path::PathBuf;

use super::disk::format_gb;
use super::format::{plugin_list, strip_colors, world_list};
use super::status::ServerStatus;
use crate::app::App;
use crate::commands::components::ComponentId;
use crate::commands::Reply;
use crate::plugins::projects::types::Member;
use crate::shared::errors::{BotError, BotResult};

/// Runs an RCON command, prefixing any failure with `context`.
async fn rcon(app: &App, command: &str, context: &str) -> BotResult<String> {
    app.services
        .rcon
        .execute(command)
        .await
        .map_err(|e| BotError::external(format!("{}: {}", context, e)))
}

pub async fn say(app: &App, caller: &Member, message: &str) -> BotResult<Reply> {
    let broadcast = format!("say [Console - {}] {}", caller.name, message);
    rcon(app, &broadcast, "Failed to broadcast message").await?;
    tracing::info!(target: "server", user = %caller.name, "Broadcast sent");
    Ok(Reply::text(format!("📢 Sent to Minecraft chat:\n> {}", message)))
}

pub async fn raw(app: &App, command: &str) -> BotResult<Reply> {
    let response = rcon(app, command, "Failed to run command").await?;
    tracing::info!(target: "server", command, "RCON command executed");
    Ok(Reply::text(format!(
        "✅ Command executed:\n```{}```",
        strip_colors(&response).trim()
    )))
}

pub fn status_summary(status: &ServerStatus) -> String {
    let mut body = status.summary();
    if !status.sample.is_empty() {
        body.push_str(&format!("\n🎮 Online Players: {}", status.sample.join(", ")));
    }
    body
}

/// Appends the server control row: one button per server command, then the
/// project board.
pub fn with_server_buttons(reply: Reply) -> Reply {
    reply
        .with_button("📡 Status", ComponentId::ServerStatus)
        .with_button("👥 Players", ComponentId::ServerPlayers)
        .with_button("🔌 Plugins", ComponentId::ServerPlugins)
        .with_button("🌍 Worlds", ComponentId::ServerWorlds)
        .with_button("📈 TPS", ComponentId::ServerTps)
        .with_button("🌱 Seed", ComponentId::ServerSeed)
        .with_button("🗺️ Map", ComponentId::ServerMap)
        .with_button("🧮 SizeWorld", ComponentId::ServerSizeWorld)
        .with_button("🧮 SizeMap", ComponentId::ServerSizeMap)
        .with_button("📁 SizeMine", ComponentId::ServerSizeMine)
        .with_button("⚡ Command", ComponentId::ServerCommand)
        .with_button("📋 Projects", ComponentId::BoardRefresh)
}

/// `!status` always answers; an unreachable server is reported, not raised.
pub async fn status(app: &App) -> Reply {
    let reply = match app.services.probe.status().await {
        Ok(status) => Reply::text(format!(
            "📡 **{}**\n{}",
            app.settings.server.address(),
            status_summary(&status)
        )),
        Err(e) => Reply::text(format!("🔴 Server is offline or unreachable.\n```{}```", e)),
    };
    with_server_buttons(reply)
}

pub async fn players(app: &App) -> BotResult<Reply> {
    let status = app
        .services
        .probe
        .status()
        .await
        .map_err(|_| BotError::external("Unable to fetch player list."))?;

    if status.sample.is_empty() {
        return Ok(Reply::text("👥 No players currently visible."));
    }
    Ok(Reply::text(format!("👥 Online players: {}", status.sample.join(", "))))
}

pub async fn plugins(app: &App) -> BotResult<Reply> {
    let response = rcon(app, "plugins", "Failed to fetch plugins").await?;
    Ok(Reply::text(format!(
        "🔌 **Plugins Installed:**\n`{}`",
        plugin_list(&response)
    )))
}

pub async fn worlds(app: &App) -> BotResult<Reply> {
    let response = rcon(app, "mv list", "Failed to fetch world list").await?;
    Ok(Reply::text(format!("🌍 **Worlds Loaded:**\n```{}```", world_list(&response))))
}

pub async fn tps(app: &App) -> BotResult<Reply> {
    let response = rcon(app, "tps", "Failed to fetch TPS").await?;
    Ok(Reply::text(format!(
        "📈 **TPS Status:**\n```{}```",
        strip_colors(&response).trim()
    )))
}

pub async fn seed(app: &App) -> BotResult<Reply> {
    let response = rcon(app, "seed", "Failed to get seed").await?;
    Ok(Reply::text(format!("🌱 Seed: `{}`", strip_colors(&response).trim())))
}

pub fn ip(app: &App) -> Reply {
    Reply::text(format!("📡 Server IP: `{}`", app.settings.server.address()))
}

pub fn map(app: &App) -> Reply {
    let url = app.settings.server.map_url.trim();
    if url.is_empty() {
        return Reply::text("🗺️ No live map is configured.");
    }
    Reply::text(format!("🗺️ **Live Map:** {}", url))
}

fn server_folder(app: &App, folder: &str) -> BotResult<PathBuf> {
    app.settings.server.resolve(folder).ok_or_else(|| {
        BotError::validation("No server folder is configured. Set `server.serverDir` in settings.json.")
    })
}

/// `!sizeworld`: every configured world folder and their total. A folder
/// that cannot be measured is listed with its error and left out of the
/// total.
pub async fn size_worlds(app: &App) -> BotResult<Reply> {
    let mut total = 0;
    let mut lines = Vec::new();

    for world in &app.settings.server.worlds {
        let path = server_folder(app, &world.path)?;
        match app.services.disk.folder_size(&path).await {
            Ok(bytes) => {
                total += bytes;
                lines.push(format!("📁 **{}**: `{}`", world.name, format_gb(bytes)));
            }
            Err(e) => {
                tracing::warn!(target: "server", world = %world.name, "Folder size failed: {}", e);
                lines.push(format!("❌ **{}**: Error - `{}`", world.name, e));
            }
        }
    }

    lines.push(format!("\n📦 **Total World Size**: `{}`", format_gb(total)));
    Ok(Reply::text(format!("🌍 **World Folder Sizes:**\n{}", lines.join("\n"))))
}

pub async fn size_map(app: &App) -> BotResult<Reply> {
    let path = server_folder(app, &app.settings.server.map_tiles_dir)?;
    let bytes = app
        .services
        .disk
        .folder_size(&path)
        .await
        .map_err(|e| BotError::external(format!("Error getting map size: {}", e)))?;
    Ok(Reply::text(format!(
        "🗺️ Map tiles folder size:\n```{}  {}```",
        format_gb(bytes),
        path.display()
    )))
}

pub async fn size_mine(app: &App) -> BotResult<Reply> {
    let path = server_folder(app, ".")?;
    let bytes = app
        .services
        .disk
        .folder_size(&path)
        .await
        .map_err(|e| BotError::external(format!("Error getting size: {}", e)))?;
    Ok(Reply::text(format!(
        "📁 Minecraft folder size:\n```{}  {}```",
        format_gb(bytes),
        app.settings.server.server_dir.trim()
    )))
}
