//! `!panel`: one button per feature, so nothing has to be typed.

use super::components::ComponentId;
use super::Reply;
use crate::plugins::server::commands::with_server_buttons;

pub fn control_panel() -> Reply {
    let reply = Reply::text(
        "🤖 **Control Panel**\nPress a button below instead of typing the command.",
    )
    .with_button("📋 Tasks", ComponentId::PanelTasks)
    .with_button("📅 Schedule", ComponentId::PanelSchedule)
    .with_button("🌤️ Weather", ComponentId::PanelWeather)
    .with_button("📈 Stocks", ComponentId::PanelStocks)
    .with_button("⏰ Reminders", ComponentId::PanelReminders)
    .with_button("❓ Help", ComponentId::PanelHelp);
    with_server_buttons(reply)
}
