//! Cross-plugin replies: `!stats` and `!daily`.

use chrono::Local;

use super::Reply;
use crate::app::App;
use crate::plugins::schedule::commands::format_tasks;
use crate::plugins::stocks::commands::fetch_prices;
use crate::plugins::weather::commands::gated_lookup;
use crate::shared::errors::BotError;

pub fn stats(app: &App) -> Reply {
    Reply::text(format!(
        "📊 **Bot Statistics**\n📋 Total Tasks: {}\n📈 Stocks Tracked: {}\n⏰ Active Reminders: {}\n🏗️ Projects: {}\n🌤️ Weather Calls This Month: {}",
        app.schedule.total_tasks(),
        app.stocks.len(),
        app.reminders.len(),
        app.projects.list().len(),
        app.weather_gate.monthly_count()
    ))
}

async fn weather_section(app: &App) -> (String, Option<String>) {
    let city = &app.settings.weather.default_city;
    match gated_lookup(&app.weather_gate, app.services.weather.as_ref(), city, &Local::now()).await {
        Ok((report, warning)) => (
            format!("🌤 Weather in **{}**: {}, {}°C", city, report.condition, report.temp_c),
            warning,
        ),
        Err(BotError::RateLimited(_)) => ("Weather API limit reached, try again later.".to_string(), None),
        Err(e) => {
            tracing::warn!(target: "weather", "Daily weather failed: {}", e);
            ("Could not get weather info.".to_string(), None)
        }
    }
}

async fn stock_section(app: &App) -> String {
    let (prices, failed) = fetch_prices(&app.stocks, app.services.quotes.as_ref()).await;

    let mut out = String::new();
    for (symbol, price) in &prices {
        out.push_str(&format!("{}: ${:.2}\n", symbol, price));
    }
    for symbol in &failed {
        out.push_str(&format!("{}: Error fetching price\n", symbol));
    }
    if out.is_empty() {
        out.push_str("No stocks in watchlist.");
    }
    out.trim_end().to_string()
}

fn task_section(app: &App) -> String {
    let mut out = String::new();
    for (category, tasks) in app.schedule.tasks_on(app.today()) {
        out.push_str(&format!("__{}__\n", category));
        out.push_str(&format_tasks(&tasks, ""));
    }
    if out.is_empty() {
        out.push_str("No tasks for today.");
    }
    out.trim_end().to_string()
}

fn reminder_section(app: &App) -> String {
    let today = app.reminders.due_on(app.today());
    if today.is_empty() {
        return "No reminders for today.".to_string();
    }
    today
        .iter()
        .map(|r| format!("⏰ {} - {}", r.due.format("%H:%M"), r.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `!daily`: weather, stock prices, today's tasks and today's reminders.
///
/// Each section degrades to a short message on failure; the summary itself
/// always renders.
pub async fn daily(app: &App) -> Reply {
    let (weather, warning) = weather_section(app).await;
    let body = format!(
        "📊 **Daily Summary**\n\n🌤️ **Weather**\n{}\n\n📈 **Stocks**\n{}\n\n📋 **Today's Tasks**\n{}\n\n⏰ **Today's Reminders**\n{}",
        weather,
        stock_section(app).await,
        task_section(app),
        reminder_section(app)
    );
    Reply::text(body).with_notice(warning)
}
