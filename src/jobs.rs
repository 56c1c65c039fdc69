//! Periodic background work: due reminders, stock thresholds, the server
//! health check, and the control panel repost.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::app::App;
use crate::commands::panel::control_panel;
use crate::commands::Reply;
use crate::plugins::reminders::commands::fired_message;
use crate::plugins::server::commands::{status_summary, with_server_buttons};
use crate::plugins::stocks::commands::price_alerts;

/// Where unsolicited messages go.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: String);
}

/// Prints notifications to stdout.
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, message: String) {
        println!("\n{}\n", message);
    }
}

/// Delivers every reminder that has come due. Each fires exactly once.
pub async fn reminder_tick(app: &App, notifier: &dyn Notifier) {
    match app.reminders.take_due(app.now()) {
        Ok(due) => {
            for reminder in &due {
                notifier.notify(fired_message(reminder)).await;
            }
        }
        Err(e) => tracing::error!(target: "reminders", "Reminder check failed: {}", e),
    }
}

pub async fn stock_tick(app: &App, notifier: &dyn Notifier) {
    if app.stocks.is_empty() {
        return;
    }
    let alerts = price_alerts(&app.stocks, app.services.quotes.as_ref()).await;
    if alerts.is_empty() {
        return;
    }

    tracing::info!(target: "stocks", count = alerts.len(), "Price alerts triggered");
    let message = alerts
        .iter()
        .map(|alert| alert.message())
        .collect::<Vec<_>>()
        .join("\n");
    notifier.notify(message).await;
}

pub async fn status_tick(app: &App, notifier: &dyn Notifier) {
    let message = match app.services.probe.status().await {
        Ok(status) => format!("🕐 **Server Check**\n{}", status_summary(&status)),
        Err(e) => {
            tracing::warn!(target: "server", "Scheduled status check failed: {}", e);
            format!("🕐 **Server Check**\n🔴 Server is offline or unreachable.\n```{}```", e)
        }
    };
    notifier.notify(with_server_buttons(Reply::text(message)).render()).await;
}

pub async fn panel_tick(notifier: &dyn Notifier) {
    notifier.notify(control_panel().render()).await;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    Reminders,
    Stocks,
    Status,
    Panel,
}

impl Job {
    pub const ALL: [Job; 4] = [Job::Reminders, Job::Stocks, Job::Status, Job::Panel];

    pub fn name(self) -> &'static str {
        match self {
            Job::Reminders => "reminders",
            Job::Stocks => "stocks",
            Job::Status => "status",
            Job::Panel => "panel",
        }
    }

    pub fn period(self, app: &App) -> Duration {
        let jobs = &app.settings.jobs;
        let secs = match self {
            Job::Reminders => jobs.reminder_interval_secs,
            Job::Stocks => jobs.stock_interval_secs,
            Job::Status => jobs.status_interval_secs,
            Job::Panel => jobs.panel_interval_secs,
        };
        Duration::from_secs(secs.max(1))
    }

    pub async fn run_once(self, app: &App, notifier: &dyn Notifier) {
        match self {
            Job::Reminders => reminder_tick(app, notifier).await,
            Job::Stocks => stock_tick(app, notifier).await,
            Job::Status => status_tick(app, notifier).await,
            Job::Panel => panel_tick(notifier).await,
        }
    }
}

/// Starts every job on its own interval. Missed ticks are skipped rather
/// than bunched up.
pub fn spawn_jobs(app: Arc<App>, notifier: Arc<dyn Notifier>) -> Vec<JoinHandle<()>> {
    Job::ALL
        .into_iter()
        .map(|job| {
            let app = Arc::clone(&app);
            let notifier = Arc::clone(&notifier);
            let period = job.period(&app);
            tracing::info!(target: "system", job = job.name(), ?period, "Background job scheduled");

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    interval.tick().await;
                    job.run_once(&app, notifier.as_ref()).await;
                }
            })
        })
        .collect()
}
