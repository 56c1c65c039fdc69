//! The owned service container shared between the console loop and the
//! background jobs.

use chrono::{Local, NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::settings::AppSettings;
use crate::plugins::projects::{init_project_store, ProjectStore};
use crate::plugins::reminders::{init_reminder_store, ReminderStore};
use crate::plugins::schedule::{init_schedule_store, ScheduleStore};
use crate::plugins::server::disk::{DirWalker, DiskUsage};
use crate::plugins::server::rcon::{RconClient, RconExecutor};
use crate::plugins::server::status::{PingClient, StatusProbe};
use crate::plugins::stocks::quotes::{QuoteSource, YahooQuotes};
use crate::plugins::stocks::{init_stock_store, StockStore};
use crate::plugins::weather::client::{OpenWeatherClient, WeatherSource};
use crate::plugins::weather::gate::RateGate;
use crate::plugins::weather::init_weather_gate;

/// External collaborators, swappable for fakes in tests.
#[derive(Clone)]
pub struct Services {
    pub weather: Arc<dyn WeatherSource>,
    pub quotes: Arc<dyn QuoteSource>,
    pub rcon: Arc<dyn RconExecutor>,
    pub probe: Arc<dyn StatusProbe>,
    pub disk: Arc<dyn DiskUsage>,
}

impl Services {
    pub fn from_settings(settings: &AppSettings) -> Self {
        let server = &settings.server;
        Self {
            weather: Arc::new(OpenWeatherClient::new(settings.weather.api_key.clone())),
            quotes: Arc::new(YahooQuotes::new()),
            rcon: Arc::new(RconClient::new(
                server.host.clone(),
                server.rcon_port,
                server.rcon_password.clone(),
                server.timeout(),
            )),
            probe: Arc::new(PingClient::new(server.host.clone(), server.port, server.timeout())),
            disk: Arc::new(DirWalker),
        }
    }
}

pub struct App {
    pub storage_dir: PathBuf,
    pub settings: AppSettings,
    pub schedule: ScheduleStore,
    pub stocks: StockStore,
    pub reminders: ReminderStore,
    pub projects: ProjectStore,
    pub weather_gate: RateGate,
    pub services: Services,
}

impl App {
    /// Loads every collection from `storage_dir`. Missing or malformed
    /// documents start empty, so this never fails.
    pub fn open(storage_dir: &Path, settings: AppSettings, services: Services) -> Self {
        let weather_gate = init_weather_gate(storage_dir, settings.weather.limits());
        let app = Self {
            storage_dir: storage_dir.to_path_buf(),
            schedule: init_schedule_store(storage_dir),
            stocks: init_stock_store(storage_dir),
            reminders: init_reminder_store(storage_dir),
            projects: init_project_store(storage_dir),
            weather_gate,
            settings,
            services,
        };
        tracing::info!(target: "system", "App state loaded from {:?}", app.storage_dir);
        app
    }

    pub fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }
}
