use chrono::{DateTime, TimeZone};

use super::client::{WeatherReport, WeatherSource};
use super::gate::{Decision, RateGate};
use crate::app::App;
use crate::commands::Reply;
use crate::shared::errors::{BotError, BotResult};

/// Asks the gate first and only calls the API once admitted.
///
/// Returns the report and the gate's budget warning, if any.
pub async fn gated_lookup<Tz: TimeZone>(
    gate: &RateGate,
    source: &dyn WeatherSource,
    city: &str,
    now: &DateTime<Tz>,
) -> BotResult<(WeatherReport, Option<String>)> {
    let warning = match gate.try_acquire(now)? {
        Decision::Allowed { warning } => warning,
        Decision::Denied(reason) => {
            tracing::warn!(target: "weather", city, ?reason, "Weather call denied");
            return Err(BotError::RateLimited(reason));
        }
    };

    let report = source.current(city).await?;
    tracing::info!(target: "weather", city, monthly = gate.monthly_count(), "Weather lookup");
    Ok((report, warning))
}

pub async fn weather(app: &App, city: Option<&str>) -> BotResult<Reply> {
    let city = city
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(&app.settings.weather.default_city);

    let (report, warning) = gated_lookup(
        &app.weather_gate,
        app.services.weather.as_ref(),
        city,
        &chrono::Local::now(),
    )
    .await?;
    Ok(Reply::text(report.summary()).with_notice(warning))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::weather::gate::GateLimits;
    use crate::shared::errors::DenyReason;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherSource for CountingSource {
        async fn current(&self, city: &str) -> BotResult<WeatherReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(WeatherReport {
                city: city.to_string(),
                condition: "Clear sky".into(),
                temp_c: 20.0,
                feels_like_c: 19.0,
                humidity: 40,
                wind_mps: 2.0,
            })
        }
    }

    #[tokio::test]
    async fn test_denied_call_never_reaches_api() {
        let tmp = tempfile::tempdir().unwrap();
        let limits = GateLimits {
            max_calls_per_minute: 1,
            ..GateLimits::default()
        };
        let gate = RateGate::open(tmp.path().join("weather_usage.json"), limits);
        let source = CountingSource {
            calls: AtomicUsize::new(0),
        };
        let now = Utc::now();

        let (report, warning) = gated_lookup(&gate, &source, "Windsor", &now).await.unwrap();
        assert_eq!(report.city, "Windsor");
        assert_eq!(warning, None);

        let denied = gated_lookup(&gate, &source, "Windsor", &now).await;
        assert!(matches!(denied, Err(BotError::RateLimited(DenyReason::RateLimited))));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
