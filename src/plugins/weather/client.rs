use async_trait::async_trait;
use serde::Deserialize;

use crate::shared::errors::{BotError, BotResult};

const OPENWEATHER_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub city: String,
    pub condition: String,
    pub temp_c: f64,
    pub feels_like_c: f64,
    pub humidity: u32,
    pub wind_mps: f64,
}

impl WeatherReport {
    pub fn summary(&self) -> String {
        format!(
            "🌤 Weather in **{}**:\nCondition: {}\nTemperature: {}°C (feels like {}°C)\nHumidity: {}%\nWind speed: {} m/s",
            self.city, self.condition, self.temp_c, self.feels_like_c, self.humidity, self.wind_mps
        )
    }
}

/// Metered weather lookup by city name.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, city: &str) -> BotResult<WeatherReport>;
}

pub struct OpenWeatherClient {
    http: reqwest::Client,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }
}

#[derive(Deserialize)]
struct OwmResponse {
    weather: Vec<OwmCondition>,
    main: OwmMain,
    wind: OwmWind,
}

#[derive(Deserialize)]
struct OwmCondition {
    description: String,
}

#[derive(Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: u32,
}

#[derive(Deserialize)]
struct OwmWind {
    speed: f64,
}

/// Capitalizes the first character, leaving the rest untouched.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn parse_report(city: &str, body: serde_json::Value) -> BotResult<WeatherReport> {
    // `cod` is a number on success and sometimes a string on failure.
    let ok = match &body["cod"] {
        serde_json::Value::Number(n) => n.as_u64() == Some(200),
        serde_json::Value::String(s) => s == "200",
        _ => false,
    };
    if !ok {
        return Err(BotError::external("Could not get weather for that location."));
    }

    let parsed: OwmResponse = serde_json::from_value(body)
        .map_err(|e| BotError::external(format!("Malformed weather response: {}", e)))?;
    let condition = parsed
        .weather
        .first()
        .map(|c| capitalize(&c.description))
        .unwrap_or_default();

    Ok(WeatherReport {
        city: city.to_string(),
        condition,
        temp_c: parsed.main.temp,
        feels_like_c: parsed.main.feels_like,
        humidity: parsed.main.humidity,
        wind_mps: parsed.wind.speed,
    })
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self, city: &str) -> BotResult<WeatherReport> {
        if self.api_key.is_empty() {
            return Err(BotError::external("Weather API key is not configured."));
        }

        let body: serde_json::Value = self
            .http
            .get(OPENWEATHER_URL)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(|e| BotError::external(format!("Weather request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| BotError::external(format!("Malformed weather response: {}", e)))?;

        parse_report(city, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_report_success() {
        let body = json!({
            "cod": 200,
            "weather": [{"description": "light rain"}],
            "main": {"temp": 21.5, "feels_like": 20.9, "humidity": 64},
            "wind": {"speed": 3.6}
        });

        let report = parse_report("Windsor, Ontario", body).unwrap();
        assert_eq!(report.condition, "Light rain");
        assert_eq!(report.humidity, 64);
        assert!(report.summary().contains("21.5°C"));
    }

    #[test]
    fn test_parse_report_not_found_is_external_error() {
        let body = json!({"cod": "404", "message": "city not found"});

        assert!(matches!(parse_report("Atlantis", body), Err(BotError::External(_))));
    }
}
