use std::sync::Arc;

use chrono::NaiveDate;
use lunch_menu_api::{raw::STATUS_SUCCESS, MealMenu, MenuFilter};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Url,
};
use serde_json::Value;

use crate::config::{ConfigError, UpstreamConfig, UpstreamMethod};

use super::helpers::RetryPolicy;

mod data;
pub use data::*;

/// Fixed description of the one request made to the meal provider.
#[derive(Debug)]
struct UpstreamRequest {
    url: Url,
    method: UpstreamMethod,
    headers: HeaderMap,
    form: Vec<(String, String)>,
    lunch_code: String,
    corner_field: usize,
    menu_field: usize,
}

#[derive(Clone)]
pub struct MenuService {
    client: reqwest::Client,
    request: Arc<UpstreamRequest>,
    retry: RetryPolicy,
}

impl MenuService {
    pub fn new(cfg: &UpstreamConfig, retry: RetryPolicy) -> Result<Self, ConfigError> {
        let url = cfg.url.as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingUpstreamUrl)?;
        let url = Url::parse(url).map_err(|err| ConfigError::InvalidUpstreamUrl {
            url: url.into(),
            reason: err.to_string(),
        })?;

        let headers = cfg.headers.iter().map(|(k, v)| -> Result<_, ConfigError> {
            Ok((
                HeaderName::from_bytes(k.as_bytes())
                    .map_err(|_| ConfigError::InvalidHeader(k.clone()))?,
                HeaderValue::from_str(v)
                    .map_err(|_| ConfigError::InvalidHeader(k.clone()))?,
            ))
        }).collect::<Result<HeaderMap, ConfigError>>()?;

        let client = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .build()
        .map_err(ConfigError::Client)?;

        Ok(Self {
            client,
            request: Arc::new(UpstreamRequest {
                url,
                method: cfg.method,
                headers,
                form: cfg.form.clone().into_iter().collect(),
                lunch_code: cfg.lunch_code.clone(),
                corner_field: cfg.corner_field,
                menu_field: cfg.menu_field,
            }),
            retry,
        })
    }

    /// Lunch for `date`, fetched and parsed with retries.
    pub async fn todays_menu(&self, date: NaiveDate) -> Result<MealMenu, LunchError> {
        let filter = self.filter(date);
        self.retry.run(|attempt| {
            let filter = &filter;
            async move {
                tracing::debug!(
                    "fetching menu for {date} (attempt {attempt}/{})",
                    self.retry.max_attempts(),
                );
                let payload = self.fetch().await?;
                Ok::<_, LunchError>(MealMenu::parse(payload, filter)?)
            }
        }).await
    }

    fn filter(&self, date: NaiveDate) -> MenuFilter {
        MenuFilter {
            date,
            lunch_code: self.request.lunch_code.clone(),
            corner_field: self.request.corner_field,
            menu_field: self.request.menu_field,
        }
    }

    /// Single request to the meal provider, no retries.
    pub async fn fetch(&self) -> Result<Value, LunchError> {
        let req = &self.request;
        let builder = match req.method {
            UpstreamMethod::Get => self.client.get(req.url.clone()),
            UpstreamMethod::Post => self.client.post(req.url.clone()).form(&req.form),
        };

        let res = builder
            .headers(req.headers.clone())
            .send().await
        .map_err(LunchError::Transport)?;

        let status = res.status();
        if !status.is_success() {
            return Err(LunchError::UpstreamStatus(status));
        }

        let body = res.bytes().await.map_err(LunchError::Transport)?;
        let payload: Value = serde_json::from_slice(&body)?;
        check_status(&payload)?;

        Ok(payload)
    }
}

/// Providers that wrap their data report success in a `status` member.
fn check_status(payload: &Value) -> Result<(), LunchError> {
    match payload.get("status") {
        None => Ok(()),
        Some(Value::String(s)) if s == STATUS_SUCCESS => Ok(()),
        Some(Value::String(s)) => Err(LunchError::UpstreamApplication(s.clone())),
        Some(other) => Err(LunchError::UpstreamApplication(other.to_string())),
    }
}
