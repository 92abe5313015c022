
use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Form,
    Json,
    Router,
};

use chrono::NaiveDate;
use lunch_menu_api::{format_menu, seoul_today};

use crate::config::{Config, ConfigError};

use self::data::MenuService;

mod data;
mod helpers;
use helpers::RetryPolicy;

#[derive(Clone, FromRef)]
struct AppState {
    menus: MenuService,
}

impl AppState {
    fn new(config: &Config) -> Result<Self, ConfigError> {
        let retry = RetryPolicy::from(&config.retry);
        tracing::info!("fetching menus with {retry:?}");

        let menus = MenuService::new(&config.upstream, retry)?;
        Ok(Self { menus })
    }
}

pub fn make_router(config: &Config) -> Result<Router, ConfigError> {
    Ok(router(AppState::new(config)?))
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/commands/lunch", post(lunch_command))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(r#"<!doctype html>
<html>
    <head>
        <title>Today's Lunch</title>
    </head>
    <body>
        <h1>Today's Lunch is running</h1>
        <p>Use the <code>/lunch</code> command to get today's menu.</p>
    </body>
</html>
"#)
}

/// Slash command fields, only used for logging.
#[derive(Debug, Default, serde::Deserialize)]
struct SlashCommand {
    command: Option<String>,
    user_name: Option<String>,
    channel_name: Option<String>,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "snake_case")]
enum ResponseType { InChannel }

#[derive(Debug, serde::Serialize)]
struct CommandResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_type: Option<ResponseType>,
    text: String,
}

async fn lunch_command(
    State(menus): State<MenuService>,
    cmd: Option<Form<SlashCommand>>,
) -> (StatusCode, Json<CommandResponse>) {
    if let Some(Form(cmd)) = cmd {
        tracing::debug!(
            "{} from {} in {}",
            cmd.command.as_deref().unwrap_or("<no command>"),
            cmd.user_name.as_deref().unwrap_or("<unknown>"),
            cmd.channel_name.as_deref().unwrap_or("<unknown>"),
        );
    }

    handle_lunch_command(&menus, seoul_today()).await
}

async fn handle_lunch_command(
    menus: &MenuService,
    today: NaiveDate,
) -> (StatusCode, Json<CommandResponse>) {
    match menus.todays_menu(today).await {
        Ok(menu) => {
            tracing::info!("sending menu for {today} ({} corners)", menu.len());
            (StatusCode::OK, Json(CommandResponse {
                response_type: Some(ResponseType::InChannel),
                text: format_menu(&menu, today),
            }))
        },
        Err(err) => {
            let text = format!("점심 메뉴를 가져오지 못했습니다: {}", err.user_message());
            tracing::error!("could not get menu for {today}: {:?}", anyhow::Error::from(err));
            (StatusCode::INTERNAL_SERVER_ERROR, Json(CommandResponse {
                response_type: None,
                text,
            }))
        },
    }
}
