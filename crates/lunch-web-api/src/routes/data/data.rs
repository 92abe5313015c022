
use lunch_menu_api::ParseError;
use reqwest::StatusCode;

/// Failure of one fetch+parse attempt. Every kind is worth retrying.
#[derive(Debug, thiserror::Error)]
pub enum LunchError {
    #[error("request to meal provider failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("meal provider answered with {0}")]
    UpstreamStatus(StatusCode),
    #[error("meal provider sent invalid json: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    #[error("meal provider reported status {0}")]
    UpstreamApplication(String),
    #[error("unexpected meal data: {0}")]
    Parse(#[from] ParseError),
}

impl LunchError {
    /// Short cause shown to chat users, never contains upstream data.
    pub fn user_message(&self) -> &'static str {
        match self {
            LunchError::Transport(_) => "식단 서버에 연결할 수 없습니다",
            LunchError::UpstreamStatus(_) => "식단 서버가 오류를 반환했습니다",
            LunchError::MalformedResponse(_) => "식단 서버의 응답을 읽을 수 없습니다",
            LunchError::UpstreamApplication(_) => "식단 서버가 요청을 처리하지 못했습니다",
            LunchError::Parse(_) => "식단 데이터 형식이 올바르지 않습니다",
        }
    }
}
