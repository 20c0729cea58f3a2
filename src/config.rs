//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `HOST`, `PORT`: 서버 바인딩 주소와 포트
//! - `GEMINI_API_KEY`: 생성형 AI 인증 키 (없으면 항상 폴백 문제 사용)
//! - `GEMINI_MODEL`, `GEMINI_BASE_URL`, `GEMINI_TIMEOUT_SECS`: AI 호출 설정
//! - `COUNTDOWN_TICK_MS`: 카운트다운 틱 간격 (기본 1초)
//! - `SESSION_IDLE_TIMEOUT_SECS`: 요청이 끊긴 세션을 정리하기까지의 시간 (기본 30분)
//! - `FRONTEND_DIST`: 빌드된 브라우저 화면 디렉토리

use std::env;
use std::fmt;
use std::time::Duration;

/// 유효한 API 키로 인정하는 최소 길이
pub const MIN_API_KEY_LEN: usize = 20;

/// 생성형 AI(Gemini) 호출 설정
#[derive(Clone)]
pub struct GeminiConfig {
    /// 인증 키: `None`이면 AI를 호출하지 않습니다.
    pub api_key: Option<String>,
    /// 모델 이름 (기본값: "gemini-pro")
    pub model: String,
    /// API 루트 URL
    pub base_url: String,
    /// 요청 타임아웃
    pub timeout: Duration,
}

// Debug 출력에는 키 대신 설정 여부만 표시합니다.
impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// 애플리케이션 전체 설정
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
    pub gemini: GeminiConfig,
    /// 카운트다운 틱 간격 (기본값: 1000ms)
    pub tick_interval: Duration,
    /// 요청이 없는 세션을 정리하기까지의 시간 (기본값: 30분)
    pub session_idle_timeout: Duration,
    /// 프론트엔드 빌드 결과물 경로 (기본값: "../frontend/dist")
    pub frontend_dist: String,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// 모든 항목에 기본값이 있으므로 실패하지 않습니다.
    /// 숫자 파싱에 실패한 값도 기본값으로 대체됩니다.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 키 → 값 조회 함수로부터 설정을 만듭니다. (테스트에서 환경변수 없이 사용)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // 빈 문자열이나 너무 짧은 키는 "설정되지 않음"으로 취급합니다.
        let api_key = lookup("GEMINI_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| key.len() >= MIN_API_KEY_LEN);

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(lookup("PORT"), 3000),
            gemini: GeminiConfig {
                api_key,
                model: lookup("GEMINI_MODEL").unwrap_or_else(|| "gemini-pro".to_string()),
                base_url: lookup("GEMINI_BASE_URL")
                    .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string()),
                timeout: Duration::from_secs(parse_or(lookup("GEMINI_TIMEOUT_SECS"), 30)),
            },
            tick_interval: Duration::from_millis(
                parse_or::<u64>(lookup("COUNTDOWN_TICK_MS"), 1000).max(1),
            ),
            session_idle_timeout: Duration::from_secs(
                parse_or::<u64>(lookup("SESSION_IDLE_TIMEOUT_SECS"), 1800).max(1),
            ),
            frontend_dist: lookup("FRONTEND_DIST")
                .unwrap_or_else(|| "../frontend/dist".to_string()),
        }
    }
}

/// 문자열을 숫자로 파싱하고, 값이 없거나 실패하면 기본값을 반환합니다.
fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
