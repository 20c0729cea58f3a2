//! # Quiz Master 웹 서버 진입점
//!
//! 이 파일은 Quiz Master 애플리케이션의 **시작점(entry point)**입니다.
//! 실제 로직은 라이브러리 크레이트(`src/lib.rs`)에 있고, 여기서는 조립과 실행만 합니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 설정 로딩
//! 4. 문제 출처(Gemini 또는 폴백) 준비
//! 5. 세션 저장소와 정리 작업 시작
//! 6. CORS, 정적 파일 서빙, 라우터 설정
//! 7. HTTP 서버 시작

// ── 외부 크레이트 및 라이브러리 크레이트에서 필요한 항목 가져오기 ──
// main.rs는 lib.rs와 별개의 크레이트로 컴파일되므로 `quizmaster::`로 접근합니다.
use anyhow::Result; // anyhow::Result: 어떤 에러 타입이든 담을 수 있는 범용 Result 타입
use axum::Router;   // 라우터: URL 경로와 핸들러를 연결하는 구조체
use quizmaster::{
    config::Config,                                // 환경변수 설정
    routes,                                        // API 라우터 조립 함수
    services::{QuestionSource, SessionRegistry},   // 문제 출처와 세션 저장소
    AppState,                                      // 핸들러 공유 상태
};
use std::path::Path; // 파일 경로를 다루는 표준 라이브러리 타입
use tower_http::{
    // tower-http: HTTP 미들웨어 모음 크레이트
    cors::{Any, CorsLayer},         // CORS(Cross-Origin Resource Sharing) 설정
    services::{ServeDir, ServeFile}, // 정적 파일 서빙 서비스
    trace::TraceLayer,              // HTTP 요청/응답 로깅 미들웨어
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt}; // 로깅 초기화 유틸리티

// #[tokio::main]: 비동기 런타임을 시작하는 어트리뷰트 매크로
// 세션 러너, 카운트다운, 정리 작업이 모두 이 런타임 위의 태스크로 돌아갑니다.
#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일에서 환경변수를 읽어옵니다. (예: GEMINI_API_KEY, PORT 등)
    // .ok()는 Result를 Option으로 변환하여, .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // registry(): 로그 수집기를 만들고
    // .with(): 필터와 포맷터를 레이어처럼 쌓아올립니다.
    tracing_subscriber::registry()
        .with(
            // EnvFilter: RUST_LOG 환경변수로 로그 레벨을 제어합니다.
            // 환경변수가 없으면 quizmaster, tower_http, axum 모듈을 debug 레벨로 설정
            // (매초 들어오는 틱 로그는 trace 레벨이라 기본값에서는 보이지 않습니다.)
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quizmaster=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer()) // 로그를 터미널에 출력하는 포맷터 레이어
        .init(); // 전역 로거로 등록

    // ── 3단계: 설정 로딩 ──
    // 모든 항목에 기본값이 있으므로 설정 로딩은 실패하지 않습니다.
    let config = Config::from_env();
    tracing::info!("Starting Quiz Master server on {}:{}", config.host, config.port);

    // ── 4단계: 문제 출처 준비 ──
    // API 키가 없으면 경고 로그를 남기고 폴백 문제만 사용합니다.
    // `?`: HTTP 클라이언트 생성에 실패하면 서버를 띄우지 않고 종료합니다.
    let source = QuestionSource::from_config(&config.gemini)?;

    // ── 5단계: 애플리케이션 상태 생성 ──
    // SessionRegistry는 내부적으로 Arc를 쓰므로 clone해도 같은 저장소를 가리킵니다.
    let state = AppState {
        registry: SessionRegistry::new(
            source,
            config.tick_interval,         // 카운트다운 틱 간격
            config.session_idle_timeout,  // 이 시간 동안 요청이 없으면 세션 정리
        ),
    };

    // 요청이 끊긴 세션을 주기적으로 정리하는 백그라운드 태스크
    // 서버가 살아 있는 동안 계속 돌기 때문에 JoinHandle은 보관하지 않습니다.
    state.registry.spawn_sweeper();
    tracing::info!(
        "Idle sessions expire after {}s",
        config.session_idle_timeout.as_secs()
    );

    // ── 6단계: CORS 미들웨어 설정 ──
    // 개발 환경에서는 Any(모두 허용)로 설정합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)   // 모든 출처(origin) 허용
        .allow_methods(Any)  // 모든 HTTP 메서드 허용
        .allow_headers(Any); // 모든 헤더 허용

    // ── 7단계: 프론트엔드 정적 파일 서빙 설정 ──
    // 빌드된 프론트엔드 파일이 있으면 같은 서버에서 서빙합니다.
    // SPA이므로 찾을 수 없는 경로는 index.html로 돌려보냅니다.
    let frontend_dist = Path::new(&config.frontend_dist);
    // if-else가 표현식으로 쓰여 결과가 바로 `app`에 대입됩니다.
    let app: Router = if frontend_dist.exists() {
        tracing::info!("Serving frontend static files from {}", config.frontend_dist);

        // not_found_service: 파일을 찾지 못하면 index.html을 반환 (SPA 라우팅 지원)
        let serve_dir = ServeDir::new(frontend_dist)
            .not_found_service(ServeFile::new(frontend_dist.join("index.html")));

        routes::router(state)
            // /api/v1에 매칭되지 않는 모든 요청은 프론트엔드로 전달
            .fallback_service(serve_dir)
            .layer(cors)
            .layer(TraceLayer::new_for_http()) // HTTP 요청/응답 자동 로깅
    } else {
        // 프론트엔드 빌드가 없으면 API만 서빙합니다.
        tracing::warn!("Frontend dist directory not found, serving API only");

        routes::router(state)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    };

    // ── 8단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    // TcpListener: TCP 연결을 수신 대기하는 소켓
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // 이 줄에서 서버가 영원히 실행됩니다 (Ctrl+C로 종료할 때까지).
    axum::serve(listener, app).await?;

    Ok(())
}
