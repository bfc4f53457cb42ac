use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use portfolio_polish::{
    contact::CONTACT_FORM_ID,
    motion::{LOADING_SELECTOR, PROJECT_CARD_SELECTOR, SHAPE_SELECTOR},
    navigation::{NAVBAR_ID, NAV_LINK_SELECTOR, SECTION_SELECTOR},
    reveal::{REVEAL_SELECTOR, SKILL_SELECTOR},
    theme::THEME_TOGGLE_ID,
    typing::HERO_TITLE_SELECTOR,
};
use scraper::{Html, Selector};
use serde::Serialize;
use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fs,
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering as AtomicOrdering},
    sync::Arc,
    time::{Instant, SystemTime, UNIX_EPOCH},
};
use tower_http::services::{ServeDir, ServeFile};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DIST_DIR: &str = "dist";
const DEFAULT_STATIC_MAX_AGE_SECONDS: u64 = 300;
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const PORT_BOUNDS: (u16, u16) = (1, u16::MAX);
const STATIC_MAX_AGE_SECONDS_BOUNDS: (u64, u64) = (0, 86_400);
const REQUEST_ID_HEADER: &str = "x-request-id";

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogLevel {
    Debug,
    Info,
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        fn rank(level: LogLevel) -> u8 {
            match level {
                LogLevel::Debug => 0,
                LogLevel::Info => 1,
            }
        }

        rank(*self).cmp(&rank(*other))
    }
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
        }
    }
}

#[derive(Clone, Debug)]
struct HostConfig {
    port: u16,
    dist_dir: PathBuf,
    static_max_age_seconds: u64,
    log_level: LogLevel,
}

impl HostConfig {
    fn from_env() -> Self {
        let port = parse_env_u16_with_bounds("PORT", DEFAULT_PORT, PORT_BOUNDS);
        let dist_dir = parse_env_non_empty_string("DIST_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DIST_DIR));
        let static_max_age_seconds = parse_env_u64_with_bounds(
            "STATIC_MAX_AGE_SECONDS",
            DEFAULT_STATIC_MAX_AGE_SECONDS,
            STATIC_MAX_AGE_SECONDS_BOUNDS,
        );
        let log_level = parse_log_level("LOG_LEVEL", DEFAULT_LOG_LEVEL);

        Self {
            port,
            dist_dir,
            static_max_age_seconds,
            log_level,
        }
    }

    fn index_path(&self) -> PathBuf {
        self.dist_dir.join("index.html")
    }
}

fn enhanced_regions() -> [(&'static str, String); 11] {
    [
        ("navbar", format!("#{NAVBAR_ID}")),
        ("navLinks", NAV_LINK_SELECTOR.to_string()),
        ("sections", SECTION_SELECTOR.to_string()),
        ("themeToggle", format!("#{THEME_TOGGLE_ID} i")),
        ("contactForm", format!("#{CONTACT_FORM_ID}")),
        ("typingEffect", HERO_TITLE_SELECTOR.to_string()),
        ("parallax", SHAPE_SELECTOR.to_string()),
        ("scrollReveal", REVEAL_SELECTOR.to_string()),
        ("skillBars", SKILL_SELECTOR.to_string()),
        ("cardHover", PROJECT_CARD_SELECTOR.to_string()),
        ("loadStagger", LOADING_SELECTOR.to_string()),
    ]
}

#[derive(Clone, Debug, Default)]
struct ShellAudit {
    features: BTreeMap<&'static str, bool>,
}

impl ShellAudit {
    fn missing(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.features
            .iter()
            .filter(|(_, present)| !**present)
            .map(|(name, _)| *name)
    }
}

fn audit_page_shell(document_html: &str) -> ShellAudit {
    let document = Html::parse_document(document_html);
    let features = enhanced_regions()
        .into_iter()
        .map(|(name, selector)| {
            let present = Selector::parse(&selector)
                .map(|selector| document.select(&selector).next().is_some())
                .unwrap_or(false);
            (name, present)
        })
        .collect();

    ShellAudit { features }
}

#[derive(Clone)]
struct AppState {
    config: Arc<HostConfig>,
    shell: Arc<ShellAudit>,
    shell_error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthPayload<'a> {
    ok: bool,
    dist_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    shell_error: Option<&'a str>,
    features: &'a BTreeMap<&'static str, bool>,
}

fn load_shell_audit(config: &HostConfig) -> (ShellAudit, Option<String>) {
    match fs::read_to_string(config.index_path()) {
        Ok(document_html) => (audit_page_shell(&document_html), None),
        Err(error) => (ShellAudit::default(), Some(error.to_string())),
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = HostConfig::from_env();
    let (shell, shell_error) = load_shell_audit(&config);

    if let Some(error) = shell_error.as_deref() {
        log_event(
            &config,
            LogLevel::Info,
            "page_shell_unreadable",
            serde_json::json!({
                "path": config.index_path().display().to_string(),
                "error": error,
            }),
        );
    }

    for feature in shell.missing() {
        log_event(
            &config,
            LogLevel::Info,
            "feature_skipped",
            serde_json::json!({ "feature": feature }),
        );
    }

    let bind_address = format!("0.0.0.0:{}", config.port);
    let static_service =
        ServeDir::new(&config.dist_dir).not_found_service(ServeFile::new(config.index_path()));

    let state = AppState {
        config: Arc::new(config),
        shell: Arc::new(shell),
        shell_error,
    };

    let app = Router::new()
        .route("/healthz", get(health))
        .fallback_service(static_service)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    log_event(
        &state.config,
        LogLevel::Info,
        "server_listening",
        serde_json::json!({
            "url": format!("http://127.0.0.1:{}", state.config.port),
            "distDir": state.config.dist_dir.display().to_string(),
        }),
    );
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health(State(state): State<AppState>) -> Response {
    let payload = HealthPayload {
        ok: state.shell_error.is_none(),
        dist_dir: state.config.dist_dir.display().to_string(),
        shell_error: state.shell_error.as_deref(),
        features: &state.shell.features,
    };

    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    (StatusCode::OK, headers, Json(payload)).into_response()
}

async fn log_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let request_id = resolve_request_id(request.headers());
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let mut response = next.run(request).await;

    if let Ok(request_id_header) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, request_id_header);
    }
    if !response.headers().contains_key(header::CACHE_CONTROL) {
        let value = static_cache_control(response.headers(), state.config.static_max_age_seconds);
        response.headers_mut().insert(header::CACHE_CONTROL, value);
    }

    let status = response.status();
    let level = if status.is_server_error() || status.is_client_error() {
        LogLevel::Info
    } else {
        LogLevel::Debug
    };
    log_event(
        &state.config,
        level,
        "request_completed",
        serde_json::json!({
            "requestId": request_id,
            "method": method,
            "path": path,
            "status": status.as_u16(),
            "durationMs": started.elapsed().as_millis() as u64,
        }),
    );

    response
}

fn static_cache_control(headers: &HeaderMap, max_age_seconds: u64) -> HeaderValue {
    let is_html = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("text/html"));

    if is_html || max_age_seconds == 0 {
        return HeaderValue::from_static("no-cache");
    }

    HeaderValue::from_str(&format!("public, max-age={max_age_seconds}"))
        .unwrap_or_else(|_| HeaderValue::from_static("no-cache"))
}

fn parse_env_u16_with_bounds(name: &str, default: u16, bounds: (u16, u16)) -> u16 {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_env_u64_with_bounds(name: &str, default: u64, bounds: (u64, u64)) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_env_non_empty_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_log_level(name: &str, default: LogLevel) -> LogLevel {
    parse_log_level_value(parse_env_non_empty_string(name).as_deref(), default)
}

fn parse_log_level_value(value: Option<&str>, default: LogLevel) -> LogLevel {
    match value.map(str::to_ascii_lowercase).as_deref() {
        Some("debug") => LogLevel::Debug,
        Some("info") => LogLevel::Info,
        _ => default,
    }
}

fn now_unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis())
        .unwrap_or(0)
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_secs())
        .unwrap_or(0)
}

fn generate_request_id() -> String {
    let counter = REQUEST_ID_COUNTER.fetch_add(1, AtomicOrdering::Relaxed);
    format!("req-{}-{counter}", now_unix_millis())
}

fn resolve_request_id(headers: &HeaderMap) -> String {
    let value = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|raw| raw.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string);

    value.unwrap_or_else(generate_request_id)
}

fn log_event(config: &HostConfig, level: LogLevel, event: &str, fields: serde_json::Value) {
    if level < config.log_level {
        return;
    }

    let mut payload = serde_json::Map::new();
    payload.insert(
        "ts".to_string(),
        serde_json::Value::Number(serde_json::Number::from(now_unix_seconds())),
    );
    payload.insert("level".to_string(), serde_json::Value::String(level.as_str().to_string()));
    payload.insert("event".to_string(), serde_json::Value::String(event.to_string()));

    if let serde_json::Value::Object(extra) = fields {
        for (key, value) in extra {
            payload.insert(key, value);
        }
    }

    println!("{}", serde_json::Value::Object(payload));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> HostConfig {
        config_with_dist_dir(PathBuf::from("/tmp/portfolio-polish-test-dist"))
    }

    fn config_with_dist_dir(dist_dir: PathBuf) -> HostConfig {
        HostConfig {
            port: DEFAULT_PORT,
            dist_dir,
            static_max_age_seconds: DEFAULT_STATIC_MAX_AGE_SECONDS,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }

    fn fresh_dist_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "portfolio-polish-{label}-{}-{}",
            std::process::id(),
            generate_request_id()
        ));
        fs::create_dir_all(&dir).expect("temp dist dir is creatable");
        dir
    }

    async fn health_json(state: AppState) -> serde_json::Value {
        let response = health(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL),
            Some(&HeaderValue::from_static("no-store"))
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("health body is readable");
        serde_json::from_slice(&body).expect("health body is JSON")
    }

    #[test]
    fn shipped_page_exposes_every_enhanced_region() {
        let audit = audit_page_shell(include_str!("../index.html"));

        let missing: Vec<_> = audit.missing().collect();
        assert!(missing.is_empty(), "missing regions: {missing:?}");
        assert_eq!(audit.features.len(), enhanced_regions().len());
    }

    #[test]
    fn bare_page_reports_missing_regions() {
        let audit = audit_page_shell(
            r##"<html><body><nav id="mainNav"><a class="nav-link" href="#about">About</a></nav>
            <section id="about"><div class="stat-item">3 years</div></section></body></html>"##,
        );

        assert_eq!(audit.features.get("navbar"), Some(&true));
        assert_eq!(audit.features.get("scrollReveal"), Some(&true));
        assert_eq!(audit.features.get("typingEffect"), Some(&false));
        assert!(audit.missing().any(|feature| feature == "contactForm"));
    }

    #[test]
    fn toggle_without_icon_is_reported_missing() {
        let audit = audit_page_shell(r#"<button id="themeToggle">Theme</button>"#);

        assert_eq!(audit.features.get("themeToggle"), Some(&false));
    }

    #[tokio::test]
    async fn health_reports_feature_audit() {
        let state = AppState {
            config: Arc::new(test_config()),
            shell: Arc::new(audit_page_shell(r#"<div class="shape"></div>"#)),
            shell_error: None,
        };

        let body = health_json(state).await;

        assert_eq!(body["ok"], serde_json::json!(true));
        assert_eq!(body["distDir"], serde_json::json!("/tmp/portfolio-polish-test-dist"));
        assert_eq!(body["features"]["parallax"], serde_json::json!(true));
        assert_eq!(body["features"]["contactForm"], serde_json::json!(false));
        assert!(body.get("shellError").is_none());
    }

    #[tokio::test]
    async fn unreadable_shell_is_reported_not_fatal() {
        let dist_dir = fresh_dist_dir("empty-dist");
        let config = config_with_dist_dir(dist_dir.clone());
        assert!(!config.index_path().exists());

        let (shell, shell_error) = load_shell_audit(&config);
        let _ = fs::remove_dir_all(&dist_dir);
        assert!(shell_error.is_some());

        let body = health_json(AppState {
            config: Arc::new(config),
            shell: Arc::new(shell),
            shell_error,
        })
        .await;

        assert_eq!(body["ok"], serde_json::json!(false));
        assert!(body["shellError"].is_string());
    }

    #[test]
    fn readable_shell_is_audited_from_dist_dir() {
        let dist_dir = fresh_dist_dir("shell-dist");
        fs::write(dist_dir.join("index.html"), r#"<nav id="mainNav"></nav>"#)
            .expect("index.html is writable");

        let (shell, shell_error) = load_shell_audit(&config_with_dist_dir(dist_dir.clone()));
        let _ = fs::remove_dir_all(&dist_dir);

        assert!(shell_error.is_none());
        assert_eq!(shell.features.get("navbar"), Some(&true));
        assert_eq!(shell.features.get("contactForm"), Some(&false));
    }

    #[test]
    fn html_is_revalidated_and_assets_are_cached() {
        let mut html = HeaderMap::new();
        html.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
        let mut wasm = HeaderMap::new();
        wasm.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/wasm"));

        assert_eq!(static_cache_control(&html, 300), "no-cache");
        assert_eq!(static_cache_control(&wasm, 300), "public, max-age=300");
        assert_eq!(static_cache_control(&wasm, 0), "no-cache");
    }

    #[test]
    fn request_id_is_echoed_or_generated() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static(" abc-123 "));
        assert_eq!(resolve_request_id(&headers), "abc-123");

        let generated = resolve_request_id(&HeaderMap::new());
        assert!(generated.starts_with("req-"));
    }

    #[test]
    fn log_level_parsing_falls_back_to_default() {
        assert_eq!(parse_log_level_value(Some("DEBUG"), LogLevel::Info), LogLevel::Debug);
        assert_eq!(parse_log_level_value(Some("verbose"), LogLevel::Info), LogLevel::Info);
        assert_eq!(parse_log_level_value(None, LogLevel::Debug), LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
    }
}
