pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod service;
pub mod state;
pub mod storage;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

pub use self::{
    config::Config,
    error::{Error, Result},
    state::AppState,
};

/// 初始化日志，过滤规则读取环境变量 `QBLOG_LOG`
///
/// 已有全局 subscriber 时静默跳过，可重复调用。
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env("QBLOG_LOG"))
        .try_init();
}

/// 按环境变量初始化日志与数据库，返回供路由层使用的 [`AppState`]
pub async fn bootstrap() -> Result<AppState> {
    init_tracing();

    let config = Config::from_env();
    let db = storage::init_db(&config).await?;

    Ok(AppState::new(db, &config))
}
