use std::env;

use tracing::{info, warn};

const DEFAULT_DATABASE_URL: &str = "sqlite://qblog.db";
const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// 进程配置，全部来自环境变量
#[derive(Debug, Clone)]
pub struct Config {
    /// `DATABASE_URL`
    pub database_url: String,
    /// `ADMIN_USERNAME`，未设置时登录总是失败
    pub admin_username: Option<String>,
    /// `ADMIN_PASSWORD`，未设置时登录总是失败
    pub admin_password: Option<String>,
    /// `QBLOG_BASE_URL`，用于补全文章图片的相对地址
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置，`from_env` 使用进程环境变量
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            database_url: or_default(&lookup, "DATABASE_URL", DEFAULT_DATABASE_URL),
            admin_username: secret(&lookup, "ADMIN_USERNAME"),
            admin_password: secret(&lookup, "ADMIN_PASSWORD"),
            base_url: or_default(&lookup, "QBLOG_BASE_URL", DEFAULT_BASE_URL),
        }
    }
}

fn or_default(lookup: impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

/// 空值与未设置等同
fn secret(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    match lookup(key) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            warn!("{key} not set, admin login disabled");
            None
        }
    }
}
