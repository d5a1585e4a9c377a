use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    auth::AuthGate,
    config::Config,
    service::{ArticleService, ProjectService},
    storage::Db,
};

/// 应用程序上下文
///
/// [`AppState`] 封装了数据库连接池、管理员认证和站点地址，供路由层提取使用。
#[derive(Clone, FromRef)]
pub struct AppState {
    pool: Db,
    auth: AuthGate,
    base_url: Arc<str>,
}

impl AppState {
    /// 创建一个新的 [`AppState`] 实例
    pub fn new(pool: Db, config: &Config) -> Self {
        Self {
            pool,
            auth: AuthGate::from_config(config),
            base_url: Arc::from(config.base_url.as_str()),
        }
    }

    /// 获取文章服务
    pub fn articles(&self) -> ArticleService<Db> {
        ArticleService::new(self.pool.clone())
    }

    /// 获取项目服务
    pub fn projects(&self) -> ProjectService<Db> {
        ProjectService::new(self.pool.clone())
    }

    pub fn auth(&self) -> &AuthGate {
        &self.auth
    }

    /// 站点地址，用于补全图片相对地址
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
