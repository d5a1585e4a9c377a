#![allow(dead_code)]

use qblog::{
    AppState, Config,
    service::{ArticleService, ProjectService},
    storage::{Db, open_in_memory},
};

pub const BASE_URL: &str = "https://blog.test";

pub struct TestApp {
    pub db: Db,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        qblog::init_tracing();

        let db = open_in_memory().await.expect("初始化内存库失败");
        let state = AppState::new(db.clone(), &config());

        Self { db, state }
    }

    pub fn articles(&self) -> ArticleService<Db> {
        self.state.articles()
    }

    pub fn projects(&self) -> ProjectService<Db> {
        self.state.projects()
    }
}

pub fn config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        admin_username: Some("admin".to_string()),
        admin_password: Some("s3cret".to_string()),
        base_url: BASE_URL.to_string(),
    }
}
