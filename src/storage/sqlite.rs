use std::{str::FromStr, time::Duration};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::config::Config;

/// 数据库连接池类型
pub type Db = sqlx::SqlitePool;

/// 建表语句，所有语句均为 `IF NOT EXISTS`，可重复执行
const SCHEMA: &str = include_str!("../../sql/01-CREATE_TABLE.sql");

/// 按配置中的 `database_url` 打开数据库并建表
pub async fn init_db(config: &Config) -> Result<Db, sqlx::Error> {
    let db = new_db_pool(&config.database_url).await?;
    migrate(&db).await?;
    tracing::info!(url = %config.database_url, "database ready");
    Ok(db)
}

/// 根据连接 URL 创建新的数据库连接池，文件不存在时自动创建
///
/// 连接池配置：
///
/// - 最大空闲时间 60 秒
/// - 最大生存时间 1500 秒（约 25 分钟）
/// - 最大连接数 10
/// - 获取连接超时 2 秒
/// - 获取前测试连接
/// - 最小连接数 2
///
/// `sqlite::memory:` 在这里每个连接都是独立的库，内存库请使用 [`open_in_memory`]。
pub async fn new_db_pool(conn_url: &str) -> Result<Db, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(conn_url)?.create_if_missing(true);

    SqlitePoolOptions::new()
        .idle_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(1500))
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(2))
        .test_before_acquire(true)
        .min_connections(2)
        .connect_with(options)
        .await
}

/// 打开单连接的内存库并建表
pub async fn open_in_memory() -> Result<Db, sqlx::Error> {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    migrate(&db).await?;
    Ok(db)
}

/// 执行内置的建表语句
///
/// 按 `;` 分割，每条 SQL 单独执行
pub async fn migrate(db: &Db) -> Result<(), sqlx::Error> {
    for sql in SCHEMA.split(';') {
        if sql.trim().is_empty() {
            continue;
        }
        sqlx::query(sql).execute(db).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let db = open_in_memory().await.expect("打开内存库失败");
        migrate(&db).await.expect("重复建表不应失败");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&db)
        .await
        .unwrap();

        assert_eq!(tables, vec!["article_views", "articles", "projects"]);
    }

    #[tokio::test]
    async fn test_indexes_created() {
        let db = open_in_memory().await.unwrap();

        let indexes: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%' ORDER BY name",
        )
        .fetch_all(&db)
        .await
        .unwrap();

        assert_eq!(
            indexes,
            vec!["idx_article_views_slug", "idx_articles_published_date"]
        );
    }
}
