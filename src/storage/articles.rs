use chrono::{DateTime, Utc};

use super::Db;
use crate::{
    content::{Article, ArticleEdit, NewArticle, NewArticleView},
    error::{Error, Result},
};

/// 文章与阅读记录的存储接口
///
/// 每个方法对应一条参数化语句，业务规则（slug 生成、合并、时间戳）由
/// [`ArticleService`](crate::service::ArticleService) 负责。
pub trait ArticleStore: Send + Sync {
    /// 插入文章，slug 冲突时返回 [`Error::ConstraintViolation`]
    fn insert_article(
        &self,
        article: &NewArticle,
    ) -> impl std::future::Future<Output = Result<Article>>;

    /// 写回合并后的字段，文章不存在时返回 `None`
    fn update_article(
        &self,
        slug: &str,
        edit: &ArticleEdit,
    ) -> impl std::future::Future<Output = Result<Option<Article>>>;

    fn article_by_slug(
        &self,
        slug: &str,
    ) -> impl std::future::Future<Output = Result<Option<Article>>>;

    fn article_by_id(&self, id: i64) -> impl std::future::Future<Output = Result<Option<Article>>>;

    /// 已发布文章，按发布时间倒序
    fn published_articles(
        &self,
        limit: i64,
        offset: i64,
    ) -> impl std::future::Future<Output = Result<Vec<Article>>>;

    fn count_published(&self) -> impl std::future::Future<Output = Result<i64>>;

    /// 全部文章（含未发布），按发布时间倒序
    fn all_articles(&self) -> impl std::future::Future<Output = Result<Vec<Article>>>;

    /// 返回实际删除的行数
    fn remove_article(&self, slug: &str) -> impl std::future::Future<Output = Result<u64>>;

    /// 插入阅读记录，同一 (slug, ip) 已存在时什么也不做并返回 `false`
    fn insert_view(
        &self,
        view: &NewArticleView,
    ) -> impl std::future::Future<Output = Result<bool>>;

    fn count_views(&self, slug: &str) -> impl std::future::Future<Output = Result<i64>>;

    /// `viewed_at >= since` 的阅读记录数
    fn count_views_since(
        &self,
        since: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<i64>>;
}

impl ArticleStore for Db {
    async fn insert_article(&self, article: &NewArticle) -> Result<Article> {
        sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (title, content, date_published, is_published, slug)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, title, content, date_published, date_updated, is_published, slug
            "#,
        )
        .bind(&article.title)
        .bind(&article.content)
        .bind(article.date_published)
        .bind(article.is_published)
        .bind(&article.slug)
        .fetch_one(self)
        .await
        .map_err(|e| Error::from_insert(e, || format!("slug `{}` already exists", article.slug)))
    }

    async fn update_article(&self, slug: &str, edit: &ArticleEdit) -> Result<Option<Article>> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            UPDATE articles
            SET title = ?, content = ?, is_published = ?, date_updated = ?
            WHERE slug = ?
            RETURNING id, title, content, date_published, date_updated, is_published, slug
            "#,
        )
        .bind(&edit.title)
        .bind(&edit.content)
        .bind(edit.is_published)
        .bind(edit.date_updated)
        .bind(slug)
        .fetch_optional(self)
        .await?;
        Ok(article)
    }

    async fn article_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, content, date_published, date_updated, is_published, slug
            FROM articles
            WHERE slug = ?
            "#,
        )
        .bind(slug)
        .fetch_optional(self)
        .await?;
        Ok(article)
    }

    async fn article_by_id(&self, id: i64) -> Result<Option<Article>> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, content, date_published, date_updated, is_published, slug
            FROM articles
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self)
        .await?;
        Ok(article)
    }

    async fn published_articles(&self, limit: i64, offset: i64) -> Result<Vec<Article>> {
        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, content, date_published, date_updated, is_published, slug
            FROM articles
            WHERE is_published = 1
            ORDER BY date_published DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self)
        .await?;
        Ok(articles)
    }

    async fn count_published(&self) -> Result<i64> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE is_published = 1")
                .fetch_one(self)
                .await?,
        )
    }

    async fn all_articles(&self) -> Result<Vec<Article>> {
        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, content, date_published, date_updated, is_published, slug
            FROM articles
            ORDER BY date_published DESC
            "#,
        )
        .fetch_all(self)
        .await?;
        Ok(articles)
    }

    async fn remove_article(&self, slug: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM articles WHERE slug = ?")
            .bind(slug)
            .execute(self)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_view(&self, view: &NewArticleView) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO article_views (article_slug, ip_address, user_agent, viewed_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (article_slug, ip_address) DO NOTHING
            "#,
        )
        .bind(&view.article_slug)
        .bind(&view.ip_address)
        .bind(&view.user_agent)
        .bind(view.viewed_at)
        .execute(self)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn count_views(&self, slug: &str) -> Result<i64> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM article_views WHERE article_slug = ?")
                .bind(slug)
                .fetch_one(self)
                .await?,
        )
    }

    async fn count_views_since(&self, since: DateTime<Utc>) -> Result<i64> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM article_views WHERE viewed_at >= ?")
                .bind(since)
                .fetch_one(self)
                .await?,
        )
    }
}
