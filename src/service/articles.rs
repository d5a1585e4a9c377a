use chrono::{TimeDelta, Utc};

use crate::{
    content::{
        Article, ArticleChanges, ArticlePage, Draft, NewArticle, NewArticleView, Page,
        PublishedArticle, ViewTotals, derive_slug,
    },
    error::{Error, Result},
    storage::ArticleStore,
};

/// 文章业务逻辑
///
/// 基于 [`ArticleStore`] 实现 slug 生成、局部更新、分页与阅读统计。
#[derive(Debug, Clone)]
pub struct ArticleService<S> {
    store: S,
}

impl<S: ArticleStore> ArticleService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 新建文章，标题和正文都不能为空
    ///
    /// slug 由标题生成，与已有文章冲突时返回 [`Error::ConstraintViolation`]。
    pub async fn create(&self, title: &str, content: &str, is_published: bool) -> Result<Article> {
        if content.trim().is_empty() {
            return Err(Error::Validation("content is required"));
        }
        self.insert(title, content, is_published).await
    }

    async fn insert(&self, title: &str, content: &str, is_published: bool) -> Result<Article> {
        if title.trim().is_empty() {
            return Err(Error::Validation("title is required"));
        }

        let slug = derive_slug(title);
        if slug.is_empty() {
            return Err(Error::Validation("title must contain letters or digits"));
        }

        let article = self
            .store
            .insert_article(&NewArticle {
                title: title.to_string(),
                content: content.to_string(),
                slug,
                date_published: Utc::now(),
                is_published,
            })
            .await?;

        tracing::info!(id = article.id, slug = %article.slug, "article created");
        Ok(article)
    }

    /// 局部更新，未提供的字段保持原值，slug 与 id 不变
    pub async fn update(&self, slug: &str, changes: ArticleChanges) -> Result<Article> {
        if changes.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(Error::Validation("title must not be empty"));
        }

        let article = self
            .store
            .article_by_slug(slug)
            .await?
            .ok_or(Error::NotFound)?;

        // 时钟回拨时也不早于上一次的时间
        let now = Utc::now().max(article.date_updated.unwrap_or(article.date_published));
        let edit = changes.merge(&article, now);

        let updated = self
            .store
            .update_article(slug, &edit)
            .await?
            .ok_or(Error::NotFound)?;

        tracing::info!(slug, "article updated");
        Ok(updated)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        self.store.article_by_slug(slug).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        self.store.article_by_id(id).await
    }

    /// 分页列出已发布文章，超出范围的页返回空列表
    ///
    /// `page` 与 `per_page` 由调用方校验，见 [`clamp_page`](super::clamp_page)。
    pub async fn list_published(&self, page: i64, per_page: i64) -> Result<Page<Article>> {
        let limit = per_page.max(0);
        let offset = (page - 1).max(0).saturating_mul(limit);

        let (items, total) = tokio::try_join!(
            self.store.published_articles(limit, offset),
            self.store.count_published()
        )?;

        Ok(Page {
            items,
            total,
            page,
            per_page,
        })
    }

    /// 列表页的对外结构
    pub async fn published_page(&self, page: i64, per_page: i64) -> Result<ArticlePage> {
        self.list_published(page, per_page).await.map(Into::into)
    }

    /// 所有文章，包括未发布的
    pub async fn list_all(&self) -> Result<Vec<Article>> {
        self.store.all_articles().await
    }

    /// 返回是否真的删除了文章，slug 不存在时返回 `false`
    pub async fn delete_by_slug(&self, slug: &str) -> Result<bool> {
        let removed = self.store.remove_article(slug).await? > 0;
        if removed {
            tracing::info!(slug, "article deleted");
        }
        Ok(removed)
    }

    /// 记录一次阅读。
    ///
    /// 同一 IP 对同一文章只记一次；存储出错只记录日志，不影响内容返回。
    pub async fn record_view(&self, slug: &str, ip_address: &str, user_agent: Option<&str>) {
        let view = NewArticleView {
            article_slug: slug.to_string(),
            ip_address: ip_address.to_string(),
            user_agent: user_agent.filter(|ua| !ua.is_empty()).map(str::to_string),
            viewed_at: Utc::now(),
        };

        match self.store.insert_view(&view).await {
            Ok(true) => tracing::debug!(slug, ip_address, "article view recorded"),
            Ok(false) => (),
            Err(e) => tracing::warn!(%e, slug, "failed to record article view"),
        }
    }

    pub async fn count_views(&self, slug: &str) -> Result<i64> {
        self.store.count_views(slug).await
    }

    /// 最近 24 小时和最近 30 天的阅读量
    pub async fn view_totals(&self) -> Result<ViewTotals> {
        let now = Utc::now();

        let (daily, monthly) = tokio::try_join!(
            self.store.count_views_since(now - TimeDelta::hours(24)),
            self.store.count_views_since(now - TimeDelta::days(30))
        )?;

        Ok(ViewTotals { daily, monthly })
    }

    /// 读者访问文章详情
    ///
    /// 文章不存在或未发布时返回 `None`；否则记录阅读并附带阅读量。
    pub async fn read_published(
        &self,
        slug: &str,
        ip_address: &str,
        user_agent: Option<&str>,
        base_url: &str,
    ) -> Result<Option<PublishedArticle>> {
        let Some(article) = self.store.article_by_slug(slug).await? else {
            return Ok(None);
        };
        if !article.is_published {
            return Ok(None);
        }

        self.record_view(slug, ip_address, user_agent).await;
        let view_count = self.count_views(slug).await?;

        Ok(Some(PublishedArticle {
            article: article.present(base_url),
            view_count,
        }))
    }

    /// 编辑器自动保存
    ///
    /// 带 slug 时只更新标题和正文，否则新建未发布文章（正文可以为空）。
    pub async fn auto_save(&self, draft: Draft) -> Result<Article> {
        let title = draft
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or(Error::Validation("title is required"))?;

        match draft.slug.filter(|s| !s.is_empty()) {
            Some(slug) => {
                let changes = ArticleChanges {
                    title: Some(title),
                    content: draft.content,
                    is_published: None,
                };
                self.update(&slug, changes).await
            }
            None => {
                let content = draft.content.unwrap_or_default();
                self.insert(&title, &content, false).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn service() -> ArticleService<MemoryStore> {
        ArticleService::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn test_create_derives_slug() {
        let svc = service();
        let article = svc
            .create("Hello, World!", "<p>body</p>", true)
            .await
            .unwrap();

        assert_eq!(article.slug, "hello-world");
        assert_eq!(article.id, 1);
        assert!(article.is_published);
        assert!(article.date_updated.is_none());
    }

    #[tokio::test]
    async fn test_create_defaults_unpublished_and_validates() {
        let svc = service();

        assert!(matches!(
            svc.create("  ", "body", false).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            svc.create("Title", " ", false).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            svc.create("???", "body", false).await,
            Err(Error::Validation(_))
        ));

        let article = svc.create("Draft", "body", false).await.unwrap();
        assert!(!article.is_published);
    }

    #[tokio::test]
    async fn test_create_slug_collision() {
        let svc = service();
        svc.create("Same Title", "a", true).await.unwrap();

        let result = svc.create("same  title", "b", true).await;
        assert!(matches!(result, Err(Error::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_update_partial() {
        let svc = service();
        let original = svc.create("Old", "<p>content</p>", true).await.unwrap();

        let updated = svc
            .update(
                "old",
                ArticleChanges {
                    title: Some("New".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "New");
        assert_eq!(updated.slug, "old", "slug 不随标题变化");
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.content, original.content);
        assert_eq!(updated.is_published, original.is_published);
        assert!(updated.date_updated.unwrap() >= original.date_published);

        let again = svc
            .update("old", ArticleChanges::default())
            .await
            .unwrap();
        assert!(again.date_updated >= updated.date_updated);
    }

    #[tokio::test]
    async fn test_update_missing_and_blank_title() {
        let svc = service();
        assert!(matches!(
            svc.update("nope", ArticleChanges::default()).await,
            Err(Error::NotFound)
        ));

        svc.create("Exists", "x", false).await.unwrap();
        let blank = ArticleChanges {
            title: Some(" ".into()),
            ..Default::default()
        };
        assert!(matches!(
            svc.update("exists", blank).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_lookups_return_none_when_absent() {
        let svc = service();
        assert!(svc.get_by_slug("missing").await.unwrap().is_none());
        assert!(svc.get_by_id(42).await.unwrap().is_none());

        let article = svc.create("Present", "x", false).await.unwrap();
        assert_eq!(
            svc.get_by_id(article.id).await.unwrap().map(|a| a.slug),
            Some("present".to_string())
        );
    }

    #[tokio::test]
    async fn test_list_published_pagination() {
        let svc = service();
        for i in 0..10 {
            svc.create(&format!("Post {i}"), "body", true).await.unwrap();
        }
        svc.create("Hidden", "body", false).await.unwrap();

        let first = svc.list_published(1, 6).await.unwrap();
        assert_eq!(first.items.len(), 6);
        assert_eq!(first.total, 10);
        assert!(first.has_more());
        assert!(
            first
                .items
                .windows(2)
                .all(|w| w[0].date_published >= w[1].date_published),
            "最新的在前"
        );

        let second = svc.list_published(2, 6).await.unwrap();
        assert_eq!(second.items.len(), 4);
        assert_eq!(second.total, 10);
        assert!(!second.has_more());

        let beyond = svc.list_published(5, 6).await.unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 10);

        assert_eq!(svc.list_all().await.unwrap().len(), 11);
    }

    #[tokio::test]
    async fn test_published_page_shape() {
        let svc = service();
        svc.create("Only", "<p>one two</p>", true).await.unwrap();

        let page = svc.published_page(1, 6).await.unwrap();
        assert_eq!(page.total, 1);
        assert!(!page.has_more);
        assert_eq!(page.articles[0].summary, "one two");
        assert_eq!(page.articles[0].reading_time, 1);
    }

    #[tokio::test]
    async fn test_delete_by_slug() {
        let svc = service();
        svc.create("Doomed", "x", true).await.unwrap();

        assert!(svc.delete_by_slug("doomed").await.unwrap());
        assert!(!svc.delete_by_slug("doomed").await.unwrap());
        assert!(svc.get_by_slug("doomed").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_view_deduplicates() {
        let svc = service();
        svc.record_view("post", "10.0.0.1", Some("curl")).await;
        svc.record_view("post", "10.0.0.1", Some("firefox")).await;
        assert_eq!(svc.count_views("post").await.unwrap(), 1);

        svc.record_view("post", "10.0.0.2", None).await;
        svc.record_view("other", "10.0.0.1", None).await;
        assert_eq!(svc.count_views("post").await.unwrap(), 2);

        let totals = svc.view_totals().await.unwrap();
        assert_eq!(totals, ViewTotals { daily: 3, monthly: 3 });
    }

    #[tokio::test]
    async fn test_read_published() {
        let svc = service();
        svc.create("Public", r#"<img src="pic.png"><p>hi</p>"#, true)
            .await
            .unwrap();
        svc.create("Private", "secret", false).await.unwrap();

        assert!(
            svc.read_published("private", "1.1.1.1", None, "http://h")
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            svc.read_published("missing", "1.1.1.1", None, "http://h")
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(svc.count_views("private").await.unwrap(), 0);

        let read = svc
            .read_published("public", "1.1.1.1", Some("ua"), "http://h")
            .await
            .unwrap()
            .expect("已发布文章应可读");
        assert_eq!(read.view_count, 1);
        assert_eq!(read.article.first_image.as_deref(), Some("http://h/pic.png"));

        let read = svc
            .read_published("public", "1.1.1.1", Some("ua"), "http://h")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(read.view_count, 1, "同一 IP 不重复计数");
    }

    #[tokio::test]
    async fn test_auto_save() {
        let svc = service();

        assert!(matches!(
            svc.auto_save(Draft::default()).await,
            Err(Error::Validation(_))
        ));

        let created = svc
            .auto_save(Draft {
                title: Some("Work In Progress".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.slug, "work-in-progress");
        assert_eq!(created.content, "");
        assert!(!created.is_published);

        let saved = svc
            .auto_save(Draft {
                title: Some("Work In Progress v2".into()),
                content: Some("<p>more</p>".into()),
                slug: Some(created.slug.clone()),
            })
            .await
            .unwrap();
        assert_eq!(saved.slug, created.slug);
        assert_eq!(saved.title, "Work In Progress v2");
        assert_eq!(saved.content, "<p>more</p>");
    }
}
