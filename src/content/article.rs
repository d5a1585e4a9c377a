use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::text;

/// 列表页摘要长度
pub const LIST_SUMMARY_LENGTH: usize = 200;

/// 文章，对应 `articles` 表的一行
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Article {
    /// 存储层分配，不可变
    pub id: i64,
    pub title: String,
    /// HTML 正文
    pub content: String,
    pub date_published: DateTime<Utc>,
    /// 每次更新时写入
    pub date_updated: Option<DateTime<Utc>>,
    pub is_published: bool,
    /// 创建时由标题生成，全局唯一，之后不再改变
    pub slug: String,
}

/// 插入新文章时写入的字段
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub slug: String,
    pub date_published: DateTime<Utc>,
    pub is_published: bool,
}

/// 文章的局部修改，`None` 表示保留原值
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_published: Option<bool>,
}

/// 合并 [`ArticleChanges`] 之后写回存储的完整字段
#[derive(Debug, Clone)]
pub struct ArticleEdit {
    pub title: String,
    pub content: String,
    pub is_published: bool,
    pub date_updated: DateTime<Utc>,
}

impl ArticleChanges {
    /// 以 `article` 为底合并修改，slug 和 id 不参与合并
    pub fn merge(self, article: &Article, now: DateTime<Utc>) -> ArticleEdit {
        ArticleEdit {
            title: self.title.unwrap_or_else(|| article.title.clone()),
            content: self.content.unwrap_or_else(|| article.content.clone()),
            is_published: self.is_published.unwrap_or(article.is_published),
            date_updated: now,
        }
    }
}

/// 编辑器自动保存的草稿
///
/// 带 `slug` 时更新已有文章，否则新建一篇未发布的文章。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Draft {
    pub title: Option<String>,
    pub content: Option<String>,
    pub slug: Option<String>,
}

/// 一次阅读记录
#[derive(Debug, Clone)]
pub struct NewArticleView {
    pub article_slug: String,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub viewed_at: DateTime<Utc>,
}

/// 最近 24 小时与最近 30 天的阅读量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewTotals {
    pub daily: i64,
    pub monthly: i64,
}

/// 分页结果
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 全部已发布文章数，与分页窗口无关
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl<T> Page<T> {
    /// 页码极大时按饱和乘法计算，不会溢出
    pub fn has_more(&self) -> bool {
        self.page.saturating_mul(self.per_page) < self.total
    }
}

/// 对外返回的文章详情
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResponse {
    pub slug: String,
    pub title: String,
    pub content: String,
    pub date_published: DateTime<Utc>,
    pub date_updated: Option<DateTime<Utc>>,
    pub is_published: bool,
    pub reading_time: u32,
    pub word_count: usize,
    pub summary: String,
    pub first_image: Option<String>,
}

/// 已发布文章的阅读视图，附带阅读量
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedArticle {
    #[serde(flatten)]
    pub article: ArticleResponse,
    pub view_count: i64,
}

/// 文章列表项
#[derive(Debug, Clone, Serialize)]
pub struct ArticleListItem {
    pub slug: String,
    pub title: String,
    pub summary: String,
    /// 形如 `October 16, 2026`
    pub published_on: String,
    pub reading_time: u32,
}

/// 文章列表页
#[derive(Debug, Clone, Serialize)]
pub struct ArticlePage {
    pub articles: Vec<ArticleListItem>,
    pub has_more: bool,
    pub total: i64,
}

impl Article {
    /// 组装对外的详情结构，图片相对地址基于 `base_url` 补全
    pub fn present(&self, base_url: &str) -> ArticleResponse {
        ArticleResponse {
            slug: self.slug.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            date_published: self.date_published,
            date_updated: self.date_updated,
            is_published: self.is_published,
            reading_time: text::reading_time(&self.content),
            word_count: text::word_count(&self.content),
            summary: text::summarize(&self.content, text::SUMMARY_LENGTH),
            first_image: text::first_image(&self.content, base_url),
        }
    }

    pub fn list_item(&self) -> ArticleListItem {
        ArticleListItem {
            slug: self.slug.clone(),
            title: self.title.clone(),
            summary: text::summarize(&self.content, LIST_SUMMARY_LENGTH),
            published_on: self.date_published.format("%B %-d, %Y").to_string(),
            reading_time: text::reading_time(&self.content),
        }
    }
}

impl From<Page<Article>> for ArticlePage {
    fn from(page: Page<Article>) -> Self {
        Self {
            has_more: page.has_more(),
            total: page.total,
            articles: page.items.iter().map(Article::list_item).collect(),
        }
    }
}
