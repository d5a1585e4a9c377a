use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use super::{ArticleStore, ProjectStore};
use crate::{
    content::{
        Article, ArticleEdit, NewArticle, NewArticleView, NewProject, Project, ProjectEdit,
    },
    error::{Error, Result},
};

/// 内存实现的存储，语义与 SQLite 实现一致，用于测试和本地调试
///
/// 克隆后共享同一份数据。
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Debug, Default)]
struct Tables {
    articles: Vec<Article>,
    views: Vec<NewArticleView>,
    projects: Vec<Project>,
    last_article_id: i64,
    last_project_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 按时间倒序排列，时间相同保持插入顺序
fn newest_first<T: Clone>(rows: &[T], at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut rows = rows.to_vec();
    rows.sort_by(|a, b| at(b).cmp(&at(a)));
    rows
}

impl ArticleStore for MemoryStore {
    async fn insert_article(&self, article: &NewArticle) -> Result<Article> {
        let mut tables = self.tables();

        if tables.articles.iter().any(|a| a.slug == article.slug) {
            return Err(Error::ConstraintViolation(format!(
                "slug `{}` already exists",
                article.slug
            )));
        }

        tables.last_article_id += 1;
        let row = Article {
            id: tables.last_article_id,
            title: article.title.clone(),
            content: article.content.clone(),
            date_published: article.date_published,
            date_updated: None,
            is_published: article.is_published,
            slug: article.slug.clone(),
        };
        tables.articles.push(row.clone());
        Ok(row)
    }

    async fn update_article(&self, slug: &str, edit: &ArticleEdit) -> Result<Option<Article>> {
        let mut tables = self.tables();

        Ok(tables
            .articles
            .iter_mut()
            .find(|a| a.slug == slug)
            .map(|a| {
                a.title = edit.title.clone();
                a.content = edit.content.clone();
                a.is_published = edit.is_published;
                a.date_updated = Some(edit.date_updated);
                a.clone()
            }))
    }

    async fn article_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        Ok(self.tables().articles.iter().find(|a| a.slug == slug).cloned())
    }

    async fn article_by_id(&self, id: i64) -> Result<Option<Article>> {
        Ok(self.tables().articles.iter().find(|a| a.id == id).cloned())
    }

    async fn published_articles(&self, limit: i64, offset: i64) -> Result<Vec<Article>> {
        let tables = self.tables();
        let published: Vec<Article> = tables
            .articles
            .iter()
            .filter(|a| a.is_published)
            .cloned()
            .collect();

        Ok(newest_first(&published, |a| a.date_published)
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn count_published(&self) -> Result<i64> {
        Ok(self.tables().articles.iter().filter(|a| a.is_published).count() as i64)
    }

    async fn all_articles(&self) -> Result<Vec<Article>> {
        Ok(newest_first(&self.tables().articles, |a| a.date_published))
    }

    async fn remove_article(&self, slug: &str) -> Result<u64> {
        let mut tables = self.tables();
        let before = tables.articles.len();
        tables.articles.retain(|a| a.slug != slug);
        Ok((before - tables.articles.len()) as u64)
    }

    async fn insert_view(&self, view: &NewArticleView) -> Result<bool> {
        let mut tables = self.tables();

        let seen = tables
            .views
            .iter()
            .any(|v| v.article_slug == view.article_slug && v.ip_address == view.ip_address);
        if seen {
            return Ok(false);
        }

        tables.views.push(view.clone());
        Ok(true)
    }

    async fn count_views(&self, slug: &str) -> Result<i64> {
        Ok(self
            .tables()
            .views
            .iter()
            .filter(|v| v.article_slug == slug)
            .count() as i64)
    }

    async fn count_views_since(&self, since: DateTime<Utc>) -> Result<i64> {
        Ok(self
            .tables()
            .views
            .iter()
            .filter(|v| v.viewed_at >= since)
            .count() as i64)
    }
}

impl ProjectStore for MemoryStore {
    async fn insert_project(&self, project: &NewProject) -> Result<Project> {
        let mut tables = self.tables();

        tables.last_project_id += 1;
        let row = Project {
            id: tables.last_project_id,
            title: project.title.clone(),
            description: project.description.clone(),
            image_url: project.image_url.clone(),
            technologies: Some(project.technologies.clone()),
            github_link: project.github_link.clone(),
            live_demo_link: project.live_demo_link.clone(),
            date_added: project.date_added,
        };
        tables.projects.push(row.clone());
        Ok(row)
    }

    async fn update_project(&self, id: i64, edit: &ProjectEdit) -> Result<Option<Project>> {
        let mut tables = self.tables();

        Ok(tables.projects.iter_mut().find(|p| p.id == id).map(|p| {
            p.title = edit.title.clone();
            p.description = edit.description.clone();
            p.image_url = edit.image_url.clone();
            p.technologies = edit.technologies.clone();
            p.github_link = edit.github_link.clone();
            p.live_demo_link = edit.live_demo_link.clone();
            p.clone()
        }))
    }

    async fn project_by_id(&self, id: i64) -> Result<Option<Project>> {
        Ok(self.tables().projects.iter().find(|p| p.id == id).cloned())
    }

    async fn all_projects(&self) -> Result<Vec<Project>> {
        Ok(newest_first(&self.tables().projects, |p| p.date_added))
    }

    async fn remove_project(&self, id: i64) -> Result<u64> {
        let mut tables = self.tables();
        let before = tables.projects.len();
        tables.projects.retain(|p| p.id != id);
        Ok((before - tables.projects.len()) as u64)
    }
}
