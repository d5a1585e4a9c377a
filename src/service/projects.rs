use chrono::Utc;

use crate::{
    content::{
        NewProject, Project, ProjectChanges, ProjectOptions, join_technologies, non_blank,
    },
    error::{Error, Result},
    storage::ProjectStore,
};

/// 项目业务逻辑
#[derive(Debug, Clone)]
pub struct ProjectService<S> {
    store: S,
}

impl<S: ProjectStore> ProjectService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 新建项目，技术标签按顺序以逗号拼接存储
    pub async fn create(
        &self,
        title: &str,
        description: &str,
        options: ProjectOptions,
    ) -> Result<Project> {
        if title.trim().is_empty() || description.trim().is_empty() {
            return Err(Error::Validation("title and description are required"));
        }
        let technologies = join_technologies(&options.technologies)?;

        let project = self
            .store
            .insert_project(&NewProject {
                title: title.to_string(),
                description: description.to_string(),
                image_url: non_blank(options.image_url),
                technologies,
                github_link: non_blank(options.github_link),
                live_demo_link: non_blank(options.live_demo_link),
                date_added: Utc::now(),
            })
            .await?;

        tracing::info!(id = project.id, "project created");
        Ok(project)
    }

    /// 局部更新，id 与 date_added 不变
    pub async fn update(&self, id: i64, changes: ProjectChanges) -> Result<Project> {
        let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
        if blank(&changes.title) || blank(&changes.description) {
            return Err(Error::Validation("title and description must not be empty"));
        }

        let project = self
            .store
            .project_by_id(id)
            .await?
            .ok_or(Error::NotFound)?;
        let edit = changes.merge(&project)?;

        let updated = self
            .store
            .update_project(id, &edit)
            .await?
            .ok_or(Error::NotFound)?;

        tracing::info!(id, "project updated");
        Ok(updated)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Project>> {
        self.store.project_by_id(id).await
    }

    /// 按添加时间倒序
    pub async fn list_all(&self) -> Result<Vec<Project>> {
        self.store.all_projects().await
    }

    /// 返回是否真的删除了项目
    pub async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let removed = self.store.remove_project(id).await? > 0;
        if removed {
            tracing::info!(id, "project deleted");
        }
        Ok(removed)
    }
}
