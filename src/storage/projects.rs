use super::Db;
use crate::{
    content::{NewProject, Project, ProjectEdit},
    error::Result,
};

/// 项目的存储接口
pub trait ProjectStore: Send + Sync {
    fn insert_project(
        &self,
        project: &NewProject,
    ) -> impl std::future::Future<Output = Result<Project>>;

    /// 写回合并后的字段，项目不存在时返回 `None`
    fn update_project(
        &self,
        id: i64,
        edit: &ProjectEdit,
    ) -> impl std::future::Future<Output = Result<Option<Project>>>;

    fn project_by_id(&self, id: i64) -> impl std::future::Future<Output = Result<Option<Project>>>;

    /// 按添加时间倒序
    fn all_projects(&self) -> impl std::future::Future<Output = Result<Vec<Project>>>;

    /// 返回实际删除的行数
    fn remove_project(&self, id: i64) -> impl std::future::Future<Output = Result<u64>>;
}

impl ProjectStore for Db {
    async fn insert_project(&self, project: &NewProject) -> Result<Project> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects
                (title, description, image_url, technologies, github_link, live_demo_link, date_added)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, title, description, image_url, technologies, github_link, live_demo_link, date_added
            "#,
        )
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.image_url)
        .bind(&project.technologies)
        .bind(&project.github_link)
        .bind(&project.live_demo_link)
        .bind(project.date_added)
        .fetch_one(self)
        .await?;
        Ok(project)
    }

    async fn update_project(&self, id: i64, edit: &ProjectEdit) -> Result<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET title = ?, description = ?, image_url = ?, technologies = ?,
                github_link = ?, live_demo_link = ?
            WHERE id = ?
            RETURNING id, title, description, image_url, technologies, github_link, live_demo_link, date_added
            "#,
        )
        .bind(&edit.title)
        .bind(&edit.description)
        .bind(&edit.image_url)
        .bind(&edit.technologies)
        .bind(&edit.github_link)
        .bind(&edit.live_demo_link)
        .bind(id)
        .fetch_optional(self)
        .await?;
        Ok(project)
    }

    async fn project_by_id(&self, id: i64) -> Result<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, title, description, image_url, technologies, github_link, live_demo_link, date_added
            FROM projects
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self)
        .await?;
        Ok(project)
    }

    async fn all_projects(&self) -> Result<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, title, description, image_url, technologies, github_link, live_demo_link, date_added
            FROM projects
            ORDER BY date_added DESC
            "#,
        )
        .fetch_all(self)
        .await?;
        Ok(projects)
    }

    async fn remove_project(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(self)
            .await?;
        Ok(result.rows_affected())
    }
}
