use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 技术标签在存储中的分隔符
const TECH_SEPARATOR: char = ',';

/// 项目，对应 `projects` 表的一行
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    /// 逗号拼接的技术标签，迁移来的旧数据可能为 NULL
    pub technologies: Option<String>,
    pub github_link: Option<String>,
    pub live_demo_link: Option<String>,
    /// 创建时写入，之后不再改变
    pub date_added: DateTime<Utc>,
}

/// 插入新项目时写入的字段
#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub technologies: String,
    pub github_link: Option<String>,
    pub live_demo_link: Option<String>,
    pub date_added: DateTime<Utc>,
}

/// 创建项目时的可选字段
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOptions {
    pub image_url: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub github_link: Option<String>,
    pub live_demo_link: Option<String>,
}

/// 项目的局部修改
///
/// `None` 保留原值；可选链接传入空串表示清空。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub github_link: Option<String>,
    pub live_demo_link: Option<String>,
}

/// 合并后写回存储的字段，id 与 date_added 不可修改
#[derive(Debug, Clone)]
pub struct ProjectEdit {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub technologies: Option<String>,
    pub github_link: Option<String>,
    pub live_demo_link: Option<String>,
}

/// 对外返回的项目
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub technologies: Vec<String>,
    pub github_link: Option<String>,
    pub live_demo_link: Option<String>,
    pub date_added: DateTime<Utc>,
}

/// 将技术标签按顺序拼接为存储格式，空列表得到空串。
///
/// 标签本身含有分隔符时无法无损还原，直接拒绝。
pub fn join_technologies(tags: &[String]) -> Result<String> {
    if tags.iter().any(|t| t.contains(TECH_SEPARATOR)) {
        return Err(Error::Validation("technology tags must not contain commas"));
    }
    Ok(tags.join(","))
}

/// 还原技术标签，空串或 NULL 得到空列表
pub fn split_technologies(stored: Option<&str>) -> Vec<String> {
    match stored {
        Some(s) if !s.is_empty() => s.split(TECH_SEPARATOR).map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// 空白字符串视为未提供
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ProjectChanges {
    pub fn merge(self, project: &Project) -> Result<ProjectEdit> {
        fn link(change: Option<String>, current: &Option<String>) -> Option<String> {
            match change {
                Some(v) => non_blank(Some(v)),
                None => current.clone(),
            }
        }

        let technologies = match self.technologies {
            Some(tags) => Some(join_technologies(&tags)?),
            None => project.technologies.clone(),
        };

        Ok(ProjectEdit {
            title: self.title.unwrap_or_else(|| project.title.clone()),
            description: self
                .description
                .unwrap_or_else(|| project.description.clone()),
            image_url: link(self.image_url, &project.image_url),
            technologies,
            github_link: link(self.github_link, &project.github_link),
            live_demo_link: link(self.live_demo_link, &project.live_demo_link),
        })
    }
}

impl Project {
    pub fn present(&self) -> ProjectResponse {
        ProjectResponse {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            technologies: split_technologies(self.technologies.as_deref()),
            github_link: self.github_link.clone(),
            live_demo_link: self.live_demo_link.clone(),
            date_added: self.date_added,
        }
    }
}
