mod articles;
mod projects;

pub use self::{articles::ArticleService, projects::ProjectService};

/// 列表默认每页数量
pub const DEFAULT_PER_PAGE: i64 = 6;

/// 列表每页数量上限
pub const MAX_PER_PAGE: i64 = 24;

/// 规整调用方传入的页码，缺省或小于 1 时取 1
pub fn clamp_page(requested: Option<i64>) -> i64 {
    requested.unwrap_or(1).max(1)
}

/// 规整调用方传入的每页数量，缺省取 [`DEFAULT_PER_PAGE`]，范围 `1..=MAX_PER_PAGE`
pub fn clamp_per_page(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE)
}
