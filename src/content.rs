mod article;
mod project;
pub mod text;

pub use self::{
    article::{
        Article, ArticleChanges, ArticleEdit, ArticleListItem, ArticlePage, ArticleResponse,
        Draft, LIST_SUMMARY_LENGTH, NewArticle, NewArticleView, Page, PublishedArticle,
        ViewTotals,
    },
    project::{
        NewProject, Project, ProjectChanges, ProjectEdit, ProjectOptions, ProjectResponse,
        join_technologies, split_technologies,
    },
    text::{derive_slug, first_image, reading_time, summarize, word_count},
};

pub(crate) use self::project::non_blank;
