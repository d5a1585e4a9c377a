mod articles;
mod memory;
mod projects;
mod sqlite;

pub use self::{
    articles::ArticleStore,
    memory::MemoryStore,
    projects::ProjectStore,
    sqlite::{Db, init_db, migrate, new_db_pool, open_in_memory},
};
