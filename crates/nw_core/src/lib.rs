pub mod error;
pub mod rank;
pub mod storage;
pub mod types;

pub use error::Error;
pub use storage::{ArticleFilter, Storage};
pub use types::{
    Article, ArticleWithRelations, Author, Category, NewArticle, Source, SourceSeed,
    UserPreference,
};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use super::storage::{ArticleFilter, Storage};
    pub use super::types::*;
    pub use super::{Error, Result};
}
