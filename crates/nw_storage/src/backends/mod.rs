pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

use nw_core::{ArticleFilter, ArticleWithRelations};

/// Shared filter predicate so the in-memory backend and tests agree with the
/// SQL semantics: slugs match exactly, names by case-insensitive substring,
/// dates inclusively, free text across title/description/content.
pub(crate) fn matches_filter(a: &ArticleWithRelations, filter: &ArticleFilter) -> bool {
    fn contains_ci(haystack: &str, needle: &str) -> bool {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }

    if let Some(source) = &filter.source {
        if a.source.slug != *source && !contains_ci(&a.source.name, source) {
            return false;
        }
    }
    if let Some(category) = &filter.category {
        match &a.category {
            Some(c) if c.slug == *category || contains_ci(&c.name, category) => {}
            _ => return false,
        }
    }
    if let Some(author) = &filter.author {
        match &a.author {
            Some(au) if contains_ci(&au.name, author) => {}
            _ => return false,
        }
    }
    if filter.date_from.is_some() || filter.date_to.is_some() {
        let Some(published) = a.article.published_at else {
            return false;
        };
        if let Some(from) = filter.date_from {
            if published < from {
                return false;
            }
        }
        if let Some(to) = filter.date_to {
            if published > to {
                return false;
            }
        }
    }
    if let Some(q) = &filter.q {
        let hit = contains_ci(&a.article.title, q)
            || a.article
                .description
                .as_deref()
                .is_some_and(|d| contains_ci(d, q))
            || a.article
                .content
                .as_deref()
                .is_some_and(|c| contains_ci(c, q));
        if !hit {
            return false;
        }
    }
    true
}
