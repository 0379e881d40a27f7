//! Preference re-ranking and pagination over an already date-sorted result set.
//!
//! Ranking is an in-memory stable multi-key sort rather than a dynamic SQL
//! ORDER BY clause: each non-empty preference list forms one tie-break layer
//! (sources first, then categories, then authors), and because the input is
//! already ordered published_at descending, a stable sort on the match tuple
//! leaves the date as the final tie-break.

use serde::Serialize;

use crate::types::{ArticleWithRelations, UserPreference};

fn as_list(list: &Option<Vec<String>>) -> &[String] {
    list.as_deref().unwrap_or(&[])
}

/// True when the layer is active (list non-empty) and the article misses it.
/// Inactive layers contribute `false` for every article, refining nothing.
fn misses(list: &[String], value: Option<&str>) -> bool {
    if list.is_empty() {
        return false;
    }
    match value {
        Some(v) => !list.iter().any(|p| p == v),
        None => true,
    }
}

/// Reorder `articles` so preferred matches rank strictly above non-matches,
/// layer by layer. The input must already be sorted published_at descending.
pub fn rank_articles(articles: &mut [ArticleWithRelations], prefs: &UserPreference) {
    let sources = as_list(&prefs.preferred_sources);
    let categories = as_list(&prefs.preferred_categories);
    let authors = as_list(&prefs.preferred_authors);

    if sources.is_empty() && categories.is_empty() && authors.is_empty() {
        return;
    }

    articles.sort_by_key(|a| {
        (
            misses(sources, Some(a.source.slug.as_str())),
            misses(categories, a.category.as_ref().map(|c| c.slug.as_str())),
            misses(authors, a.author.as_ref().map(|au| au.name.as_str())),
        )
    });
}

/// One page of a ranked result set, Laravel-paginator shaped.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub current_page: usize,
    pub data: Vec<T>,
    pub per_page: usize,
    pub total: usize,
    pub last_page: usize,
}

/// Slice out page `page` (1-based) of `per_page` items. `total` always
/// reflects the full set, not the current page.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let total = items.len();
    let last_page = std::cmp::max(1, total.div_ceil(per_page));
    let data = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();
    Page {
        current_page: page,
        data,
        per_page,
        total,
        last_page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Article, Author, Category, Source};
    use chrono::{TimeZone, Utc};

    fn article(id: i64, source: &str, category: &str, author: &str, day: u32) -> ArticleWithRelations {
        ArticleWithRelations {
            article: Article {
                id,
                source_id: 1,
                category_id: Some(1),
                author_id: Some(1),
                external_id: format!("ext-{id}"),
                title: format!("Article {id}"),
                slug: None,
                description: None,
                content: None,
                url: format!("https://example.com/{id}"),
                image_url: None,
                language: Some("en".into()),
                published_at: Some(Utc.with_ymd_and_hms(2025, 9, day, 12, 0, 0).unwrap()),
                raw: None,
            },
            source: Source {
                id: 1,
                name: source.to_string(),
                slug: source.to_string(),
                api_key: None,
                base_url: String::new(),
                last_fetched_at: None,
            },
            category: Some(Category {
                id: 1,
                name: category.to_string(),
                slug: category.to_string(),
            }),
            author: Some(Author {
                id: 1,
                name: author.to_string(),
            }),
        }
    }

    fn prefs(
        sources: &[&str],
        categories: &[&str],
        authors: &[&str],
    ) -> UserPreference {
        let to_vec = |xs: &[&str]| {
            if xs.is_empty() {
                None
            } else {
                Some(xs.iter().map(|s| s.to_string()).collect())
            }
        };
        UserPreference {
            user_id: 1,
            preferred_sources: to_vec(sources),
            preferred_categories: to_vec(categories),
            preferred_authors: to_vec(authors),
        }
    }

    fn ids(articles: &[ArticleWithRelations]) -> Vec<i64> {
        articles.iter().map(|a| a.article.id).collect()
    }

    #[test]
    fn preferred_source_ranks_above_equal_date() {
        // Same date, sources A and B: the article from A must come strictly first.
        let mut set = vec![
            article(1, "b", "general", "x", 10),
            article(2, "a", "general", "x", 10),
        ];
        rank_articles(&mut set, &prefs(&["a"], &[], &[]));
        assert_eq!(ids(&set), vec![2, 1]);
    }

    #[test]
    fn date_order_is_preserved_within_a_layer() {
        let mut set = vec![
            article(1, "a", "general", "x", 12),
            article(2, "b", "general", "x", 11),
            article(3, "a", "general", "x", 10),
        ];
        rank_articles(&mut set, &prefs(&["a"], &[], &[]));
        // Both source-a articles first, still newest first; b last.
        assert_eq!(ids(&set), vec![1, 3, 2]);
    }

    #[test]
    fn later_layers_only_refine_ties() {
        // All from the preferred source; category layer breaks the tie, and the
        // author layer only reorders within equal (source, category) matches.
        let mut set = vec![
            article(1, "a", "sports", "x", 10),
            article(2, "a", "tech", "y", 10),
            article(3, "a", "tech", "x", 10),
        ];
        rank_articles(&mut set, &prefs(&["a"], &["tech"], &["x"]));
        assert_eq!(ids(&set), vec![3, 2, 1]);
    }

    #[test]
    fn empty_preference_lists_change_nothing() {
        let mut set = vec![
            article(1, "b", "general", "x", 12),
            article(2, "a", "general", "x", 11),
        ];
        rank_articles(&mut set, &prefs(&[], &[], &[]));
        assert_eq!(ids(&set), vec![1, 2]);
    }

    #[test]
    fn missing_relation_counts_as_non_match() {
        let mut set = vec![
            article(1, "a", "general", "x", 10),
            article(2, "a", "general", "x", 10),
        ];
        set[0].author = None;
        rank_articles(&mut set, &prefs(&[], &[], &["x"]));
        assert_eq!(ids(&set), vec![2, 1]);
    }

    #[test]
    fn paginate_bounds_and_total() {
        let items: Vec<i32> = (1..=23).collect();
        let page = paginate(items, 3, 10);
        assert_eq!(page.data, vec![21, 22, 23]);
        assert_eq!(page.total, 23);
        assert_eq!(page.last_page, 3);
        assert_eq!(page.current_page, 3);

        let empty: Vec<i32> = vec![];
        let page = paginate(empty, 1, 10);
        assert!(page.data.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.last_page, 1);
    }

    #[test]
    fn paginate_past_the_end_is_empty() {
        let page = paginate(vec![1, 2, 3], 5, 10);
        assert!(page.data.is_empty());
        assert_eq!(page.total, 3);
    }
}
