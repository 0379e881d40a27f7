//! Request-parameter validation for the article listing. Raw strings in,
//! either a typed query or per-field error messages out; validation never
//! panics across the API boundary.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

use nw_core::ArticleFilter;

const DEFAULT_PER_PAGE: usize = 10;
const MAX_PER_PAGE: usize = 100;
const MAX_PARAM_LEN: usize = 255;

/// Query parameters exactly as received, before validation.
#[derive(Debug, Default, Deserialize)]
pub struct RawListQuery {
    pub source: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub q: Option<String>,
    pub per_page: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct ListQuery {
    pub filter: ArticleFilter,
    pub page: usize,
    pub per_page: usize,
}

pub type ValidationErrors = BTreeMap<String, Vec<String>>;

fn push_error(errors: &mut ValidationErrors, field: &str, message: String) {
    errors.entry(field.to_string()).or_default().push(message);
}

fn validate_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
) -> Option<String> {
    let value = value.filter(|v| !v.is_empty())?;
    if value.len() > MAX_PARAM_LEN {
        push_error(
            errors,
            field,
            format!("The {field} field must not be greater than {MAX_PARAM_LEN} characters."),
        );
        return None;
    }
    Some(value)
}

fn validate_date(errors: &mut ValidationErrors, field: &str, value: Option<&str>) -> Option<NaiveDate> {
    let value = value.filter(|v| !v.is_empty())?;
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            push_error(
                errors,
                field,
                format!("The {field} field must be a valid date (YYYY-MM-DD)."),
            );
            None
        }
    }
}

fn validate_int(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    min: usize,
    max: usize,
    default: usize,
) -> usize {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return default;
    };
    match value.parse::<usize>() {
        Ok(n) if (min..=max).contains(&n) => n,
        _ => {
            let message = if max == usize::MAX {
                format!("The {field} field must be an integer greater than or equal to {min}.")
            } else {
                format!("The {field} field must be an integer between {min} and {max}.")
            };
            push_error(errors, field, message);
            default
        }
    }
}

impl RawListQuery {
    pub fn validate(self) -> Result<ListQuery, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let source = validate_text(&mut errors, "source", self.source);
        let category = validate_text(&mut errors, "category", self.category);
        let author = validate_text(&mut errors, "author", self.author);
        let q = validate_text(&mut errors, "q", self.q);

        // Day granularity, inclusive on both ends.
        let date_from = validate_date(&mut errors, "date_from", self.date_from.as_deref())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| d.and_utc());
        let date_to = validate_date(&mut errors, "date_to", self.date_to.as_deref())
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map(|d| d.and_utc());

        let per_page = validate_int(
            &mut errors,
            "per_page",
            self.per_page.as_deref(),
            1,
            MAX_PER_PAGE,
            DEFAULT_PER_PAGE,
        );
        let page = validate_int(&mut errors, "page", self.page.as_deref(), 1, usize::MAX, 1);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ListQuery {
            filter: ArticleFilter {
                source,
                category,
                author,
                date_from,
                date_to,
                q,
            },
            page,
            per_page,
        })
    }
}

impl ListQuery {
    /// Canonical cache key over the requesting identity, the full filter set
    /// and the page window. Segments are JSON-serialized so filter values
    /// containing separator characters cannot alias another filter set.
    pub fn cache_key(&self, user_id: i64) -> String {
        let f = &self.filter;
        let key = serde_json::json!([
            user_id,
            f.source,
            f.category,
            f.author,
            f.date_from.map(|d| d.timestamp()),
            f.date_to.map(|d| d.timestamp()),
            f.q,
            self.page,
            self.per_page,
        ]);
        format!("articles:{key}")
    }
}
