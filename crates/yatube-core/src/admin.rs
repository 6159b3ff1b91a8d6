//! Declarative configuration of the administrative console.
//!
//! Every entity is registered with a [`ModelAdmin`] describing which columns
//! the change list shows, which of them can be edited in place, which
//! fields free-text search covers and which facets can filter the list.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::DomainError;

/// Rows on one change-list page.
pub const LIST_PER_PAGE: u64 = 100;

const EMPTY_VALUE_DISPLAY: &str = "-пусто-";
const DEFAULT_EMPTY_VALUE_DISPLAY: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminModel {
    Post,
    Group,
    Comment,
    Follow,
}

impl AdminModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminModel::Post => "post",
            AdminModel::Group => "group",
            AdminModel::Comment => "comment",
            AdminModel::Follow => "follow",
        }
    }
}

impl fmt::Display for AdminModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminModel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(AdminModel::Post),
            "group" => Ok(AdminModel::Group),
            "comment" => Ok(AdminModel::Comment),
            "follow" => Ok(AdminModel::Follow),
            other => Err(DomainError::not_found("admin model", other)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModelAdmin {
    pub model: AdminModel,
    pub verbose_name: &'static str,
    pub verbose_name_plural: &'static str,
    pub list_display: &'static [&'static str],
    pub list_editable: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub list_filter: &'static [&'static str],
    pub empty_value_display: &'static str,
    /// Fields filled from other fields when left blank: (target, sources).
    pub prepopulated_fields: &'static [(&'static str, &'static [&'static str])],
}

pub static POST_ADMIN: ModelAdmin = ModelAdmin {
    model: AdminModel::Post,
    verbose_name: "Пост",
    verbose_name_plural: "Посты",
    list_display: &["pk", "text", "created", "author", "group"],
    list_editable: &["group"],
    search_fields: &["text"],
    list_filter: &["created"],
    empty_value_display: EMPTY_VALUE_DISPLAY,
    prepopulated_fields: &[],
};

pub static GROUP_ADMIN: ModelAdmin = ModelAdmin {
    model: AdminModel::Group,
    verbose_name: "Группа",
    verbose_name_plural: "Группы",
    list_display: &["pk", "title", "slug", "description"],
    list_editable: &[],
    search_fields: &["title", "description"],
    list_filter: &["title"],
    empty_value_display: EMPTY_VALUE_DISPLAY,
    prepopulated_fields: &[("slug", &["title"])],
};

pub static COMMENT_ADMIN: ModelAdmin = ModelAdmin {
    model: AdminModel::Comment,
    verbose_name: "Комментарий",
    verbose_name_plural: "Комментарии",
    list_display: &["post", "author", "text", "created"],
    list_editable: &[],
    search_fields: &["author", "text"],
    list_filter: &["created"],
    empty_value_display: DEFAULT_EMPTY_VALUE_DISPLAY,
    prepopulated_fields: &[],
};

pub static FOLLOW_ADMIN: ModelAdmin = ModelAdmin {
    model: AdminModel::Follow,
    verbose_name: "Подписка",
    verbose_name_plural: "Подписки",
    list_display: &["author", "user"],
    list_editable: &[],
    search_fields: &["author"],
    list_filter: &["author", "user"],
    empty_value_display: DEFAULT_EMPTY_VALUE_DISPLAY,
    prepopulated_fields: &[],
};

/// All registered models, in console order.
pub fn registry() -> [&'static ModelAdmin; 4] {
    [&POST_ADMIN, &GROUP_ADMIN, &COMMENT_ADMIN, &FOLLOW_ADMIN]
}

pub fn lookup(model: AdminModel) -> &'static ModelAdmin {
    match model {
        AdminModel::Post => &POST_ADMIN,
        AdminModel::Group => &GROUP_ADMIN,
        AdminModel::Comment => &COMMENT_ADMIN,
        AdminModel::Follow => &FOLLOW_ADMIN,
    }
}

impl ModelAdmin {
    pub fn is_editable(&self, column: &str) -> bool {
        self.list_editable.contains(&column)
    }

    /// Render an optional cell value, using the empty placeholder for nulls.
    pub fn display(&self, value: Option<String>) -> String {
        match value {
            Some(v) if !v.is_empty() => v,
            _ => self.empty_value_display.to_string(),
        }
    }

    /// Source fields for a prepopulated field, if any.
    pub fn prepopulated_from(&self, field: &str) -> Option<&'static [&'static str]> {
        self.prepopulated_fields
            .iter()
            .find(|(target, _)| *target == field)
            .map(|(_, sources)| *sources)
    }
}

/// Date facets offered for timestamp filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFacet {
    Today,
    PastSevenDays,
    ThisMonth,
    ThisYear,
}

impl FromStr for DateFacet {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(DateFacet::Today),
            "past_7_days" => Ok(DateFacet::PastSevenDays),
            "this_month" => Ok(DateFacet::ThisMonth),
            "this_year" => Ok(DateFacet::ThisYear),
            other => Err(DomainError::Validation(format!(
                "unknown date facet '{other}'"
            ))),
        }
    }
}

impl DateFacet {
    /// Inclusive lower bound of the facet, relative to `now`.
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        let day = match self {
            DateFacet::Today => today,
            DateFacet::PastSevenDays => today - Duration::days(7),
            DateFacet::ThisMonth => today.with_day(1).unwrap_or(today),
            DateFacet::ThisYear => today.with_ordinal(1).unwrap_or(today),
        };
        Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
    }
}

/// A validated filter of a change list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFilter {
    Created(DateFacet),
    Title(String),
    Author(String),
    User(String),
}

/// Query parameters of a change list.
#[derive(Debug, Clone, Default)]
pub struct ChangeListQuery {
    pub search: Option<String>,
    pub filters: Vec<ListFilter>,
    pub page: Option<String>,
}

impl ChangeListQuery {
    /// Build a query from raw request parameters. `q` and `page` are
    /// reserved; every other key must be one of the model's `list_filter`.
    pub fn parse(
        admin: &ModelAdmin,
        params: &BTreeMap<String, String>,
    ) -> Result<Self, DomainError> {
        let mut query = ChangeListQuery::default();

        for (key, value) in params {
            match key.as_str() {
                "q" => {
                    let term = value.trim();
                    if !term.is_empty() {
                        query.search = Some(term.to_string());
                    }
                }
                "page" => query.page = Some(value.clone()),
                field if admin.list_filter.contains(&field) => {
                    let filter = match field {
                        "created" => ListFilter::Created(value.parse()?),
                        "title" => ListFilter::Title(value.clone()),
                        "author" => ListFilter::Author(value.clone()),
                        "user" => ListFilter::User(value.clone()),
                        _ => {
                            return Err(DomainError::Internal(format!(
                                "filter '{field}' has no implementation"
                            )));
                        }
                    };
                    query.filters.push(filter);
                }
                other => {
                    return Err(DomainError::Validation(format!(
                        "'{other}' is not a filter of {}",
                        admin.model
                    )));
                }
            }
        }

        Ok(query)
    }
}

/// One row of a change list, values in `list_display` order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeListRow {
    pub pk: Uuid,
    pub values: Vec<String>,
}
