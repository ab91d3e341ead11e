//! User-facing notices for rejected rules.
//!
//! Every non-empty error category produces one notice listing all of its
//! labels, so a user sees the complete set of problems after one save.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::model::TransformErrors;

/// Category of rule a notice refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeCategory {
    /// Database collection rules.
    Crud,
    /// Function service rules.
    Functions,
    /// File storage rules.
    FileStore,
    /// Static hosting routes.
    Static,
}

/// A single error notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Category the notice describes.
    pub category: NoticeCategory,
    /// Short title.
    pub title: String,
    /// Description naming every rejected rule in the category.
    pub description: String,
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

/// Build one notice per non-empty error category, in a fixed order.
#[must_use]
pub fn notices(errors: &TransformErrors) -> Vec<Notice> {
    let mut out = Vec::new();

    let crud: Vec<String> = errors
        .crud
        .iter()
        .filter(|(_, collections)| !collections.is_empty())
        .map(|(db, collections)| format!("{db} - ({})", collections.join(", ")))
        .collect();
    if !crud.is_empty() {
        out.push(Notice {
            category: NoticeCategory::Crud,
            title: "Error in CRUD config".to_string(),
            description: crud.join(" "),
        });
    }

    if !errors.functions.is_empty() {
        out.push(Notice {
            category: NoticeCategory::Functions,
            title: "Error in Functions config".to_string(),
            description: format!("Services - {}", errors.functions.join(", ")),
        });
    }

    if !errors.file_store.is_empty() {
        out.push(Notice {
            category: NoticeCategory::FileStore,
            title: "Error in File Storage config".to_string(),
            description: format!("Rules - {}", errors.file_store.join(", ")),
        });
    }

    if !errors.static_routes.is_empty() {
        out.push(static_notice(&errors.static_routes));
    }

    out
}

/// Notice for rejected routes of a static document.
#[must_use]
pub fn static_notice(labels: &[String]) -> Notice {
    Notice {
        category: NoticeCategory::Static,
        title: "Error in Static config".to_string(),
        description: format!("Routes - {}", labels.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RuleSite;

    #[test]
    fn no_errors_means_no_notices() {
        assert!(notices(&TransformErrors::default()).is_empty());
    }

    #[test]
    fn crud_notice_groups_by_database() {
        let mut errors = TransformErrors::default();
        for (db, name) in [("mongo", "users"), ("mongo", "posts"), ("sql", "orders")] {
            errors.record(&RuleSite::Collection {
                db: db.into(),
                name: name.into(),
            });
        }
        let out = notices(&errors);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Error in CRUD config");
        assert_eq!(out[0].description, "mongo - (users, posts) sql - (orders)");
    }

    #[test]
    fn every_category_gets_its_own_notice() {
        let mut errors = TransformErrors::default();
        errors.record(&RuleSite::Collection {
            db: "mongo".into(),
            name: "users".into(),
        });
        errors.record(&RuleSite::Service { name: "a".into() });
        errors.record(&RuleSite::Service { name: "b".into() });
        errors.record(&RuleSite::FileRule { index: 2 });
        errors.record(&RuleSite::StaticRoute { index: 0 });
        let out = notices(&errors);
        let categories: Vec<NoticeCategory> = out.iter().map(|n| n.category).collect();
        assert_eq!(
            categories,
            vec![
                NoticeCategory::Crud,
                NoticeCategory::Functions,
                NoticeCategory::FileStore,
                NoticeCategory::Static
            ]
        );
        assert_eq!(out[1].description, "Services - a, b");
        assert_eq!(out[2].description, "Rules - Rule 3");
        assert_eq!(out[3].to_string(), "Error in Static config: Routes - Rule 1");
    }
}
