use chrono::NaiveDateTime;
use sqlx::FromRow;

/// Database model for category
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub valid_from: NaiveDateTime,
    /// `None` keeps the category open-ended
    pub valid_to: Option<NaiveDateTime>,
}

impl Category {
    /// Whether the validity window contains `at` (start inclusive, end exclusive)
    pub fn is_valid_at(&self, at: NaiveDateTime) -> bool {
        self.valid_from <= at && self.valid_to.is_none_or(|to| to > at)
    }

    /// Whether the category has not expired by `now`
    pub fn is_active_at(&self, now: NaiveDateTime) -> bool {
        self.valid_to.is_none_or(|to| to > now)
    }
}

/// Values for a category row that has not been inserted yet
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub valid_from: NaiveDateTime,
    pub valid_to: Option<NaiveDateTime>,
}
