use sea_orm::sea_query::{Condition, Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::ColumnTrait;

use crate::entity::{posts, users};

const LIKE_ESCAPE: char = '\\';

/// Free-text filter over post title, content and author username.
///
/// Matching is a case-insensitive substring test on each field, combined
/// with OR. A blank query matches everything.
///
/// The needle is folded with ASCII rules only, the same way SQLite's
/// `LOWER()` folds the column, so the exact text of a field always matches
/// itself. Non-ASCII letters are left to the backend's `LIKE` collation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostSearch {
    needle: Option<String>,
}

impl PostSearch {
    pub fn new(query: Option<&str>) -> Self {
        let needle = query
            .filter(|q| !q.is_empty())
            .map(str::to_ascii_lowercase);
        Self { needle }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_none()
    }

    /// Predicate to apply to a select over posts joined with their author.
    pub fn condition(&self) -> Condition {
        let Some(needle) = &self.needle else {
            return Condition::all();
        };
        let pattern = format!("%{}%", escape_like(needle));
        Condition::any()
            .add(contains(posts::Column::Title, &pattern))
            .add(contains(posts::Column::Content, &pattern))
            .add(contains(users::Column::Username, &pattern))
    }
}

fn contains<C: ColumnTrait>(column: C, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column.as_column_ref())))
        .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}
