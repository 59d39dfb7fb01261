//! Query/command layer. Every public operation opens its own transaction on
//! the connection it is given and commits only when it succeeds; an early
//! return drops the transaction, which rolls it back.

pub mod authors;
pub mod comments;
pub mod dashboard;
pub mod likes;
pub mod posts;
pub mod search;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

pub use search::PostSearch;

use crate::errors::ServiceError;

/// Maps a 1-based page request onto the pages that exist.
///
/// Page 1 always exists, even for an empty listing.
pub(crate) fn resolve_page(requested: Option<u64>, num_pages: u64) -> Result<u64, ServiceError> {
    let page = requested.unwrap_or(1);
    if page == 0 || page > num_pages.max(1) {
        return Err(ServiceError::NotFound);
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_one_always_exists() {
        assert_eq!(resolve_page(None, 0).unwrap(), 1);
        assert_eq!(resolve_page(Some(1), 0).unwrap(), 1);
        assert_eq!(resolve_page(Some(3), 3).unwrap(), 3);
    }

    #[test]
    fn out_of_range_pages_are_not_found() {
        assert!(matches!(resolve_page(Some(0), 2), Err(ServiceError::NotFound)));
        assert!(matches!(resolve_page(Some(2), 0), Err(ServiceError::NotFound)));
        assert!(matches!(resolve_page(Some(4), 3), Err(ServiceError::NotFound)));
    }
}
