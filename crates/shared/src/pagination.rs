//! Page-number pagination.

use serde::Serialize;

/// One page of an ordered result set.
///
/// `page_index` is 1-based. An empty source has zero pages and neither a
/// previous nor a next page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PaginatedList<T> {
    pub items: Vec<T>,
    pub page_index: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

/// Clamps a requested page index and size to at least 1.
pub fn normalize(page_index: i64, page_size: i64) -> (i64, i64) {
    (page_index.max(1), page_size.max(1))
}

/// Row offset of the first item on a page. Saturates instead of overflowing
/// for page indexes far past the end.
pub fn offset(page_index: i64, page_size: i64) -> i64 {
    let (page_index, page_size) = normalize(page_index, page_size);
    (page_index - 1).saturating_mul(page_size)
}

impl<T> PaginatedList<T> {
    /// Wraps an already-sliced page.
    pub fn new(items: Vec<T>, total_count: i64, page_index: i64, page_size: i64) -> Self {
        let (page_index, page_size) = normalize(page_index, page_size);
        let total_count = total_count.max(0);
        let total_pages = total_count / page_size + i64::from(total_count % page_size != 0);

        Self {
            items,
            page_index,
            page_size,
            total_count,
            total_pages,
            has_previous_page: page_index > 1,
            has_next_page: page_index < total_pages,
        }
    }

    /// Slices a fully materialized, already ordered list.
    pub fn from_vec(all_items: Vec<T>, page_index: i64, page_size: i64) -> Self {
        let total_count = all_items.len() as i64;
        let (page_index, page_size) = normalize(page_index, page_size);
        let items = all_items
            .into_iter()
            .skip(offset(page_index, page_size) as usize)
            .take(page_size as usize)
            .collect();

        Self::new(items, total_count, page_index, page_size)
    }

    /// Converts every item while keeping the page metadata.
    pub fn map<U, F>(self, f: F) -> PaginatedList<U>
    where
        F: FnMut(T) -> U,
    {
        PaginatedList {
            items: self.items.into_iter().map(f).collect(),
            page_index: self.page_index,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source_has_no_pages() {
        let page: PaginatedList<String> = PaginatedList::from_vec(Vec::new(), 1, 10);

        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_previous_page);
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_five_items_page_size_two() {
        let names: Vec<&str> = vec!["Burgas", "Pleven", "Ruse", "Sofia", "Varna"];

        let first = PaginatedList::from_vec(names.clone(), 1, 2);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.items, vec!["Burgas", "Pleven"]);
        assert!(!first.has_previous_page);
        assert!(first.has_next_page);

        let last = PaginatedList::from_vec(names, 3, 2);
        assert_eq!(last.items, vec!["Varna"]);
        assert!(last.has_previous_page);
        assert!(!last.has_next_page);
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let page = PaginatedList::from_vec(vec![1, 2, 3], 5, 2);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 2);
        assert!(page.has_previous_page);
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_non_positive_inputs_are_clamped() {
        let page = PaginatedList::from_vec(vec![1, 2, 3], 0, 0);
        assert_eq!(page.page_index, 1);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.items, vec![1]);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_offset() {
        assert_eq!(offset(1, 10), 0);
        assert_eq!(offset(3, 10), 20);
        assert_eq!(offset(-4, 10), 0);
    }

    #[test]
    fn test_huge_page_index_saturates() {
        assert_eq!(offset(i64::MAX, 10), i64::MAX);
        assert_eq!(offset(i64::MAX, 1), i64::MAX - 1);

        let page = PaginatedList::from_vec(vec![1, 2, 3], i64::MAX, 2);
        assert!(page.items.is_empty());
        assert_eq!(page.page_index, i64::MAX);
        assert_eq!(page.total_pages, 2);
        assert!(page.has_previous_page);
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_huge_page_size_has_one_page() {
        let page = PaginatedList::new(vec![1], 1, 1, i64::MAX);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = PaginatedList::new(vec![1, 2], 7, 2, 2).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total_pages, 4);
        assert!(page.has_previous_page);
        assert!(page.has_next_page);
    }

    #[test]
    fn test_serializes_snake_case() {
        let page = PaginatedList::new(vec!["a"], 1, 1, 10);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["total_pages"], 1);
        assert_eq!(json["has_next_page"], false);
    }
}
