use serde::Serialize;
use utoipa::ToSchema;

pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Pagination {
    #[schema(example = 1)]
    pub page: usize,
    #[schema(example = 10)]
    pub per_page: usize,
    #[schema(example = 23)]
    pub total_items: usize,
    #[schema(example = 3)]
    pub total_pages: usize,
    /// True when nothing matched; the client shows a single empty state
    /// instead of page controls.
    pub no_data: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

pub fn total_pages(len: usize, size: usize) -> usize {
    len.div_ceil(size.max(1))
}

/// Pulls a requested page back into `1..=total_pages` (page 1 when empty).
pub fn clamp_page(requested: i64, total_pages: usize) -> usize {
    let last = total_pages.max(1) as i64;
    requested.clamp(1, last) as usize
}

pub fn paginate<T: Clone>(items: &[T], size: usize, requested: i64) -> PageSlice<T> {
    let size = size.max(1);
    let pages = total_pages(items.len(), size);
    let page = clamp_page(requested, pages);

    let start = ((page - 1) * size).min(items.len());
    let end = (start + size).min(items.len());

    PageSlice {
        items: items[start..end].to_vec(),
        pagination: Pagination {
            page,
            per_page: size,
            total_items: items.len(),
            total_pages: pages,
            no_data: items.is_empty(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_concatenate_back_to_the_input() {
        let items: Vec<u32> = (1..=23).collect();
        let pages = total_pages(items.len(), PAGE_SIZE);
        assert_eq!(pages, 3);

        let rebuilt: Vec<u32> = (1..=pages as i64)
            .flat_map(|p| paginate(&items, PAGE_SIZE, p).items)
            .collect();
        assert_eq!(rebuilt, items);
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_page() {
        let items: Vec<u32> = (0..20).collect();
        let last = paginate(&items, PAGE_SIZE, 2);
        assert_eq!(last.pagination.total_pages, 2);
        assert_eq!(last.items, (10..20).collect::<Vec<_>>());
    }

    #[test]
    fn out_of_range_pages_are_clamped() {
        let items: Vec<u32> = (0..15).collect();

        let low = paginate(&items, PAGE_SIZE, -4);
        assert_eq!(low.pagination.page, 1);
        assert_eq!(low.items.len(), 10);

        let high = paginate(&items, PAGE_SIZE, 99);
        assert_eq!(high.pagination.page, 2);
        assert_eq!(high.items, (10..15).collect::<Vec<_>>());
    }

    #[test]
    fn empty_list_is_a_single_no_data_state() {
        let empty: Vec<u32> = Vec::new();
        let slice = paginate(&empty, PAGE_SIZE, 3);
        assert!(slice.items.is_empty());
        assert_eq!(
            slice.pagination,
            Pagination {
                page: 1,
                per_page: PAGE_SIZE,
                total_items: 0,
                total_pages: 0,
                no_data: true,
            }
        );
    }
}
