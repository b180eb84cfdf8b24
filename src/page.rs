use crate::error::{GameError, Res};

/// Largest page size a client may ask for.
pub const MAX_PAGE_SIZE: usize = 100;

/// One page of a list response.
#[derive(Debug, PartialEq, serde::Serialize)]
pub struct Page<T> {
    /// Items across every page.
    pub count: usize,
    pub page: usize,
    pub pages: usize,
    pub results: Vec<T>,
}

/// Cut page `page` (numbered from 1) out of `items`. A zero page size falls
/// back to `default_size`. An empty list still has a first page.
pub fn paginate<T>(
    items: Vec<T>,
    page: Option<usize>,
    page_size: Option<usize>,
    default_size: usize,
) -> Res<Page<T>> {
    let page = page.unwrap_or(1);
    let page_size = page_size
        .filter(|&n| n > 0)
        .unwrap_or(default_size)
        .min(MAX_PAGE_SIZE);

    let count = items.len();
    let pages = count.div_ceil(page_size).max(1);
    if page == 0 || page > pages {
        return Err(GameError::InvalidPage(page));
    }

    let results = items
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();
    Ok(Page {
        count,
        page,
        pages,
        results,
    })
}

#[cfg(test)]
mod test {
    use crate::error::GameError;

    use super::{paginate, MAX_PAGE_SIZE};

    #[test]
    fn test_page_boundaries() {
        let items: Vec<u32> = (1..=20).collect();

        let first = paginate(items.clone(), None, None, 18).unwrap();
        assert_eq!(first.count, 20);
        assert_eq!(first.pages, 2);
        assert_eq!(first.results, (1..=18).collect::<Vec<_>>());

        let last = paginate(items.clone(), Some(2), None, 18).unwrap();
        assert_eq!(last.results, vec![19, 20]);

        assert_eq!(
            paginate(items.clone(), Some(3), None, 18),
            Err(GameError::InvalidPage(3))
        );
        assert_eq!(
            paginate(items.clone(), Some(0), None, 18),
            Err(GameError::InvalidPage(0))
        );
    }

    #[test]
    fn test_page_size_override() {
        let items: Vec<u32> = (1..=10).collect();

        let page = paginate(items.clone(), Some(4), Some(3), 18).unwrap();
        assert_eq!(page.pages, 4);
        assert_eq!(page.results, vec![10]);

        // Zero means the default.
        let page = paginate(items.clone(), None, Some(0), 4).unwrap();
        assert_eq!(page.results, vec![1, 2, 3, 4]);

        let page = paginate((0..500).collect::<Vec<u32>>(), None, Some(1000), 18).unwrap();
        assert_eq!(page.results.len(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_empty_list() {
        let page = paginate(Vec::<u32>::new(), None, None, 10).unwrap();
        assert_eq!(page.count, 0);
        assert_eq!(page.pages, 1);
        assert!(page.results.is_empty());
        assert_eq!(
            paginate(Vec::<u32>::new(), Some(2), None, 10),
            Err(GameError::InvalidPage(2))
        );
    }
}
