use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page size must be greater than zero")]
    ZeroPageSize,
}

/// Pagination of a server-side table. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    current_page: usize,
    page_size: usize,
    total_count: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_size: 20,
            total_count: 0,
        }
    }
}

impl PaginationState {
    pub fn new(page_size: usize) -> Result<Self, PaginationError> {
        if page_size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        Ok(Self {
            page_size,
            ..Self::default()
        })
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn total_pages(&self) -> usize {
        self.total_count.div_ceil(self.page_size)
    }

    /// Номера первой и последней записи на странице (1-based), (0, 0) для пустой таблицы
    pub fn display_range(&self) -> (usize, usize) {
        if self.total_count == 0 {
            return (0, 0);
        }
        let start = (self.current_page - 1) * self.page_size + 1;
        let end = (self.current_page * self.page_size).min(self.total_count);
        (start, end)
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// Moves to `page`, clamped into `[1, max(total_pages, 1)]`.
    pub fn set_page(&mut self, page: usize) {
        let last = self.total_pages().max(1);
        self.current_page = page.clamp(1, last);
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), PaginationError> {
        if page_size == 0 {
            return Err(PaginationError::ZeroPageSize);
        }
        self.page_size = page_size;
        self.current_page = 1;
        Ok(())
    }

    pub fn set_total_count(&mut self, total_count: usize) {
        self.total_count = total_count;
        self.set_page(self.current_page);
    }

    /// Сброс на первую страницу (при смене фильтров или сортировки)
    pub fn reset(&mut self) {
        self.current_page = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let mut p = PaginationState::new(20).unwrap();
        assert_eq!(p.total_pages(), 0);
        p.set_total_count(41);
        assert_eq!(p.total_pages(), 3);
        p.set_total_count(40);
        assert_eq!(p.total_pages(), 2);
    }

    #[test]
    fn test_display_range() {
        let mut p = PaginationState::new(20).unwrap();
        assert_eq!(p.display_range(), (0, 0));
        p.set_total_count(45);
        assert_eq!(p.display_range(), (1, 20));
        p.set_page(3);
        assert_eq!(p.display_range(), (41, 45));
    }

    #[test]
    fn test_set_page_clamps() {
        let mut p = PaginationState::new(10).unwrap();
        p.set_total_count(25);
        p.set_page(0);
        assert_eq!(p.current_page(), 1);
        p.set_page(99);
        assert_eq!(p.current_page(), 3);
        assert!(p.has_previous());
        assert!(!p.has_next());
    }

    #[test]
    fn test_shrinking_total_pulls_page_back() {
        let mut p = PaginationState::new(10).unwrap();
        p.set_total_count(100);
        p.set_page(10);
        p.set_total_count(15);
        assert_eq!(p.current_page(), 2);
        p.set_total_count(0);
        assert_eq!(p.current_page(), 1);
    }

    #[test]
    fn test_page_size_change_resets_page() {
        let mut p = PaginationState::new(10).unwrap();
        p.set_total_count(100);
        p.set_page(5);
        p.set_page_size(50).unwrap();
        assert_eq!(p.current_page(), 1);
        assert_eq!(p.total_pages(), 2);
        assert_eq!(p.set_page_size(0), Err(PaginationError::ZeroPageSize));
        assert_eq!(p.page_size(), 50);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert_eq!(PaginationState::new(0), Err(PaginationError::ZeroPageSize));
    }
}
