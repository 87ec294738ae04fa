use serde::Serialize;

use crate::error::CoreError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self, CoreError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if page < 1 {
            return Err(CoreError::InvalidPage);
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(CoreError::InvalidLimit {
                got: limit,
                max: MAX_LIMIT,
            });
        }
        Ok(Self { page, limit })
    }

    pub fn skip(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.limit as usize)
    }

    pub fn take(&self) -> usize {
        self.limit as usize
    }

    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.limit as usize)
    }
}
