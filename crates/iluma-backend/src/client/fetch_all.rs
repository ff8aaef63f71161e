//! Multi-page category fetch for `BackendClient`.

use iluma_core::{Category, RawProduct};

use crate::error::BackendError;

use super::BackendClient;
use super::MAX_PAGES;

impl BackendClient {
    /// Fetches a whole category by walking `skip = 0, N, 2N, …` until the
    /// backend returns a page shorter than `N` (the configured page size).
    ///
    /// **All-or-nothing semantics**: on any page failure, products from earlier
    /// pages are discarded and the error is returned, so the cache never holds
    /// a truncated category.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_category_page`].
    /// Returns [`BackendError::PaginationLimit`] if the number of pages exceeds
    /// [`MAX_PAGES`].
    pub async fn fetch_category(
        &self,
        category: Category,
    ) -> Result<Vec<RawProduct>, BackendError> {
        let limit = self.page_size;
        let page_len = usize::try_from(limit).unwrap_or(usize::MAX);
        let mut all_products: Vec<RawProduct> = Vec::new();
        let mut skip = 0usize;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(BackendError::PaginationLimit {
                    category: category.to_string(),
                    max_pages: MAX_PAGES,
                });
            }

            let page = self.fetch_category_page(category, skip, limit).await?;
            let received = page.len();
            all_products.extend(page);

            if received < page_len {
                break;
            }
            skip += received;
        }

        tracing::debug!(
            %category,
            products = all_products.len(),
            pages = page_count,
            "fetched category from backend"
        );
        Ok(all_products)
    }
}
