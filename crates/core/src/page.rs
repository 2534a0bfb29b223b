//! Offset pagination shared by list endpoints.

use serde::Deserialize;

/// `skip`/`limit` window over an ordered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "Page::default_limit")]
    pub limit: usize,
}

impl Page {
    pub const DEFAULT_LIMIT: usize = 100;

    pub fn new(skip: usize, limit: usize) -> Self {
        Self { skip, limit }
    }

    fn default_limit() -> usize {
        Self::DEFAULT_LIMIT
    }

    /// Apply the window to an already ordered iterator.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items.into_iter().skip(self.skip).take(self.limit).collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_limit_is_one_hundred() {
        let page: Page = serde_json::from_str("{}").unwrap();
        assert_eq!(page, Page::new(0, 100));
    }

    proptest! {
        /// The window never yields more than `limit` items and never reorders.
        #[test]
        fn window_is_a_contiguous_slice(len in 0usize..300, skip in 0usize..400, limit in 0usize..200) {
            let items: Vec<usize> = (0..len).collect();
            let out = Page::new(skip, limit).apply(items.clone());
            prop_assert!(out.len() <= limit);
            let start = skip.min(len);
            let end = (start + limit).min(len);
            prop_assert_eq!(out, items[start..end].to_vec());
        }
    }
}
