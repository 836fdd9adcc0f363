//! Cache key schema
//!
//! Key format: v{VERSION}:page:{method}:{path_and_query}

/// Cache schema version - increment when changing key formats
pub const CACHE_VERSION: u32 = 1;

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Rendered page for a request.
    /// Format: v1:page:GET:/?page=2
    ///
    /// The viewer is not part of the key; every visitor gets the same cached
    /// listing within the TTL window.
    pub fn page(method: &str, path_and_query: &str) -> String {
        format!(
            "v{}:page:{}:{}",
            CACHE_VERSION,
            method.to_ascii_uppercase(),
            path_and_query
        )
    }

    /// Prefix shared by every cached page
    pub fn page_prefix() -> String {
        format!("v{}:page:", CACHE_VERSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_key_format() {
        assert_eq!(CacheKey::page("get", "/?page=2"), "v1:page:GET:/?page=2");
    }

    #[test]
    fn test_page_key_distinguishes_query() {
        assert_ne!(CacheKey::page("GET", "/"), CacheKey::page("GET", "/?page=2"));
    }

    #[test]
    fn test_prefix_covers_keys() {
        let key = CacheKey::page("GET", "/");
        assert!(key.starts_with(&CacheKey::page_prefix()));
    }
}
