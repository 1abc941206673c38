use thiserror::Error;

/// Status codes reported when the caller does not supply a match list.
pub const DEFAULT_MATCH_CODES: &[u16] = &[200, 204, 301, 302, 307, 401, 403];

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("match-codes list is empty; every response would be dropped")]
    EmptyMatchCodes,
}

/// Status-code and size predicates applied to every directory-mode response.
/// Parsed once from configuration, read-only afterwards.
#[derive(Debug, Clone)]
pub struct FilterRules {
    match_codes: Vec<u16>,
    filter_codes: Vec<u16>,
    filter_sizes: Vec<i64>,
}

impl FilterRules {
    /// An explicitly empty match list is rejected here rather than silently
    /// matching nothing.
    pub fn new(
        match_codes: Vec<u16>,
        filter_codes: Vec<u16>,
        filter_sizes: Vec<i64>,
    ) -> Result<Self, FilterError> {
        if match_codes.is_empty() {
            return Err(FilterError::EmptyMatchCodes);
        }
        Ok(Self {
            match_codes,
            filter_codes,
            filter_sizes,
        })
    }

    pub fn with_default_matches(filter_codes: Vec<u16>, filter_sizes: Vec<i64>) -> Self {
        Self {
            match_codes: DEFAULT_MATCH_CODES.to_vec(),
            filter_codes,
            filter_sizes,
        }
    }

    /// Verdict order: match list first, then filtered codes, then filtered
    /// sizes.
    pub fn accepts(&self, status: u16, size: i64) -> bool {
        if !self.match_codes.contains(&status) {
            return false;
        }
        if !self.filter_codes.is_empty() && self.filter_codes.contains(&status) {
            return false;
        }
        if !self.filter_sizes.is_empty() && self.filter_sizes.contains(&size) {
            return false;
        }
        true
    }

    pub fn match_codes(&self) -> &[u16] {
        &self.match_codes
    }

    pub fn filter_codes(&self) -> &[u16] {
        &self.filter_codes
    }

    pub fn filter_sizes(&self) -> &[i64] {
        &self.filter_sizes
    }
}

impl Default for FilterRules {
    fn default() -> Self {
        Self::with_default_matches(Vec::new(), Vec::new())
    }
}
