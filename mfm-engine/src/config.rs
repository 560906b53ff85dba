use mfm_model::DEFAULT_MAX_NAME_LEN;

/// Configuration for the version catalog.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Whether an import may replace the tree of an existing draft with the
    /// same label when the request asks for it.
    pub allow_draft_replace: bool,
    /// Whether marking a draft latest publishes it. When false the call is
    /// rejected instead.
    pub publish_on_mark_latest: bool,
    /// Longest accepted faction/detachment/enhancement/unit name.
    pub max_name_len: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            allow_draft_replace: true,
            publish_on_mark_latest: true,
            max_name_len: DEFAULT_MAX_NAME_LEN,
        }
    }
}
