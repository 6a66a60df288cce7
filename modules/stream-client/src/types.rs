use serde_json::Value;
use typed_builder::TypedBuilder;

/// Connection settings, passed in by the caller at construction.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub endpoint: String,
    pub bearer_token: String,
}

/// One fetch: what to track and how many records to take.
#[derive(Debug, Clone, TypedBuilder)]
pub struct FetchRequest {
    /// Comma-separated keywords, like `#tags` or `@mentions`. Empty tracks nothing.
    #[builder(default, setter(into))]
    pub track: String,
    /// Stop after this many non-blank lines.
    #[builder(default = 100)]
    pub limit: u32,
    /// Extra query parameters passed through to the endpoint.
    #[builder(default)]
    pub params: Vec<(String, String)>,
}

impl FetchRequest {
    pub(crate) fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::with_capacity(self.params.len() + 1);
        if !self.track.is_empty() {
            query.push(("track".to_string(), self.track.clone()));
        }
        query.extend(self.params.iter().cloned());
        query
    }
}

/// Records decoded from one fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub records: Vec<Value>,
    /// Non-blank lines read, decoded or not.
    pub lines_read: u32,
    /// Lines that were not valid JSON.
    pub skipped: u32,
}
