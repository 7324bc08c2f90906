use serde::{Deserialize, Serialize};

/// Paged listing envelope (`{"Items": [...], "TotalRecordCount": n}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryResult<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total_record_count: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<i32>,
}
