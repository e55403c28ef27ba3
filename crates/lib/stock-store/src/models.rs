use serde::{Deserialize, Serialize};

/// One indexed instrument in the ticker collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickerDoc {
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub doc_id: String,
    pub symbol: String,
    /// Display label, `"SYM - COMPANY NAME"`.
    pub label: String,
    pub embedding: Vec<f32>,
}

/// One ranked nearest-neighbor hit from the ticker index.
///
/// Ranking and distance semantics are whatever the database's KNN
/// query returns; no uniqueness invariant is imposed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub doc_id: String,
    pub label: String,
    pub distance: f64,
}
