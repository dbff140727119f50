use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

impl InsertResult {
    pub fn new(inserted_id: impl Into<String>) -> Self {
        Self {
            acknowledged: true,
            inserted_id: inserted_id.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: usize,
    pub modified_count: usize,
}

impl UpdateResult {
    pub fn new(changed: usize) -> Self {
        Self {
            acknowledged: true,
            matched_count: changed,
            modified_count: changed,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: usize,
}

impl DeleteResult {
    pub fn new(deleted_count: usize) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}
