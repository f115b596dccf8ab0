use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gallery::{DraftGallery, SecondaryImage};
use crate::products::model::ProductInput;
use crate::posts::model::PostInput;

/// Which record type a draft edits. Decides the compression profile on
/// ingest and the submit target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftKind {
    Product,
    Post,
}

/// One uploaded file in an ingest batch. Bytes travel base64 encoded.
#[derive(Debug, Clone, Deserialize)]
pub struct FilePayload {
    pub name: String,
    pub content_type: String,
    pub data: String,
}

/// Outcome of one ingest batch: ids of appended assets plus per-file
/// warnings. A warning never aborts the rest of the batch.
#[derive(Debug, Serialize)]
pub struct IngestReport {
    pub added: Vec<String>,
    pub warnings: Vec<String>,
}

/// Editing session for one product or post. Form fields stay free-form
/// while editing; they are validated into a typed input at submit.
#[derive(Debug, Clone, Serialize)]
pub struct Draft {
    pub id: String,
    pub kind: DraftKind,
    /// Set when the draft edits an existing record.
    pub record_id: Option<String>,
    pub fields: serde_json::Map<String, Value>,
    pub gallery: DraftGallery,
    pub created_at: String,
}

impl Draft {
    pub fn new(kind: DraftKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            record_id: None,
            fields: serde_json::Map::new(),
            gallery: DraftGallery::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Draft seeded from a persisted record for the edit flow.
    pub fn for_record(
        kind: DraftKind,
        record_id: &str,
        fields: serde_json::Map<String, Value>,
        primary: Option<&str>,
        secondaries: &[SecondaryImage],
    ) -> Self {
        let mut draft = Self::new(kind);
        draft.record_id = Some(record_id.to_string());
        draft.fields = fields;
        draft.gallery = DraftGallery::from_record(primary, secondaries);
        draft
    }

    /// Fold the gallery projection into the form fields and parse the
    /// result as a typed product input.
    pub fn product_input(&self) -> Result<ProductInput, String> {
        if self.kind != DraftKind::Product {
            return Err("Draft is not a product draft".to_string());
        }
        let mut fields = self.fields.clone();
        if let Some(projection) = self.gallery.projection() {
            fields.insert(
                "imageBase64".to_string(),
                Value::String(projection.primary_encoded_data),
            );
            fields.insert(
                "additionalImages".to_string(),
                serde_json::to_value(&projection.secondary_images)
                    .map_err(|e| format!("Could not serialize gallery: {}", e))?,
            );
        }
        let input: ProductInput = serde_json::from_value(Value::Object(fields))
            .map_err(|e| format!("Invalid product fields: {}", e))?;
        input.validate()?;
        Ok(input)
    }

    /// Same as [`Draft::product_input`] for post drafts. Only the primary
    /// asset (the cover) feeds the record; content images ride inside the
    /// markdown as references.
    pub fn post_input(&self) -> Result<PostInput, String> {
        if self.kind != DraftKind::Post {
            return Err("Draft is not a post draft".to_string());
        }
        let mut fields = self.fields.clone();
        if let Some(projection) = self.gallery.projection() {
            fields.insert(
                "imageBase64".to_string(),
                Value::String(projection.primary_encoded_data),
            );
        }
        let input: PostInput = serde_json::from_value(Value::Object(fields))
            .map_err(|e| format!("Invalid post fields: {}", e))?;
        input.validate()?;
        Ok(input)
    }
}
