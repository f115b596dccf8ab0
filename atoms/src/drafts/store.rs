use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine};
use futures::future::join_all;
use tokio::sync::Mutex;

use super::model::{Draft, DraftKind, FilePayload, IngestReport};
use crate::gallery::{SecondaryImage, MAX_GALLERY_IMAGES};
use crate::imaging::model::{
    CompressionProfile, MAX_COMPRESSED_ESTIMATE_BYTES, POST_COVER, PRODUCT_IMAGE,
};
use crate::imaging::{compress_image, CompressedImage};

fn profile_for(kind: DraftKind) -> CompressionProfile {
    match kind {
        DraftKind::Product => PRODUCT_IMAGE,
        DraftKind::Post => POST_COVER,
    }
}

async fn compress_file(
    file: &FilePayload,
    profile: &CompressionProfile,
) -> Result<CompressedImage, String> {
    let bytes = STANDARD
        .decode(&file.data)
        .map_err(|_| "could not read file data".to_string())?;
    let compressed = compress_image(&bytes, &file.content_type, profile)
        .await
        .map_err(|e| e.to_string())?;
    if compressed.size_estimate_bytes > MAX_COMPRESSED_ESTIMATE_BYTES {
        return Err(format!(
            "still {} KB after compression, over the {} KB ceiling",
            compressed.size_estimate_bytes / 1024,
            MAX_COMPRESSED_ESTIMATE_BYTES / 1024
        ));
    }
    Ok(compressed)
}

/// In-memory draft sessions. Every gallery mutation goes through this
/// single owner, which keeps the one-primary invariant safe when requests
/// arrive concurrently.
#[derive(Default)]
pub struct DraftStore {
    drafts: Mutex<HashMap<String, Draft>>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self {
            drafts: Mutex::new(HashMap::new()),
        }
    }

    /// Open a blank draft and return its snapshot.
    pub async fn open(&self, kind: DraftKind) -> Draft {
        let draft = Draft::new(kind);
        let mut drafts = self.drafts.lock().await;
        drafts.insert(draft.id.clone(), draft.clone());
        draft
    }

    /// Open a draft seeded from a persisted record (edit flow).
    pub async fn open_for_record(
        &self,
        kind: DraftKind,
        record_id: &str,
        fields: serde_json::Map<String, serde_json::Value>,
        primary: Option<&str>,
        secondaries: &[SecondaryImage],
    ) -> Draft {
        let draft = Draft::for_record(kind, record_id, fields, primary, secondaries);
        let mut drafts = self.drafts.lock().await;
        drafts.insert(draft.id.clone(), draft.clone());
        draft
    }

    pub async fn get(&self, draft_id: &str) -> Option<Draft> {
        let drafts = self.drafts.lock().await;
        drafts.get(draft_id).cloned()
    }

    /// Merge a field patch into the draft's form fields.
    pub async fn update_fields(
        &self,
        draft_id: &str,
        patch: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Draft, String> {
        let mut drafts = self.drafts.lock().await;
        let draft = drafts
            .get_mut(draft_id)
            .ok_or_else(|| "Draft not found".to_string())?;
        for (key, value) in patch {
            draft.fields.insert(key, value);
        }
        Ok(draft.clone())
    }

    /// Compress and append a batch of files.
    ///
    /// The whole batch is rejected when it would push the gallery past the
    /// image cap. Individual files are compressed concurrently, keyed by
    /// file identity, and appended in file order; per-file failures (raw
    /// ceiling, unreadable data, decode errors, post-compression size)
    /// become warnings and never abort the rest.
    pub async fn ingest_files(
        &self,
        draft_id: &str,
        files: Vec<FilePayload>,
    ) -> Result<(Draft, IngestReport), String> {
        let mut drafts = self.drafts.lock().await;
        let draft = drafts
            .get_mut(draft_id)
            .ok_or_else(|| "Draft not found".to_string())?;

        if files.len() > draft.gallery.remaining_capacity() {
            return Err(format!(
                "At most {} images per draft",
                MAX_GALLERY_IMAGES
            ));
        }

        let profile = profile_for(draft.kind);
        let outcomes = join_all(files.into_iter().map(|file| {
            let profile = profile;
            async move {
                let outcome = compress_file(&file, &profile).await;
                (file.name, outcome)
            }
        }))
        .await;

        let mut report = IngestReport {
            added: Vec::new(),
            warnings: Vec::new(),
        };
        for (name, outcome) in outcomes {
            match outcome {
                Ok(compressed) => {
                    let asset_id = draft.gallery.add(&name, compressed);
                    report.added.push(asset_id);
                }
                Err(reason) => report.warnings.push(format!("{}: {}", name, reason)),
            }
        }
        Ok((draft.clone(), report))
    }

    pub async fn set_primary(&self, draft_id: &str, asset_id: &str) -> Result<Draft, String> {
        let mut drafts = self.drafts.lock().await;
        let draft = drafts
            .get_mut(draft_id)
            .ok_or_else(|| "Draft not found".to_string())?;
        draft.gallery.set_primary(asset_id);
        Ok(draft.clone())
    }

    pub async fn remove_asset(&self, draft_id: &str, asset_id: &str) -> Result<Draft, String> {
        let mut drafts = self.drafts.lock().await;
        let draft = drafts
            .get_mut(draft_id)
            .ok_or_else(|| "Draft not found".to_string())?;
        draft.gallery.remove(asset_id);
        Ok(draft.clone())
    }

    pub async fn reorder(&self, draft_id: &str, from: usize, to: usize) -> Result<Draft, String> {
        let mut drafts = self.drafts.lock().await;
        let draft = drafts
            .get_mut(draft_id)
            .ok_or_else(|| "Draft not found".to_string())?;
        draft.gallery.reorder(from, to);
        Ok(draft.clone())
    }

    /// Remove and return a draft for submission. Persistence failures after
    /// this point are the caller's to surface; the compressed assets in the
    /// returned draft stay usable for a retry.
    pub async fn take(&self, draft_id: &str) -> Option<Draft> {
        let mut drafts = self.drafts.lock().await;
        drafts.remove(draft_id)
    }

    /// Drop a draft (form reset). Returns whether it existed.
    pub async fn discard(&self, draft_id: &str) -> bool {
        let mut drafts = self.drafts.lock().await;
        drafts.remove(draft_id).is_some()
    }

    /// Put a draft back, e.g. when persistence failed after [`DraftStore::take`].
    pub async fn restore(&self, draft: Draft) {
        let mut drafts = self.drafts.lock().await;
        drafts.insert(draft.id.clone(), draft);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;
    use serde_json::json;

    fn jpeg_payload(name: &str, width: u32, height: u32) -> FilePayload {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut bytes = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, 85);
        encoder
            .encode(img.as_raw(), width, height, image::ColorType::Rgb8)
            .unwrap();
        FilePayload {
            name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            data: STANDARD.encode(&bytes),
        }
    }

    fn oversized_payload(name: &str) -> FilePayload {
        FilePayload {
            name: name.to_string(),
            content_type: "image/jpeg".to_string(),
            data: STANDARD.encode(vec![0u8; 6 * 1024 * 1024]),
        }
    }

    #[tokio::test]
    async fn ingest_appends_in_file_order() {
        let store = DraftStore::new();
        let draft = store.open(DraftKind::Product).await;
        let files = vec![
            jpeg_payload("first.jpg", 64, 48),
            jpeg_payload("second.jpg", 64, 48),
        ];
        let (draft, report) = store.ingest_files(&draft.id, files).await.unwrap();
        assert_eq!(report.added.len(), 2);
        assert!(report.warnings.is_empty());
        let names: Vec<_> = draft
            .gallery
            .assets()
            .iter()
            .map(|a| a.source_name.as_str())
            .collect();
        assert_eq!(names, vec!["first.jpg", "second.jpg"]);
        assert!(draft.gallery.assets()[0].is_primary);
    }

    #[tokio::test]
    async fn oversized_file_is_skipped_with_warning() {
        let store = DraftStore::new();
        let draft = store.open(DraftKind::Product).await;
        let files = vec![jpeg_payload("ok.jpg", 64, 48), oversized_payload("big.jpg")];
        let (draft, report) = store.ingest_files(&draft.id, files).await.unwrap();
        assert_eq!(draft.gallery.len(), 1);
        assert_eq!(report.added.len(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("big.jpg:"));
        assert!(draft.gallery.assets()[0].is_primary);
    }

    #[tokio::test]
    async fn undecodable_file_warns_and_batch_continues() {
        let store = DraftStore::new();
        let draft = store.open(DraftKind::Product).await;
        let files = vec![
            FilePayload {
                name: "broken.jpg".to_string(),
                content_type: "image/jpeg".to_string(),
                data: STANDARD.encode(b"not an image"),
            },
            jpeg_payload("ok.jpg", 64, 48),
        ];
        let (draft, report) = store.ingest_files(&draft.id, files).await.unwrap();
        assert_eq!(draft.gallery.len(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(draft.gallery.assets()[0].source_name, "ok.jpg");
    }

    #[tokio::test]
    async fn batch_past_the_cap_is_rejected() {
        let store = DraftStore::new();
        let draft = store.open(DraftKind::Product).await;
        let files: Vec<_> = (0..6)
            .map(|i| jpeg_payload(&format!("f{}.jpg", i), 32, 24))
            .collect();
        let err = store.ingest_files(&draft.id, files).await.unwrap_err();
        assert!(err.contains("At most 5"));
        let draft = store.get(&draft.id).await.unwrap();
        assert!(draft.gallery.is_empty());
    }

    #[tokio::test]
    async fn gallery_mutations_go_through_the_store() {
        let store = DraftStore::new();
        let draft = store.open(DraftKind::Product).await;
        let files = vec![
            jpeg_payload("a.jpg", 64, 48),
            jpeg_payload("b.jpg", 64, 48),
            jpeg_payload("c.jpg", 64, 48),
        ];
        let (draft, report) = store.ingest_files(&draft.id, files).await.unwrap();
        let c = report.added[2].clone();

        let draft = store.set_primary(&draft.id, &c).await.unwrap();
        assert_eq!(draft.gallery.primary().map(|a| a.id.clone()), Some(c.clone()));

        let draft = store.reorder(&draft.id, 2, 0).await.unwrap();
        assert_eq!(draft.gallery.assets()[0].id, c);

        let draft = store.remove_asset(&draft.id, &c).await.unwrap();
        assert_eq!(draft.gallery.len(), 2);
        assert_eq!(
            draft.gallery.assets().iter().filter(|a| a.is_primary).count(),
            1
        );
    }

    #[tokio::test]
    async fn update_fields_merges_patch() {
        let store = DraftStore::new();
        let draft = store.open(DraftKind::Product).await;
        let patch = json!({"name": "Teapot", "price": 120000})
            .as_object()
            .cloned()
            .unwrap();
        let draft = store.update_fields(&draft.id, patch).await.unwrap();
        assert_eq!(draft.fields["name"], json!("Teapot"));

        let patch = json!({"price": 99000}).as_object().cloned().unwrap();
        let draft = store.update_fields(&draft.id, patch).await.unwrap();
        assert_eq!(draft.fields["price"], json!(99000));
        assert_eq!(draft.fields["name"], json!("Teapot"));
    }

    #[tokio::test]
    async fn product_input_takes_gallery_projection() {
        let store = DraftStore::new();
        let draft = store.open(DraftKind::Product).await;
        let patch = json!({"name": "Teapot", "price": 120000, "category": "ceramics"})
            .as_object()
            .cloned()
            .unwrap();
        store.update_fields(&draft.id, patch).await.unwrap();
        let files = vec![
            jpeg_payload("a.jpg", 64, 48),
            jpeg_payload("b.jpg", 64, 48),
        ];
        let (draft, _) = store.ingest_files(&draft.id, files).await.unwrap();

        let input = draft.product_input().unwrap();
        assert_eq!(input.name, "Teapot");
        assert!(input.image_base64.starts_with("data:image/jpeg;base64,"));
        assert_eq!(input.additional_images.len(), 1);
        assert_eq!(input.additional_images[0].name, "b.jpg");
    }

    #[tokio::test]
    async fn product_input_rejects_missing_name() {
        let store = DraftStore::new();
        let draft = store.open(DraftKind::Product).await;
        let err = draft.product_input().unwrap_err();
        assert!(err.contains("name"));
    }

    #[tokio::test]
    async fn take_removes_and_restore_puts_back() {
        let store = DraftStore::new();
        let draft = store.open(DraftKind::Post).await;
        let taken = store.take(&draft.id).await.unwrap();
        assert!(store.get(&draft.id).await.is_none());
        store.restore(taken).await;
        assert!(store.get(&draft.id).await.is_some());
    }

    #[tokio::test]
    async fn unknown_draft_is_an_error() {
        let store = DraftStore::new();
        let err = store
            .ingest_files("missing", vec![jpeg_payload("a.jpg", 32, 24)])
            .await
            .unwrap_err();
        assert_eq!(err, "Draft not found");
    }
}
