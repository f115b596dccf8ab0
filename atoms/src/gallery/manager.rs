use serde::Serialize;

use super::model::{GalleryProjection, ImageAsset, SecondaryImage};
use crate::imaging::model::BASE64_BINARY_RATIO;
use crate::imaging::CompressedImage;

/// Cap on images per draft, counting the primary.
pub const MAX_GALLERY_IMAGES: usize = 5;

/// Ordered image collection for one product or post draft.
///
/// A non-empty gallery holds exactly one primary asset. The first asset
/// added to an empty gallery becomes primary; removing the primary promotes
/// the first remaining asset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DraftGallery {
    assets: Vec<ImageAsset>,
}

impl DraftGallery {
    pub fn new() -> Self {
        Self { assets: Vec::new() }
    }

    /// Rebuild a gallery from a persisted record for the edit flow: the
    /// stored primary comes first, then the stored secondaries in order.
    pub fn from_record(primary: Option<&str>, secondaries: &[SecondaryImage]) -> Self {
        let mut gallery = Self::new();
        if let Some(data) = primary.filter(|d| !d.is_empty()) {
            gallery.assets.push(ImageAsset {
                id: uuid::Uuid::new_v4().to_string(),
                source_name: "image-1".to_string(),
                encoded_data: data.to_string(),
                size_estimate_bytes: (data.len() as f64 * BASE64_BINARY_RATIO) as u64,
                is_primary: true,
            });
        }
        for (i, secondary) in secondaries.iter().enumerate() {
            if secondary.base64.is_empty() {
                continue;
            }
            let source_name = if secondary.name.is_empty() {
                format!("image-{}", i + 2)
            } else {
                secondary.name.clone()
            };
            gallery.assets.push(ImageAsset {
                id: uuid::Uuid::new_v4().to_string(),
                source_name,
                encoded_data: secondary.base64.clone(),
                size_estimate_bytes: (secondary.base64.len() as f64 * BASE64_BINARY_RATIO) as u64,
                is_primary: gallery.assets.is_empty(),
            });
        }
        gallery
    }

    pub fn assets(&self) -> &[ImageAsset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn remaining_capacity(&self) -> usize {
        MAX_GALLERY_IMAGES.saturating_sub(self.assets.len())
    }

    /// Append one compressed image. The first asset added to an empty
    /// gallery becomes primary. Returns the new asset's id.
    pub fn add(&mut self, source_name: &str, compressed: CompressedImage) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.assets.push(ImageAsset {
            id: id.clone(),
            source_name: source_name.to_string(),
            encoded_data: compressed.encoded_data,
            size_estimate_bytes: compressed.size_estimate_bytes,
            is_primary: self.assets.is_empty(),
        });
        id
    }

    /// Make exactly the target primary. Unknown ids are a no-op.
    pub fn set_primary(&mut self, asset_id: &str) {
        if !self.assets.iter().any(|a| a.id == asset_id) {
            return;
        }
        for asset in &mut self.assets {
            asset.is_primary = asset.id == asset_id;
        }
    }

    /// Remove an asset. If it was primary and assets remain, the first
    /// remaining asset in order is promoted. Unknown ids are a no-op.
    pub fn remove(&mut self, asset_id: &str) {
        let Some(pos) = self.assets.iter().position(|a| a.id == asset_id) else {
            return;
        };
        let removed = self.assets.remove(pos);
        if removed.is_primary {
            if let Some(first) = self.assets.first_mut() {
                first.is_primary = true;
            }
        }
    }

    /// Move an asset to a new position without touching primary flags.
    /// Out-of-range indexes are a no-op.
    pub fn reorder(&mut self, from: usize, to: usize) {
        if from >= self.assets.len() || to >= self.assets.len() || from == to {
            return;
        }
        let asset = self.assets.remove(from);
        self.assets.insert(to, asset);
    }

    pub fn primary(&self) -> Option<&ImageAsset> {
        self.assets.iter().find(|a| a.is_primary)
    }

    /// Derived preview for the form header; `None` once the gallery empties.
    pub fn preview(&self) -> Option<&str> {
        self.primary().map(|a| a.encoded_data.as_str())
    }

    /// Projection persisted on records: the primary's payload first, then
    /// non-primary `{base64, name}` pairs in gallery order.
    pub fn projection(&self) -> Option<GalleryProjection> {
        let primary = self.primary()?;
        let secondary_images = self
            .assets
            .iter()
            .filter(|a| !a.is_primary)
            .map(|a| SecondaryImage {
                base64: a.encoded_data.clone(),
                name: a.source_name.clone(),
            })
            .collect();
        Some(GalleryProjection {
            primary_encoded_data: primary.encoded_data.clone(),
            secondary_images,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compressed(data: &str) -> CompressedImage {
        CompressedImage {
            encoded_data: data.to_string(),
            width: 1,
            height: 1,
            quality: 80,
            size_estimate_bytes: (data.len() as f64 * BASE64_BINARY_RATIO) as u64,
        }
    }

    fn primary_count(gallery: &DraftGallery) -> usize {
        gallery.assets().iter().filter(|a| a.is_primary).count()
    }

    #[test]
    fn first_added_asset_becomes_primary() {
        let mut gallery = DraftGallery::new();
        gallery.add("a.jpg", compressed("data-a"));
        gallery.add("b.jpg", compressed("data-b"));
        assert_eq!(primary_count(&gallery), 1);
        assert_eq!(gallery.primary().map(|a| a.source_name.as_str()), Some("a.jpg"));
    }

    #[test]
    fn set_primary_moves_the_flag() {
        let mut gallery = DraftGallery::new();
        gallery.add("a.jpg", compressed("data-a"));
        gallery.add("b.jpg", compressed("data-b"));
        let c = gallery.add("c.jpg", compressed("data-c"));
        gallery.set_primary(&c);
        assert_eq!(primary_count(&gallery), 1);
        assert_eq!(gallery.primary().map(|a| a.id.clone()), Some(c));
        // Order is untouched.
        let names: Vec<_> = gallery.assets().iter().map(|a| a.source_name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn set_primary_with_unknown_id_is_a_noop() {
        let mut gallery = DraftGallery::new();
        let a = gallery.add("a.jpg", compressed("data-a"));
        gallery.set_primary("missing");
        assert_eq!(gallery.primary().map(|x| x.id.clone()), Some(a));
    }

    #[test]
    fn removing_primary_promotes_first_remaining() {
        let mut gallery = DraftGallery::new();
        let a = gallery.add("a.jpg", compressed("data-a"));
        gallery.add("b.jpg", compressed("data-b"));
        gallery.add("c.jpg", compressed("data-c"));
        gallery.remove(&a);
        assert_eq!(primary_count(&gallery), 1);
        assert_eq!(gallery.primary().map(|x| x.source_name.clone()), Some("b.jpg".to_string()));
    }

    #[test]
    fn removing_non_primary_keeps_primary() {
        let mut gallery = DraftGallery::new();
        let a = gallery.add("a.jpg", compressed("data-a"));
        let b = gallery.add("b.jpg", compressed("data-b"));
        gallery.remove(&b);
        assert_eq!(gallery.primary().map(|x| x.id.clone()), Some(a));
        assert_eq!(gallery.len(), 1);
    }

    #[test]
    fn removing_last_asset_clears_preview() {
        let mut gallery = DraftGallery::new();
        let a = gallery.add("a.jpg", compressed("data-a"));
        gallery.remove(&a);
        assert!(gallery.is_empty());
        assert_eq!(gallery.preview(), None);
        assert!(gallery.projection().is_none());
    }

    #[test]
    fn reorder_preserves_primary_flags() {
        let mut gallery = DraftGallery::new();
        gallery.add("a.jpg", compressed("data-a"));
        gallery.add("b.jpg", compressed("data-b"));
        gallery.add("c.jpg", compressed("data-c"));
        gallery.reorder(0, 2);
        let names: Vec<_> = gallery.assets().iter().map(|a| a.source_name.as_str()).collect();
        assert_eq!(names, vec!["b.jpg", "c.jpg", "a.jpg"]);
        assert_eq!(primary_count(&gallery), 1);
        assert_eq!(gallery.primary().map(|x| x.source_name.clone()), Some("a.jpg".to_string()));
    }

    #[test]
    fn reorder_out_of_range_is_a_noop() {
        let mut gallery = DraftGallery::new();
        gallery.add("a.jpg", compressed("data-a"));
        gallery.reorder(0, 5);
        gallery.reorder(3, 0);
        assert_eq!(gallery.len(), 1);
    }

    #[test]
    fn projection_normalizes_primary_to_first() {
        let mut gallery = DraftGallery::new();
        gallery.add("a.jpg", compressed("data-a"));
        gallery.add("b.jpg", compressed("data-b"));
        let c = gallery.add("c.jpg", compressed("data-c"));
        gallery.set_primary(&c);

        let projection = gallery.projection().unwrap();
        assert_eq!(projection.primary_encoded_data, "data-c");
        let secondaries: Vec<_> = projection
            .secondary_images
            .iter()
            .map(|s| s.base64.as_str())
            .collect();
        assert_eq!(secondaries, vec!["data-a", "data-b"]);
    }

    #[test]
    fn invariant_holds_across_mixed_operations() {
        let mut gallery = DraftGallery::new();
        let a = gallery.add("a.jpg", compressed("data-a"));
        let b = gallery.add("b.jpg", compressed("data-b"));
        let c = gallery.add("c.jpg", compressed("data-c"));
        for step in 0..4 {
            match step {
                0 => gallery.set_primary(&b),
                1 => gallery.reorder(2, 0),
                2 => gallery.remove(&b),
                _ => gallery.set_primary(&c),
            }
            assert_eq!(primary_count(&gallery), 1, "after step {}", step);
        }
        let _ = a;
    }

    #[test]
    fn from_record_seeds_primary_first() {
        let secondaries = vec![
            SecondaryImage { base64: "data-b".to_string(), name: "b.jpg".to_string() },
            SecondaryImage { base64: "data-c".to_string(), name: String::new() },
        ];
        let gallery = DraftGallery::from_record(Some("data-a"), &secondaries);
        assert_eq!(gallery.len(), 3);
        assert_eq!(gallery.preview(), Some("data-a"));
        assert_eq!(gallery.assets()[2].source_name, "image-3");
    }

    #[test]
    fn from_record_skips_empty_payloads() {
        let secondaries = vec![SecondaryImage { base64: String::new(), name: "x".to_string() }];
        let gallery = DraftGallery::from_record(None, &secondaries);
        assert!(gallery.is_empty());
    }
}
