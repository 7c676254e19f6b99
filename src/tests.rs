#[cfg(test)]
mod tests {

    mod slug_tests {
        use crate::services::slug::{compute_slug, generate_slug, validate_slug, SlugError};

        #[test]
        fn test_generate_slug_basic() {
            assert_eq!(generate_slug("Pool Cleaning"), "pool-cleaning");
        }

        #[test]
        fn test_generate_slug_special_characters() {
            assert_eq!(generate_slug("Spa & Hot-Tub Covers!"), "spa-hot-tub-covers");
        }

        #[test]
        fn test_generate_slug_unicode() {
            assert_eq!(generate_slug("Piscine Élégante"), "piscine-elegante");
        }

        #[test]
        fn test_generate_slug_clips_long_titles() {
            let slug = generate_slug(&"chlorine ".repeat(60));
            assert!(slug.len() <= 188);
            assert!(!slug.ends_with('-'));
            assert!(validate_slug(&slug));
        }

        #[test]
        fn test_compute_slug_skips_taken_candidates() {
            let taken = ["pool-cleaning", "pool-cleaning-1"];
            let slug = compute_slug("Pool Cleaning", |c| Ok(taken.contains(&c))).unwrap();
            assert_eq!(slug, "pool-cleaning-2");
        }

        #[test]
        fn test_compute_slug_rejects_unusable_titles() {
            let result = compute_slug("!!!", |_| Ok(false));
            assert!(matches!(result, Err(SlugError::Empty(_))));
        }

        #[test]
        fn test_validate_slug() {
            assert!(validate_slug("pool-cleaning-2"));
            assert!(!validate_slug(""));
            assert!(!validate_slug("Pool-Cleaning"));
            assert!(!validate_slug("pool_cleaning"));
            assert!(!validate_slug(&"a".repeat(201)));
        }
    }

    mod model_tests {
        use crate::models::{ContactStatus, ThemeMode, VariantSize};

        #[test]
        fn test_variant_size_round_trip_names() {
            for size in VariantSize::ALL {
                assert_eq!(size.as_str().parse::<VariantSize>(), Ok(size));
            }
            assert!("original".parse::<VariantSize>().is_err());
            assert!("Large".parse::<VariantSize>().is_err());
        }

        #[test]
        fn test_contact_status_parse() {
            assert_eq!("new".parse::<ContactStatus>(), Ok(ContactStatus::New));
            assert_eq!("CONTACTED".parse::<ContactStatus>(), Ok(ContactStatus::Contacted));
            assert!("archived".parse::<ContactStatus>().is_err());
        }

        #[test]
        fn test_theme_mode_display() {
            assert_eq!(ThemeMode::Preset.to_string(), "preset");
            assert_eq!(ThemeMode::Custom.to_string(), "custom");
        }
    }

    /// Media library behaviour against in-memory stores that can be told to fail.
    mod media_library_tests {
        use crate::db::{StoreError, StoreResult};
        use crate::models::{Blob, MediaAsset, NewMediaAsset};
        use crate::services::catalog::{MediaCatalog, MediaRemoval};
        use crate::services::media::{MediaError, MediaLibrary, UploadFile, UploadLimits};
        use crate::services::references::{
            ReferenceCount, ReferenceGate, ReferenceKind, ReferenceReport,
        };
        use crate::services::storage::BlobStore;
        use image::{DynamicImage, ImageFormat, RgbImage};
        use std::collections::BTreeMap;
        use std::io::Cursor;
        use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
        use std::sync::{Arc, Mutex};

        fn failure(what: &str) -> StoreError {
            StoreError::Unavailable(what.to_string())
        }

        #[derive(Default)]
        struct MemoryBlobs {
            blobs: Mutex<BTreeMap<i64, Vec<u8>>>,
            next_id: AtomicUsize,
            /// Number of puts that succeed before every further put fails.
            puts_before_failure: Option<usize>,
            fail_delete_of: Mutex<Vec<i64>>,
        }

        impl MemoryBlobs {
            fn failing_after(puts: usize) -> Self {
                Self {
                    puts_before_failure: Some(puts),
                    ..Default::default()
                }
            }

            fn len(&self) -> usize {
                self.blobs.lock().unwrap().len()
            }

            fn refuse_delete(&self, id: i64) {
                self.fail_delete_of.lock().unwrap().push(id);
            }
        }

        impl BlobStore for MemoryBlobs {
            fn put(&self, data: &[u8], _content_type: &str) -> StoreResult<i64> {
                let n = self.next_id.fetch_add(1, Ordering::SeqCst);
                if self.puts_before_failure.is_some_and(|max| n >= max) {
                    return Err(failure("blob put"));
                }
                let id = n as i64 + 1;
                self.blobs.lock().unwrap().insert(id, data.to_vec());
                Ok(id)
            }

            fn get(&self, id: i64) -> StoreResult<Option<Blob>> {
                Ok(self.blobs.lock().unwrap().get(&id).map(|data| Blob {
                    id,
                    data: data.clone(),
                    content_type: "image/jpeg".to_string(),
                    created_at: String::new(),
                }))
            }

            fn delete(&self, id: i64) -> StoreResult<bool> {
                if self.fail_delete_of.lock().unwrap().contains(&id) {
                    return Err(failure("blob delete"));
                }
                Ok(self.blobs.lock().unwrap().remove(&id).is_some())
            }
        }

        #[derive(Default)]
        struct MemoryCatalog {
            records: Mutex<BTreeMap<i64, MediaAsset>>,
            blobs: Arc<MemoryBlobs>,
            /// Product references reported for every media id.
            references: u64,
            fail_insert: AtomicBool,
            fail_remove: AtomicBool,
        }

        impl MediaCatalog for MemoryCatalog {
            fn insert(&self, asset: &NewMediaAsset) -> StoreResult<MediaAsset> {
                if self.fail_insert.load(Ordering::SeqCst) {
                    return Err(failure("catalog insert"));
                }
                let mut records = self.records.lock().unwrap();
                let id = records.keys().last().copied().unwrap_or(0) + 1;
                let media = MediaAsset {
                    id,
                    filename: asset.filename.clone(),
                    original_name: asset.original_name.clone(),
                    mime_type: asset.mime_type.clone(),
                    title: String::new(),
                    alt_text: String::new(),
                    sizes: asset.sizes,
                    created_at: chrono::Utc::now().to_rfc3339(),
                };
                records.insert(id, media.clone());
                Ok(media)
            }

            fn get(&self, id: i64) -> StoreResult<Option<MediaAsset>> {
                Ok(self.records.lock().unwrap().get(&id).cloned())
            }

            fn list(&self, limit: usize, offset: usize) -> StoreResult<Vec<MediaAsset>> {
                Ok(self
                    .records
                    .lock()
                    .unwrap()
                    .values()
                    .rev()
                    .skip(offset)
                    .take(limit)
                    .cloned()
                    .collect())
            }

            fn count(&self) -> StoreResult<i64> {
                Ok(self.records.lock().unwrap().len() as i64)
            }

            fn update_details(&self, id: i64, title: &str, alt_text: &str) -> StoreResult<bool> {
                let mut records = self.records.lock().unwrap();
                match records.get_mut(&id) {
                    Some(media) => {
                        media.title = title.to_string();
                        media.alt_text = alt_text.to_string();
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }

            fn references(&self, _id: i64) -> StoreResult<ReferenceReport> {
                let mut report = ReferenceReport::default();
                if self.references > 0 {
                    report.references.push(ReferenceCount {
                        kind: ReferenceKind::Product,
                        count: self.references,
                    });
                }
                Ok(report)
            }

            fn begin_removal(&self) -> StoreResult<Box<dyn MediaRemoval + '_>> {
                Ok(Box::new(MemoryRemoval {
                    catalog: self,
                    blobs: Vec::new(),
                    record: None,
                }))
            }
        }

        /// Buffers deletes until commit, like the SQLite transaction.
        struct MemoryRemoval<'a> {
            catalog: &'a MemoryCatalog,
            blobs: Vec<i64>,
            record: Option<i64>,
        }

        impl MediaRemoval for MemoryRemoval<'_> {
            fn references(&mut self, media_id: i64) -> StoreResult<ReferenceReport> {
                self.catalog.references(media_id)
            }

            fn delete_blob(&mut self, blob_id: i64) -> StoreResult<bool> {
                let blobs = &self.catalog.blobs;
                if blobs.fail_delete_of.lock().unwrap().contains(&blob_id) {
                    return Err(failure("blob delete"));
                }
                let exists = blobs.blobs.lock().unwrap().contains_key(&blob_id);
                if exists {
                    self.blobs.push(blob_id);
                }
                Ok(exists)
            }

            fn remove_record(&mut self, media_id: i64) -> StoreResult<bool> {
                if self.catalog.fail_remove.load(Ordering::SeqCst) {
                    return Err(failure("catalog remove"));
                }
                let exists = self.catalog.records.lock().unwrap().contains_key(&media_id);
                if exists {
                    self.record = Some(media_id);
                }
                Ok(exists)
            }

            fn commit(self: Box<Self>) -> StoreResult<()> {
                let mut blobs = self.catalog.blobs.blobs.lock().unwrap();
                for id in &self.blobs {
                    blobs.remove(id);
                }
                if let Some(id) = self.record {
                    self.catalog.records.lock().unwrap().remove(&id);
                }
                Ok(())
            }
        }

        struct Harness {
            blobs: Arc<MemoryBlobs>,
            catalog: Arc<MemoryCatalog>,
            library: MediaLibrary,
        }

        fn harness_with(blobs: MemoryBlobs, references: u64, limits: UploadLimits) -> Harness {
            let blobs = Arc::new(blobs);
            let catalog = Arc::new(MemoryCatalog {
                blobs: blobs.clone(),
                references,
                ..Default::default()
            });
            let library = MediaLibrary::new(
                blobs.clone(),
                catalog.clone(),
                ReferenceGate::new(),
                limits,
            );
            Harness {
                blobs,
                catalog,
                library,
            }
        }

        fn harness() -> Harness {
            harness_with(MemoryBlobs::default(), 0, UploadLimits::default())
        }

        fn png_upload(name: &str, width: u32, height: u32) -> UploadFile {
            let img = RgbImage::from_fn(width, height, |x, y| {
                image::Rgb([(x * 7 % 256) as u8, (y * 3 % 256) as u8, 90])
            });
            let mut buf = Cursor::new(Vec::new());
            DynamicImage::ImageRgb8(img)
                .write_to(&mut buf, ImageFormat::Png)
                .unwrap();
            UploadFile {
                original_name: name.to_string(),
                mime_type: "image/png".to_string(),
                data: buf.into_inner(),
            }
        }

        #[test]
        fn test_ingest_stores_three_blobs_and_one_record() {
            let h = harness();
            let media = h.library.ingest(&png_upload("deck.png", 1200, 600)).unwrap();

            assert_eq!(h.blobs.len(), 3);
            assert_eq!(h.catalog.count().unwrap(), 1);
            assert!(media.filename.ends_with(".jpg"));
            assert_eq!(media.original_name, "deck.png");
            assert_eq!((media.sizes.large.width, media.sizes.large.height), (1200, 600));
            assert_eq!((media.sizes.medium.width, media.sizes.medium.height), (900, 450));
            assert_eq!((media.sizes.thumb.width, media.sizes.thumb.height), (400, 200));

            let ids = media.sizes.storage_ids();
            assert!(ids[0] != ids[1] && ids[1] != ids[2] && ids[0] != ids[2]);
        }

        #[test]
        fn test_failed_blob_write_removes_earlier_blobs() {
            let h = harness_with(MemoryBlobs::failing_after(2), 0, UploadLimits::default());

            let err = h.library.ingest(&png_upload("deck.png", 800, 600)).unwrap_err();
            match err {
                MediaError::StorageWrite { leaked_blobs, .. } => assert!(leaked_blobs.is_empty()),
                other => panic!("unexpected error: {other:?}"),
            }
            assert_eq!(h.blobs.len(), 0);
            assert_eq!(h.catalog.count().unwrap(), 0);
        }

        #[test]
        fn test_failed_catalog_insert_reports_unremovable_blobs() {
            let h = harness();
            h.catalog.fail_insert.store(true, Ordering::SeqCst);
            h.blobs.refuse_delete(2);

            let err = h.library.ingest(&png_upload("deck.png", 800, 600)).unwrap_err();
            match err {
                MediaError::StorageWrite { leaked_blobs, .. } => assert_eq!(leaked_blobs, vec![2]),
                other => panic!("unexpected error: {other:?}"),
            }
            assert_eq!(h.blobs.len(), 1);
        }

        #[test]
        fn test_rejects_before_decoding() {
            let limits = UploadLimits {
                max_file_bytes: 64,
                max_batch_files: 20,
            };
            let h = harness_with(MemoryBlobs::default(), 0, limits);

            let mut text = png_upload("notes.txt", 10, 10);
            text.mime_type = "text/plain".to_string();
            assert!(matches!(
                h.library.ingest(&text),
                Err(MediaError::UnsupportedType(_))
            ));

            let big = png_upload("big.png", 200, 200);
            assert!(matches!(
                h.library.ingest(&big),
                Err(MediaError::PayloadTooLarge { max: 64, .. })
            ));
            assert_eq!(h.blobs.len(), 0);
        }

        #[test]
        fn test_undecodable_upload_writes_nothing() {
            let h = harness();
            let file = UploadFile {
                original_name: "broken.jpg".to_string(),
                mime_type: "image/jpeg".to_string(),
                data: b"definitely not a jpeg".to_vec(),
            };
            assert!(matches!(h.library.ingest(&file), Err(MediaError::Decode(_))));
            assert_eq!(h.blobs.len(), 0);
        }

        #[test]
        fn test_batch_reports_each_failure() {
            let h = harness();
            let mut files: Vec<UploadFile> = (0..4)
                .map(|i| png_upload(&format!("photo-{i}.png"), 300, 200))
                .collect();
            files.insert(
                1,
                UploadFile {
                    original_name: "corrupt.png".to_string(),
                    mime_type: "image/png".to_string(),
                    data: vec![0x89, b'P', b'N', b'G', 0, 0, 0],
                },
            );

            let report = h.library.ingest_batch(&files).unwrap();
            assert_eq!(report.uploaded.len(), 4);
            assert_eq!(report.skipped(), 1);
            assert_eq!(report.failed[0].original_name, "corrupt.png");
            assert_eq!(report.failed[0].kind, "decode");
        }

        #[test]
        fn test_batch_limits() {
            let h = harness();
            assert!(matches!(h.library.ingest_batch(&[]), Err(MediaError::EmptyBatch)));

            let files = vec![png_upload("a.png", 4, 4); 21];
            assert!(matches!(
                h.library.ingest_batch(&files),
                Err(MediaError::TooManyFiles { count: 21, max: 20 })
            ));
            assert_eq!(h.blobs.len(), 0);
        }

        #[test]
        fn test_open_variant() {
            let h = harness();
            let media = h.library.ingest(&png_upload("deck.png", 500, 500)).unwrap();

            let thumb = h.library.open_variant(media.id, "thumb").unwrap();
            assert_eq!(thumb.id, media.sizes.thumb.storage_id);
            assert_eq!(thumb.data.len() as u64, media.sizes.thumb.bytes);

            assert!(matches!(
                h.library.open_variant(media.id, "original"),
                Err(MediaError::NotFound)
            ));
            assert!(matches!(
                h.library.open_variant(media.id + 1, "thumb"),
                Err(MediaError::NotFound)
            ));
        }

        #[test]
        fn test_update_details_trims_and_reports_missing() {
            let h = harness();
            let media = h.library.ingest(&png_upload("deck.png", 50, 50)).unwrap();

            let updated = h
                .library
                .update_details(media.id, "  New deck  ", " Cedar deck at dusk ")
                .unwrap();
            assert_eq!(updated.title, "New deck");
            assert_eq!(updated.alt_text, "Cedar deck at dusk");
            assert_eq!(updated.sizes, media.sizes);

            assert!(matches!(
                h.library.update_details(999, "x", "y"),
                Err(MediaError::NotFound)
            ));
        }

        #[test]
        fn test_delete_referenced_media_is_refused() {
            let h = harness_with(MemoryBlobs::default(), 2, UploadLimits::default());
            let media = h.library.ingest(&png_upload("deck.png", 50, 50)).unwrap();

            match h.library.delete(media.id) {
                Err(MediaError::Referenced(report)) => {
                    assert_eq!(report.total(), 2);
                    assert_eq!(report.to_string(), "products (2)");
                }
                other => panic!("unexpected result: {other:?}"),
            }
            assert_eq!(h.blobs.len(), 3);
            assert!(h.library.get(media.id).is_ok());
        }

        #[test]
        fn test_delete_removes_blobs_then_record() {
            let h = harness();
            let media = h.library.ingest(&png_upload("deck.png", 50, 50)).unwrap();

            h.library.delete(media.id).unwrap();
            assert_eq!(h.blobs.len(), 0);
            assert!(matches!(h.library.get(media.id), Err(MediaError::NotFound)));
            assert!(matches!(h.library.delete(media.id), Err(MediaError::NotFound)));
        }

        #[test]
        fn test_failed_blob_delete_rolls_back() {
            let h = harness();
            let media = h.library.ingest(&png_upload("deck.png", 50, 50)).unwrap();
            h.blobs.refuse_delete(media.sizes.medium.storage_id);

            match h.library.delete(media.id) {
                Err(MediaError::StorageDelete { removed, .. }) => assert_eq!(removed, 1),
                other => panic!("unexpected result: {other:?}"),
            }
            assert_eq!(h.blobs.len(), 3);
            assert!(h.library.get(media.id).is_ok());
        }

        #[test]
        fn test_failed_record_removal_keeps_blobs() {
            let h = harness();
            let media = h.library.ingest(&png_upload("deck.png", 50, 50)).unwrap();
            h.catalog.fail_remove.store(true, Ordering::SeqCst);

            match h.library.delete(media.id) {
                Err(MediaError::StorageDelete { removed, .. }) => assert_eq!(removed, 3),
                other => panic!("unexpected result: {other:?}"),
            }
            assert_eq!(h.blobs.len(), 3);
            let thumb = h.library.open_variant(media.id, "thumb").unwrap();
            assert_eq!(thumb.id, media.sizes.thumb.storage_id);
        }
    }
}
