//! Property-Based Tests for Catalog Module
//!
//! Page arithmetic and the paging behavior of the primary store.

use proptest::prelude::*;

use crate::catalog::{
    total_pages, AssetDocument, AssetFilter, CatalogSource, MemoryStore, PageRequest, RecordId,
};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // `total_pages` is the smallest page count covering every record.
    #[test]
    fn prop_total_pages_covers_total(total in 0u64..100_000, page_size in 1u32..=100) {
        let pages = total_pages(total, page_size);
        prop_assert!(pages * page_size as u64 >= total);
        if pages > 0 {
            prop_assert!((pages - 1) * (page_size as u64) < total);
        } else {
            prop_assert_eq!(total, 0);
        }
    }

    // Clamped requests always land in range and skip the preceding pages.
    #[test]
    fn prop_page_request_is_clamped(page in proptest::option::of(0u32..10_000), size in proptest::option::of(0u32..1_000)) {
        let request = PageRequest::new(page, size);
        prop_assert!(request.page() >= 1);
        prop_assert!((1..=100).contains(&request.page_size()));
        prop_assert_eq!(
            request.skip(),
            (request.page() as u64 - 1) * request.page_size() as u64
        );
    }

    // Every page reports the unpaged total; pages past the end are empty
    // with the same metadata.
    #[test]
    fn prop_store_pages_partition_records(
        count in 0usize..80,
        page in 1u32..12,
        page_size in 1u32..25,
    ) {
        let rt = runtime();
        rt.block_on(async {
            let store = MemoryStore::new();
            for _ in 0..count {
                store
                    .insert_asset(AssetDocument {
                        id: RecordId::generate().to_string(),
                        ..Default::default()
                    })
                    .await;
            }

            let request = PageRequest::new(Some(page), Some(page_size));
            let result = store
                .list_assets(&AssetFilter::default(), request)
                .await
                .unwrap();

            let skip = request.skip() as usize;
            let expected = count.saturating_sub(skip).min(page_size as usize);
            prop_assert_eq!(result.total, count as u64);
            prop_assert_eq!(result.items.len(), expected);
            if page as u64 > total_pages(count as u64, page_size) {
                prop_assert!(result.items.is_empty());
            }
            Ok(())
        })?;
    }
}
