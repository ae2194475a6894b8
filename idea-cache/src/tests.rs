#[cfg(test)]
mod tests {
    use crate::{normalize_keyword, CacheStore};
    use scout_core::{CacheError, CoreError, IdeaRecord, IdeaUnit, KeywordCacheEntry};
    use serde_json::json;
    use std::env;

    fn setup_test_store() -> CacheStore {
        let dir = env::temp_dir().join(format!("test_idea_cache_{}", uuid::Uuid::new_v4()));
        CacheStore::new(dir)
    }

    fn record(value: serde_json::Value) -> IdeaRecord {
        serde_json::from_value(value).expect("test record should deserialize")
    }

    #[test]
    fn test_keyword_normalization() {
        assert_eq!(normalize_keyword("Invoicing"), "invoicing");
        assert_eq!(normalize_keyword("pet care/grooming"), "pet_care_grooming");
        assert_eq!(normalize_keyword("AI  tools!"), "ai__tools_");
    }

    #[test]
    fn test_file_naming() {
        let store = CacheStore::new("/cache");
        assert!(store
            .identifier_path("Pet Care")
            .ends_with("keyword_id_pet_care.json"));
        assert!(store.record_path("Pet Care").ends_with("ideas_pet_care.json"));
        assert!(store
            .output_path("Pet Care", 25)
            .ends_with("deep_pet_care_25.json"));
        assert!(store.scored_path("Pet Care").ends_with("deepseek_pet_care.json"));
    }

    #[tokio::test]
    async fn test_missing_keyword_loads_none() {
        let store = setup_test_store();
        assert_eq!(store.load("invoicing").await.unwrap(), None);
        assert!(store.load_entry("invoicing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_identifier_round_trip() {
        let store = setup_test_store();
        store
            .save("invoicing", &json!({"id": "abc123"}))
            .await
            .expect("Failed to save identifier");

        assert_eq!(
            store.load("invoicing").await.unwrap(),
            Some("abc123".to_string())
        );
        assert_eq!(
            store.load_entry("Invoicing").await.unwrap(),
            Some(KeywordCacheEntry::Identifier {
                id: "abc123".to_string()
            })
        );

        let raw = std::fs::read_to_string(store.identifier_path("invoicing")).unwrap();
        assert!(raw.contains("\n"), "cache files are pretty-printed");
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_entries() {
        let store = setup_test_store();

        let not_a_mapping = store.save("invoicing", &json!(["abc123"])).await;
        assert!(matches!(
            not_a_mapping,
            Err(CoreError::Cache(CacheError::InvalidEntry { .. }))
        ));

        let missing_id = store.save("invoicing", &json!({"niche": "invoicing"})).await;
        assert!(matches!(
            missing_id,
            Err(CoreError::Cache(CacheError::InvalidEntry { .. }))
        ));

        // Nothing was written
        assert!(!store.identifier_path("invoicing").exists());
    }

    #[tokio::test]
    async fn test_full_record_supersedes_identifier() {
        let store = setup_test_store();
        store.save_identifier("invoicing", "abc123").await.unwrap();

        let full = record(json!({"id": "def456", "niche": "invoicing", "ideas": "{}"}));
        store.save_record("invoicing", &full).await.unwrap();

        assert_eq!(
            store.load("invoicing").await.unwrap(),
            Some("def456".to_string())
        );
        assert_eq!(
            store.load_entry("invoicing").await.unwrap(),
            Some(KeywordCacheEntry::Record(full))
        );
    }

    #[tokio::test]
    async fn test_record_without_id_falls_back_to_identifier() {
        let store = setup_test_store();
        store.save_identifier("invoicing", "abc123").await.unwrap();
        // An empty upstream answer is still persisted as-is
        store
            .save_record("invoicing", &IdeaRecord::empty())
            .await
            .unwrap();

        assert_eq!(
            store.load("invoicing").await.unwrap(),
            Some("abc123".to_string())
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let store = setup_test_store();
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.identifier_path("invoicing"), "{not json").unwrap();

        let result = store.load("invoicing").await;
        assert!(matches!(
            result,
            Err(CoreError::Cache(CacheError::Corrupt { .. }))
        ));
    }

    #[tokio::test]
    async fn test_output_round_trip() {
        let store = setup_test_store();
        let ideas = vec![
            IdeaUnit::new("InvoiceBot", "Automates invoices"),
            IdeaUnit::new("TaxHelper", "Tracks tax deadlines"),
        ];
        store.save_output("invoicing", 2, &ideas).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.output_path("invoicing", 2)).unwrap())
                .unwrap();
        assert_eq!(
            raw,
            json!([
                {"InvoiceBot": "Automates invoices"},
                {"TaxHelper": "Tracks tax deadlines"}
            ])
        );

        assert_eq!(store.load_output("invoicing", 2).await.unwrap(), Some(ideas));
        assert_eq!(store.load_output("invoicing", 3).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_cached_keywords() {
        let store = setup_test_store();
        assert!(store.list_cached_keywords().await.unwrap().is_empty());

        store.save_identifier("pet care", "a").await.unwrap();
        store
            .save_record("pet care", &record(json!({"id": "a"})))
            .await
            .unwrap();
        store.save_identifier("invoicing", "b").await.unwrap();
        store.save_output("invoicing", 5, &[]).await.unwrap();
        store.save_scored("invoicing", &[]).await.unwrap();

        assert_eq!(
            store.list_cached_keywords().await.unwrap(),
            vec!["invoicing".to_string(), "pet care".to_string()]
        );
    }
}
