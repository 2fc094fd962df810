//! # Translation Tag Tests
//!
//! Covers the create/merge policy, listing filters, deletion and review of
//! tags attached to whole verse translations.

mod common;

use crate::common::{setup_tracing, translation_payload};
use serde_json::json;
use versetag::{tagging::translation::ENTRIES_KEY, TagError, TagFilters};
use versetag_test_utils::TestSetup;

/// A database with verses 1.1.1, 1.1.2, 1.2.1 and 2.1.1 plus root tags
/// `devotion` and `knowledge`.
async fn seeded() -> TestSetup {
    setup_tracing();
    let setup = TestSetup::new().await.unwrap();
    for (canto, chapter, verse) in [(1, 1, 1), (1, 1, 2), (1, 2, 1), (2, 1, 1)] {
        setup.add_verse(canto, chapter, verse, None).await.unwrap();
    }
    setup.add_root_tag("devotion", true).await.unwrap();
    setup.add_root_tag("knowledge", true).await.unwrap();
    setup
}

#[tokio::test]
async fn test_batch_with_repeated_tag_merges_into_one_row() {
    let setup = seeded().await;
    let service = setup.translation_tags();
    let tagger = setup.tagger("tagger@example.com").await.unwrap();

    let payload = translation_payload(
        "1.1.1",
        json!([{"tag": "devotion"}, {"tag": "devotion", "tagger_remark": "dup note"}]),
    );
    let created = service.create(&tagger, &payload).await.unwrap();

    assert_eq!(created.len(), 2);
    assert_eq!(created[0].id, created[1].id);
    assert_eq!(created[1].tagger_remark.as_deref(), Some("dup note"));

    let all = service.list(&TagFilters::default()).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].tag_name, "devotion");
    assert_eq!(all[0].tagger_remark.as_deref(), Some("dup note"));
    assert_eq!(all[0].tagger.as_deref(), Some(tagger.id.as_str()));
    assert_eq!(all[0].verse.verse_id, "1.1.1");
    assert_eq!(all[0].reviewer, None);
}

#[tokio::test]
async fn test_second_request_with_remark_updates_existing_row() {
    let setup = seeded().await;
    let service = setup.translation_tags();
    let tagger = setup.tagger("tagger@example.com").await.unwrap();

    let first = service
        .create(&tagger, &translation_payload("1.1.1", json!([{"tag": "devotion"}])))
        .await
        .unwrap();
    let second = service
        .create(
            &tagger,
            &translation_payload(
                "1.1.1",
                json!([{"tag": "devotion", "tagger_remark": "dup note"}]),
            ),
        )
        .await
        .unwrap();

    assert_eq!(first[0].id, second[0].id);
    let stored = service.get(first[0].id).await.unwrap().unwrap();
    assert_eq!(stored.tagger_remark.as_deref(), Some("dup note"));
    assert_eq!(service.list(&TagFilters::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_second_request_without_remark_fails_and_keeps_one_row() {
    let setup = seeded().await;
    let service = setup.translation_tags();
    let tagger = setup.tagger("tagger@example.com").await.unwrap();
    let payload = translation_payload("1.1.1", json!([{"tag": "devotion"}]));

    service.create(&tagger, &payload).await.unwrap();
    let result = service.create(&tagger, &payload).await;

    match result {
        Err(TagError::Validation(message)) => assert_eq!(message, "DB Integrity error"),
        other => panic!("expected a validation error, got {other:?}"),
    }
    assert_eq!(service.list(&TagFilters::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_entry_rolls_back_the_whole_batch() {
    let setup = seeded().await;
    let service = setup.translation_tags();
    let tagger = setup.tagger("tagger@example.com").await.unwrap();

    let payload = translation_payload(
        "1.1.1",
        json!([{"tag": "devotion"}, {"tag": "no-such-tag"}]),
    );
    let result = service.create(&tagger, &payload).await;

    assert!(matches!(result, Err(TagError::Validation(_))));
    assert!(service.list(&TagFilters::default()).await.unwrap().is_empty());

    // The connection is usable again after the rollback.
    let ok = service
        .create(&tagger, &translation_payload("1.1.1", json!([{"tag": "devotion"}])))
        .await
        .unwrap();
    assert_eq!(ok.len(), 1);
}

#[tokio::test]
async fn test_unknown_verse_is_a_validation_error() {
    let setup = seeded().await;
    let service = setup.translation_tags();
    let tagger = setup.tagger("tagger@example.com").await.unwrap();

    let result = service
        .create(&tagger, &translation_payload("9.9.9", json!([{"tag": "devotion"}])))
        .await;
    assert!(matches!(result, Err(TagError::Validation(_))));
}

#[tokio::test]
async fn test_malformed_payload_is_rejected_with_field_errors() {
    let setup = seeded().await;
    let service = setup.translation_tags();
    let tagger = setup.tagger("tagger@example.com").await.unwrap();

    // The verse does not exist either; structural validation wins.
    let payload = translation_payload("9.9.9", json!([{"tagger_remark": "no tag"}]));
    match service.create(&tagger, &payload).await {
        Err(TagError::BadRequestData(errors)) => {
            assert!(errors.contains_key(&format!("{ENTRIES_KEY}.0.tag")));
        }
        other => panic!("expected BadRequestData, got {other:?}"),
    }

    let missing_verse = json!({ "translationtags": [] });
    assert!(matches!(
        service.create(&tagger, &missing_verse).await,
        Err(TagError::BadRequestData(_))
    ));
}

#[tokio::test]
async fn test_empty_batch_creates_nothing() {
    let setup = seeded().await;
    let service = setup.translation_tags();
    let tagger = setup.tagger("tagger@example.com").await.unwrap();

    let created = service
        .create(&tagger, &translation_payload("1.1.1", json!([])))
        .await
        .unwrap();
    assert!(created.is_empty());
}

#[tokio::test]
async fn test_empty_batch_skips_verse_lookup() {
    let setup = seeded().await;
    let service = setup.translation_tags();
    let tagger = setup.tagger("tagger@example.com").await.unwrap();

    let created = service
        .create(&tagger, &translation_payload("9.9.9", json!([])))
        .await
        .unwrap();
    assert!(created.is_empty());
}

#[tokio::test]
async fn test_list_applies_only_supplied_filters() {
    let setup = seeded().await;
    let service = setup.translation_tags();
    let tagger = setup.tagger("tagger@example.com").await.unwrap();

    for verse_id in ["1.1.1", "1.1.2", "1.2.1", "2.1.1"] {
        service
            .create(
                &tagger,
                &translation_payload(verse_id, json!([{"tag": "devotion"}, {"tag": "knowledge"}])),
            )
            .await
            .unwrap();
    }

    let all = service.list(&TagFilters::default()).await.unwrap();
    assert_eq!(all.len(), 8);

    let canto_one = service
        .list(&TagFilters {
            canto_num: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(canto_one.len(), 6);
    assert!(canto_one.iter().all(|t| t.verse.canto_num == 1));

    let chapter_one = service
        .list(&TagFilters {
            canto_num: Some(1),
            chapter_num: Some(1),
            verse_id: None,
        })
        .await
        .unwrap();
    assert_eq!(chapter_one.len(), 4);

    let single = service
        .list(&TagFilters {
            verse_id: Some("1.2.1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let names: Vec<&str> = single.iter().map(|t| t.tag_name.as_str()).collect();
    assert_eq!(names, vec!["devotion", "knowledge"]);
}

#[tokio::test]
async fn test_delete_removes_row_and_unknown_id_is_not_found() {
    let setup = seeded().await;
    let service = setup.translation_tags();
    let tagger = setup.tagger("tagger@example.com").await.unwrap();
    let created = service
        .create(&tagger, &translation_payload("1.1.1", json!([{"tag": "devotion"}])))
        .await
        .unwrap();

    match service.delete(created[0].id + 100).await {
        Err(TagError::NotFound(message)) => assert_eq!(message, "Not a valid tag_id"),
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert_eq!(service.list(&TagFilters::default()).await.unwrap().len(), 1);

    service.delete(created[0].id).await.unwrap();
    assert!(service.get(created[0].id).await.unwrap().is_none());
    assert!(matches!(
        service.delete(created[0].id).await,
        Err(TagError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_review_requires_reviewer_role() {
    let setup = seeded().await;
    let service = setup.translation_tags();
    let tagger = setup.tagger("tagger@example.com").await.unwrap();
    let reviewer = setup.reviewer("reviewer@example.com").await.unwrap();
    let created = service
        .create(&tagger, &translation_payload("1.1.1", json!([{"tag": "devotion"}])))
        .await
        .unwrap();
    let id = created[0].id;

    // Denied for an existing id and for a missing one alike.
    assert!(matches!(
        service.review(&tagger, id).await,
        Err(TagError::PermissionDenied(_))
    ));
    assert!(matches!(
        service.review(&tagger, id + 100).await,
        Err(TagError::PermissionDenied(_))
    ));
    assert_eq!(service.get(id).await.unwrap().unwrap().reviewer, None);

    let reviewed = service.review(&reviewer, id).await.unwrap();
    assert_eq!(reviewed.reviewer.as_deref(), Some(reviewer.id.as_str()));

    assert!(matches!(
        service.review(&reviewer, id + 100).await,
        Err(TagError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_ambiguous_tag_name_needs_level() {
    let setup = seeded().await;
    let root = setup.add_root_tag("bhakti", false).await.unwrap();
    let child = setup.add_tag("bhakti", 2, Some(root.id), true).await.unwrap();
    let service = setup.translation_tags();
    let tagger = setup.tagger("tagger@example.com").await.unwrap();

    let ambiguous = service
        .create(&tagger, &translation_payload("1.1.1", json!([{"tag": "bhakti"}])))
        .await;
    assert!(matches!(ambiguous, Err(TagError::Validation(_))));

    let created = service
        .create(
            &tagger,
            &translation_payload("1.1.1", json!([{"tag": "bhakti", "level": 2}])),
        )
        .await
        .unwrap();
    assert_eq!(created[0].tag_name, child.name);
}
