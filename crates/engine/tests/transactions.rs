mod common;

use engine::{EngineError, TransactionCmd, UpdateMode};

use common::{account, at, engine, png_bytes, tag, wallet};

#[tokio::test]
async fn create_returns_tags_and_owner() {
    let t = engine().await;
    let user = account(&t.engine, "test@example.com").await;
    let wallet_id = wallet(&t.engine, user.id, "Cash").await;
    let fuel = tag(&t.engine, user.id, "fuel").await;
    let car = tag(&t.engine, user.id, "car").await;

    let tx = t
        .engine
        .create_transaction(
            user.id,
            TransactionCmd::new("expenses", "car", wallet_id, 5, at(2))
                .note("gas")
                .tags(vec![car, fuel, car]),
        )
        .await
        .unwrap();

    assert_eq!(tx.user_id, Some(user.id));
    assert_eq!(tx.wallet_id, Some(wallet_id));
    assert_eq!(tx.note.as_deref(), Some("gas"));
    assert_eq!(tx.tag_ids(), [fuel, car]);
    assert!(tx.image.is_none());

    // the wallet balance is not touched
    assert_eq!(t.engine.list_wallets(user.id).await.unwrap()[0].balance, 100);
}

#[tokio::test]
async fn create_reports_every_invalid_field() {
    let t = engine().await;
    let user = account(&t.engine, "test@example.com").await;

    let err = t
        .engine
        .create_transaction(
            user.id,
            TransactionCmd {
                flow: Some(String::new()),
                category: Some("c".repeat(21)),
                wallet_id: Some(999),
                tags: Some(vec![404]),
                date: None,
                note: Some("n".repeat(501)),
                amount: None,
            },
        )
        .await
        .unwrap_err();

    let EngineError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    for field in ["flow", "category", "wallet", "tags", "date", "note", "amount"] {
        assert!(errors.contains(field), "missing error for {field}");
    }
    assert_eq!(
        errors.field("wallet"),
        ["Invalid pk \"999\" - object does not exist."]
    );
}

#[tokio::test]
async fn list_is_newest_first_and_scoped() {
    let t = engine().await;
    let user = account(&t.engine, "test@example.com").await;
    let other = account(&t.engine, "other@example.com").await;
    let wallet_id = wallet(&t.engine, user.id, "Cash").await;

    let older = t
        .engine
        .create_transaction(user.id, TransactionCmd::new("expenses", "a", wallet_id, 1, at(1)))
        .await
        .unwrap();
    let newer = t
        .engine
        .create_transaction(user.id, TransactionCmd::new("expenses", "b", wallet_id, 1, at(5)))
        .await
        .unwrap();
    let same_day = t
        .engine
        .create_transaction(user.id, TransactionCmd::new("expenses", "c", wallet_id, 1, at(5)))
        .await
        .unwrap();
    t.engine
        .create_transaction(other.id, TransactionCmd::new("income", "d", wallet_id, 1, at(9)))
        .await
        .unwrap();

    let ids: Vec<i32> = t
        .engine
        .list_transactions(user.id, None)
        .await
        .unwrap()
        .into_iter()
        .map(|tx| tx.id)
        .collect();
    assert_eq!(ids, [same_day.id, newer.id, older.id]);
}

#[tokio::test]
async fn keyword_matches_category_note_or_tag() {
    let t = engine().await;
    let user = account(&t.engine, "test@example.com").await;
    let wallet_id = wallet(&t.engine, user.id, "Cash").await;
    let tag_id = tag(&t.engine, user.id, "testtag1").await;

    let tx = t
        .engine
        .create_transaction(
            user.id,
            TransactionCmd::new("expenses", "food", wallet_id, 5, at(2))
                .note("testnote1")
                .tags(vec![tag_id]),
        )
        .await
        .unwrap();
    let plain = t
        .engine
        .create_transaction(user.id, TransactionCmd::new("income", "salary", wallet_id, 9, at(3)))
        .await
        .unwrap();

    for keyword in ["foo", "FOOD", "testnote", "testtag", "1"] {
        let found = t
            .engine
            .list_transactions(user.id, Some(keyword))
            .await
            .unwrap();
        assert_eq!(found.len(), 1, "keyword {keyword}");
        assert_eq!(found[0].id, tx.id);
        assert_eq!(found[0].tag_ids(), [tag_id]);
    }

    assert!(
        t.engine
            .list_transactions(user.id, Some("nothing-like-this"))
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        t.engine
            .list_transactions(user.id, Some("%"))
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        t.engine.list_transactions(user.id, Some("")).await.unwrap().len(),
        2
    );
    let salary = t
        .engine
        .list_transactions(user.id, Some("sal"))
        .await
        .unwrap();
    assert_eq!(salary.len(), 1);
    assert_eq!(salary[0].id, plain.id);
}

#[tokio::test]
async fn keyword_never_leaks_other_accounts() {
    let t = engine().await;
    let user = account(&t.engine, "test@example.com").await;
    let other = account(&t.engine, "other@example.com").await;
    let wallet_id = wallet(&t.engine, other.id, "Cash").await;

    t.engine
        .create_transaction(other.id, TransactionCmd::new("expenses", "food", wallet_id, 5, at(2)))
        .await
        .unwrap();

    assert!(
        t.engine
            .list_transactions(user.id, Some("food"))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn keyword_folds_non_ascii_case() {
    let t = engine().await;
    let user = account(&t.engine, "test@example.com").await;
    let wallet_id = wallet(&t.engine, user.id, "Cash").await;
    let tag_id = tag(&t.engine, user.id, "Ölwechsel").await;

    let pastry = t
        .engine
        .create_transaction(
            user.id,
            TransactionCmd::new("expenses", "Éclair", wallet_id, 4, at(1)).note("Crème brûlée"),
        )
        .await
        .unwrap();
    let garage = t
        .engine
        .create_transaction(
            user.id,
            TransactionCmd::new("expenses", "car", wallet_id, 60, at(2)).tags(vec![tag_id]),
        )
        .await
        .unwrap();

    for keyword in ["Éclair", "éclair", "ÉCLAIR", "CRÈME", "brûlée"] {
        let found = t.engine.list_transactions(user.id, Some(keyword)).await.unwrap();
        assert_eq!(found.len(), 1, "keyword {keyword}");
        assert_eq!(found[0].id, pastry.id);
    }
    for keyword in ["Ölwechsel", "ölwechsel", "ÖLW"] {
        let found = t.engine.list_transactions(user.id, Some(keyword)).await.unwrap();
        assert_eq!(found.len(), 1, "keyword {keyword}");
        assert_eq!(found[0].id, garage.id);
        assert_eq!(found[0].tag_ids(), [tag_id]);
    }
}

#[tokio::test]
async fn partial_update_keeps_missing_fields() {
    let t = engine().await;
    let user = account(&t.engine, "test@example.com").await;
    let wallet_id = wallet(&t.engine, user.id, "Cash").await;
    let tag_id = tag(&t.engine, user.id, "fuel").await;
    let tx = t
        .engine
        .create_transaction(
            user.id,
            TransactionCmd::new("expenses", "car", wallet_id, 5, at(2))
                .note("gas")
                .tags(vec![tag_id]),
        )
        .await
        .unwrap();

    let updated = t
        .engine
        .update_transaction(
            user.id,
            tx.id,
            TransactionCmd {
                amount: Some(42),
                ..Default::default()
            },
            UpdateMode::Partial,
        )
        .await
        .unwrap();

    assert_eq!(updated.amount, 42);
    assert_eq!(updated.category, "car");
    assert_eq!(updated.note.as_deref(), Some("gas"));
    assert_eq!(updated.date, at(2));
    assert_eq!(updated.tag_ids(), [tag_id]);

    let cleared = t
        .engine
        .update_transaction(
            user.id,
            tx.id,
            TransactionCmd {
                tags: Some(Vec::new()),
                note: Some(String::new()),
                ..Default::default()
            },
            UpdateMode::Partial,
        )
        .await
        .unwrap();
    assert!(cleared.tags.is_empty());
    assert!(cleared.note.is_none());
}

#[tokio::test]
async fn full_update_requires_fields_and_resets_tags() {
    let t = engine().await;
    let user = account(&t.engine, "test@example.com").await;
    let wallet_id = wallet(&t.engine, user.id, "Cash").await;
    let tag_id = tag(&t.engine, user.id, "fuel").await;
    let tx = t
        .engine
        .create_transaction(
            user.id,
            TransactionCmd::new("expenses", "car", wallet_id, 5, at(2))
                .note("gas")
                .tags(vec![tag_id]),
        )
        .await
        .unwrap();

    let err = t
        .engine
        .update_transaction(
            user.id,
            tx.id,
            TransactionCmd {
                amount: Some(42),
                ..Default::default()
            },
            UpdateMode::Full,
        )
        .await
        .unwrap_err();
    let EngineError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(errors.contains("flow"));
    assert!(errors.contains("wallet"));
    assert!(!errors.contains("amount"));

    let replaced = t
        .engine
        .update_transaction(
            user.id,
            tx.id,
            TransactionCmd::new("income", "salary", wallet_id, 1000, at(4)),
            UpdateMode::Full,
        )
        .await
        .unwrap();
    assert_eq!(replaced.flow, "income");
    assert_eq!(replaced.date, at(4));
    assert!(replaced.note.is_none());
    assert!(replaced.tags.is_empty());
}

#[tokio::test]
async fn foreign_transactions_look_missing() {
    let t = engine().await;
    let user = account(&t.engine, "test@example.com").await;
    let other = account(&t.engine, "other@example.com").await;
    let wallet_id = wallet(&t.engine, user.id, "Cash").await;
    let tx = t
        .engine
        .create_transaction(user.id, TransactionCmd::new("expenses", "car", wallet_id, 5, at(2)))
        .await
        .unwrap();

    let not_found = EngineError::KeyNotFound("transaction not exists".to_string());
    assert_eq!(t.engine.transaction(other.id, tx.id).await.unwrap_err(), not_found);
    assert_eq!(
        t.engine
            .update_transaction(other.id, tx.id, TransactionCmd::default(), UpdateMode::Partial)
            .await
            .unwrap_err(),
        not_found
    );
    assert_eq!(
        t.engine.delete_transaction(other.id, tx.id).await.unwrap_err(),
        not_found
    );
    // ownership is checked before the payload
    assert_eq!(
        t.engine
            .upload_transaction_image(other.id, tx.id, b"notimage".to_vec())
            .await
            .unwrap_err(),
        not_found
    );
    assert_eq!(t.engine.transaction(user.id, 404).await.unwrap_err(), not_found);

    t.engine.transaction(user.id, tx.id).await.unwrap();
}

#[tokio::test]
async fn upload_replaces_and_delete_releases_image() {
    let t = engine().await;
    let user = account(&t.engine, "test@example.com").await;
    let wallet_id = wallet(&t.engine, user.id, "Cash").await;
    let tx = t
        .engine
        .create_transaction(user.id, TransactionCmd::new("expenses", "car", wallet_id, 5, at(2)))
        .await
        .unwrap();

    let first = t
        .engine
        .upload_transaction_image(user.id, tx.id, png_bytes())
        .await
        .unwrap()
        .image
        .unwrap();
    assert!(first.starts_with("uploads/transaction/"));
    assert!(first.ends_with(".png"));
    assert!(t.engine.media().path(&first).exists());

    let second = t
        .engine
        .upload_transaction_image(user.id, tx.id, png_bytes())
        .await
        .unwrap()
        .image
        .unwrap();
    assert_ne!(first, second);
    assert!(!t.engine.media().path(&first).exists());
    assert!(t.engine.media().path(&second).exists());

    let err = t
        .engine
        .upload_transaction_image(user.id, tx.id, b"notimage".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidImage(_)));
    assert_eq!(
        t.engine.transaction(user.id, tx.id).await.unwrap().image,
        Some(second.clone())
    );

    // updates leave the image alone
    let updated = t
        .engine
        .update_transaction(
            user.id,
            tx.id,
            TransactionCmd::new("expenses", "car", wallet_id, 6, at(2)),
            UpdateMode::Full,
        )
        .await
        .unwrap();
    assert_eq!(updated.image, Some(second.clone()));

    t.engine.delete_transaction(user.id, tx.id).await.unwrap();
    assert!(!t.engine.media().path(&second).exists());
}

#[tokio::test]
async fn keyword_over_separate_transactions() {
    let t = engine().await;
    let user = account(&t.engine, "test@example.com").await;
    let wallet_id = wallet(&t.engine, user.id, "Cash").await;
    let tag_id = tag(&t.engine, user.id, "testtag1").await;

    let food = t
        .engine
        .create_transaction(user.id, TransactionCmd::new("expenses", "food", wallet_id, 1, at(1)))
        .await
        .unwrap();
    let noted = t
        .engine
        .create_transaction(
            user.id,
            TransactionCmd::new("expenses", "car", wallet_id, 2, at(2)).note("testnote1"),
        )
        .await
        .unwrap();
    let tagged = t
        .engine
        .create_transaction(
            user.id,
            TransactionCmd::new("expenses", "car", wallet_id, 3, at(3)).tags(vec![tag_id]),
        )
        .await
        .unwrap();

    let ids = |txs: Vec<engine::Transaction>| txs.into_iter().map(|tx| tx.id).collect::<Vec<_>>();

    let found = t.engine.list_transactions(user.id, Some("foo")).await.unwrap();
    assert_eq!(ids(found), [food.id]);
    let found = t.engine.list_transactions(user.id, Some("testnote")).await.unwrap();
    assert_eq!(ids(found), [noted.id]);
    let found = t.engine.list_transactions(user.id, Some("testtag")).await.unwrap();
    assert_eq!(ids(found), [tagged.id]);
    // Substring match: "1" finds the noted row as well, not only the tag match.
    let found = t.engine.list_transactions(user.id, Some("1")).await.unwrap();
    assert_eq!(ids(found), [tagged.id, noted.id]);
    let found = t.engine.list_transactions(user.id, Some("car")).await.unwrap();
    assert_eq!(ids(found), [tagged.id, noted.id]);
}
