mod common;

use engine::{EngineError, ProfileUpdate, RegisterCmd, TransactionCmd};

use common::{account, at, engine, png_bytes, tag, wallet};

#[tokio::test]
async fn register_lowercases_email_and_hides_password() {
    let t = engine().await;

    let account = t
        .engine
        .register(RegisterCmd::new("Test@Example.COM", "testpass123").name("Test"))
        .await
        .unwrap();

    assert_eq!(account.email, "test@example.com");
    assert_eq!(account.name, "Test");
    assert!(account.is_active);
    assert!(!account.is_staff);

    let found = t.engine.account_by_email("TEST@example.com").await.unwrap();
    assert_eq!(found.id, account.id);
}

#[tokio::test]
async fn register_rejects_duplicates_short_passwords_and_bad_emails() {
    let t = engine().await;
    account(&t.engine, "test@example.com").await;

    let err = t
        .engine
        .register(RegisterCmd::new("TEST@example.com", "testpass123"))
        .await
        .unwrap_err();
    let EngineError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(errors.contains("email"));

    let err = t
        .engine
        .register(RegisterCmd::new("other@example.com", "pw"))
        .await
        .unwrap_err();
    let EngineError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(errors.contains("password"));

    let err = t
        .engine
        .register(RegisterCmd::new("not-an-email", "testpass123"))
        .await
        .unwrap_err();
    let EngineError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(errors.contains("email"));

    let err = t.engine.register(RegisterCmd::default()).await.unwrap_err();
    let EngineError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(errors.field("email"), ["This field is required."]);
    assert_eq!(errors.field("password"), ["This field is required."]);
}

#[tokio::test]
async fn concurrent_registrations_of_one_email() {
    let t = engine().await;

    let (first, second) = tokio::join!(
        t.engine.register(RegisterCmd::new("race@example.com", "testpass123")),
        t.engine.register(RegisterCmd::new("RACE@example.com", "testpass123")),
    );

    let mut results = [first, second];
    results.sort_by_key(Result::is_err);
    let [winner, loser] = results;
    assert_eq!(winner.unwrap().email, "race@example.com");
    let err = loser.unwrap_err();
    let EngineError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert_eq!(errors.field("email"), ["user with this email already exists."]);
}

#[tokio::test]
async fn superuser_has_staff_flags() {
    let t = engine().await;

    let admin = t
        .engine
        .create_superuser(RegisterCmd::new("admin@example.com", "adminpass"))
        .await
        .unwrap();

    assert!(admin.is_staff);
    assert!(admin.is_superuser);
}

#[tokio::test]
async fn token_is_stable_and_resolves_to_principal() {
    let t = engine().await;
    let user = account(&t.engine, "test@example.com").await;

    let token = t
        .engine
        .authenticate(Some("Test@Example.com"), Some("testpass123"))
        .await
        .unwrap();
    let again = t
        .engine
        .authenticate(Some("test@example.com"), Some("testpass123"))
        .await
        .unwrap();
    assert_eq!(token, again);

    let principal = t.engine.principal(&token).await.unwrap();
    assert_eq!(principal.id, user.id);

    assert_eq!(
        t.engine.principal("nope").await.unwrap_err(),
        EngineError::Unauthorized
    );
}

#[tokio::test]
async fn concurrent_first_logins_share_one_token() {
    let t = engine().await;
    let user = account(&t.engine, "test@example.com").await;

    let (first, second) = tokio::join!(
        t.engine.authenticate(Some("test@example.com"), Some("testpass123")),
        t.engine.authenticate(Some("test@example.com"), Some("testpass123")),
    );
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_eq!(first, second);
    assert_eq!(t.engine.principal(&first).await.unwrap().id, user.id);
}

#[tokio::test]
async fn wrong_credentials_are_indistinguishable() {
    let t = engine().await;
    account(&t.engine, "test@example.com").await;

    let wrong_password = t
        .engine
        .authenticate(Some("test@example.com"), Some("wrongpass"))
        .await
        .unwrap_err();
    let unknown_email = t
        .engine
        .authenticate(Some("ghost@example.com"), Some("testpass123"))
        .await
        .unwrap_err();

    assert_eq!(wrong_password, EngineError::InvalidCredentials);
    assert_eq!(unknown_email, EngineError::InvalidCredentials);

    let missing = t.engine.authenticate(None, None).await.unwrap_err();
    assert!(matches!(missing, EngineError::Validation(_)));
}

#[tokio::test]
async fn profile_update_changes_name_and_password() {
    let t = engine().await;
    let user = account(&t.engine, "test@example.com").await;

    let updated = t
        .engine
        .update_profile(
            user.id,
            ProfileUpdate {
                name: Some("New name".to_string()),
                password: Some("newpass123".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "New name");
    assert_eq!(updated.email, "test@example.com");

    assert_eq!(
        t.engine
            .authenticate(Some("test@example.com"), Some("testpass123"))
            .await
            .unwrap_err(),
        EngineError::InvalidCredentials
    );
    t.engine
        .authenticate(Some("test@example.com"), Some("newpass123"))
        .await
        .unwrap();

    let unchanged = t
        .engine
        .update_profile(user.id, ProfileUpdate::default())
        .await
        .unwrap();
    assert_eq!(unchanged, updated);

    let err = t
        .engine
        .update_profile(
            user.id,
            ProfileUpdate {
                name: None,
                password: Some("abc".to_string()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn delete_account_removes_everything_it_owns() {
    let t = engine().await;
    let user = account(&t.engine, "test@example.com").await;
    let other = account(&t.engine, "other@example.com").await;
    let wallet_id = wallet(&t.engine, user.id, "Cash").await;
    let tag_id = tag(&t.engine, user.id, "food").await;

    let own = t
        .engine
        .create_transaction(
            user.id,
            TransactionCmd::new("expenses", "food", wallet_id, 5, at(2)).tags(vec![tag_id]),
        )
        .await
        .unwrap();
    let with_image = t
        .engine
        .upload_transaction_image(user.id, own.id, png_bytes())
        .await
        .unwrap();
    let image = with_image.image.unwrap();
    assert!(t.engine.media().path(&image).exists());

    // another account booking on this account's wallet with its tag
    let foreign = t
        .engine
        .create_transaction(
            other.id,
            TransactionCmd::new("income", "gift", wallet_id, 7, at(3)).tags(vec![tag_id]),
        )
        .await
        .unwrap();

    t.engine
        .authenticate(Some("test@example.com"), Some("testpass123"))
        .await
        .unwrap();
    t.engine.delete_account(user.id).await.unwrap();

    assert!(matches!(
        t.engine.profile(user.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(!t.engine.media().path(&image).exists());
    assert!(matches!(
        t.engine.transaction(other.id, foreign.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert_eq!(
        t.engine
            .authenticate(Some("test@example.com"), Some("testpass123"))
            .await
            .unwrap_err(),
        EngineError::InvalidCredentials
    );

    // the other account survives
    t.engine.profile(other.id).await.unwrap();
}
