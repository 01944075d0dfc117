//! Storage integration tests over a temp-file SQLite database.

use tempfile::TempDir;

use watermap_core::{PaymentMethod, PointId, UserId, WaterPointDraft};
use watermap_store::{NewUser, PaymentOrder, PointFilter, SqliteStore, Store, StoreError};

async fn open_store() -> (SqliteStore, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let url = format!("sqlite://{}", temp_dir.path().join("watermap.db").display());
    let store = SqliteStore::connect(&url).await.expect("Failed to open store");
    store.migrate().await.expect("Failed to migrate");
    (store, temp_dir)
}

fn draft(name: &str, city: Option<&str>, rating: Option<f64>) -> WaterPointDraft {
    WaterPointDraft {
        name: name.to_string(),
        description: None,
        kind: None,
        address: None,
        city: city.map(ToOwned::to_owned),
        country: None,
        rating,
        website: None,
        reviews_count: None,
        region: None,
        timezone: None,
        phone: None,
        latitude: 54.7,
        longitude: 55.9,
    }
}

async fn seed_user(store: &SqliteStore, email: &str) -> UserId {
    store
        .create_user(&NewUser {
            name: "Test User".into(),
            email: email.into(),
            password_hash: "$argon2id$fake".into(),
        })
        .await
        .expect("Failed to create user")
        .id
}

fn order(
    user_id: UserId,
    point_id: PointId,
    method: PaymentMethod,
    volume: f64,
    amount: f64,
    debit: f64,
    earned: f64,
) -> PaymentOrder {
    PaymentOrder {
        user_id,
        water_point_id: point_id,
        volume,
        amount,
        method,
        debit,
        bonus_earned: earned,
    }
}

// ============================================================================
// Migration
// ============================================================================

#[tokio::test]
async fn migrate_is_idempotent() {
    let (store, _dir) = open_store().await;
    store.migrate().await.expect("Second migrate must succeed");
    store.migrate().await.expect("Third migrate must succeed");
}

// ============================================================================
// Water points
// ============================================================================

#[tokio::test]
async fn point_crud_roundtrip() {
    let (store, _dir) = open_store().await;

    let created = store
        .create_point(&draft("Spring", Some("Ufa"), Some(4.5)))
        .await
        .unwrap();

    let fetched = store.get_point(created.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);

    let replaced = store
        .update_point(created.id, &draft("Renamed", Some("Ufa"), None))
        .await
        .unwrap();
    assert_eq!(replaced.name, "Renamed");
    assert_eq!(replaced.rating, None);

    store.delete_point(created.id).await.unwrap();
    assert!(store.get_point(created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn update_and_delete_missing_point_report_not_found() {
    let (store, _dir) = open_store().await;

    let missing = PointId::new(999);
    assert!(matches!(
        store.update_point(missing, &draft("x", None, None)).await,
        Err(StoreError::NotFound { entity: "water point", .. })
    ));
    assert!(matches!(
        store.delete_point(missing).await,
        Err(StoreError::NotFound { entity: "water point", .. })
    ));
}

#[tokio::test]
async fn list_paginates_in_insertion_order() {
    let (store, _dir) = open_store().await;

    for i in 0..5 {
        store.create_point(&draft(&format!("p{i}"), None, None)).await.unwrap();
    }

    let page = store.list_points(1, 2).await.unwrap();
    let names: Vec<_> = page.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["p1", "p2"]);
}

#[tokio::test]
async fn search_combines_exact_filters_and_rating_bound() {
    let (store, _dir) = open_store().await;

    store.create_point(&draft("Good Ufa spring", Some("Ufa"), Some(4.5))).await.unwrap();
    store.create_point(&draft("Poor Ufa tap", Some("Ufa"), Some(3.0))).await.unwrap();
    store.create_point(&draft("Kazan well", Some("Kazan"), Some(4.9))).await.unwrap();
    store.create_point(&draft("Unrated Ufa", Some("Ufa"), None)).await.unwrap();

    let found = store
        .search_points(&PointFilter {
            city: Some("Ufa".into()),
            min_rating: Some(4.0),
            limit: 100,
            ..PointFilter::default()
        })
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Good Ufa spring");
}

#[tokio::test]
async fn search_substring_is_case_insensitive_across_fields() {
    let (store, _dir) = open_store().await;

    let mut spring = draft("Artesian SPRING", None, None);
    spring.description = Some("cold and clean".into());
    store.create_point(&spring).await.unwrap();

    let mut by_address = draft("Pump", None, None);
    by_address.address = Some("Spring street 5".into());
    store.create_point(&by_address).await.unwrap();

    store.create_point(&draft("Unrelated", None, None)).await.unwrap();

    let found = store
        .search_points(&PointFilter {
            query: Some("spring".into()),
            limit: 100,
            ..PointFilter::default()
        })
        .await
        .unwrap();

    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn import_inserts_all_rows_in_one_batch() {
    let (store, _dir) = open_store().await;

    let drafts: Vec<_> = (0..3).map(|i| draft(&format!("i{i}"), None, None)).collect();
    let inserted = store.import_points(&drafts).await.unwrap();
    assert_eq!(inserted, 3);
    assert_eq!(store.list_points(0, 100).await.unwrap().len(), 3);
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let (store, _dir) = open_store().await;

    seed_user(&store, "dup@example.com").await;
    let err = store
        .create_user(&NewUser {
            name: "Other".into(),
            email: "dup@example.com".into(),
            password_hash: "$argon2id$fake".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn new_users_start_with_zeroed_counters() {
    let (store, _dir) = open_store().await;

    let id = seed_user(&store, "zero@example.com").await;
    let user = store.get_user(id).await.unwrap().unwrap();
    assert_eq!(user.bonus_balance, 0.0);
    assert_eq!(user.total_volume, 0.0);
}

#[tokio::test]
async fn update_user_keeps_password_when_not_replaced() {
    let (store, _dir) = open_store().await;

    let id = seed_user(&store, "keep@example.com").await;
    let updated = store
        .update_user(
            id,
            &watermap_store::UserUpdate {
                name: "Renamed".into(),
                email: "keep@example.com".into(),
                password_hash: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.password_hash, "$argon2id$fake");
}

// ============================================================================
// Payments
// ============================================================================

#[tokio::test]
async fn payment_updates_counters_and_appends_ledger_row() {
    let (store, _dir) = open_store().await;

    let user_id = seed_user(&store, "payer@example.com").await;
    let point = store.create_point(&draft("Spring", None, None)).await.unwrap();

    let payment = store
        .record_payment(&order(user_id, point.id, PaymentMethod::Card, 45.0, 90.0, 0.0, 10.0))
        .await
        .unwrap();

    assert_eq!(payment.bonus_earned, 10.0);
    assert_eq!(payment.bonus_used, 0.0);

    let user = store.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.bonus_balance, 10.0);
    assert_eq!(user.total_volume, 45.0);

    let ledger = store.list_payments_by_user(user_id).await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].id, payment.id);
    assert_eq!(ledger[0].volume, 45.0);
    assert_eq!(ledger[0].amount, 90.0);
    assert_eq!(ledger[0].payment_method, PaymentMethod::Card);
}

#[tokio::test]
async fn insufficient_balance_leaves_no_partial_state() {
    let (store, _dir) = open_store().await;

    let user_id = seed_user(&store, "broke@example.com").await;
    let point = store.create_point(&draft("Spring", None, None)).await.unwrap();

    let err = store
        .record_payment(&order(user_id, point.id, PaymentMethod::Bonus, 20.0, 50.0, 50.0, 5.0))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::InsufficientBalance { balance, required }
            if balance == 0.0 && required == 50.0
    ));

    let user = store.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.bonus_balance, 0.0);
    assert_eq!(user.total_volume, 0.0);
    assert!(store.list_payments_by_user(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn payment_requires_existing_user_and_point() {
    let (store, _dir) = open_store().await;

    let user_id = seed_user(&store, "exists@example.com").await;
    let point = store.create_point(&draft("Spring", None, None)).await.unwrap();

    assert!(matches!(
        store
            .record_payment(&order(UserId::new(999), point.id, PaymentMethod::Card, 1.0, 1.0, 0.0, 0.0))
            .await,
        Err(StoreError::NotFound { entity: "user", .. })
    ));
    assert!(matches!(
        store
            .record_payment(&order(user_id, PointId::new(999), PaymentMethod::Card, 1.0, 1.0, 0.0, 0.0))
            .await,
        Err(StoreError::NotFound { entity: "water point", .. })
    ));
}

#[tokio::test]
async fn ledger_rows_accumulate_and_never_change() {
    let (store, _dir) = open_store().await;

    let user_id = seed_user(&store, "history@example.com").await;
    let point = store.create_point(&draft("Spring", None, None)).await.unwrap();

    let mut recorded = Vec::new();
    for _ in 0..3 {
        recorded.push(
            store
                .record_payment(&order(user_id, point.id, PaymentMethod::Card, 20.0, 40.0, 0.0, 5.0))
                .await
                .unwrap(),
        );
    }

    let ledger = store.list_payments_by_user(user_id).await.unwrap();
    let ledger_ids: Vec<_> = ledger.iter().map(|p| p.id).collect();
    let recorded_ids: Vec<_> = recorded.iter().map(|p| p.id).collect();
    assert_eq!(ledger_ids, recorded_ids);
    assert!(ledger.iter().all(|p| p.bonus_earned == 5.0 && p.volume == 20.0));

    let user = store.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.bonus_balance, 15.0);
    assert_eq!(user.total_volume, 60.0);
}

// ============================================================================
// Admins
// ============================================================================

#[tokio::test]
async fn bootstrap_creates_exactly_one_admin_once() {
    let (store, _dir) = open_store().await;

    let first = store.bootstrap_admin("admin", "$argon2id$a").await.unwrap();
    assert!(first.is_some());

    let second = store.bootstrap_admin("other", "$argon2id$b").await.unwrap();
    assert!(second.is_none());

    assert_eq!(store.count_admins().await.unwrap(), 1);
    let admin = store.get_admin_by_username("admin").await.unwrap().unwrap();
    assert_eq!(admin.username, "admin");
}

#[tokio::test]
async fn rotation_replaces_the_single_admin() {
    let (store, _dir) = open_store().await;

    store.bootstrap_admin("admin", "$argon2id$a").await.unwrap();
    let rotated = store.rotate_admin("root", "$argon2id$b").await.unwrap();
    assert_eq!(rotated.username, "root");

    assert_eq!(store.count_admins().await.unwrap(), 1);
    assert!(store.get_admin_by_username("admin").await.unwrap().is_none());
    assert!(store.get_admin_by_username("root").await.unwrap().is_some());
}

#[tokio::test]
async fn rotation_to_colliding_username_is_a_conflict() {
    let (store, _dir) = open_store().await;

    store.bootstrap_admin("admin", "$argon2id$a").await.unwrap();
    let err = store.rotate_admin("admin", "$argon2id$b").await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    assert_eq!(store.count_admins().await.unwrap(), 1);
    let unchanged = store.get_admin_by_username("admin").await.unwrap().unwrap();
    assert_eq!(unchanged.password_hash, "$argon2id$a");
}

#[tokio::test]
async fn delete_all_admins_reports_removed_count() {
    let (store, _dir) = open_store().await;

    store.bootstrap_admin("admin", "$argon2id$a").await.unwrap();
    assert_eq!(store.delete_all_admins().await.unwrap(), 1);
    assert_eq!(store.count_admins().await.unwrap(), 0);
}
