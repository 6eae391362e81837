use chrono::{NaiveDate, TimeZone, Utc};
use sea_orm::Database;

use engine::{HistoryFilter, Ledger, PaidStatus, Split};
use migration::MigratorTrait;

async fn ledger_with_db() -> Ledger {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Ledger::builder().database(db).build().unwrap()
}

#[tokio::test]
async fn regular_viewers_only_see_their_own_expenses() {
    let ledger = ledger_with_db().await;
    let alice = ledger.add_member("alice", "hash", None).await.unwrap();
    let bob = ledger.add_member("bob", "hash", None).await.unwrap();
    let carol = ledger.add_member("carol", "hash", None).await.unwrap();
    let admin = ledger.add_admin("root", "hash", None).await.unwrap();

    let shared = ledger
        .create_expense("Dinner", 60.0, alice.id, &[alice.id, bob.id], &Split::Equal, Utc::now())
        .await
        .unwrap();
    let private = ledger
        .create_expense("Cinema", 24.0, carol.id, &[carol.id, alice.id], &Split::Equal, Utc::now())
        .await
        .unwrap();

    let bob_view = ledger
        .history(&HistoryFilter::default(), bob.id)
        .await
        .unwrap();
    assert_eq!(bob_view.len(), 1);
    assert_eq!(bob_view[0].id, shared.id);

    let alice_view = ledger
        .history(&HistoryFilter::default(), alice.id)
        .await
        .unwrap();
    assert_eq!(alice_view.len(), 2);

    let admin_view = ledger
        .history(&HistoryFilter::default(), admin.id)
        .await
        .unwrap();
    assert_eq!(admin_view.len(), 2);
    assert!(admin_view.iter().any(|e| e.id == private.id));
}

#[tokio::test]
async fn history_is_ordered_newest_first() {
    let ledger = ledger_with_db().await;
    let alice = ledger.add_member("alice", "hash", None).await.unwrap();

    let old = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let new = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
    ledger
        .create_expense("Old", 10.0, alice.id, &[alice.id], &Split::Equal, old)
        .await
        .unwrap();
    ledger
        .create_expense("New", 10.0, alice.id, &[alice.id], &Split::Equal, new)
        .await
        .unwrap();

    let view = ledger
        .history(&HistoryFilter::default(), alice.id)
        .await
        .unwrap();
    assert_eq!(view[0].description, "New");
    assert_eq!(view[1].description, "Old");
}

#[tokio::test]
async fn search_matches_description_case_insensitively() {
    let ledger = ledger_with_db().await;
    let alice = ledger.add_member("alice", "hash", None).await.unwrap();

    ledger
        .create_expense("Weekly Groceries", 80.0, alice.id, &[alice.id], &Split::Equal, Utc::now())
        .await
        .unwrap();
    ledger
        .create_expense("Taxi", 20.0, alice.id, &[alice.id], &Split::Equal, Utc::now())
        .await
        .unwrap();

    let filter = HistoryFilter {
        search: Some("groc".to_string()),
        ..Default::default()
    };
    let view = ledger.history(&filter, alice.id).await.unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].description, "Weekly Groceries");
}

#[tokio::test]
async fn date_range_includes_the_whole_end_day() {
    let ledger = ledger_with_db().await;
    let alice = ledger.add_member("alice", "hash", None).await.unwrap();

    ledger
        .create_expense(
            "Late on the 10th",
            10.0,
            alice.id,
            &[alice.id],
            &Split::Equal,
            Utc.with_ymd_and_hms(2026, 4, 10, 23, 30, 0).unwrap(),
        )
        .await
        .unwrap();
    ledger
        .create_expense(
            "On the 11th",
            10.0,
            alice.id,
            &[alice.id],
            &Split::Equal,
            Utc.with_ymd_and_hms(2026, 4, 11, 0, 30, 0).unwrap(),
        )
        .await
        .unwrap();

    let filter = HistoryFilter {
        date_from: NaiveDate::from_ymd_opt(2026, 4, 1),
        date_to: NaiveDate::from_ymd_opt(2026, 4, 10),
        ..Default::default()
    };
    let view = ledger.history(&filter, alice.id).await.unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].description, "Late on the 10th");
}

#[tokio::test]
async fn payer_filter_narrows_to_one_member() {
    let ledger = ledger_with_db().await;
    let alice = ledger.add_member("alice", "hash", None).await.unwrap();
    let bob = ledger.add_member("bob", "hash", None).await.unwrap();

    ledger
        .create_expense("Dinner", 60.0, alice.id, &[alice.id, bob.id], &Split::Equal, Utc::now())
        .await
        .unwrap();
    ledger
        .create_expense("Taxi", 20.0, bob.id, &[alice.id, bob.id], &Split::Equal, Utc::now())
        .await
        .unwrap();

    let filter = HistoryFilter {
        payer_id: Some(bob.id),
        ..Default::default()
    };
    let view = ledger.history(&filter, alice.id).await.unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].description, "Taxi");
}

#[tokio::test]
async fn paid_status_filter_inspects_settlement_sets() {
    let ledger = ledger_with_db().await;
    let alice = ledger.add_member("alice", "hash", None).await.unwrap();
    let bob = ledger.add_member("bob", "hash", None).await.unwrap();

    let settled = ledger
        .create_expense("Dinner", 60.0, alice.id, &[alice.id, bob.id], &Split::Equal, Utc::now())
        .await
        .unwrap();
    let outstanding = ledger
        .create_expense("Taxi", 20.0, alice.id, &[alice.id, bob.id], &Split::Equal, Utc::now())
        .await
        .unwrap();

    let bob_row = ledger
        .settlements_for(settled.id)
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.member_id == bob.id)
        .unwrap();
    ledger
        .mark_settlement_paid(bob_row.id, bob.id)
        .await
        .unwrap();

    let filter = HistoryFilter {
        paid_status: PaidStatus::Settled,
        ..Default::default()
    };
    let view = ledger.history(&filter, alice.id).await.unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].id, settled.id);

    let filter = HistoryFilter {
        paid_status: PaidStatus::Outstanding,
        ..Default::default()
    };
    let view = ledger.history(&filter, alice.id).await.unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].id, outstanding.id);
}
