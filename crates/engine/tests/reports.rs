use chrono::{Datelike, Duration, TimeZone, Utc};
use sea_orm::Database;

use engine::{AMOUNT_EPSILON, Ledger, Split};
use migration::MigratorTrait;

async fn ledger_with_db() -> Ledger {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Ledger::builder().database(db).build().unwrap()
}

#[tokio::test]
async fn statistics_cover_spending_and_debts() {
    let ledger = ledger_with_db().await;
    let alice = ledger.add_member("alice", "hash", None).await.unwrap();
    let bob = ledger.add_member("bob", "hash", None).await.unwrap();
    let carol = ledger.add_member("carol", "hash", None).await.unwrap();

    ledger
        .create_expense(
            "Rent",
            90.0,
            alice.id,
            &[alice.id, bob.id, carol.id],
            &Split::Equal,
            Utc::now(),
        )
        .await
        .unwrap();
    ledger
        .create_expense("Taxi", 30.0, bob.id, &[alice.id, bob.id], &Split::Equal, Utc::now())
        .await
        .unwrap();

    let stats = ledger.statistics(alice.id).await.unwrap();
    // 90 fronted plus a 15 share of Bob's taxi.
    assert!((stats.total_spent - 105.0).abs() < AMOUNT_EPSILON);
    assert!((stats.total_owed - 15.0).abs() < AMOUNT_EPSILON);
    assert!((stats.total_owed_to_me - 60.0).abs() < AMOUNT_EPSILON);
    assert!((stats.net_balance - 45.0).abs() < AMOUNT_EPSILON);
    assert_eq!(stats.paid_count, 1);
    assert_eq!(stats.unpaid_count, 1);

    assert_eq!(stats.top_expenses.len(), 2);
    assert_eq!(stats.top_expenses[0].description, "Rent");
    assert_eq!(stats.top_expenses[1].description, "Taxi");

    let bob_stats = ledger.statistics(bob.id).await.unwrap();
    assert!((bob_stats.total_spent - 60.0).abs() < AMOUNT_EPSILON);
    assert!((bob_stats.total_owed - 30.0).abs() < AMOUNT_EPSILON);
    assert!((bob_stats.total_owed_to_me - 15.0).abs() < AMOUNT_EPSILON);
}

#[tokio::test]
async fn top_expenses_are_capped_at_five() {
    let ledger = ledger_with_db().await;
    let alice = ledger.add_member("alice", "hash", None).await.unwrap();

    for (i, amount) in [10.0, 50.0, 20.0, 60.0, 30.0, 40.0, 5.0].iter().enumerate() {
        ledger
            .create_expense(
                &format!("Purchase {i}"),
                *amount,
                alice.id,
                &[alice.id],
                &Split::Equal,
                Utc::now(),
            )
            .await
            .unwrap();
    }

    let stats = ledger.statistics(alice.id).await.unwrap();
    assert_eq!(stats.top_expenses.len(), 5);
    let amounts: Vec<f64> = stats.top_expenses.iter().map(|e| e.amount).collect();
    assert_eq!(amounts, vec![60.0, 50.0, 40.0, 30.0, 20.0]);
}

#[tokio::test]
async fn monthly_trend_spans_six_months_with_idle_zeroes() {
    let ledger = ledger_with_db().await;
    let alice = ledger.add_member("alice", "hash", None).await.unwrap();

    let now = Utc::now();
    ledger
        .create_expense("This month", 40.0, alice.id, &[alice.id], &Split::Equal, now)
        .await
        .unwrap();
    // Outside the six-month window entirely.
    ledger
        .create_expense(
            "Ancient",
            500.0,
            alice.id,
            &[alice.id],
            &Split::Equal,
            Utc.with_ymd_and_hms(2020, 1, 15, 12, 0, 0).unwrap(),
        )
        .await
        .unwrap();

    let stats = ledger.statistics(alice.id).await.unwrap();
    assert_eq!(stats.monthly_trend.len(), 6);

    let last = stats.monthly_trend.last().unwrap();
    assert_eq!((last.year, last.month), (now.year(), now.month()));
    assert!((last.total - 40.0).abs() < AMOUNT_EPSILON);
    assert!(
        stats.monthly_trend[..5]
            .iter()
            .all(|m| m.total.abs() < AMOUNT_EPSILON)
    );
}

#[tokio::test]
async fn reminder_groups_skip_debtors_without_contact_address() {
    let ledger = ledger_with_db().await;
    let alice = ledger
        .add_member("alice", "hash", Some("alice@example.com"))
        .await
        .unwrap();
    let bob = ledger.add_member("bob", "hash", None).await.unwrap();
    let carol = ledger
        .add_member("carol", "hash", Some("carol@example.com"))
        .await
        .unwrap();

    ledger
        .create_expense(
            "Rent",
            90.0,
            alice.id,
            &[alice.id, bob.id, carol.id],
            &Split::Equal,
            Utc::now(),
        )
        .await
        .unwrap();

    let groups = ledger.reminder_groups().await.unwrap();
    assert_eq!(groups.len(), 1);

    let group = groups.get(&carol.id).unwrap();
    assert_eq!(group.member.username, "carol");
    assert_eq!(group.entries.len(), 1);
    assert_eq!(group.entries[0].payer_name, "alice");
    assert_eq!(group.entries[0].description, "Rent");
    assert!((group.entries[0].amount - 30.0).abs() < AMOUNT_EPSILON);
}

#[tokio::test]
async fn reminder_groups_collect_all_debts_of_one_member() {
    let ledger = ledger_with_db().await;
    let alice = ledger
        .add_member("alice", "hash", Some("alice@example.com"))
        .await
        .unwrap();
    let bob = ledger
        .add_member("bob", "hash", Some("bob@example.com"))
        .await
        .unwrap();

    let dinner = ledger
        .create_expense("Dinner", 60.0, alice.id, &[alice.id, bob.id], &Split::Equal, Utc::now())
        .await
        .unwrap();
    ledger
        .create_expense("Taxi", 20.0, alice.id, &[alice.id, bob.id], &Split::Equal, Utc::now())
        .await
        .unwrap();

    let groups = ledger.reminder_groups().await.unwrap();
    let bob_group = groups.get(&bob.id).unwrap();
    assert_eq!(bob_group.entries.len(), 2);

    // A settled row drops out of the next sweep.
    let bob_row = ledger
        .settlements_for(dinner.id)
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.member_id == bob.id)
        .unwrap();
    ledger
        .mark_settlement_paid(bob_row.id, bob.id)
        .await
        .unwrap();

    let groups = ledger.reminder_groups().await.unwrap();
    assert_eq!(groups.get(&bob.id).unwrap().entries.len(), 1);
}

#[tokio::test]
async fn reminder_scans_report_the_latest_completion() {
    let ledger = ledger_with_db().await;
    assert!(ledger.last_reminder_scan().await.unwrap().is_none());

    let earlier = Utc::now() - Duration::hours(2);
    let later = Utc::now();
    ledger.record_reminder_scan(earlier).await.unwrap();
    ledger.record_reminder_scan(later).await.unwrap();

    let last = ledger.last_reminder_scan().await.unwrap().unwrap();
    assert!((last - later).num_seconds().abs() < 1);
}
