use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    ClosingInputs, Engine, EngineError, MIN_JUSTIFICATION_LEN, RecordKind, RecordState,
    StaticPermissions, codes,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for user in ["alice", "bruno"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password, display_name) VALUES (?, ?, ?)",
            vec![user.into(), "password".into(), user.into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn inputs_for_till(till_number: i32) -> ClosingInputs {
    ClosingInputs {
        till_number,
        ..ClosingInputs::default()
    }
}

#[tokio::test]
async fn closing_sums_open_records_and_consumes_them() {
    let (engine, _db) = engine_with_db().await;
    for amount in [50, 30, 20] {
        engine
            .create_record(RecordKind::Expense, "alice", Some(1), amount, None)
            .await
            .unwrap();
    }
    // A record on another till must not leak in.
    engine
        .create_record(RecordKind::Expense, "alice", Some(2), 999, None)
        .await
        .unwrap();

    let closing = engine
        .create_closing(inputs_for_till(1), "alice")
        .await
        .unwrap();
    assert_eq!(closing.aggregates.expenses, 100);
    assert_eq!(closing.aggregates.balance_sales, 0);

    // The summed records now carry the closing's id.
    let open = engine
        .list_records(Some(RecordKind::Expense), Some(1), true, "alice")
        .await
        .unwrap();
    assert!(open.is_empty());
    let all = engine
        .list_records(Some(RecordKind::Expense), Some(1), false, "alice")
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    for record in &all {
        assert_eq!(
            record.state,
            RecordState::Consumed {
                closing_id: closing.id
            }
        );
    }
}

#[tokio::test]
async fn consumed_records_never_count_twice() {
    let (engine, _db) = engine_with_db().await;
    engine
        .create_record(RecordKind::BalanceSale, "alice", Some(1), 700, None)
        .await
        .unwrap();

    let first = engine
        .create_closing(inputs_for_till(1), "alice")
        .await
        .unwrap();
    assert_eq!(first.aggregates.balance_sales, 700);

    let second = engine
        .create_closing(inputs_for_till(1), "alice")
        .await
        .unwrap();
    assert_eq!(second.aggregates.balance_sales, 0);
}

#[tokio::test]
async fn each_kind_lands_in_its_own_aggregate() {
    let (engine, _db) = engine_with_db().await;
    engine
        .create_record(RecordKind::BalanceSale, "alice", Some(1), 1_000, None)
        .await
        .unwrap();
    engine
        .create_record(RecordKind::BalanceFlow, "alice", Some(1), 400, None)
        .await
        .unwrap();
    engine
        .create_record(RecordKind::Expense, "alice", Some(1), 300, None)
        .await
        .unwrap();
    engine
        .create_record(RecordKind::Loan, "alice", Some(1), 200, None)
        .await
        .unwrap();
    // Bill counts are consumed but never summed.
    engine
        .create_record(RecordKind::BillCount, "alice", Some(1), 55_000, None)
        .await
        .unwrap();

    let closing = engine
        .create_closing(inputs_for_till(1), "alice")
        .await
        .unwrap();
    assert_eq!(closing.aggregates.balance_sales, 1_000);
    assert_eq!(closing.aggregates.product_payments, 400);
    assert_eq!(closing.aggregates.expenses, 300);
    assert_eq!(closing.aggregates.agent_loans, 200);
    assert_eq!(
        closing.derived.efectivo_total,
        1_000 - 400 - 300 - 200
    );
    assert!(engine.latest_bill_count(1).await.unwrap().is_none());
}

#[tokio::test]
async fn consumed_records_are_frozen() {
    let (engine, _db) = engine_with_db().await;
    let record = engine
        .create_record(RecordKind::Expense, "alice", Some(1), 80, None)
        .await
        .unwrap();
    let closing = engine
        .create_closing(inputs_for_till(1), "alice")
        .await
        .unwrap();

    let err = engine
        .update_record(record.id, Some(90), None, "alice")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Consumed(closing.id.to_string()));

    let err = engine.deactivate_record(record.id, "alice").await.unwrap_err();
    assert_eq!(err, EngineError::Consumed(closing.id.to_string()));
}

#[tokio::test]
async fn closing_requires_a_till() {
    let (engine, _db) = engine_with_db().await;
    let err = engine
        .create_closing(inputs_for_till(0), "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn update_recomputes_but_keeps_the_captured_aggregates() {
    let (engine, _db) = engine_with_db().await;
    engine
        .create_record(RecordKind::Expense, "alice", Some(1), 100, None)
        .await
        .unwrap();
    let closing = engine
        .create_closing(
            ClosingInputs {
                initial_cash: 1_000,
                counted_cash: 900,
                ..inputs_for_till(1)
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(closing.derived.efectivo_total, 900);
    assert_eq!(closing.derived.faltante_sobrante, 0);

    // New records on the till after the fact change nothing.
    engine
        .create_record(RecordKind::Expense, "alice", Some(1), 500, None)
        .await
        .unwrap();

    let updated = engine
        .update_closing(
            closing.id,
            ClosingInputs {
                initial_cash: 1_000,
                counted_cash: 950,
                ..inputs_for_till(1)
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(updated.aggregates.expenses, 100);
    assert_eq!(updated.derived.efectivo_total, 900);
    assert_eq!(updated.derived.faltante_sobrante, 50);

    let err = engine
        .update_closing(closing.id, inputs_for_till(2), "alice")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("a closing cannot move to another till".to_string())
    );
}

#[tokio::test]
async fn finalized_closings_reject_updates() {
    let (engine, _db) = engine_with_db().await;
    let closing = engine
        .create_closing(
            ClosingInputs {
                initial_cash: 500,
                counted_cash: 450,
                ..inputs_for_till(1)
            },
            "alice",
        )
        .await
        .unwrap();
    engine
        .apply_adjustment(closing.id, -75, "bill counted twice", "alice")
        .await
        .unwrap();
    engine.deactivate_closing(closing.id, "alice").await.unwrap();

    // Replaying the original inputs must not roll the final result back.
    let err = engine
        .update_closing(
            closing.id,
            ClosingInputs {
                initial_cash: 500,
                counted_cash: 450,
                ..inputs_for_till(1)
            },
            "alice",
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidState("closing already finalized".to_string())
    );

    let stored = engine.closing(closing.id).await.unwrap();
    assert_eq!(stored.derived.efectivo_total, 425);
    assert_eq!(stored.derived.faltante_sobrante, 25);
}

#[tokio::test]
async fn closings_list_is_till_scoped_and_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let first = engine
        .create_closing(inputs_for_till(1), "alice")
        .await
        .unwrap();
    let second = engine
        .create_closing(inputs_for_till(1), "alice")
        .await
        .unwrap();
    engine
        .create_closing(inputs_for_till(2), "alice")
        .await
        .unwrap();

    let listed = engine.list_closings(1).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
}

#[tokio::test]
async fn only_inactive_closings_seed_the_next_opening() {
    let (engine, _db) = engine_with_db().await;
    let today = Utc::now().date_naive();

    assert_eq!(
        engine.last_inactive_closing_of_day(1, today).await.unwrap(),
        None
    );

    let closing = engine
        .create_closing(
            ClosingInputs {
                counted_cash: 123_400,
                ..inputs_for_till(1)
            },
            "alice",
        )
        .await
        .unwrap();

    // Still active, so still invisible.
    assert_eq!(
        engine.last_inactive_closing_of_day(1, today).await.unwrap(),
        None
    );

    engine.deactivate_closing(closing.id, "alice").await.unwrap();
    assert_eq!(
        engine.last_inactive_closing_of_day(1, today).await.unwrap(),
        Some(123_400)
    );
    assert_eq!(
        engine.last_inactive_closing_of_day(2, today).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn adjustment_moves_the_final_result_and_keeps_the_trail() {
    let (engine, _db) = engine_with_db().await;
    let closing = engine
        .create_closing(
            ClosingInputs {
                initial_cash: 500,
                counted_cash: 450,
                ..inputs_for_till(1)
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(closing.derived.efectivo_total, 500);

    let adjustment = engine
        .apply_adjustment(closing.id, -75, "bill counted twice", "alice")
        .await
        .unwrap();
    assert_eq!(adjustment.previous_final_result, 500);
    assert_eq!(adjustment.new_final_result, 425);
    assert_eq!(adjustment.previous_difference, -50);
    assert_eq!(adjustment.new_difference, 25);

    let stored = engine.closing(closing.id).await.unwrap();
    assert_eq!(stored.derived.efectivo_total, 425);
    assert_eq!(stored.derived.faltante_sobrante, 25);

    let history = engine.list_adjustments(closing.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0], adjustment);
}

#[tokio::test]
async fn adjustments_chain_and_read_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let closing = engine
        .create_closing(
            ClosingInputs {
                initial_cash: 1_000,
                counted_cash: 1_000,
                ..inputs_for_till(1)
            },
            "alice",
        )
        .await
        .unwrap();

    engine
        .apply_adjustment(closing.id, 200, "missed transfer", "alice")
        .await
        .unwrap();
    engine
        .apply_adjustment(closing.id, -50, "typo in expenses", "bruno")
        .await
        .unwrap();

    let history = engine.list_adjustments(closing.id).await.unwrap();
    assert_eq!(history.len(), 2);
    // Newest first; each entry is self-contained.
    assert_eq!(history[0].amount_minor, -50);
    assert_eq!(history[0].previous_final_result, 1_200);
    assert_eq!(history[0].new_final_result, 1_150);
    assert_eq!(history[1].amount_minor, 200);
    assert_eq!(history[1].previous_final_result, 1_000);

    let stored = engine.closing(closing.id).await.unwrap();
    assert_eq!(stored.derived.efectivo_total, 1_150);
}

#[tokio::test]
async fn zero_and_unjustified_adjustments_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let closing = engine
        .create_closing(
            ClosingInputs {
                initial_cash: 500,
                counted_cash: 500,
                ..inputs_for_till(1)
            },
            "alice",
        )
        .await
        .unwrap();

    let err = engine
        .apply_adjustment(closing.id, 0, "valid justification", "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let too_short = "x".repeat(MIN_JUSTIFICATION_LEN - 1);
    let err = engine
        .apply_adjustment(closing.id, 10, &too_short, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Nothing was written on either rejection.
    assert!(engine.list_adjustments(closing.id).await.unwrap().is_empty());
    let stored = engine.closing(closing.id).await.unwrap();
    assert_eq!(stored.derived.efectivo_total, 500);
}

#[tokio::test]
async fn permissions_gate_the_mutating_operations() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "INSERT INTO users (username, password, display_name) VALUES (?, ?, ?)",
        vec!["alice".into(), "password".into(), "alice".into()],
    ))
    .await
    .unwrap();

    let engine = Engine::builder()
        .database(db)
        .permissions(Arc::new(StaticPermissions::with_grants([(
            "alice",
            codes::RECORD_WRITE,
        )])))
        .build()
        .await
        .unwrap();

    engine
        .create_record(RecordKind::Expense, "alice", Some(1), 100, None)
        .await
        .unwrap();

    let err = engine
        .create_closing(inputs_for_till(1), "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}
