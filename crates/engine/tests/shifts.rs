use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{Engine, EngineError, OperationKind, RecordKind, ShiftState};
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

async fn assignment_for(engine: &Engine, user: &str) -> Uuid {
    let definition = match engine
        .create_definition("Morning", None, "06:00", "14:00")
        .await
    {
        Ok(definition) => definition,
        // Already created by an earlier call in the same test.
        Err(_) => engine
            .list_definitions()
            .await
            .unwrap()
            .into_iter()
            .next()
            .unwrap(),
    };
    engine
        .create_assignment(
            user,
            definition.id,
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn fresh_system_has_both_operations_free() {
    let (engine, _db) = engine_with_db().await;

    let availability = engine.operations_in_use().await.unwrap();
    assert_eq!(availability.agent.holder(), None);
    assert_eq!(availability.super_.holder(), None);

    // Idempotent without intervening writes.
    let again = engine.operations_in_use().await.unwrap();
    assert_eq!(availability, again);
}

#[tokio::test]
async fn activation_claims_the_operation_and_blocks_other_users() {
    let (engine, _db) = engine_with_db().await;
    let alice_shift = assignment_for(&engine, "alice").await;
    let bruno_shift = assignment_for(&engine, "bruno").await;

    engine
        .activate_shift(alice_shift, 1, OperationKind::Super, "alice")
        .await
        .unwrap();

    let availability = engine.operations_in_use().await.unwrap();
    assert_eq!(availability.super_.holder(), Some("alice"));
    assert_eq!(availability.agent.holder(), None);

    let err = engine
        .activate_shift(bruno_shift, 2, OperationKind::Super, "bruno")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::OperationInUse {
            operation: OperationKind::Super,
            holder: "alice".to_string(),
        }
    );

    // The rejected shift stays Unassigned.
    let bruno = engine.shift_assignment(bruno_shift, "bruno").await.unwrap();
    assert_eq!(bruno.state, ShiftState::Unassigned);
}

#[tokio::test]
async fn one_active_shift_per_user() {
    let (engine, _db) = engine_with_db().await;
    let first = assignment_for(&engine, "alice").await;
    let second = assignment_for(&engine, "alice").await;

    engine
        .activate_shift(first, 1, OperationKind::Super, "alice")
        .await
        .unwrap();

    // Rejected before the lock is even consulted: agent is free.
    let err = engine
        .activate_shift(second, 1, OperationKind::Agent, "alice")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AlreadyActive("alice".to_string()));

    let availability = engine.operations_in_use().await.unwrap();
    assert_eq!(availability.agent.holder(), None);
}

#[tokio::test]
async fn concurrent_activations_have_exactly_one_winner() {
    let (engine, _db) = engine_with_db().await;
    let alice_shift = assignment_for(&engine, "alice").await;
    let bruno_shift = assignment_for(&engine, "bruno").await;

    let (a, b) = tokio::join!(
        engine.activate_shift(alice_shift, 1, OperationKind::Agent, "alice"),
        engine.activate_shift(bruno_shift, 2, OperationKind::Agent, "bruno"),
    );
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);

    let availability = engine.operations_in_use().await.unwrap();
    assert!(availability.agent.holder().is_some());
}

#[tokio::test]
async fn finalize_requires_an_active_shift() {
    let (engine, _db) = engine_with_db().await;
    let shift = assignment_for(&engine, "alice").await;

    let err = engine.finalize_shift(shift, "alice").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidState("shift was never started".to_string())
    );

    let assignment = engine.shift_assignment(shift, "alice").await.unwrap();
    assert_eq!(assignment.state, ShiftState::Unassigned);
}

#[tokio::test]
async fn finalize_frees_the_slot_and_closes_bill_counts() {
    let (engine, _db) = engine_with_db().await;
    let alice_shift = assignment_for(&engine, "alice").await;
    let bruno_shift = assignment_for(&engine, "bruno").await;

    engine
        .activate_shift(alice_shift, 1, OperationKind::Super, "alice")
        .await
        .unwrap();
    engine
        .create_record(RecordKind::BillCount, "alice", Some(1), 42_000, None)
        .await
        .unwrap();
    assert!(engine.latest_bill_count(1).await.unwrap().is_some());

    let finished = engine.finalize_shift(alice_shift, "alice").await.unwrap();
    assert!(matches!(finished.state, ShiftState::Finished { .. }));

    // Slot is free again and stale counts are gone.
    assert!(engine.latest_bill_count(1).await.unwrap().is_none());
    engine
        .activate_shift(bruno_shift, 2, OperationKind::Super, "bruno")
        .await
        .unwrap();
}

#[tokio::test]
async fn finalize_twice_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let shift = assignment_for(&engine, "alice").await;

    engine
        .activate_shift(shift, 1, OperationKind::Agent, "alice")
        .await
        .unwrap();
    engine.finalize_shift(shift, "alice").await.unwrap();

    let err = engine.finalize_shift(shift, "alice").await.unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidState("shift already finished".to_string())
    );
}

#[tokio::test]
async fn reset_returns_the_shift_to_unassigned_and_frees_the_slot() {
    let (engine, _db) = engine_with_db().await;
    let shift = assignment_for(&engine, "alice").await;

    engine
        .activate_shift(shift, 1, OperationKind::Super, "alice")
        .await
        .unwrap();

    let reset = engine.reset_shift(shift, "alice").await.unwrap();
    assert_eq!(reset.state, ShiftState::Unassigned);
    assert_eq!(reset.till_number, None);
    assert_eq!(reset.operation, None);

    let availability = engine.operations_in_use().await.unwrap();
    assert_eq!(availability.super_.holder(), None);

    // The same assignment can start again after the mistake is undone.
    engine
        .activate_shift(shift, 1, OperationKind::Super, "alice")
        .await
        .unwrap();
}

#[tokio::test]
async fn activation_validates_till_number() {
    let (engine, _db) = engine_with_db().await;
    let shift = assignment_for(&engine, "alice").await;

    let err = engine
        .activate_shift(shift, 0, OperationKind::Agent, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn foreign_assignments_are_invisible() {
    let (engine, _db) = engine_with_db().await;
    let alice_shift = assignment_for(&engine, "alice").await;

    let err = engine
        .activate_shift(alice_shift, 1, OperationKind::Agent, "bruno")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("shift assignment not exists".to_string())
    );
}
