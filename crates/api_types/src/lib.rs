//! Wire types shared by the HTTP server and its clients.
//!
//! All monetary fields are integer minor units. Enum payloads use
//! snake_case strings on the wire.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod shift {
    use super::*;

    /// System-wide operation type a shift binds to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum OperationType {
        Agent,
        Super,
    }

    /// Request body for creating an assignment.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AssignmentNew {
        pub shift_definition_id: Uuid,
        pub day: NaiveDate,
    }

    /// Request body for `POST /shifts/{id}/start`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ShiftStart {
        pub operation_type: OperationType,
        pub till_number: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case", tag = "state")]
    pub enum ShiftStateView {
        Unassigned,
        Active {
            since: DateTime<Utc>,
        },
        Finished {
            since: DateTime<Utc>,
            until: DateTime<Utc>,
        },
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ShiftView {
        pub id: Uuid,
        pub user_id: String,
        pub shift_definition_id: Uuid,
        pub day: NaiveDate,
        pub till_number: Option<i32>,
        pub operation_type: Option<OperationType>,
        #[serde(flatten)]
        pub state: ShiftStateView,
    }

    /// One slot of the availability report.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OperationSlot {
        pub in_use: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub holder: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub since: Option<DateTime<Utc>>,
    }

    /// Response for `GET /shifts/operations-in-use`.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OperationsInUse {
        pub agent_operation: OperationSlot,
        pub super_operation: OperationSlot,
    }
}

pub mod definition {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DefinitionNew {
        pub name: String,
        #[serde(default)]
        pub description: Option<String>,
        pub scheduled_start: String,
        pub scheduled_end: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DefinitionView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub scheduled_start: String,
        pub scheduled_end: String,
    }
}

pub mod record {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum RecordKind {
        Loan,
        Expense,
        BillCount,
        BalanceFlow,
        BalanceSale,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordNew {
        pub kind: RecordKind,
        #[serde(default)]
        pub till_number: Option<i32>,
        pub amount_minor: i64,
        #[serde(default)]
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordUpdate {
        #[serde(default)]
        pub amount_minor: Option<i64>,
        #[serde(default)]
        pub description: Option<String>,
    }

    /// Query string for `GET /records`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RecordQuery {
        #[serde(default)]
        pub kind: Option<RecordKind>,
        #[serde(default)]
        pub till: Option<i32>,
        /// Only records not yet consumed by a closing.
        #[serde(default)]
        pub open: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordView {
        pub id: Uuid,
        pub kind: RecordKind,
        pub user_id: String,
        pub till_number: Option<i32>,
        pub amount_minor: i64,
        pub description: Option<String>,
        pub active: bool,
        pub created_at: DateTime<Utc>,
        pub closing_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordsResponse {
        pub records: Vec<RecordView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LatestBillCount {
        pub record: Option<RecordView>,
    }
}

pub mod closing {
    use super::*;

    /// Opening cash used when a till has no prior finalized closing.
    pub const DEFAULT_OPENING_CASH_MINOR: i64 = 100_000;

    /// Operator inputs for `POST /closings` and `PATCH /closings/{id}`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ClosingPayload {
        pub till_number: i32,
        #[serde(default)]
        pub shift_assignment_id: Option<Uuid>,
        #[serde(default)]
        pub initial_cash: i64,
        #[serde(default)]
        pub counted_cash: i64,
        #[serde(default)]
        pub cash_sales: i64,
        #[serde(default)]
        pub credit_sales: i64,
        #[serde(default)]
        pub pos_sales: i64,
        #[serde(default)]
        pub transfer_bancolombia: i64,
        #[serde(default)]
        pub transfer_nequi: i64,
        #[serde(default)]
        pub transfer_daviplata: i64,
        #[serde(default)]
        pub house_additional: i64,
        #[serde(default)]
        pub agent_additional: i64,
        #[serde(default)]
        pub credit_payments: i64,
        #[serde(default)]
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ClosingView {
        pub id: Uuid,
        pub user_id: String,
        pub till_number: i32,
        pub shift_assignment_id: Option<Uuid>,
        pub initial_cash: i64,
        pub counted_cash: i64,
        pub cash_sales: i64,
        pub credit_sales: i64,
        pub pos_sales: i64,
        pub transfer_bancolombia: i64,
        pub transfer_nequi: i64,
        pub transfer_daviplata: i64,
        pub house_additional: i64,
        pub agent_additional: i64,
        pub credit_payments: i64,
        pub balance_sales: i64,
        pub product_payments: i64,
        pub expenses: i64,
        pub agent_loans: i64,
        pub total_spv: i64,
        pub efectivo_total: i64,
        pub faltante_sobrante: i64,
        pub notes: Option<String>,
        pub active: bool,
        pub closed_at: DateTime<Utc>,
    }

    /// Query string for `GET /closings/last-inactive-of-day`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LastInactiveQuery {
        pub till: i32,
        /// Defaults to the current UTC day.
        #[serde(default)]
        pub day: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LastInactiveResponse {
        pub till_number: i32,
        pub counted_cash_minor: i64,
        /// False when no prior closing existed and the default was applied.
        pub from_previous_closing: bool,
    }
}

pub mod adjustment {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AdjustmentNew {
        pub amount_minor: i64,
        pub justification: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AdjustmentView {
        pub id: Uuid,
        pub closing_id: Uuid,
        pub user_id: String,
        pub amount_minor: i64,
        pub previous_final_result: i64,
        pub new_final_result: i64,
        pub previous_difference: i64,
        pub new_difference: i64,
        pub justification: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AdjustmentsResponse {
        pub adjustments: Vec<AdjustmentView>,
    }
}
