//! Domain engine for shift tracking and cash-closing reconciliation.
//!
//! The [`Engine`] wraps a sea-orm connection and exposes the four core
//! workflows: shift lifecycle with system-wide operation exclusivity,
//! financial record CRUD, closing aggregation (pull open records, sum,
//! consume), and the append-only adjustment ledger.

pub use adjustments::Adjustment;
pub use closings::{
    Closing, ClosingDerived, ClosingInputs, RecordAggregates, compute_derived,
};
pub use error::EngineError;
pub use financial_records::{FinancialRecord, RecordKind, RecordState};
pub use operation_locks::{Availability, LockState};
pub use ops::{Engine, MIN_JUSTIFICATION_LEN};
pub use permissions::{PermissionChecker, StaticPermissions, codes};
pub use shift_assignments::{OperationKind, ShiftAssignment, ShiftState};
pub use shift_definitions::ShiftDefinition;

mod adjustments;
mod closings;
mod error;
mod financial_records;
mod operation_locks;
mod ops;
mod permissions;
mod shift_assignments;
mod shift_definitions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
