//! Permission gate for mutating operations.
//!
//! Role and permission storage lives outside the engine; the engine only
//! calls [`PermissionChecker::has_permission`] and rejects with
//! `EngineError::Forbidden` when it returns false. The server crate provides
//! the database-backed implementation; [`StaticPermissions`] covers tests
//! and embedded use.

use std::collections::HashSet;

use async_trait::async_trait;
use sea_orm::DbErr;

/// Permission codes gating the engine's mutating operations.
pub mod codes {
    pub const SHIFT_ACTIVATE: &str = "shift.activate";
    pub const SHIFT_FINALIZE: &str = "shift.finalize";
    pub const SHIFT_RESET: &str = "shift.reset";
    pub const CLOSING_CREATE: &str = "closing.create";
    pub const CLOSING_UPDATE: &str = "closing.update";
    pub const CLOSING_ADJUST: &str = "closing.adjust";
    pub const RECORD_WRITE: &str = "record.write";
}

#[async_trait]
pub trait PermissionChecker: Send + Sync {
    async fn has_permission(&self, user_id: &str, code: &str) -> Result<bool, DbErr>;
}

/// In-memory allow-list checker.
#[derive(Debug, Default)]
pub struct StaticPermissions {
    grants: HashSet<(String, String)>,
    allow_all: bool,
}

impl StaticPermissions {
    /// A checker that grants everything to everyone.
    pub fn allow_all() -> Self {
        Self {
            grants: HashSet::new(),
            allow_all: true,
        }
    }

    pub fn with_grants<I, S>(grants: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            grants: grants
                .into_iter()
                .map(|(user, code)| (user.into(), code.into()))
                .collect(),
            allow_all: false,
        }
    }
}

#[async_trait]
impl PermissionChecker for StaticPermissions {
    async fn has_permission(&self, user_id: &str, code: &str) -> Result<bool, DbErr> {
        if self.allow_all {
            return Ok(true);
        }
        Ok(self
            .grants
            .contains(&(user_id.to_string(), code.to_string())))
    }
}
