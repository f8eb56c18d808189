//! Access-control issuance boundary.

use std::sync::atomic::{AtomicI64, Ordering};

use thiserror::Error;

use shoebox_catalog::{CatalogError, CatalogStore};
use shoebox_core::AclId;

/// Permissions granted to the owning user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AclFlags {
    pub read: bool,
    pub modify: bool,
    pub create: bool,
    pub delete: bool,
}

impl AclFlags {
    /// Every permission.
    pub const FULL: Self = Self {
        read: true,
        modify: true,
        create: true,
        delete: true,
    };
}

#[derive(Debug, Error)]
pub enum AclError {
    #[error("Invalid user id {user_id}")]
    InvalidUser { user_id: i64 },

    #[error("Access control service unavailable: {message}")]
    Unavailable { message: String },
}

/// Creates an access-control list for each new entry.
pub trait AclIssuer: Send + Sync {
    fn create_acl(&self, user_id: i64, flags: AclFlags) -> Result<AclId, AclError>;
}

/// Hands out increasing ids, continuing after the highest one already in
/// the catalog.
#[derive(Debug)]
pub struct SequentialAclIssuer {
    last: AtomicI64,
}

impl SequentialAclIssuer {
    /// Start after `last`; the first id issued is `last + 1`.
    pub fn new(last: i64) -> Self {
        Self {
            last: AtomicI64::new(last),
        }
    }

    /// Continue from the catalog's highest ACL id.
    pub fn from_catalog(store: &impl CatalogStore) -> Result<Self, CatalogError> {
        Ok(Self::new(store.max_acl_id()?.unwrap_or(0)))
    }
}

impl AclIssuer for SequentialAclIssuer {
    fn create_acl(&self, user_id: i64, _flags: AclFlags) -> Result<AclId, AclError> {
        if user_id < 1 {
            return Err(AclError::InvalidUser { user_id });
        }
        Ok(AclId(self.last.fetch_add(1, Ordering::Relaxed) + 1))
    }
}
