//! Alert lifecycle.
//!
//! An alert moves forward only: `acknowledged` and `resolved` each flip from
//! false to true once and never back. Resolving does not require a prior
//! acknowledgement.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use thiserror::Error;

use crate::models::Alert;

#[derive(Debug, Error, PartialEq)]
pub enum LifecycleError {
    #[error("alert {0} is already acknowledged")]
    AlreadyAcknowledged(i32),

    #[error("alert {0} is already resolved")]
    AlreadyResolved(i32),
}

#[derive(AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::alerts)]
pub struct AlertAcknowledgement {
    pub acknowledged: bool,
    pub acknowledged_by: i32,
    pub acknowledged_at: DateTime<Utc>,
}

#[derive(AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::alerts)]
pub struct AlertResolution {
    pub resolved: bool,
    pub resolved_at: DateTime<Utc>,
}

pub fn acknowledge(
    alert: &Alert,
    user_id: i32,
    now: DateTime<Utc>,
) -> Result<AlertAcknowledgement, LifecycleError> {
    if alert.acknowledged {
        return Err(LifecycleError::AlreadyAcknowledged(alert.id));
    }
    Ok(AlertAcknowledgement {
        acknowledged: true,
        acknowledged_by: user_id,
        acknowledged_at: now,
    })
}

pub fn resolve(alert: &Alert, now: DateTime<Utc>) -> Result<AlertResolution, LifecycleError> {
    if alert.resolved {
        return Err(LifecycleError::AlreadyResolved(alert.id));
    }
    Ok(AlertResolution {
        resolved: true,
        resolved_at: now,
    })
}
