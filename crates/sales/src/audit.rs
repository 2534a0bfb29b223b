//! Audit trail for sales plan changes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use medisupply_core::{PlanId, UserId};

use crate::SalesPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOperation {
    Create,
    Update,
    Delete,
}

/// Where the change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditOrigin {
    /// A user acting through the public API.
    Manual,
    /// Another service, authenticated with the internal key.
    Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanAuditEntry {
    pub plan_id: PlanId,
    #[serde(rename = "operacion")]
    pub operation: AuditOperation,
    #[serde(rename = "usuario_id")]
    pub user_id: Option<UserId>,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "datos_anteriores")]
    pub previous: Option<serde_json::Value>,
    #[serde(rename = "datos_nuevos")]
    pub current: Option<serde_json::Value>,
    #[serde(rename = "origen")]
    pub origin: AuditOrigin,
}

fn snapshot(plan: &SalesPlan) -> serde_json::Value {
    serde_json::json!({
        "productos_objetivo": plan.target_products,
        "meta_monetaria_usd": plan.monetary_goal_usd,
        "estado": plan.status,
    })
}

impl PlanAuditEntry {
    /// Record the transition `before` → `after` of one plan.
    ///
    /// `before` is `None` on creation, `after` is `None` on deletion.
    pub fn record(
        before: Option<&SalesPlan>,
        after: Option<&SalesPlan>,
        user_id: Option<UserId>,
        origin: AuditOrigin,
        at: DateTime<Utc>,
    ) -> Option<Self> {
        let (plan_id, operation) = match (before, after) {
            (None, Some(p)) => (p.id, AuditOperation::Create),
            (Some(p), Some(_)) => (p.id, AuditOperation::Update),
            (Some(p), None) => (p.id, AuditOperation::Delete),
            (None, None) => return None,
        };

        Some(Self {
            plan_id,
            operation,
            user_id,
            timestamp: at,
            previous: before.map(snapshot),
            current: after.map(snapshot),
            origin,
        })
    }
}
