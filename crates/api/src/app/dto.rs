use serde::{Deserialize, Serialize};

use medisupply_auth::Caller;
use medisupply_core::{ClientId, Page};
use medisupply_orders::{OrderFilter, OrderStatus};

// -------------------------
// Query DTOs
// -------------------------

/// Filters accepted by the public order listing.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub estado: Option<OrderStatus>,
    pub id_cliente: Option<ClientId>,
}

impl From<OrderListQuery> for OrderFilter {
    fn from(q: OrderListQuery) -> Self {
        OrderFilter {
            status: q.estado,
            client_id: q.id_cliente,
            ..OrderFilter::default()
        }
    }
}

/// Internal listings page through bigger windows by default.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InternalPage {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "InternalPage::default_limit")]
    pub limit: usize,
}

impl InternalPage {
    pub const DEFAULT_LIMIT: usize = 1000;

    fn default_limit() -> usize {
        Self::DEFAULT_LIMIT
    }
}

impl From<InternalPage> for Page {
    fn from(p: InternalPage) -> Self {
        Page::new(p.skip, p.limit)
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub kind: &'static str,
    pub id: Option<i64>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
}

impl From<&Caller> for WhoAmI {
    fn from(caller: &Caller) -> Self {
        let principal = caller.principal();
        Self {
            kind: caller.kind(),
            id: principal.map(|p| p.id.get()),
            email: principal.map(|p| p.email.clone()),
            name: principal.and_then(|p| p.name.clone()),
            role: principal.and_then(|p| p.role.as_ref()).map(|r| r.as_str().to_string()),
        }
    }
}
