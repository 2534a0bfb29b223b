use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use medisupply_core::{ClientId, DomainError, DomainResult, OrderId, ProductId, VehicleId, VendorId};

/// Order lifecycle as stored by the order-service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Abierto,
    PorAlistar,
    EnAlistamiento,
    EnReparto,
    Entregado,
    Devuelto,
}

/// One product line of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "id_producto")]
    pub product_id: ProductId,
    #[serde(rename = "cantidad")]
    pub quantity: i64,
}

/// A delivery order. Field names on the wire follow the order-service API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(rename = "fecha_entrega_estimada")]
    pub estimated_delivery: DateTime<Utc>,
    #[serde(rename = "id_vehiculo")]
    pub vehicle_id: Option<VehicleId>,
    #[serde(rename = "id_cliente")]
    pub client_id: ClientId,
    #[serde(rename = "id_vendedor")]
    pub vendor_id: VendorId,
    #[serde(rename = "estado")]
    pub status: OrderStatus,
    #[serde(rename = "fecha_creacion")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "productos")]
    pub lines: Vec<OrderLine>,
}

/// Input for creating an order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewOrder {
    #[serde(rename = "fecha_entrega_estimada")]
    pub estimated_delivery: DateTime<Utc>,
    #[serde(rename = "id_vehiculo", default)]
    pub vehicle_id: Option<VehicleId>,
    #[serde(rename = "id_cliente")]
    pub client_id: ClientId,
    #[serde(rename = "id_vendedor")]
    pub vendor_id: VendorId,
    #[serde(rename = "productos", default)]
    pub lines: Vec<OrderLine>,
    #[serde(rename = "estado", default)]
    pub status: Option<OrderStatus>,
}

/// Partial update. Absent fields are left untouched; `productos`, when
/// present, replaces every line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderPatch {
    #[serde(rename = "fecha_entrega_estimada", default)]
    pub estimated_delivery: Option<DateTime<Utc>>,
    #[serde(rename = "id_vehiculo", default)]
    pub vehicle_id: Option<VehicleId>,
    #[serde(rename = "id_cliente", default)]
    pub client_id: Option<ClientId>,
    #[serde(rename = "id_vendedor", default)]
    pub vendor_id: Option<VendorId>,
    #[serde(rename = "estado", default)]
    pub status: Option<OrderStatus>,
    #[serde(rename = "productos", default)]
    pub lines: Option<Vec<OrderLine>>,
}

fn validate_lines(lines: &[OrderLine]) -> DomainResult<()> {
    for line in lines {
        if line.quantity <= 0 {
            return Err(DomainError::validation(format!(
                "cantidad must be positive for product {}",
                line.product_id
            )));
        }
        if line.product_id.get() <= 0 {
            return Err(DomainError::validation("id_producto must be positive"));
        }
    }
    Ok(())
}

fn validate_refs(client_id: ClientId, vendor_id: VendorId) -> DomainResult<()> {
    if client_id.get() <= 0 {
        return Err(DomainError::validation("id_cliente must be positive"));
    }
    if vendor_id.get() <= 0 {
        return Err(DomainError::validation("id_vendedor must be positive"));
    }
    Ok(())
}

impl NewOrder {
    pub fn validate(&self) -> DomainResult<()> {
        validate_refs(self.client_id, self.vendor_id)?;
        validate_lines(&self.lines)
    }
}

impl Order {
    /// Build an order from validated input.
    pub fn create(id: OrderId, input: NewOrder, now: DateTime<Utc>) -> DomainResult<Self> {
        input.validate()?;
        Ok(Self {
            id,
            estimated_delivery: input.estimated_delivery,
            vehicle_id: input.vehicle_id,
            client_id: input.client_id,
            vendor_id: input.vendor_id,
            status: input.status.unwrap_or_default(),
            created_at: now,
            lines: input.lines,
        })
    }

    /// Only open orders can be changed.
    pub fn is_modifiable(&self) -> bool {
        matches!(self.status, OrderStatus::Abierto)
    }

    pub fn apply(&mut self, patch: OrderPatch) -> DomainResult<()> {
        if !self.is_modifiable() {
            return Err(DomainError::invariant("order status does not allow changes"));
        }

        validate_refs(
            patch.client_id.unwrap_or(self.client_id),
            patch.vendor_id.unwrap_or(self.vendor_id),
        )?;
        if let Some(lines) = &patch.lines {
            validate_lines(lines)?;
        }

        if let Some(v) = patch.estimated_delivery {
            self.estimated_delivery = v;
        }
        if let Some(v) = patch.vehicle_id {
            self.vehicle_id = Some(v);
        }
        if let Some(v) = patch.client_id {
            self.client_id = v;
        }
        if let Some(v) = patch.vendor_id {
            self.vendor_id = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(lines) = patch.lines {
            self.lines = lines;
        }
        Ok(())
    }
}

/// Listing filters. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderFilter {
    #[serde(rename = "estado", default)]
    pub status: Option<OrderStatus>,
    #[serde(rename = "id_cliente", default)]
    pub client_id: Option<ClientId>,
    #[serde(rename = "id_vendedor", default)]
    pub vendor_id: Option<VendorId>,
    /// Inclusive lower bound on the creation time.
    #[serde(rename = "fecha_desde", default, deserialize_with = "crate::datetime::deserialize_opt")]
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the creation time.
    #[serde(rename = "fecha_hasta", default, deserialize_with = "crate::datetime::deserialize_opt")]
    pub created_until: Option<DateTime<Utc>>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|s| s == order.status)
            && self.client_id.is_none_or(|c| c == order.client_id)
            && self.vendor_id.is_none_or(|v| v == order.vendor_id)
            && self.created_from.is_none_or(|from| order.created_at >= from)
            && self.created_until.is_none_or(|until| order.created_at <= until)
    }
}
