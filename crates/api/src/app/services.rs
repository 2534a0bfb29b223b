//! Storage wiring and the operations the route handlers call.

use std::sync::Arc;

use chrono::Utc;

use medisupply_clients::{Client, ClientPatch, NewClient, normalize_nit};
use medisupply_core::{ClientId, DomainResult, OrderId, Page, PlanId};
use medisupply_infra::{InMemoryStore, Store};
use medisupply_orders::{NewOrder, Order, OrderFilter, OrderPatch};
use medisupply_sales::{NewPlan, PlanAuditEntry, PlanPatch, SalesPlan};

use crate::context::CallerContext;

#[derive(Clone)]
pub struct AppServices {
    clients: Arc<dyn Store<ClientId, Client>>,
    orders: Arc<dyn Store<OrderId, Order>>,
    plans: Arc<dyn Store<PlanId, SalesPlan>>,
    plan_audit: Arc<dyn Store<i64, PlanAuditEntry>>,
}

impl AppServices {
    pub fn in_memory() -> Self {
        Self {
            clients: Arc::new(InMemoryStore::new()),
            orders: Arc::new(InMemoryStore::new()),
            plans: Arc::new(InMemoryStore::new()),
            plan_audit: Arc::new(InMemoryStore::new()),
        }
    }

    // -------------------------
    // Clients
    // -------------------------

    pub fn register_client(&self, ctx: &CallerContext, input: NewClient) -> DomainResult<Client> {
        let client = Client::register(ClientId::new(self.clients.next_id()), input, Utc::now())?;
        self.clients
            .insert_unique(client.id, client.clone(), &|existing, new| existing.nit == new.nit)?;
        tracing::info!(client_id = %client.id, actor = ctx.actor(), "client registered");
        Ok(client)
    }

    pub fn list_clients(&self, page: Page) -> Vec<Client> {
        page.apply(self.clients.list())
    }

    pub fn get_client(&self, id: ClientId) -> Option<Client> {
        self.clients.get(&id)
    }

    /// Lookup by NIT, with the same separator rules as registration.
    pub fn get_client_by_nit(&self, raw: &str) -> DomainResult<Option<Client>> {
        let nit = normalize_nit(raw)?;
        Ok(self.clients.list().into_iter().find(|c| c.nit == nit))
    }

    pub fn update_client(&self, ctx: &CallerContext, id: ClientId, patch: ClientPatch) -> DomainResult<Client> {
        let now = Utc::now();
        let updated = self.clients.update(&id, &mut |client| client.apply(patch.clone(), now))?;
        tracing::info!(client_id = %id, actor = ctx.actor(), "client updated");
        Ok(updated)
    }

    pub fn validate_client(&self, ctx: &CallerContext, id: ClientId) -> DomainResult<Client> {
        let now = Utc::now();
        let updated = self.clients.update(&id, &mut |client| {
            client.mark_validated(now);
            Ok(())
        })?;
        tracing::info!(client_id = %id, actor = ctx.actor(), "client validated");
        Ok(updated)
    }

    pub fn delete_client(&self, ctx: &CallerContext, id: ClientId) -> DomainResult<Client> {
        let removed = self.clients.remove_if(&id, &|_| Ok(()))?;
        tracing::info!(client_id = %id, actor = ctx.actor(), "client deleted");
        Ok(removed)
    }

    // -------------------------
    // Orders
    // -------------------------

    pub fn create_order(&self, input: NewOrder) -> DomainResult<Order> {
        input.validate()?;
        let order = Order::create(OrderId::new(self.orders.next_id()), input, Utc::now())?;
        self.orders.insert_unique(order.id, order.clone(), &|_, _| false)?;
        tracing::info!(order_id = %order.id, "order created");
        Ok(order)
    }

    pub fn list_orders(&self, filter: &OrderFilter, page: Page) -> Vec<Order> {
        page.apply(self.orders.list().into_iter().filter(|o| filter.matches(o)))
    }

    pub fn get_order(&self, id: OrderId) -> Option<Order> {
        self.orders.get(&id)
    }

    pub fn update_order(&self, id: OrderId, patch: OrderPatch) -> DomainResult<Order> {
        self.orders.update(&id, &mut |order| order.apply(patch.clone()))
    }

    pub fn delete_order(&self, id: OrderId) -> DomainResult<Order> {
        self.orders.remove_if(&id, &|_| Ok(()))
    }

    // -------------------------
    // Sales plans
    // -------------------------

    pub fn create_plan(&self, ctx: &CallerContext, input: NewPlan) -> DomainResult<SalesPlan> {
        let id = PlanId::new(self.plans.next_id());
        let plan = SalesPlan::create(id, input, ctx.user_id(), Utc::now())?;
        self.plans
            .insert_unique(id, plan.clone(), &|existing, new| existing.slot() == new.slot())?;
        self.audit(ctx, None, Some(&plan));
        Ok(plan)
    }

    pub fn list_plans(&self, page: Page) -> Vec<SalesPlan> {
        page.apply(self.plans.list())
    }

    pub fn get_plan(&self, id: PlanId) -> Option<SalesPlan> {
        self.plans.get(&id)
    }

    pub fn update_plan(&self, ctx: &CallerContext, id: PlanId, patch: PlanPatch) -> DomainResult<SalesPlan> {
        let mut before = None;
        let updated = self.plans.update(&id, &mut |plan| {
            before = Some(plan.clone());
            plan.apply(patch.clone())
        })?;
        self.audit(ctx, before.as_ref(), Some(&updated));
        Ok(updated)
    }

    pub fn delete_plan(&self, ctx: &CallerContext, id: PlanId) -> DomainResult<SalesPlan> {
        let removed = self.plans.remove_if(&id, &SalesPlan::ensure_deletable)?;
        self.audit(ctx, Some(&removed), None);
        Ok(removed)
    }

    pub fn plan_audit(&self, id: PlanId) -> Vec<PlanAuditEntry> {
        self.plan_audit
            .list()
            .into_iter()
            .filter(|entry| entry.plan_id == id)
            .collect()
    }

    fn audit(&self, ctx: &CallerContext, before: Option<&SalesPlan>, after: Option<&SalesPlan>) {
        let Some(entry) = PlanAuditEntry::record(before, after, ctx.user_id(), ctx.audit_origin(), Utc::now())
        else {
            return;
        };
        tracing::info!(
            plan_id = %entry.plan_id,
            operation = ?entry.operation,
            origin = ?entry.origin,
            "sales plan changed"
        );
        let key = self.plan_audit.next_id();
        if let Err(err) = self.plan_audit.insert_unique(key, entry, &|_, _| false) {
            tracing::error!(error = %err, "failed to record plan audit entry");
        }
    }
}

impl Default for AppServices {
    fn default() -> Self {
        Self::in_memory()
    }
}
