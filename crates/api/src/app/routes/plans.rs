//! Sales plans. Any authenticated caller may read; creating needs `Admin` or
//! `Vendedor`; changing or deleting needs `Admin` or being the plan's author.

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use medisupply_auth::Role;
use medisupply_core::{Page, PlanId};
use medisupply_sales::{NewPlan, PlanPatch, SalesPlan};

use crate::app::extract::{ApiJson, ApiQuery};
use crate::app::{errors, services::AppServices};
use crate::context::CallerContext;

const CREATE_ROLES: [Role; 2] = [Role::ADMIN, Role::VENDOR];
const OVERRIDE_ROLES: [Role; 1] = [Role::ADMIN];

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_plans).post(create_plan))
        .route(
            "/:id",
            get(get_plan).put(update_plan).patch(update_plan).delete(delete_plan),
        )
        .route("/:id/auditoria", get(plan_audit))
}

fn parse_plan_id(raw: &str) -> Result<PlanId, Response> {
    raw.parse().map_err(errors::domain_error_to_response)
}

/// Load a plan and check the caller may change it.
fn load_for_change(services: &AppServices, ctx: &CallerContext, id: PlanId) -> Result<SalesPlan, Response> {
    let plan = services
        .get_plan(id)
        .ok_or_else(|| errors::json_error(StatusCode::NOT_FOUND, "not_found", "plan not found"))?;
    ctx.require_owner_or_role(plan.created_by, &OVERRIDE_ROLES)
        .map_err(errors::forbidden)?;
    Ok(plan)
}

pub async fn create_plan(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<CallerContext>,
    ApiJson(body): ApiJson<NewPlan>,
) -> Response {
    if let Err(e) = ctx.require_any_role(&CREATE_ROLES) {
        return errors::forbidden(e);
    }
    match services.create_plan(&ctx, body) {
        Ok(plan) => (StatusCode::CREATED, Json(plan)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_plans(Extension(services): Extension<AppServices>, ApiQuery(page): ApiQuery<Page>) -> Response {
    Json(services.list_plans(page)).into_response()
}

pub async fn get_plan(Extension(services): Extension<AppServices>, Path(id): Path<String>) -> Response {
    let id = match parse_plan_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.get_plan(id) {
        Some(plan) => Json(plan).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "plan not found"),
    }
}

pub async fn update_plan(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<PlanPatch>,
) -> Response {
    let result = parse_plan_id(&id)
        .and_then(|id| load_for_change(&services, &ctx, id))
        .and_then(|plan| {
            services
                .update_plan(&ctx, plan.id, body)
                .map_err(errors::domain_error_to_response)
        });
    match result {
        Ok(plan) => Json(plan).into_response(),
        Err(res) => res,
    }
}

pub async fn delete_plan(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Response {
    let result = parse_plan_id(&id)
        .and_then(|id| load_for_change(&services, &ctx, id))
        .and_then(|plan| {
            services
                .delete_plan(&ctx, plan.id)
                .map_err(errors::domain_error_to_response)
        });
    match result {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(res) => res,
    }
}

pub async fn plan_audit(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Response {
    if let Err(e) = ctx.require_any_role(&OVERRIDE_ROLES) {
        return errors::forbidden(e);
    }
    let id = match parse_plan_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    // Deleted plans keep their trail; ids that never existed are 404.
    let trail = services.plan_audit(id);
    if trail.is_empty() && services.get_plan(id).is_none() {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "plan not found");
    }
    Json(trail).into_response()
}
