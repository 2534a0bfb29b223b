use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use medisupply_core::{CountryId, DomainError, DomainResult, PlanId, ProductId, UserId, VendorId};

/// Planning quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Period {
    Q1,
    Q2,
    Q3,
    Q4,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    #[default]
    Creado,
    EnEjecucion,
    Finalizado,
}

/// Uniqueness key: one plan per vendor, quarter, year and country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlanSlot {
    pub vendor_id: VendorId,
    pub period: Period,
    pub year: i32,
    pub country_id: CountryId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesPlan {
    pub id: PlanId,
    #[serde(rename = "vendedor_id")]
    pub vendor_id: VendorId,
    #[serde(rename = "periodo")]
    pub period: Period,
    #[serde(rename = "anio")]
    pub year: i32,
    #[serde(rename = "pais")]
    pub country_id: CountryId,
    #[serde(rename = "productos_objetivo")]
    pub target_products: Vec<ProductId>,
    #[serde(rename = "meta_monetaria_usd")]
    pub monetary_goal_usd: Option<f64>,
    #[serde(rename = "estado")]
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewPlan {
    #[serde(rename = "vendedor_id")]
    pub vendor_id: VendorId,
    #[serde(rename = "periodo")]
    pub period: Period,
    #[serde(rename = "anio")]
    pub year: i32,
    #[serde(rename = "pais")]
    pub country_id: CountryId,
    #[serde(rename = "productos_objetivo")]
    pub target_products: Vec<ProductId>,
    #[serde(rename = "meta_monetaria_usd", default)]
    pub monetary_goal_usd: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlanPatch {
    #[serde(rename = "productos_objetivo", default)]
    pub target_products: Option<Vec<ProductId>>,
    #[serde(rename = "meta_monetaria_usd", default)]
    pub monetary_goal_usd: Option<f64>,
    #[serde(rename = "estado", default)]
    pub status: Option<PlanStatus>,
}

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 9999;

/// De-duplicate and order the target list; it must not end up empty.
fn normalize_targets(targets: Vec<ProductId>) -> DomainResult<Vec<ProductId>> {
    if targets.iter().any(|p| p.get() <= 0) {
        return Err(DomainError::validation("productos_objetivo contains an invalid id"));
    }
    let set: BTreeSet<ProductId> = targets.into_iter().collect();
    if set.is_empty() {
        return Err(DomainError::validation("productos_objetivo is required"));
    }
    Ok(set.into_iter().collect())
}

/// Goals are strictly positive and kept to cents.
fn normalize_goal(goal: Option<f64>) -> DomainResult<Option<f64>> {
    let Some(v) = goal else {
        return Ok(None);
    };
    if !(v.is_finite() && v > 0.0) {
        return Err(DomainError::validation("meta_monetaria_usd must be > 0"));
    }

    // Scaling to cents can overflow for huge but finite inputs.
    let rounded = (v * 100.0).round() / 100.0;
    if !rounded.is_finite() || rounded <= 0.0 {
        return Err(DomainError::validation("meta_monetaria_usd is out of range"));
    }
    Ok(Some(rounded))
}

impl SalesPlan {
    pub fn create(
        id: PlanId,
        input: NewPlan,
        created_by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if input.vendor_id.get() <= 0 {
            return Err(DomainError::validation("vendedor_id must be positive"));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&input.year) {
            return Err(DomainError::validation(format!(
                "anio must be between {MIN_YEAR} and {MAX_YEAR}"
            )));
        }

        Ok(Self {
            id,
            vendor_id: input.vendor_id,
            period: input.period,
            year: input.year,
            country_id: input.country_id,
            target_products: normalize_targets(input.target_products)?,
            monetary_goal_usd: normalize_goal(input.monetary_goal_usd)?,
            status: PlanStatus::default(),
            created_at: now,
            created_by,
        })
    }

    pub fn slot(&self) -> PlanSlot {
        PlanSlot {
            vendor_id: self.vendor_id,
            period: self.period,
            year: self.year,
            country_id: self.country_id,
        }
    }

    pub fn apply(&mut self, patch: PlanPatch) -> DomainResult<()> {
        if self.status == PlanStatus::Finalizado {
            return Err(DomainError::invariant("a finished plan cannot be modified"));
        }

        let targets = patch.target_products.map(normalize_targets).transpose()?;
        let goal = normalize_goal(patch.monetary_goal_usd)?;

        if let Some(targets) = targets {
            self.target_products = targets;
        }
        if goal.is_some() {
            self.monetary_goal_usd = goal;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        Ok(())
    }

    pub fn ensure_deletable(&self) -> DomainResult<()> {
        if self.status == PlanStatus::EnEjecucion {
            return Err(DomainError::invariant("a plan in execution cannot be deleted"));
        }
        Ok(())
    }
}

impl NewPlan {
    pub fn slot(&self) -> PlanSlot {
        PlanSlot {
            vendor_id: self.vendor_id,
            period: self.period,
            year: self.year,
            country_id: self.country_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn new_plan() -> NewPlan {
        NewPlan {
            vendor_id: VendorId::new(4),
            period: Period::Q2,
            year: 2025,
            country_id: CountryId::new(1),
            target_products: vec![ProductId::new(3), ProductId::new(1), ProductId::new(3)],
            monetary_goal_usd: Some(15_000.456),
        }
    }

    #[test]
    fn create_normalizes_targets_and_goal() {
        let plan = SalesPlan::create(PlanId::new(1), new_plan(), Some(UserId::new(9)), test_time()).unwrap();
        assert_eq!(plan.target_products, vec![ProductId::new(1), ProductId::new(3)]);
        assert_eq!(plan.monetary_goal_usd, Some(15_000.46));
        assert_eq!(plan.status, PlanStatus::Creado);
        assert_eq!(plan.created_by, Some(UserId::new(9)));
    }

    #[test]
    fn create_rejects_empty_targets_bad_year_and_goal() {
        let mut input = new_plan();
        input.target_products.clear();
        assert!(SalesPlan::create(PlanId::new(1), input, None, test_time()).is_err());

        let mut input = new_plan();
        input.year = 1899;
        assert!(SalesPlan::create(PlanId::new(1), input, None, test_time()).is_err());

        let mut input = new_plan();
        input.monetary_goal_usd = Some(0.0);
        assert!(SalesPlan::create(PlanId::new(1), input, None, test_time()).is_err());
    }

    #[test]
    fn goal_too_large_to_round_is_rejected() {
        let mut input = new_plan();
        input.monetary_goal_usd = Some(1e307);
        assert!(matches!(
            SalesPlan::create(PlanId::new(1), input, None, test_time()),
            Err(DomainError::Validation(_))
        ));

        let mut plan = SalesPlan::create(PlanId::new(1), new_plan(), None, test_time()).unwrap();
        let err = plan
            .apply(PlanPatch { monetary_goal_usd: Some(f64::MAX), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(plan.monetary_goal_usd, Some(15_000.46));

        // A tiny positive goal would round to zero.
        let mut input = new_plan();
        input.monetary_goal_usd = Some(0.001);
        assert!(SalesPlan::create(PlanId::new(1), input, None, test_time()).is_err());
    }

    #[test]
    fn period_uses_quarter_labels_on_the_wire() {
        let plan: NewPlan = serde_json::from_str(
            r#"{"vendedor_id":1,"periodo":"Q4","anio":2026,"pais":2,"productos_objetivo":[5]}"#,
        )
        .unwrap();
        assert_eq!(plan.period, Period::Q4);
        assert!(serde_json::from_str::<Period>(r#""Q5""#).is_err());
    }

    #[test]
    fn plan_in_execution_cannot_be_deleted() {
        let mut plan = SalesPlan::create(PlanId::new(1), new_plan(), None, test_time()).unwrap();
        assert!(plan.ensure_deletable().is_ok());

        plan.apply(PlanPatch { status: Some(PlanStatus::EnEjecucion), ..Default::default() }).unwrap();
        assert!(matches!(plan.ensure_deletable(), Err(DomainError::InvariantViolation(_))));
    }

    #[test]
    fn finished_plan_is_frozen() {
        let mut plan = SalesPlan::create(PlanId::new(1), new_plan(), None, test_time()).unwrap();
        plan.apply(PlanPatch { status: Some(PlanStatus::Finalizado), ..Default::default() }).unwrap();

        let err = plan
            .apply(PlanPatch { target_products: Some(vec![ProductId::new(8)]), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn slot_identifies_vendor_quarter_year_country() {
        let plan = SalesPlan::create(PlanId::new(1), new_plan(), None, test_time()).unwrap();
        assert_eq!(plan.slot(), new_plan().slot());

        let mut other = new_plan();
        other.period = Period::Q3;
        assert_ne!(plan.slot(), other.slot());
    }

    proptest! {
        /// Normalized targets are sorted, unique and cover the input set.
        #[test]
        fn targets_are_sorted_and_unique(ids in prop::collection::vec(1i64..50, 1..20)) {
            let mut input = new_plan();
            input.target_products = ids.iter().copied().map(ProductId::new).collect();
            let plan = SalesPlan::create(PlanId::new(1), input, None, test_time()).unwrap();

            prop_assert!(plan.target_products.windows(2).all(|w| w[0] < w[1]));
            for id in ids {
                prop_assert!(plan.target_products.contains(&ProductId::new(id)));
            }
        }
    }
}
