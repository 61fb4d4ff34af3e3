use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Material/SKU master record used for line-item resolution.
///
/// `trading_material_code` carries the alternate trading-SKU alias that the
/// resolver falls back to when the primary code search misses.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub enterprise_id: Uuid,

    pub material_code: String,
    pub trading_material_code: Option<String>,
    pub quality_code: Option<String>,
    pub division_id: Option<Uuid>,
    pub plant_id: Option<Uuid>,

    pub description: Option<String>,
    pub brand: Option<String>,

    /// Weight per sales unit, kilograms
    pub gross_weight: Decimal,
    /// Weight per piece, kilograms
    pub net_weight: Decimal,

    pub is_active: bool,
    pub is_displayed: bool,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {}
