use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Enterprise-scoped calculation rule (read-only to the engine).
///
/// Maintained by configuration admins; the pipeline only ever reads these,
/// ordered by `sequence`, to decide which submitted calculation lines count
/// toward discounts, handling charges, and taxes.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "calculation_definitions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub enterprise_id: Uuid,
    pub legal_entity_id: Option<Uuid>,

    /// "item" or "order"
    pub entity_type: String,
    /// PRICE, DISCOUNT, TAX, MANUAL_DISCOUNT, HANDLING_CHARGE, OTHER_CHARGES
    pub calc_type: String,

    pub code: String,
    pub description: Option<String>,
    pub value: Decimal,
    /// "%" or "flat"
    pub unit: String,
    pub sequence: i32,

    pub is_addition: bool,
    pub is_compound: bool,
    pub depends_on: Option<String>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {}
