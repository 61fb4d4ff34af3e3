use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Indent header: one dealer sales order with its computed totals.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "indents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub enterprise_id: Uuid,

    #[validate(length(
        min = 1,
        max = 50,
        message = "Indent number must be between 1 and 50 characters"
    ))]
    pub indent_number: String,

    pub dealer_id: Uuid,
    pub dealer_user_id: Uuid,

    // Resolved organizational context snapshot
    pub legal_entity_id: Uuid,
    pub division_id: Uuid,
    pub plant_id: Uuid,
    pub sales_office_id: Uuid,
    pub sales_group_id: Uuid,

    pub status: String,

    // Totals; final_amount is the integer-rounded grand total and round_off
    // the adjustment applied to reach it.
    pub base_amount: Decimal,
    pub total_discount: Decimal,
    pub handling_charges: Decimal,
    pub total_tax: Decimal,
    pub total_tcs: Decimal,
    pub round_off: Decimal,
    pub final_amount: Decimal,
    pub total_weight: Decimal,

    // Delimited descriptive rollups (deduplicated, insertion-ordered)
    pub brand_names: Option<String>,
    pub item_descriptions: Option<String>,
    pub item_codes: Option<String>,

    pub created_by: String,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::indent_item::Entity")]
    IndentItem,
    #[sea_orm(has_many = "super::calculation_line::Entity")]
    CalculationLine,
}

impl Related<super::indent_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IndentItem.def()
    }
}

impl Related<super::calculation_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CalculationLine.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {}
