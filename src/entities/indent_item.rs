use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One priced line of an indent. Reconciliation matches rows by the natural
/// key (material_code, quality_code[, top_design]) rather than by id.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "indent_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub indent_id: Uuid,
    pub product_id: Uuid,

    pub material_code: String,
    pub quality_code: String,
    pub top_design: Option<String>,

    pub quantity: Decimal,
    pub unit: String,
    pub pcs: i32,
    pub rate: Decimal,
    pub amount: Decimal,
    pub weight_tons: Decimal,

    pub discount_amount: Decimal,
    pub handling_charges: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::indent::Entity",
        from = "Column::IndentId",
        to = "super::indent::Column::Id"
    )]
    Indent,
    #[sea_orm(has_many = "super::calculation_line::Entity")]
    CalculationLine,
}

impl Related<super::indent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Indent.def()
    }
}

impl Related<super::calculation_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CalculationLine.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        let now = Utc::now();

        if insert {
            active_model.created_at = Set(now);
        }

        if let ActiveValue::NotSet = active_model.updated_at {
            active_model.updated_at = Set(Some(now));
        }

        Ok(active_model)
    }
}
