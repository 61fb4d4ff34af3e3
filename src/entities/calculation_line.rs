use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted calculation result (discount, handling charge, or tax line).
///
/// Child of either an indent item (`item_id` set) or the indent header
/// (`item_id` null, for order-level GST/TCS lines). Rows are owned by their
/// parent and are fully replaced whenever that parent is reconciled.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "calculation_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub indent_id: Uuid,
    pub item_id: Option<Uuid>,

    pub code: String,
    pub description: Option<String>,
    pub rate: Decimal,
    pub unit: String,
    pub amount: Decimal,
    pub sequence: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::indent::Entity",
        from = "Column::IndentId",
        to = "super::indent::Column::Id"
    )]
    Indent,
    #[sea_orm(
        belongs_to = "super::indent_item::Entity",
        from = "Column::ItemId",
        to = "super::indent_item::Column::Id"
    )]
    IndentItem,
}

impl Related<super::indent::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Indent.def()
    }
}

impl Related<super::indent_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IndentItem.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {}
