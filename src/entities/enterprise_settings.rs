use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-enterprise pipeline configuration.
///
/// `weight_basis` selects the item weight strategy; `item_match_key` selects
/// the natural key used to match items across resubmissions (some enterprises
/// add the top-design code as a third discriminator); `price_calc_code` is
/// the reserved calculation code routed away from discount processing.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enterprise_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub enterprise_id: Uuid,

    /// "gross_quantity" or "net_pcs"
    pub weight_basis: String,
    /// "material_quality" or "material_quality_top_design"
    pub item_match_key: String,
    pub price_calc_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {}
