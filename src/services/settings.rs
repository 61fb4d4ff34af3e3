use crate::{
    db::DbPool,
    entities::enterprise_settings::{self, Entity as EnterpriseSettingsEntity},
    errors::ServiceError,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use std::str::FromStr;
use std::sync::Arc;
use strum::{AsRefStr, Display, EnumString};
use tracing::warn;
use uuid::Uuid;

/// Which measure drives the derived item weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum WeightBasis {
    /// `gross_weight * quantity`
    GrossQuantity,
    /// `net_weight * pcs`
    NetPcs,
}

/// Which natural key matches items across resubmissions. Some enterprises
/// add the top-design code as a third discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ItemMatchKey {
    MaterialQuality,
    MaterialQualityTopDesign,
}

/// Per-enterprise pipeline configuration, with defaults applied when a row
/// or field is absent (absence of the weight strategy is non-fatal by
/// contract).
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub weight_basis: WeightBasis,
    pub item_match_key: ItemMatchKey,
    pub price_calc_code: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            weight_basis: WeightBasis::GrossQuantity,
            item_match_key: ItemMatchKey::MaterialQuality,
            price_calc_code: "PRICE".to_string(),
        }
    }
}

impl PipelineSettings {
    fn from_model(model: enterprise_settings::Model) -> Self {
        let defaults = Self::default();

        let weight_basis = WeightBasis::from_str(&model.weight_basis).unwrap_or_else(|_| {
            warn!(
                value = %model.weight_basis,
                "unknown weight basis configured, using default"
            );
            defaults.weight_basis
        });
        let item_match_key = ItemMatchKey::from_str(&model.item_match_key).unwrap_or_else(|_| {
            warn!(
                value = %model.item_match_key,
                "unknown item match key configured, using default"
            );
            defaults.item_match_key
        });

        Self {
            weight_basis,
            item_match_key,
            price_calc_code: model.price_calc_code,
        }
    }
}

/// Loads an enterprise's pipeline settings, falling back to defaults when
/// none are configured.
#[derive(Clone)]
pub struct SettingsStore {
    db: Arc<DbPool>,
}

impl SettingsStore {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    pub async fn load(&self, enterprise_id: Uuid) -> Result<PipelineSettings, ServiceError> {
        let row = EnterpriseSettingsEntity::find()
            .filter(enterprise_settings::Column::EnterpriseId.eq(enterprise_id))
            .one(&*self.db)
            .await?;

        Ok(match row {
            Some(model) => PipelineSettings::from_model(model),
            None => {
                warn!(enterprise_id = %enterprise_id, "no enterprise settings configured, using defaults");
                PipelineSettings::default()
            }
        })
    }
}
