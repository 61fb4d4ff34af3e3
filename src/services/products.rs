use crate::{
    db::DbPool,
    entities::product::{self, Entity as ProductEntity},
    errors::ServiceError,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Select};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Optional narrowing filters for product resolution.
#[derive(Debug, Clone, Default)]
pub struct ProductFilters {
    pub quality_code: Option<String>,
    pub division_id: Option<Uuid>,
    pub plant_id: Option<Uuid>,
}

/// Resolves a material/SKU code to a single active, display-eligible product.
///
/// When the primary material-code search misses, the resolver retries against
/// the trading material code so that trading-SKU aliases keep working.
#[derive(Clone)]
pub struct ProductResolver {
    db: Arc<DbPool>,
}

impl ProductResolver {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, filters), fields(enterprise_id = %enterprise_id, material_code = %material_code))]
    pub async fn resolve(
        &self,
        enterprise_id: Uuid,
        material_code: &str,
        filters: &ProductFilters,
    ) -> Result<product::Model, ServiceError> {
        let primary = self
            .eligible(enterprise_id, filters)
            .filter(product::Column::MaterialCode.eq(material_code))
            .one(&*self.db)
            .await?;

        if let Some(found) = primary {
            return Ok(found);
        }

        debug!(material_code, "primary code miss, trying trading material code");
        let trading = self
            .eligible(enterprise_id, filters)
            .filter(product::Column::TradingMaterialCode.eq(material_code))
            .one(&*self.db)
            .await?;

        trading.ok_or_else(|| ServiceError::ProductNotFound(material_code.to_string()))
    }

    fn eligible(&self, enterprise_id: Uuid, filters: &ProductFilters) -> Select<ProductEntity> {
        let mut query = ProductEntity::find()
            .filter(product::Column::EnterpriseId.eq(enterprise_id))
            .filter(product::Column::IsActive.eq(true))
            .filter(product::Column::IsDisplayed.eq(true));

        if let Some(quality) = &filters.quality_code {
            if !quality.is_empty() {
                query = query.filter(product::Column::QualityCode.eq(quality.clone()));
            }
        }
        if let Some(division_id) = filters.division_id {
            query = query.filter(product::Column::DivisionId.eq(division_id));
        }
        if let Some(plant_id) = filters.plant_id {
            query = query.filter(product::Column::PlantId.eq(plant_id));
        }

        query
    }
}
