use crate::{
    db::DbPool,
    dto::OrgCodes,
    entities::dealer_mapping::{self, Entity as DealerMappingEntity},
    entities::org_unit::{self, Entity as OrgUnitEntity},
    errors::ServiceError,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use std::sync::Arc;
use strum::{AsRefStr, Display};
use tracing::instrument;
use uuid::Uuid;

/// The organizational unit kinds addressable by code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum OrgUnitType {
    LegalEntity,
    Division,
    Plant,
    SalesOffice,
    SalesGroup,
    Dealer,
}

/// Resolved organizational snapshot attached to an indent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessContext {
    pub legal_entity_id: Uuid,
    pub division_id: Uuid,
    pub plant_id: Uuid,
    pub sales_office_id: Uuid,
    pub sales_group_id: Uuid,
    pub dealer_id: Uuid,
}

/// Resolves human-entered org codes to internal ids and validates the
/// dealer's configured mapping. Pure lookup and validation; no writes.
#[derive(Clone)]
pub struct BusinessContextResolver {
    db: Arc<DbPool>,
}

impl BusinessContextResolver {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, codes), fields(enterprise_id = %enterprise_id))]
    pub async fn resolve(
        &self,
        enterprise_id: Uuid,
        codes: &OrgCodes,
    ) -> Result<BusinessContext, ServiceError> {
        let legal_entity_id = self
            .resolve_unit(enterprise_id, OrgUnitType::LegalEntity, &codes.legal_entity, "legal entity")
            .await?;
        let division_id = self
            .resolve_unit(enterprise_id, OrgUnitType::Division, &codes.division, "division")
            .await?;
        let plant_id = self
            .resolve_unit(enterprise_id, OrgUnitType::Plant, &codes.plant, "plant")
            .await?;
        let sales_office_id = self
            .resolve_unit(enterprise_id, OrgUnitType::SalesOffice, &codes.sales_office, "sales office")
            .await?;
        let sales_group_id = self
            .resolve_unit(enterprise_id, OrgUnitType::SalesGroup, &codes.sales_group, "sales group")
            .await?;
        let dealer_id = self
            .resolve_unit(enterprise_id, OrgUnitType::Dealer, &codes.dealer, "dealer")
            .await?;

        let context = BusinessContext {
            legal_entity_id,
            division_id,
            plant_id,
            sales_office_id,
            sales_group_id,
            dealer_id,
        };

        self.validate_dealer_mapping(enterprise_id, &context).await?;

        Ok(context)
    }

    async fn resolve_unit(
        &self,
        enterprise_id: Uuid,
        unit_type: OrgUnitType,
        code: &str,
        field: &str,
    ) -> Result<Uuid, ServiceError> {
        let unit = OrgUnitEntity::find()
            .filter(org_unit::Column::EnterpriseId.eq(enterprise_id))
            .filter(org_unit::Column::UnitType.eq(unit_type.as_ref()))
            .filter(org_unit::Column::Code.eq(code))
            .filter(org_unit::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?;

        unit.map(|u| u.id).ok_or_else(|| ServiceError::InvalidReference {
            field: field.to_string(),
            code: code.to_string(),
        })
    }

    /// The dealer's configured mapping rows must contain each resolved unit.
    /// No silent fallback: an unmapped unit rejects the submission.
    async fn validate_dealer_mapping(
        &self,
        enterprise_id: Uuid,
        context: &BusinessContext,
    ) -> Result<(), ServiceError> {
        let mappings = DealerMappingEntity::find()
            .filter(dealer_mapping::Column::EnterpriseId.eq(enterprise_id))
            .filter(dealer_mapping::Column::DealerId.eq(context.dealer_id))
            .all(&*self.db)
            .await?;

        if mappings.is_empty() {
            return Err(ServiceError::UnmappedBusinessRelation("dealer".to_string()));
        }

        if !mappings.iter().any(|m| m.plant_id == context.plant_id) {
            return Err(ServiceError::UnmappedBusinessRelation("plant".to_string()));
        }
        if !mappings
            .iter()
            .any(|m| m.sales_office_id == context.sales_office_id)
        {
            return Err(ServiceError::UnmappedBusinessRelation(
                "sales office".to_string(),
            ));
        }
        if !mappings
            .iter()
            .any(|m| m.sales_group_id == context.sales_group_id)
        {
            return Err(ServiceError::UnmappedBusinessRelation(
                "sales group".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_type_string_forms() {
        assert_eq!(OrgUnitType::LegalEntity.as_ref(), "legal_entity");
        assert_eq!(OrgUnitType::SalesOffice.as_ref(), "sales_office");
        assert_eq!(OrgUnitType::Dealer.as_ref(), "dealer");
    }
}
