//! Outbound collaborator clients: the unit-conversion pricing service and
//! the per-user TCS rate lookup.

use crate::{
    db::DbPool,
    entities::tcs_rate::{self, Entity as TcsRateEntity},
    errors::ServiceError,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;

/// Alternate unit-of-measure metadata returned by the pricing service.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AlternateUnit {
    /// Base unit, e.g. "M2"
    pub unit: String,
    /// Alternate unit, e.g. "BOX"
    pub alternate_unit: String,
    /// Base units per one alternate unit
    pub ratio: Decimal,
}

/// Unit-conversion lookup against the external pricing service.
///
/// Lookup failure is non-fatal by contract: callers fall back to treating
/// pcs as quantity and log the failure.
#[async_trait]
pub trait UnitConversionClient: Send + Sync {
    async fn alternate_units(
        &self,
        enterprise_id: Uuid,
        material_code: &str,
    ) -> Result<Vec<AlternateUnit>, ServiceError>;
}

/// HTTP implementation backed by `reqwest`.
pub struct HttpUnitConversionClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpUnitConversionClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::InternalError(format!("http client init failed: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl UnitConversionClient for HttpUnitConversionClient {
    #[instrument(skip(self), fields(material_code = %material_code))]
    async fn alternate_units(
        &self,
        enterprise_id: Uuid,
        material_code: &str,
    ) -> Result<Vec<AlternateUnit>, ServiceError> {
        let url = format!("{}/api/v1/unit-conversions", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("enterprise_id", enterprise_id.to_string()),
                ("material_code", material_code.to_string()),
            ])
            .send()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(format!("unit conversion: {e}")))?;

        if !response.status().is_success() {
            return Err(ServiceError::ExternalServiceError(format!(
                "unit conversion returned {}",
                response.status()
            )));
        }

        response
            .json::<Vec<AlternateUnit>>()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(format!("unit conversion: {e}")))
    }
}

/// Used when no pricing service is configured: reports no alternate units, so
/// pcs-to-quantity derivation falls back to pcs without an error.
pub struct DisabledUnitConversionClient;

#[async_trait]
impl UnitConversionClient for DisabledUnitConversionClient {
    async fn alternate_units(
        &self,
        _enterprise_id: Uuid,
        _material_code: &str,
    ) -> Result<Vec<AlternateUnit>, ServiceError> {
        Ok(Vec::new())
    }
}

/// Per-user TCS rate lookup. Absence means no TCS applies.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TcsRateProvider: Send + Sync {
    async fn tcs_rate(
        &self,
        enterprise_id: Uuid,
        legal_entity_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Decimal>, ServiceError>;
}

/// Database-backed TCS rates, maintained by tax administrators.
pub struct DbTcsRateProvider {
    db: Arc<DbPool>,
}

impl DbTcsRateProvider {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TcsRateProvider for DbTcsRateProvider {
    async fn tcs_rate(
        &self,
        enterprise_id: Uuid,
        legal_entity_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Decimal>, ServiceError> {
        let rate = TcsRateEntity::find()
            .filter(tcs_rate::Column::EnterpriseId.eq(enterprise_id))
            .filter(tcs_rate::Column::LegalEntityId.eq(legal_entity_id))
            .filter(tcs_rate::Column::UserId.eq(user_id))
            .filter(tcs_rate::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?;

        Ok(rate.map(|r| r.percentage))
    }
}
