pub mod indents;

use crate::{
    config::AppConfig,
    db::DbPool,
    errors::ServiceError,
    events::EventSender,
    services::indents::IndentService,
    services::pricing::{
        DbTcsRateProvider, DisabledUnitConversionClient, HttpUnitConversionClient,
        UnitConversionClient,
    },
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Service container shared across handlers.
#[derive(Clone)]
pub struct AppServices {
    pub indents: IndentService,
}

impl AppServices {
    pub fn new(
        db: Arc<DbPool>,
        config: &AppConfig,
        event_sender: Option<Arc<EventSender>>,
    ) -> Result<Self, ServiceError> {
        let conversions: Arc<dyn UnitConversionClient> = match &config.pricing_service_url {
            Some(url) => {
                info!(url = %url, "unit conversion lookups enabled");
                Arc::new(HttpUnitConversionClient::new(
                    url.clone(),
                    Duration::from_secs(config.pricing_timeout_secs),
                )?)
            }
            None => {
                info!("no pricing service configured, unit conversion lookups disabled");
                Arc::new(DisabledUnitConversionClient)
            }
        };
        let tcs_rates = Arc::new(DbTcsRateProvider::new(db.clone()));

        Ok(Self {
            indents: IndentService::new(db, conversions, tcs_rates, event_sender),
        })
    }
}
