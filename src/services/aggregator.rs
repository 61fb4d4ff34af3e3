use crate::{
    common::OrderedSet,
    entities::calculation_definition,
    errors::ServiceError,
    money::Money,
    services::calculations::{CalculationEngine, NormalizedCalcLine},
    services::items::ProcessedItem,
    services::pricing::TcsRateProvider,
};
use rust_decimal::Decimal;
use tracing::instrument;
use uuid::Uuid;

/// Delimiter used when flattening descriptive rollups for storage.
const ROLLUP_DELIMITER: &str = ", ";

/// Order-level totals and rollups produced by the aggregation stage.
#[derive(Debug, Clone)]
pub struct IndentTotals {
    pub base_amount: Money,
    pub total_discount: Money,
    pub handling_charges: Money,
    pub total_tax: Money,
    pub total_tcs: Money,
    /// Adjustment applied to reach the integer-rounded final amount
    pub round_off: Money,
    /// Integer-rounded grand total
    pub final_amount: Money,
    pub total_weight: Decimal,

    pub brand_names: Option<String>,
    pub item_descriptions: Option<String>,
    pub item_codes: Option<String>,

    /// Order-level calculation lines (GST, TCS) for persistence
    pub order_lines: Vec<NormalizedCalcLine>,
}

/// Sums processed items into order totals, applies order-level GST and TCS,
/// and computes the final round-off.
pub struct OrderAggregator;

impl OrderAggregator {
    #[instrument(skip_all, fields(items = items.len()))]
    pub async fn aggregate(
        items: &[ProcessedItem],
        order_definitions: &[calculation_definition::Model],
        tcs_rates: &dyn TcsRateProvider,
        enterprise_id: Uuid,
        legal_entity_id: Uuid,
        dealer_user_id: Uuid,
    ) -> Result<IndentTotals, ServiceError> {
        let mut base_amount = Money::ZERO;
        let mut total_discount = Money::ZERO;
        let mut handling_charges = Money::ZERO;
        let mut total_weight = Decimal::ZERO;

        let mut brands = OrderedSet::new();
        let mut descriptions = OrderedSet::new();
        let mut item_codes = OrderedSet::new();

        for item in items {
            base_amount = base_amount.accumulate(item.amount.amount());
            total_discount = total_discount.accumulate(item.discount.amount());
            handling_charges = handling_charges.accumulate(item.handling.amount());
            total_weight += item.weight_tons;

            if let Some(brand) = &item.brand {
                brands.insert(brand.clone());
            }
            if let Some(description) = &item.description {
                descriptions.insert(description.clone());
            }
            item_codes.insert(item.material_code.clone());
        }

        // Pre-tax running total
        let mut running = base_amount - total_discount + handling_charges;

        let mut order_lines = Vec::new();

        let total_tax = match CalculationEngine::gst_line(order_definitions, running) {
            Some(line) => {
                let amount = line.amount;
                running = running + amount;
                order_lines.push(line);
                amount
            }
            None => Money::ZERO,
        };

        // TCS applies to the GST-inclusive total
        let tcs_rate = tcs_rates
            .tcs_rate(enterprise_id, legal_entity_id, dealer_user_id)
            .await?;
        let total_tcs = match tcs_rate.filter(|rate| *rate > Decimal::ZERO) {
            Some(rate) => {
                let line = CalculationEngine::tcs_line(rate, running);
                let amount = line.amount;
                running = running + amount;
                order_lines.push(line);
                amount
            }
            None => Money::ZERO,
        };

        let final_amount = running.round_whole();
        let round_off = running.round_off_to(final_amount);

        Ok(IndentTotals {
            base_amount,
            total_discount,
            handling_charges,
            total_tax,
            total_tcs,
            round_off,
            final_amount,
            total_weight,
            brand_names: non_empty(brands.join(ROLLUP_DELIMITER)),
            item_descriptions: non_empty(descriptions.join(ROLLUP_DELIMITER)),
            item_codes: non_empty(item_codes.join(ROLLUP_DELIMITER)),
            order_lines,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
