use crate::{
    db::DbPool,
    dto::RawCalculationLine,
    entities::calculation_definition::{self, Entity as CalculationDefinitionEntity},
    errors::ServiceError,
    money::Money,
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;
use std::sync::Arc;
use strum::{AsRefStr, Display};
use tracing::instrument;
use uuid::Uuid;

/// Calculation unit markers carried by definitions and persisted lines.
pub const UNIT_PERCENT: &str = "%";
pub const UNIT_FLAT: &str = "flat";

/// Order-level definition code for GST.
pub const GST_CODE: &str = "gst";
/// Persisted code for the TCS order line (TCS rates are per-user, not
/// definition-driven).
pub const TCS_CODE: &str = "tcs";

/// Whether a definition applies to line items or to the order header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum EntityLevel {
    Item,
    Order,
}

/// Loads enterprise calculation definitions, ordered by sequence.
#[derive(Clone)]
pub struct CalculationDefinitionStore {
    db: Arc<DbPool>,
}

impl CalculationDefinitionStore {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self), fields(enterprise_id = %enterprise_id, level = %level))]
    pub async fn load(
        &self,
        enterprise_id: Uuid,
        legal_entity_id: Uuid,
        level: EntityLevel,
    ) -> Result<Vec<calculation_definition::Model>, ServiceError> {
        let defs = CalculationDefinitionEntity::find()
            .filter(calculation_definition::Column::EnterpriseId.eq(enterprise_id))
            .filter(
                Condition::any()
                    .add(calculation_definition::Column::LegalEntityId.is_null())
                    .add(calculation_definition::Column::LegalEntityId.eq(legal_entity_id)),
            )
            .filter(calculation_definition::Column::EntityType.eq(level.as_ref()))
            .filter(calculation_definition::Column::IsActive.eq(true))
            .order_by_asc(calculation_definition::Column::Sequence)
            .all(&*self.db)
            .await?;

        Ok(defs)
    }
}

/// A calculation line normalized against its matching definition, ready for
/// persistence as a child record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCalcLine {
    pub code: String,
    pub description: Option<String>,
    pub rate: Decimal,
    pub unit: String,
    pub amount: Money,
    pub sequence: i32,
}

/// Result of running the engine over one item's raw calculation lines.
#[derive(Debug, Clone, Default)]
pub struct ItemCalcOutcome {
    pub discount: Money,
    pub handling: Money,
    pub lines: Vec<NormalizedCalcLine>,
}

/// Applies configured calculation definitions to raw calculation lines.
///
/// Only lines whose code matches a definition affect totals; everything else
/// is ignored. Matched lines are validated strictly because silently skipping
/// a malformed discount or charge would understate financial totals.
pub struct CalculationEngine;

impl CalculationEngine {
    /// Processes one item's raw lines, splitting matched lines into discount
    /// and handling-charge accumulation. Lines whose description mentions
    /// "handling charge" or whose code equals the enterprise's reserved price
    /// code route to handling charges.
    ///
    /// Both accumulators re-round to two decimals after every step, matching
    /// the stepwise rounding of the historical totals.
    pub fn process_item_lines(
        definitions: &[calculation_definition::Model],
        raw_lines: &[RawCalculationLine],
        price_calc_code: &str,
    ) -> Result<ItemCalcOutcome, ServiceError> {
        let by_code: HashMap<&str, &calculation_definition::Model> = definitions
            .iter()
            .map(|def| (def.code.as_str(), def))
            .collect();

        let mut outcome = ItemCalcOutcome::default();

        // Caller order is preserved; no re-sorting.
        for raw in raw_lines {
            let code = raw
                .code
                .as_deref()
                .filter(|c| !c.is_empty())
                .ok_or_else(|| ServiceError::MissingField("calcCode".to_string()))?;

            // Exact code match only; unmatched lines are configuration-gated
            // out and must not affect totals.
            let Some(definition) = by_code.get(code) else {
                continue;
            };

            let rate = raw
                .rate
                .ok_or_else(|| ServiceError::MissingField("calcRate".to_string()))?;
            let amount = raw
                .amount
                .ok_or_else(|| ServiceError::MissingField("calcAmount".to_string()))?;

            let is_handling = code == price_calc_code
                || raw
                    .description
                    .as_deref()
                    .map(|d| d.to_lowercase().contains("handling charge"))
                    .unwrap_or(false);

            if is_handling {
                outcome.handling = outcome.handling.accumulate(amount);
            } else {
                outcome.discount = outcome.discount.accumulate(amount);
            }

            outcome.lines.push(NormalizedCalcLine {
                code: code.to_string(),
                description: raw
                    .description
                    .clone()
                    .or_else(|| definition.description.clone()),
                rate,
                unit: definition.unit.clone(),
                amount: Money::round2(amount),
                sequence: definition.sequence,
            });
        }

        Ok(outcome)
    }

    /// Computes the order-level GST line for `pre_tax`, when a `gst`
    /// definition is configured: percentage of the pre-tax total or a flat
    /// amount depending on the definition's unit.
    pub fn gst_line(
        order_definitions: &[calculation_definition::Model],
        pre_tax: Money,
    ) -> Option<NormalizedCalcLine> {
        let definition = order_definitions.iter().find(|def| def.code == GST_CODE)?;

        let amount = if definition.unit == UNIT_PERCENT {
            pre_tax.percent(definition.value)
        } else {
            Money::round2(definition.value)
        };

        Some(NormalizedCalcLine {
            code: definition.code.clone(),
            description: definition.description.clone(),
            rate: definition.value,
            unit: definition.unit.clone(),
            amount,
            sequence: definition.sequence,
        })
    }

    /// Computes the TCS line as a percentage of the GST-inclusive total.
    pub fn tcs_line(rate: Decimal, taxed_total: Money) -> NormalizedCalcLine {
        NormalizedCalcLine {
            code: TCS_CODE.to_string(),
            description: Some("Tax collected at source".to_string()),
            rate,
            unit: UNIT_PERCENT.to_string(),
            amount: taxed_total.percent(rate),
            sequence: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn definition(code: &str, unit: &str, value: Decimal, seq: i32) -> calculation_definition::Model {
        calculation_definition::Model {
            id: Uuid::new_v4(),
            enterprise_id: Uuid::new_v4(),
            legal_entity_id: None,
            entity_type: "item".to_string(),
            calc_type: "DISCOUNT".to_string(),
            code: code.to_string(),
            description: None,
            value,
            unit: unit.to_string(),
            sequence: seq,
            is_addition: false,
            is_compound: false,
            depends_on: None,
            is_active: true,
        }
    }

    fn raw(code: &str, rate: Decimal, amount: Decimal) -> RawCalculationLine {
        RawCalculationLine {
            code: Some(code.to_string()),
            description: None,
            rate: Some(rate),
            amount: Some(amount),
        }
    }

    #[test]
    fn matched_discount_lines_accumulate() {
        let defs = vec![
            definition("D10", UNIT_PERCENT, dec!(10), 1),
            definition("D5", UNIT_PERCENT, dec!(5), 2),
        ];
        let lines = vec![raw("D10", dec!(10), dec!(100)), raw("D5", dec!(5), dec!(50))];

        let outcome = CalculationEngine::process_item_lines(&defs, &lines, "PRICE").unwrap();
        assert_eq!(outcome.discount.amount(), dec!(150.00));
        assert_eq!(outcome.handling.amount(), dec!(0));
        assert_eq!(outcome.lines.len(), 2);
    }

    #[test]
    fn unmatched_codes_do_not_affect_totals() {
        let defs = vec![definition("D10", UNIT_PERCENT, dec!(10), 1)];
        let lines = vec![raw("UNKNOWN", dec!(50), dec!(500))];

        let outcome = CalculationEngine::process_item_lines(&defs, &lines, "PRICE").unwrap();
        assert_eq!(outcome.discount, Money::ZERO);
        assert!(outcome.lines.is_empty());
    }

    #[test]
    fn handling_charge_routed_by_description() {
        let defs = vec![definition("HC1", UNIT_FLAT, dec!(25), 1)];
        let mut line = raw("HC1", dec!(0), dec!(25));
        line.description = Some("Special Handling Charge".to_string());

        let outcome = CalculationEngine::process_item_lines(&defs, &[line], "PRICE").unwrap();
        assert_eq!(outcome.handling.amount(), dec!(25.00));
        assert_eq!(outcome.discount, Money::ZERO);
    }

    #[test]
    fn reserved_price_code_routed_to_handling() {
        let defs = vec![definition("PRICE", UNIT_FLAT, dec!(0), 1)];
        let outcome =
            CalculationEngine::process_item_lines(&defs, &[raw("PRICE", dec!(0), dec!(12))], "PRICE")
                .unwrap();
        assert_eq!(outcome.handling.amount(), dec!(12.00));
        assert_eq!(outcome.discount, Money::ZERO);
    }

    #[test]
    fn missing_code_is_a_hard_failure() {
        let defs = vec![definition("D10", UNIT_PERCENT, dec!(10), 1)];
        let line = RawCalculationLine {
            code: None,
            description: None,
            rate: Some(dec!(10)),
            amount: Some(dec!(100)),
        };
        let err = CalculationEngine::process_item_lines(&defs, &[line], "PRICE").unwrap_err();
        assert_matches!(err, ServiceError::MissingField(field) if field == "calcCode");
    }

    #[test]
    fn matched_line_missing_rate_or_amount_fails() {
        let defs = vec![definition("D10", UNIT_PERCENT, dec!(10), 1)];

        let no_rate = RawCalculationLine {
            code: Some("D10".to_string()),
            description: None,
            rate: None,
            amount: Some(dec!(100)),
        };
        assert_matches!(
            CalculationEngine::process_item_lines(&defs, &[no_rate], "PRICE").unwrap_err(),
            ServiceError::MissingField(field) if field == "calcRate"
        );

        let no_amount = RawCalculationLine {
            code: Some("D10".to_string()),
            description: None,
            rate: Some(dec!(10)),
            amount: None,
        };
        assert_matches!(
            CalculationEngine::process_item_lines(&defs, &[no_amount], "PRICE").unwrap_err(),
            ServiceError::MissingField(field) if field == "calcAmount"
        );
    }

    #[test]
    fn discount_accumulation_rounds_each_step() {
        let defs = vec![definition("D1", UNIT_FLAT, dec!(0), 1)];
        let lines = vec![raw("D1", dec!(0), dec!(0.005)), raw("D1", dec!(0), dec!(0.005))];

        let outcome = CalculationEngine::process_item_lines(&defs, &lines, "PRICE").unwrap();
        // Per-step rounding: 0.005 -> 0.01, then 0.01 + 0.005 -> 0.02.
        assert_eq!(outcome.discount.amount(), dec!(0.02));
    }

    #[test]
    fn gst_percent_and_flat() {
        let mut percent_def = definition(GST_CODE, UNIT_PERCENT, dec!(18), 1);
        percent_def.entity_type = "order".to_string();
        let line = CalculationEngine::gst_line(&[percent_def], Money::round2(dec!(900))).unwrap();
        assert_eq!(line.amount.amount(), dec!(162.00));

        let mut flat_def = definition(GST_CODE, UNIT_FLAT, dec!(75), 1);
        flat_def.entity_type = "order".to_string();
        let line = CalculationEngine::gst_line(&[flat_def], Money::round2(dec!(900))).unwrap();
        assert_eq!(line.amount.amount(), dec!(75.00));
    }

    #[test]
    fn gst_absent_when_not_configured() {
        assert!(CalculationEngine::gst_line(&[], Money::round2(dec!(900))).is_none());
    }

    #[test]
    fn tcs_is_percentage_of_taxed_total() {
        let line = CalculationEngine::tcs_line(dec!(0.1), Money::round2(dec!(1062)));
        assert_eq!(line.amount.amount(), dec!(1.06));
        assert_eq!(line.code, TCS_CODE);
    }
}
