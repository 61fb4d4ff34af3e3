use crate::{
    dto::SubmittedItem,
    entities::{calculation_definition, product},
    errors::ServiceError,
    money::Money,
    services::calculations::{CalculationEngine, NormalizedCalcLine},
    services::pricing::UnitConversionClient,
    services::products::{ProductFilters, ProductResolver},
    services::settings::{PipelineSettings, WeightBasis},
};
use rust_decimal::Decimal;
use tracing::{instrument, warn};
use uuid::Uuid;

/// Alternate unit pair recognized for pcs-to-quantity derivation.
const BOX_UNIT: &str = "BOX";

const KG_PER_TON: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// A fully priced line item, ready for aggregation and persistence.
#[derive(Debug, Clone)]
pub struct ProcessedItem {
    pub product_id: Uuid,
    pub material_code: String,
    pub quality_code: String,
    pub top_design: Option<String>,

    pub quantity: Decimal,
    pub unit: String,
    pub pcs: i32,
    pub rate: Decimal,
    pub amount: Money,
    pub weight_tons: Decimal,

    pub discount: Money,
    pub handling: Money,
    pub calc_lines: Vec<NormalizedCalcLine>,

    pub description: Option<String>,
    pub brand: Option<String>,
}

/// Processes one submitted line at a time: product resolution, mandatory
/// field checks, amount and weight derivation, and the per-item calculation
/// pass. All of this happens before the persistence transaction opens.
pub struct ItemProcessor<'a> {
    products: &'a ProductResolver,
    conversions: &'a dyn UnitConversionClient,
    item_definitions: &'a [calculation_definition::Model],
    settings: &'a PipelineSettings,
}

impl<'a> ItemProcessor<'a> {
    pub fn new(
        products: &'a ProductResolver,
        conversions: &'a dyn UnitConversionClient,
        item_definitions: &'a [calculation_definition::Model],
        settings: &'a PipelineSettings,
    ) -> Self {
        Self {
            products,
            conversions,
            item_definitions,
            settings,
        }
    }

    #[instrument(skip(self, item), fields(material_code = %item.material_code))]
    pub async fn process(
        &self,
        enterprise_id: Uuid,
        item: &SubmittedItem,
    ) -> Result<ProcessedItem, ServiceError> {
        let filters = ProductFilters {
            quality_code: item.quality_code.clone(),
            ..Default::default()
        };
        let product = self
            .products
            .resolve(enterprise_id, &item.material_code, &filters)
            .await?;

        let rate = item
            .rate
            .ok_or_else(|| ServiceError::MissingField("rate".to_string()))?;
        let pcs = item
            .pcs
            .ok_or_else(|| ServiceError::MissingField("pcs".to_string()))?;

        let quantity = match item.quantity {
            Some(quantity) => quantity,
            None => {
                derive_quantity(self.conversions, enterprise_id, &item.material_code, &item.unit, pcs)
                    .await
            }
        };

        let amount = Money::from_qty_rate(quantity, rate);
        let weight_tons = weight_tons(self.settings.weight_basis, &product, quantity, pcs);

        let outcome = CalculationEngine::process_item_lines(
            self.item_definitions,
            &item.calculations,
            &self.settings.price_calc_code,
        )?;

        Ok(ProcessedItem {
            product_id: product.id,
            material_code: item.material_code.clone(),
            quality_code: item.quality().to_string(),
            top_design: item.top_design.clone(),
            quantity,
            unit: item.unit.clone(),
            pcs,
            rate,
            amount,
            weight_tons,
            discount: outcome.discount,
            handling: outcome.handling,
            calc_lines: outcome.lines,
            description: product.description,
            brand: product.brand,
        })
    }
}

/// Derives quantity from pcs via the unit-conversion service: when an
/// alternate unit pair (submitted unit ↔ BOX) matches, quantity is
/// `pcs * ratio`. Lookup failure is logged and falls back to pcs.
pub async fn derive_quantity(
    conversions: &dyn UnitConversionClient,
    enterprise_id: Uuid,
    material_code: &str,
    unit: &str,
    pcs: i32,
) -> Decimal {
    let fallback = Decimal::from(pcs);

    let units = match conversions.alternate_units(enterprise_id, material_code).await {
        Ok(units) => units,
        Err(err) => {
            warn!(
                material_code,
                error = %err,
                "unit conversion lookup failed, using pcs as quantity"
            );
            return fallback;
        }
    };

    let matched = units.iter().find(|alt| {
        alt.unit.eq_ignore_ascii_case(unit) && alt.alternate_unit.eq_ignore_ascii_case(BOX_UNIT)
    });

    match matched {
        Some(alt) => fallback * alt.ratio,
        None => fallback,
    }
}

/// Item weight in tons per the enterprise's configured basis. Missing weight
/// data yields zero weight rather than failing the line.
pub fn weight_tons(
    basis: WeightBasis,
    product: &product::Model,
    quantity: Decimal,
    pcs: i32,
) -> Decimal {
    let weight_kg = match basis {
        WeightBasis::GrossQuantity => product.gross_weight * quantity,
        WeightBasis::NetPcs => product.net_weight * Decimal::from(pcs),
    };

    if weight_kg.is_zero() {
        warn!(
            material_code = %product.material_code,
            basis = %basis,
            "no weight data for product, recording zero weight"
        );
    }

    weight_kg / KG_PER_TON
}
