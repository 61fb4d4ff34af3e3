//! Request payloads accepted by the indent pipeline.
//!
//! These arrive fully parsed from the HTTP layer; the services validate the
//! business-level requirements (mandatory quantity/pcs/rate, resolvable
//! codes) themselves, so the DTOs only enforce structural constraints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A full indent submission: header context plus the complete item set.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct IndentSubmission {
    pub enterprise_id: Uuid,

    #[validate(length(min = 1, max = 50, message = "Indent number is required"))]
    pub indent_number: String,

    /// The dealer-side user submitting the order
    pub dealer_user_id: Uuid,

    #[validate]
    pub org: OrgCodes,

    #[validate]
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<SubmittedItem>,

    /// Explicitly removed items (full-order edits); union-ed with the
    /// reconciliation diff.
    #[serde(default)]
    pub removed_items: Vec<ItemKeyDto>,
}

/// Human-entered organizational codes, resolved before any pricing begins.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct OrgCodes {
    #[validate(length(min = 1))]
    pub legal_entity: String,
    #[validate(length(min = 1))]
    pub division: String,
    #[validate(length(min = 1))]
    pub plant: String,
    #[validate(length(min = 1))]
    pub sales_office: String,
    #[validate(length(min = 1))]
    pub sales_group: String,
    #[validate(length(min = 1))]
    pub dealer: String,
}

/// One submitted order line.
///
/// `quantity` may be omitted when `pcs` is supplied; the item processor then
/// derives it through the unit-conversion service (falling back to pcs).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SubmittedItem {
    #[validate(length(min = 1))]
    pub material_code: String,

    #[serde(default)]
    pub quality_code: Option<String>,

    #[serde(default)]
    pub top_design: Option<String>,

    pub quantity: Option<Decimal>,

    #[validate(length(min = 1))]
    pub unit: String,

    pub pcs: Option<i32>,

    pub rate: Option<Decimal>,

    /// Raw calculation lines (discounts, charges) as submitted by the dealer
    /// front end; only lines matching a configured definition count.
    #[serde(default)]
    pub calculations: Vec<RawCalculationLine>,
}

impl SubmittedItem {
    /// The quality code half of the natural key; absent means blank.
    pub fn quality(&self) -> &str {
        self.quality_code.as_deref().unwrap_or("")
    }
}

/// Raw calculation entry attached to a submitted line. Field-level absence is
/// validated by the calculation engine, not here, because only matched lines
/// are hard-validated.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RawCalculationLine {
    pub code: Option<String>,
    pub description: Option<String>,
    pub rate: Option<Decimal>,
    pub amount: Option<Decimal>,
}

/// Natural key of an item, as used in explicit removed-items lists.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ItemKeyDto {
    pub material_code: String,
    #[serde(default)]
    pub quality_code: Option<String>,
    #[serde(default)]
    pub top_design: Option<String>,
}
