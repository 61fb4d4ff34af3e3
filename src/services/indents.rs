use crate::{
    db::DbPool,
    dto::{IndentSubmission, ItemKeyDto},
    entities::calculation_line::{self, Entity as CalculationLineEntity},
    entities::indent::{self, Entity as IndentEntity},
    entities::indent_item::{self, Entity as IndentItemEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    services::aggregator::{IndentTotals, OrderAggregator},
    services::calculations::{CalculationDefinitionStore, EntityLevel, NormalizedCalcLine},
    services::items::{ItemProcessor, ProcessedItem},
    services::org_context::{BusinessContext, BusinessContextResolver},
    services::pricing::{TcsRateProvider, UnitConversionClient},
    services::products::ProductResolver,
    services::settings::{ItemMatchKey, PipelineSettings, SettingsStore},
};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Indent lifecycle states, including the ERP synchronization sub-states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum IndentStatus {
    Draft,
    Submitted,
    Modified,
    Approved,
    Rejected,
    Posted,
    ErpPending,
    ErpSynced,
    ErpFailed,
}

/// Natural key used to match items across resubmissions. The top-design
/// discriminator participates only when the enterprise's match-key strategy
/// asks for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    material_code: String,
    quality_code: String,
    top_design: Option<String>,
}

impl ItemKey {
    fn new(
        material_code: &str,
        quality_code: &str,
        top_design: Option<&str>,
        strategy: ItemMatchKey,
    ) -> Self {
        let top_design = match strategy {
            ItemMatchKey::MaterialQuality => None,
            ItemMatchKey::MaterialQualityTopDesign => top_design.map(|t| t.to_string()),
        };
        Self {
            material_code: material_code.to_string(),
            quality_code: quality_code.to_string(),
            top_design,
        }
    }

    fn from_processed(item: &ProcessedItem, strategy: ItemMatchKey) -> Self {
        Self::new(
            &item.material_code,
            &item.quality_code,
            item.top_design.as_deref(),
            strategy,
        )
    }

    fn from_model(model: &indent_item::Model, strategy: ItemMatchKey) -> Self {
        Self::new(
            &model.material_code,
            &model.quality_code,
            model.top_design.as_deref(),
            strategy,
        )
    }

    fn from_dto(dto: &ItemKeyDto, strategy: ItemMatchKey) -> Self {
        Self::new(
            &dto.material_code,
            dto.quality_code.as_deref().unwrap_or(""),
            dto.top_design.as_deref(),
            strategy,
        )
    }
}

/// Storage operations for the reconciliation transaction.
///
/// Every method takes the transaction handle explicitly; the orchestrator
/// alone owns the transaction lifecycle.
#[async_trait]
pub trait IndentStore: Send + Sync {
    async fn find_by_unique_key(
        &self,
        txn: &DatabaseTransaction,
        enterprise_id: Uuid,
        indent_number: &str,
    ) -> Result<Option<indent::Model>, ServiceError>;

    async fn find_by_id(
        &self,
        txn: &DatabaseTransaction,
        indent_id: Uuid,
    ) -> Result<Option<indent::Model>, ServiceError>;

    async fn insert_header(
        &self,
        txn: &DatabaseTransaction,
        header: indent::ActiveModel,
    ) -> Result<indent::Model, ServiceError>;

    async fn update_header(
        &self,
        txn: &DatabaseTransaction,
        header: indent::ActiveModel,
    ) -> Result<indent::Model, ServiceError>;

    async fn list_items(
        &self,
        txn: &DatabaseTransaction,
        indent_id: Uuid,
    ) -> Result<Vec<indent_item::Model>, ServiceError>;

    async fn insert_item(
        &self,
        txn: &DatabaseTransaction,
        item: indent_item::ActiveModel,
    ) -> Result<indent_item::Model, ServiceError>;

    async fn update_item(
        &self,
        txn: &DatabaseTransaction,
        item: indent_item::ActiveModel,
    ) -> Result<indent_item::Model, ServiceError>;

    async fn delete_item(
        &self,
        txn: &DatabaseTransaction,
        item_id: Uuid,
    ) -> Result<(), ServiceError>;

    async fn delete_item_lines(
        &self,
        txn: &DatabaseTransaction,
        item_id: Uuid,
    ) -> Result<(), ServiceError>;

    /// Full replace: deletes the item's calculation lines, then inserts the
    /// new set.
    async fn replace_item_lines(
        &self,
        txn: &DatabaseTransaction,
        indent_id: Uuid,
        item_id: Uuid,
        lines: &[NormalizedCalcLine],
    ) -> Result<(), ServiceError>;

    /// Full replace of the order-level (header-owned) calculation lines.
    async fn replace_order_lines(
        &self,
        txn: &DatabaseTransaction,
        indent_id: Uuid,
        lines: &[NormalizedCalcLine],
    ) -> Result<(), ServiceError>;
}

/// sea-orm backed store.
pub struct SeaOrmIndentStore;

fn line_active_model(
    indent_id: Uuid,
    item_id: Option<Uuid>,
    line: &NormalizedCalcLine,
) -> calculation_line::ActiveModel {
    calculation_line::ActiveModel {
        id: Set(Uuid::new_v4()),
        indent_id: Set(indent_id),
        item_id: Set(item_id),
        code: Set(line.code.clone()),
        description: Set(line.description.clone()),
        rate: Set(line.rate),
        unit: Set(line.unit.clone()),
        amount: Set(line.amount.amount()),
        sequence: Set(line.sequence),
    }
}

#[async_trait]
impl IndentStore for SeaOrmIndentStore {
    async fn find_by_unique_key(
        &self,
        txn: &DatabaseTransaction,
        enterprise_id: Uuid,
        indent_number: &str,
    ) -> Result<Option<indent::Model>, ServiceError> {
        Ok(IndentEntity::find()
            .filter(indent::Column::EnterpriseId.eq(enterprise_id))
            .filter(indent::Column::IndentNumber.eq(indent_number))
            .one(txn)
            .await?)
    }

    async fn find_by_id(
        &self,
        txn: &DatabaseTransaction,
        indent_id: Uuid,
    ) -> Result<Option<indent::Model>, ServiceError> {
        Ok(IndentEntity::find_by_id(indent_id).one(txn).await?)
    }

    async fn insert_header(
        &self,
        txn: &DatabaseTransaction,
        header: indent::ActiveModel,
    ) -> Result<indent::Model, ServiceError> {
        Ok(header.insert(txn).await?)
    }

    async fn update_header(
        &self,
        txn: &DatabaseTransaction,
        header: indent::ActiveModel,
    ) -> Result<indent::Model, ServiceError> {
        Ok(header.update(txn).await?)
    }

    async fn list_items(
        &self,
        txn: &DatabaseTransaction,
        indent_id: Uuid,
    ) -> Result<Vec<indent_item::Model>, ServiceError> {
        Ok(IndentItemEntity::find()
            .filter(indent_item::Column::IndentId.eq(indent_id))
            .order_by_asc(indent_item::Column::CreatedAt)
            .all(txn)
            .await?)
    }

    async fn insert_item(
        &self,
        txn: &DatabaseTransaction,
        item: indent_item::ActiveModel,
    ) -> Result<indent_item::Model, ServiceError> {
        Ok(item.insert(txn).await?)
    }

    async fn update_item(
        &self,
        txn: &DatabaseTransaction,
        item: indent_item::ActiveModel,
    ) -> Result<indent_item::Model, ServiceError> {
        Ok(item.update(txn).await?)
    }

    async fn delete_item(
        &self,
        txn: &DatabaseTransaction,
        item_id: Uuid,
    ) -> Result<(), ServiceError> {
        IndentItemEntity::delete_by_id(item_id).exec(txn).await?;
        Ok(())
    }

    async fn delete_item_lines(
        &self,
        txn: &DatabaseTransaction,
        item_id: Uuid,
    ) -> Result<(), ServiceError> {
        CalculationLineEntity::delete_many()
            .filter(calculation_line::Column::ItemId.eq(item_id))
            .exec(txn)
            .await?;
        Ok(())
    }

    async fn replace_item_lines(
        &self,
        txn: &DatabaseTransaction,
        indent_id: Uuid,
        item_id: Uuid,
        lines: &[NormalizedCalcLine],
    ) -> Result<(), ServiceError> {
        self.delete_item_lines(txn, item_id).await?;
        if !lines.is_empty() {
            let models = lines
                .iter()
                .map(|line| line_active_model(indent_id, Some(item_id), line));
            CalculationLineEntity::insert_many(models).exec(txn).await?;
        }
        Ok(())
    }

    async fn replace_order_lines(
        &self,
        txn: &DatabaseTransaction,
        indent_id: Uuid,
        lines: &[NormalizedCalcLine],
    ) -> Result<(), ServiceError> {
        CalculationLineEntity::delete_many()
            .filter(calculation_line::Column::IndentId.eq(indent_id))
            .filter(calculation_line::Column::ItemId.is_null())
            .exec(txn)
            .await?;
        if !lines.is_empty() {
            let models = lines
                .iter()
                .map(|line| line_active_model(indent_id, None, line));
            CalculationLineEntity::insert_many(models).exec(txn).await?;
        }
        Ok(())
    }
}

/// Totals block returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IndentTotalsDto {
    pub base_amount: Decimal,
    pub total_discount: Decimal,
    pub handling_charges: Decimal,
    pub total_tax: Decimal,
    pub total_tcs: Decimal,
    pub round_off: Decimal,
    pub final_amount: Decimal,
}

impl From<&IndentTotals> for IndentTotalsDto {
    fn from(totals: &IndentTotals) -> Self {
        Self {
            base_amount: totals.base_amount.amount(),
            total_discount: totals.total_discount.amount(),
            handling_charges: totals.handling_charges.amount(),
            total_tax: totals.total_tax.amount(),
            total_tcs: totals.total_tcs.amount(),
            round_off: totals.round_off.amount(),
            final_amount: totals.final_amount.amount(),
        }
    }
}

/// Acknowledgement returned by submit and full-upsert operations.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IndentConfirmation {
    pub id: Uuid,
    pub indent_number: String,
    pub status: String,
    pub totals: IndentTotalsDto,
}

/// Read view of a persisted indent header.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IndentResponse {
    pub id: Uuid,
    pub enterprise_id: Uuid,
    pub indent_number: String,
    pub dealer_id: Uuid,
    pub status: String,
    pub totals: IndentTotalsDto,
    pub total_weight: Decimal,
    pub brand_names: Option<String>,
    pub item_descriptions: Option<String>,
    pub item_codes: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IndentListResponse {
    pub indents: Vec<IndentResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Default, Clone, Copy)]
struct ReconcileStats {
    created: usize,
    updated: usize,
    deleted: usize,
}

/// The reconciliation orchestrator: runs the full pipeline for a submission
/// and persists the outcome in a single transaction.
///
/// All resolution, pricing, and aggregation happen before the transaction
/// opens; the transaction is purely persistence.
#[derive(Clone)]
pub struct IndentService {
    db: Arc<DbPool>,
    store: Arc<dyn IndentStore>,
    context_resolver: BusinessContextResolver,
    products: ProductResolver,
    definitions: CalculationDefinitionStore,
    settings: SettingsStore,
    conversions: Arc<dyn UnitConversionClient>,
    tcs_rates: Arc<dyn TcsRateProvider>,
    event_sender: Option<Arc<EventSender>>,
}

impl IndentService {
    pub fn new(
        db: Arc<DbPool>,
        conversions: Arc<dyn UnitConversionClient>,
        tcs_rates: Arc<dyn TcsRateProvider>,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            context_resolver: BusinessContextResolver::new(db.clone()),
            products: ProductResolver::new(db.clone()),
            definitions: CalculationDefinitionStore::new(db.clone()),
            settings: SettingsStore::new(db.clone()),
            store: Arc::new(SeaOrmIndentStore),
            db,
            conversions,
            tcs_rates,
            event_sender,
        }
    }

    /// Swaps the storage implementation; used by tests to inject failures.
    pub fn with_store(mut self, store: Arc<dyn IndentStore>) -> Self {
        self.store = store;
        self
    }

    /// Submits an order: prices and validates every line, aggregates totals,
    /// and reconciles against any stored order with the same unique key.
    #[instrument(skip(self, request), fields(indent_number = %request.indent_number))]
    pub async fn submit_indent(
        &self,
        request: IndentSubmission,
        actor: &str,
    ) -> Result<IndentConfirmation, ServiceError> {
        request.validate()?;

        let prepared = self.prepare(&request).await?;

        let txn = self.db.begin().await?;
        let existing = self
            .store
            .find_by_unique_key(&txn, request.enterprise_id, &request.indent_number)
            .await?;
        let was_update = existing.is_some();
        let old_status = existing.as_ref().map(|e| e.status.clone());

        let (header, stats) = match self
            .persist(&txn, &request, &prepared, existing, actor)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                txn.rollback().await.ok();
                return Err(err);
            }
        };
        txn.commit().await?;

        info!(
            indent_id = %header.id,
            created = stats.created,
            updated = stats.updated,
            deleted = stats.deleted,
            "indent persisted"
        );
        self.publish_events(&header, was_update, old_status, stats)
            .await;

        Ok(confirmation(&header, &prepared.totals))
    }

    /// Full-order edit of an existing indent, honoring the explicit
    /// removed-items list. Fails with a reconciliation conflict when the
    /// indent does not exist or its unique key does not match the payload.
    #[instrument(skip(self, request), fields(indent_id = %indent_id))]
    pub async fn upsert_indent_full(
        &self,
        indent_id: Uuid,
        request: IndentSubmission,
        actor: &str,
    ) -> Result<IndentConfirmation, ServiceError> {
        request.validate()?;

        let prepared = self.prepare(&request).await?;

        let txn = self.db.begin().await?;
        let existing = self.store.find_by_id(&txn, indent_id).await?;
        let existing = match existing {
            Some(model) => model,
            None => {
                txn.rollback().await.ok();
                return Err(ServiceError::ReconciliationConflict(format!(
                    "indent {indent_id} not found for update"
                )));
            }
        };
        if existing.enterprise_id != request.enterprise_id
            || existing.indent_number != request.indent_number
        {
            txn.rollback().await.ok();
            return Err(ServiceError::ReconciliationConflict(format!(
                "indent {indent_id} does not match the submitted unique key"
            )));
        }
        let old_status = Some(existing.status.clone());

        let (header, stats) = match self
            .persist(&txn, &request, &prepared, Some(existing), actor)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                txn.rollback().await.ok();
                return Err(err);
            }
        };
        txn.commit().await?;

        self.publish_events(&header, true, old_status, stats).await;

        Ok(confirmation(&header, &prepared.totals))
    }

    /// Retrieves an indent by id.
    pub async fn get_indent(&self, indent_id: Uuid) -> Result<Option<IndentResponse>, ServiceError> {
        let indent = IndentEntity::find_by_id(indent_id).one(&*self.db).await?;
        Ok(indent.map(model_to_response))
    }

    /// Retrieves an indent by its unique business key.
    pub async fn get_indent_by_number(
        &self,
        enterprise_id: Uuid,
        indent_number: &str,
    ) -> Result<Option<IndentResponse>, ServiceError> {
        let indent = IndentEntity::find()
            .filter(indent::Column::EnterpriseId.eq(enterprise_id))
            .filter(indent::Column::IndentNumber.eq(indent_number))
            .one(&*self.db)
            .await?;
        Ok(indent.map(model_to_response))
    }

    /// Lists an indent's items in insertion order.
    pub async fn get_indent_items(
        &self,
        indent_id: Uuid,
    ) -> Result<Vec<indent_item::Model>, ServiceError> {
        Ok(IndentItemEntity::find()
            .filter(indent_item::Column::IndentId.eq(indent_id))
            .order_by_asc(indent_item::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    /// Lists indents with pagination, newest first.
    pub async fn list_indents(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<IndentListResponse, ServiceError> {
        let paginator = IndentEntity::find()
            .order_by_desc(indent::Column::CreatedAt)
            .paginate(&*self.db, per_page.max(1));

        let total = paginator.num_items().await?;
        let indents = paginator
            .fetch_page(page.saturating_sub(1))
            .await?
            .into_iter()
            .map(model_to_response)
            .collect();

        Ok(IndentListResponse {
            indents,
            total,
            page,
            per_page,
        })
    }

    /// Runs the pre-transaction stages: settings, context resolution,
    /// definition loading, per-item processing, and aggregation.
    async fn prepare(&self, request: &IndentSubmission) -> Result<PreparedIndent, ServiceError> {
        let settings = self.settings.load(request.enterprise_id).await?;

        let context = self
            .context_resolver
            .resolve(request.enterprise_id, &request.org)
            .await?;

        let item_definitions = self
            .definitions
            .load(request.enterprise_id, context.legal_entity_id, EntityLevel::Item)
            .await?;
        let order_definitions = self
            .definitions
            .load(request.enterprise_id, context.legal_entity_id, EntityLevel::Order)
            .await?;

        let processor = ItemProcessor::new(
            &self.products,
            &*self.conversions,
            &item_definitions,
            &settings,
        );

        // Items are processed sequentially, in caller order.
        let mut items = Vec::with_capacity(request.items.len());
        for submitted in &request.items {
            items.push(processor.process(request.enterprise_id, submitted).await?);
        }

        let strategy = settings.item_match_key;
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(ItemKey::from_processed(item, strategy)) {
                return Err(ServiceError::ValidationError(format!(
                    "duplicate item for material code {} / quality {}",
                    item.material_code, item.quality_code
                )));
            }
        }
        let removed: HashSet<ItemKey> = request
            .removed_items
            .iter()
            .map(|dto| ItemKey::from_dto(dto, strategy))
            .collect();
        for item in &items {
            if removed.contains(&ItemKey::from_processed(item, strategy)) {
                return Err(ServiceError::ValidationError(format!(
                    "item {} is listed both as submitted and removed",
                    item.material_code
                )));
            }
        }

        let totals = OrderAggregator::aggregate(
            &items,
            &order_definitions,
            &*self.tcs_rates,
            request.enterprise_id,
            context.legal_entity_id,
            request.dealer_user_id,
        )
        .await?;

        Ok(PreparedIndent {
            context,
            settings,
            items,
            totals,
            removed,
        })
    }

    /// Header upsert plus the item-level diff, entirely inside `txn`.
    async fn persist(
        &self,
        txn: &DatabaseTransaction,
        request: &IndentSubmission,
        prepared: &PreparedIndent,
        existing: Option<indent::Model>,
        actor: &str,
    ) -> Result<(indent::Model, ReconcileStats), ServiceError> {
        let now = Utc::now();
        let totals = &prepared.totals;
        let context = &prepared.context;

        match existing {
            None => {
                let indent_id = Uuid::new_v4();
                let header = indent::ActiveModel {
                    id: Set(indent_id),
                    enterprise_id: Set(request.enterprise_id),
                    indent_number: Set(request.indent_number.clone()),
                    dealer_id: Set(context.dealer_id),
                    dealer_user_id: Set(request.dealer_user_id),
                    legal_entity_id: Set(context.legal_entity_id),
                    division_id: Set(context.division_id),
                    plant_id: Set(context.plant_id),
                    sales_office_id: Set(context.sales_office_id),
                    sales_group_id: Set(context.sales_group_id),
                    status: Set(IndentStatus::Submitted.to_string()),
                    base_amount: Set(totals.base_amount.amount()),
                    total_discount: Set(totals.total_discount.amount()),
                    handling_charges: Set(totals.handling_charges.amount()),
                    total_tax: Set(totals.total_tax.amount()),
                    total_tcs: Set(totals.total_tcs.amount()),
                    round_off: Set(totals.round_off.amount()),
                    final_amount: Set(totals.final_amount.amount()),
                    total_weight: Set(totals.total_weight),
                    brand_names: Set(totals.brand_names.clone()),
                    item_descriptions: Set(totals.item_descriptions.clone()),
                    item_codes: Set(totals.item_codes.clone()),
                    created_by: Set(actor.to_string()),
                    updated_by: Set(None),
                    created_at: Set(now),
                    updated_at: Set(None),
                    version: Set(1),
                };
                let header = self.store.insert_header(txn, header).await?;

                let mut stats = ReconcileStats::default();
                for item in &prepared.items {
                    let inserted = self
                        .store
                        .insert_item(txn, new_item_model(indent_id, item, now))
                        .await?;
                    self.store
                        .replace_item_lines(txn, indent_id, inserted.id, &item.calc_lines)
                        .await?;
                    stats.created += 1;
                }

                self.store
                    .replace_order_lines(txn, indent_id, &totals.order_lines)
                    .await?;

                Ok((header, stats))
            }
            Some(stored) => {
                let indent_id = stored.id;
                let version = stored.version;

                let mut header: indent::ActiveModel = stored.into();
                header.dealer_id = Set(context.dealer_id);
                header.dealer_user_id = Set(request.dealer_user_id);
                header.legal_entity_id = Set(context.legal_entity_id);
                header.division_id = Set(context.division_id);
                header.plant_id = Set(context.plant_id);
                header.sales_office_id = Set(context.sales_office_id);
                header.sales_group_id = Set(context.sales_group_id);
                header.status = Set(IndentStatus::Modified.to_string());
                header.base_amount = Set(totals.base_amount.amount());
                header.total_discount = Set(totals.total_discount.amount());
                header.handling_charges = Set(totals.handling_charges.amount());
                header.total_tax = Set(totals.total_tax.amount());
                header.total_tcs = Set(totals.total_tcs.amount());
                header.round_off = Set(totals.round_off.amount());
                header.final_amount = Set(totals.final_amount.amount());
                header.total_weight = Set(totals.total_weight);
                header.brand_names = Set(totals.brand_names.clone());
                header.item_descriptions = Set(totals.item_descriptions.clone());
                header.item_codes = Set(totals.item_codes.clone());
                header.updated_by = Set(Some(actor.to_string()));
                header.updated_at = Set(Some(now));
                header.version = Set(version + 1);
                let header = self.store.update_header(txn, header).await?;

                let stats = self
                    .reconcile_items(txn, indent_id, prepared, now)
                    .await?;

                self.store
                    .replace_order_lines(txn, indent_id, &totals.order_lines)
                    .await?;

                Ok((header, stats))
            }
        }
    }

    /// Diffs the new item set against the stored one by natural key and
    /// applies create/update/delete operations. Children of updated items
    /// are fully replaced, never merged.
    async fn reconcile_items(
        &self,
        txn: &DatabaseTransaction,
        indent_id: Uuid,
        prepared: &PreparedIndent,
        now: chrono::DateTime<Utc>,
    ) -> Result<ReconcileStats, ServiceError> {
        let strategy = prepared.settings.item_match_key;
        let old_items = self.store.list_items(txn, indent_id).await?;

        let mut old_by_key: HashMap<ItemKey, indent_item::Model> = old_items
            .into_iter()
            .map(|model| (ItemKey::from_model(&model, strategy), model))
            .collect();

        let mut stats = ReconcileStats::default();

        // New submission order drives the operation order.
        for item in &prepared.items {
            let key = ItemKey::from_processed(item, strategy);
            match old_by_key.remove(&key) {
                Some(stored) => {
                    let item_id = stored.id;
                    let mut model: indent_item::ActiveModel = stored.into();
                    model.product_id = Set(item.product_id);
                    model.top_design = Set(item.top_design.clone());
                    model.quantity = Set(item.quantity);
                    model.unit = Set(item.unit.clone());
                    model.pcs = Set(item.pcs);
                    model.rate = Set(item.rate);
                    model.amount = Set(item.amount.amount());
                    model.weight_tons = Set(item.weight_tons);
                    model.discount_amount = Set(item.discount.amount());
                    model.handling_charges = Set(item.handling.amount());
                    model.updated_at = Set(Some(now));
                    self.store.update_item(txn, model).await?;
                    self.store
                        .replace_item_lines(txn, indent_id, item_id, &item.calc_lines)
                        .await?;
                    stats.updated += 1;
                }
                None => {
                    let inserted = self
                        .store
                        .insert_item(txn, new_item_model(indent_id, item, now))
                        .await?;
                    self.store
                        .replace_item_lines(txn, indent_id, inserted.id, &item.calc_lines)
                        .await?;
                    stats.created += 1;
                }
            }
        }

        // Anything left in the old set is gone from the submission (or was
        // explicitly removed): destroy the item and all its children.
        for (key, stored) in old_by_key {
            if !prepared.removed.is_empty() && !prepared.removed.contains(&key) {
                warn!(
                    indent_id = %indent_id,
                    material_code = %stored.material_code,
                    "item absent from submission but not in removed list, deleting"
                );
            }
            self.store.delete_item_lines(txn, stored.id).await?;
            self.store.delete_item(txn, stored.id).await?;
            stats.deleted += 1;
        }

        Ok(stats)
    }

    async fn publish_events(
        &self,
        header: &indent::Model,
        was_update: bool,
        old_status: Option<String>,
        stats: ReconcileStats,
    ) {
        let Some(sender) = &self.event_sender else {
            return;
        };

        let event = if was_update {
            Event::IndentUpdated(header.id)
        } else {
            Event::IndentCreated(header.id)
        };
        if let Err(err) = sender.send(event).await {
            warn!(indent_id = %header.id, error = %err, "failed to send indent event");
        }

        if let Some(old_status) = old_status.filter(|old| *old != header.status) {
            let event = Event::IndentStatusChanged {
                indent_id: header.id,
                old_status,
                new_status: header.status.clone(),
            };
            if let Err(err) = sender.send(event).await {
                warn!(indent_id = %header.id, error = %err, "failed to send status event");
            }
        }

        let event = Event::IndentItemsReconciled {
            indent_id: header.id,
            created: stats.created,
            updated: stats.updated,
            deleted: stats.deleted,
        };
        if let Err(err) = sender.send(event).await {
            warn!(indent_id = %header.id, error = %err, "failed to send reconcile event");
        }
    }
}

/// Pre-transaction pipeline output.
struct PreparedIndent {
    context: BusinessContext,
    settings: PipelineSettings,
    items: Vec<ProcessedItem>,
    totals: IndentTotals,
    removed: HashSet<ItemKey>,
}

fn new_item_model(
    indent_id: Uuid,
    item: &ProcessedItem,
    now: chrono::DateTime<Utc>,
) -> indent_item::ActiveModel {
    indent_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        indent_id: Set(indent_id),
        product_id: Set(item.product_id),
        material_code: Set(item.material_code.clone()),
        quality_code: Set(item.quality_code.clone()),
        top_design: Set(item.top_design.clone()),
        quantity: Set(item.quantity),
        unit: Set(item.unit.clone()),
        pcs: Set(item.pcs),
        rate: Set(item.rate),
        amount: Set(item.amount.amount()),
        weight_tons: Set(item.weight_tons),
        discount_amount: Set(item.discount.amount()),
        handling_charges: Set(item.handling.amount()),
        created_at: Set(now),
        updated_at: Set(None),
    }
}

fn confirmation(header: &indent::Model, totals: &IndentTotals) -> IndentConfirmation {
    IndentConfirmation {
        id: header.id,
        indent_number: header.indent_number.clone(),
        status: header.status.clone(),
        totals: totals.into(),
    }
}

fn model_to_response(model: indent::Model) -> IndentResponse {
    IndentResponse {
        id: model.id,
        enterprise_id: model.enterprise_id,
        indent_number: model.indent_number,
        dealer_id: model.dealer_id,
        status: model.status,
        totals: IndentTotalsDto {
            base_amount: model.base_amount,
            total_discount: model.total_discount,
            handling_charges: model.handling_charges,
            total_tax: model.total_tax,
            total_tcs: model.total_tcs,
            round_off: model.round_off,
            final_amount: model.final_amount,
        },
        total_weight: model.total_weight,
        brand_names: model.brand_names,
        item_descriptions: model.item_descriptions,
        item_codes: model.item_codes,
        created_at: model.created_at,
        updated_at: model.updated_at,
        version: model.version,
    }
}
