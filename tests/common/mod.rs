use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use indent_api::{
    config::AppConfig,
    db,
    entities::{
        calculation_definition, dealer_mapping, enterprise_settings, org_unit, product, tcs_rate,
    },
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};

/// Reference data installed into every test database.
pub struct Seed {
    pub enterprise_id: Uuid,
    pub dealer_user_id: Uuid,
    pub dealer_id: Uuid,
    pub legal_entity_id: Uuid,
}

/// Helper harness for spinning up an application backed by an in-memory
/// SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub seed: Seed,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single pooled connection keeps the in-memory database alive and
        // shared for the duration of the test.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let seed = seed_reference_data(&db_arc).await;

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db_arc.clone(), &cfg, Some(Arc::new(event_sender.clone())))
            .expect("failed to build services");

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .merge(indent_api::base_routes())
            .nest("/api/v1", indent_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            seed,
            _event_task: event_task,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                builder
                    .body(Body::from(serde_json::to_vec(&json).unwrap()))
                    .unwrap()
            }
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    /// Installs a TCS rate for the given user.
    #[allow(dead_code)]
    pub async fn seed_tcs_rate(&self, user_id: Uuid, percentage: Decimal) {
        tcs_rate::ActiveModel {
            id: Set(Uuid::new_v4()),
            enterprise_id: Set(self.seed.enterprise_id),
            legal_entity_id: Set(self.seed.legal_entity_id),
            user_id: Set(user_id),
            percentage: Set(percentage),
            is_active: Set(true),
        }
        .insert(&*self.state.db)
        .await
        .expect("failed to seed tcs rate");
    }
}

async fn seed_reference_data(db: &Arc<sea_orm::DatabaseConnection>) -> Seed {
    let enterprise_id = Uuid::new_v4();
    let dealer_user_id = Uuid::new_v4();

    let legal_entity_id = seed_org_unit(db, enterprise_id, "legal_entity", "LE01").await;
    let _division_id = seed_org_unit(db, enterprise_id, "division", "DIV1").await;
    let plant_id = seed_org_unit(db, enterprise_id, "plant", "PL01").await;
    let sales_office_id = seed_org_unit(db, enterprise_id, "sales_office", "SO01").await;
    let sales_group_id = seed_org_unit(db, enterprise_id, "sales_group", "SG01").await;
    let dealer_id = seed_org_unit(db, enterprise_id, "dealer", "DLR1").await;

    dealer_mapping::ActiveModel {
        id: Set(Uuid::new_v4()),
        enterprise_id: Set(enterprise_id),
        dealer_id: Set(dealer_id),
        plant_id: Set(plant_id),
        sales_office_id: Set(sales_office_id),
        sales_group_id: Set(sales_group_id),
    }
    .insert(&**db)
    .await
    .expect("failed to seed dealer mapping");

    enterprise_settings::ActiveModel {
        id: Set(Uuid::new_v4()),
        enterprise_id: Set(enterprise_id),
        weight_basis: Set("gross_quantity".to_string()),
        item_match_key: Set("material_quality".to_string()),
        price_calc_code: Set("PRICE".to_string()),
    }
    .insert(&**db)
    .await
    .expect("failed to seed enterprise settings");

    seed_product(db, enterprise_id, "MAT-100", None, "Glazed Vitrified Tile", "Crest").await;
    seed_product(db, enterprise_id, "MAT-200", None, "Ceramic Wall Tile", "Crest").await;
    seed_product(
        db,
        enterprise_id,
        "TR-300",
        Some("MAT-300"),
        "Polished Tile",
        "Aurora",
    )
    .await;

    // Item-level definitions: a percentage discount and a flat freight code.
    seed_definition(db, enterprise_id, "item", "DISCOUNT", "DISC", dec!(10), "%", 1).await;
    seed_definition(db, enterprise_id, "item", "HANDLING_CHARGE", "FRT", dec!(0), "flat", 2).await;
    // Order-level GST at 18%.
    seed_definition(db, enterprise_id, "order", "TAX", "gst", dec!(18), "%", 1).await;

    Seed {
        enterprise_id,
        dealer_user_id,
        dealer_id,
        legal_entity_id,
    }
}

async fn seed_org_unit(
    db: &Arc<sea_orm::DatabaseConnection>,
    enterprise_id: Uuid,
    unit_type: &str,
    code: &str,
) -> Uuid {
    let id = Uuid::new_v4();
    org_unit::ActiveModel {
        id: Set(id),
        enterprise_id: Set(enterprise_id),
        unit_type: Set(unit_type.to_string()),
        code: Set(code.to_string()),
        name: Set(format!("{} {}", unit_type, code)),
        is_active: Set(true),
    }
    .insert(&**db)
    .await
    .expect("failed to seed org unit");
    id
}

async fn seed_product(
    db: &Arc<sea_orm::DatabaseConnection>,
    enterprise_id: Uuid,
    material_code: &str,
    trading_material_code: Option<&str>,
    description: &str,
    brand: &str,
) -> Uuid {
    let id = Uuid::new_v4();
    product::ActiveModel {
        id: Set(id),
        enterprise_id: Set(enterprise_id),
        material_code: Set(material_code.to_string()),
        trading_material_code: Set(trading_material_code.map(|c| c.to_string())),
        quality_code: Set(None),
        division_id: Set(None),
        plant_id: Set(None),
        description: Set(Some(description.to_string())),
        brand: Set(Some(brand.to_string())),
        gross_weight: Set(dec!(20)),
        net_weight: Set(dec!(1.5)),
        is_active: Set(true),
        is_displayed: Set(true),
        created_at: Set(Utc::now()),
    }
    .insert(&**db)
    .await
    .expect("failed to seed product");
    id
}

#[allow(clippy::too_many_arguments)]
async fn seed_definition(
    db: &Arc<sea_orm::DatabaseConnection>,
    enterprise_id: Uuid,
    entity_type: &str,
    calc_type: &str,
    code: &str,
    value: Decimal,
    unit: &str,
    sequence: i32,
) {
    calculation_definition::ActiveModel {
        id: Set(Uuid::new_v4()),
        enterprise_id: Set(enterprise_id),
        legal_entity_id: Set(None),
        entity_type: Set(entity_type.to_string()),
        calc_type: Set(calc_type.to_string()),
        code: Set(code.to_string()),
        description: Set(None),
        value: Set(value),
        unit: Set(unit.to_string()),
        sequence: Set(sequence),
        is_addition: Set(calc_type == "TAX" || calc_type == "HANDLING_CHARGE"),
        is_compound: Set(false),
        depends_on: Set(None),
        is_active: Set(true),
    }
    .insert(&**db)
    .await
    .expect("failed to seed calculation definition");
}

/// Parses a decimal field out of a JSON object (rust_decimal serializes as a
/// string).
#[allow(dead_code)]
pub fn decimal_field(value: &Value, key: &str) -> Decimal {
    let raw = value
        .get(key)
        .unwrap_or_else(|| panic!("missing field {key} in {value}"));
    match raw {
        Value::String(s) => s.parse().expect("invalid decimal"),
        Value::Number(n) => n.to_string().parse().expect("invalid decimal"),
        other => panic!("unexpected {key} value: {other}"),
    }
}
