mod common;

use common::{decimal_field, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use uuid::Uuid;

fn org_block() -> Value {
    json!({
        "legal_entity": "LE01",
        "division": "DIV1",
        "plant": "PL01",
        "sales_office": "SO01",
        "sales_group": "SG01",
        "dealer": "DLR1",
    })
}

fn submission(app: &TestApp, indent_number: &str, items: Value) -> Value {
    json!({
        "enterprise_id": app.seed.enterprise_id,
        "indent_number": indent_number,
        "dealer_user_id": app.seed.dealer_user_id,
        "org": org_block(),
        "items": items,
    })
}

fn discounted_item(material_code: &str, quantity: u32, rate: u32, discount: u32) -> Value {
    json!({
        "material_code": material_code,
        "quantity": quantity.to_string(),
        "unit": "M2",
        "pcs": 10,
        "rate": rate.to_string(),
        "calculations": [
            { "code": "DISC", "description": "Dealer discount", "rate": "10", "amount": discount.to_string() }
        ],
    })
}

#[tokio::test]
async fn submit_computes_item_and_order_totals() {
    let app = TestApp::new().await;

    let payload = submission(
        &app,
        "IND-1001",
        json!([discounted_item("MAT-100", 10, 100, 100)]),
    );
    let (status, body) = app.post_json("/api/v1/indents", payload).await;
    assert_eq!(status, 201, "unexpected body: {body}");

    let data = &body["data"];
    assert_eq!(data["status"], "submitted");
    let totals = &data["totals"];
    assert_eq!(decimal_field(totals, "base_amount"), dec!(1000));
    assert_eq!(decimal_field(totals, "total_discount"), dec!(100));
    assert_eq!(decimal_field(totals, "handling_charges"), dec!(0));
    // 900 pre-tax, 18% GST
    assert_eq!(decimal_field(totals, "total_tax"), dec!(162));
    assert_eq!(decimal_field(totals, "total_tcs"), dec!(0));
    assert_eq!(decimal_field(totals, "final_amount"), dec!(1062));
    assert_eq!(decimal_field(totals, "round_off"), dec!(0));

    // Read back by id and by business key.
    let id = data["id"].as_str().unwrap();
    let (status, fetched) = app.get(&format!("/api/v1/indents/{id}")).await;
    assert_eq!(status, 200);
    assert_eq!(fetched["data"]["indent_number"], "IND-1001");
    assert_eq!(fetched["data"]["version"], 1);
    // 10 M2 at 20 kg gross weight = 200 kg = 0.2 t
    assert_eq!(decimal_field(&fetched["data"], "total_weight"), dec!(0.2));
    assert_eq!(fetched["data"]["brand_names"], "Crest");

    let (status, by_number) = app
        .get(&format!(
            "/api/v1/indents/by-number/IND-1001?enterprise_id={}",
            app.seed.enterprise_id
        ))
        .await;
    assert_eq!(status, 200);
    assert_eq!(by_number["data"]["id"].as_str().unwrap(), id);

    let (status, items) = app.get(&format!("/api/v1/indents/{id}/items")).await;
    assert_eq!(status, 200);
    let items = items["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(decimal_field(&items[0], "amount"), dec!(1000));
    assert_eq!(decimal_field(&items[0], "discount_amount"), dec!(100));
}

#[tokio::test]
async fn handling_lines_route_by_description() {
    let app = TestApp::new().await;

    let item = json!({
        "material_code": "MAT-100",
        "quantity": "10",
        "unit": "M2",
        "pcs": 10,
        "rate": "100",
        "calculations": [
            { "code": "FRT", "description": "Handling Charges", "rate": "0", "amount": "50" }
        ],
    });
    let (status, body) = app
        .post_json("/api/v1/indents", submission(&app, "IND-1002", json!([item])))
        .await;
    assert_eq!(status, 201, "unexpected body: {body}");

    let totals = &body["data"]["totals"];
    assert_eq!(decimal_field(totals, "handling_charges"), dec!(50));
    assert_eq!(decimal_field(totals, "total_discount"), dec!(0));
    // 1050 pre-tax, 18% GST = 189
    assert_eq!(decimal_field(totals, "total_tax"), dec!(189));
    assert_eq!(decimal_field(totals, "final_amount"), dec!(1239));
}

#[tokio::test]
async fn unmatched_calculation_codes_are_ignored() {
    let app = TestApp::new().await;

    let item = json!({
        "material_code": "MAT-100",
        "quantity": "10",
        "unit": "M2",
        "pcs": 10,
        "rate": "100",
        "calculations": [
            { "code": "NOPE", "description": "Mystery line", "rate": "5", "amount": "999" }
        ],
    });
    let (status, body) = app
        .post_json("/api/v1/indents", submission(&app, "IND-1003", json!([item])))
        .await;
    assert_eq!(status, 201, "unexpected body: {body}");

    let totals = &body["data"]["totals"];
    assert_eq!(decimal_field(totals, "total_discount"), dec!(0));
    assert_eq!(decimal_field(totals, "base_amount"), dec!(1000));
    assert_eq!(decimal_field(totals, "final_amount"), dec!(1180));
}

#[tokio::test]
async fn tcs_applies_after_gst() {
    let app = TestApp::new().await;
    app.seed_tcs_rate(app.seed.dealer_user_id, dec!(1)).await;

    let payload = submission(
        &app,
        "IND-1004",
        json!([discounted_item("MAT-100", 10, 100, 100)]),
    );
    let (status, body) = app.post_json("/api/v1/indents", payload).await;
    assert_eq!(status, 201, "unexpected body: {body}");

    // 900 pre-tax, +162 GST = 1062, +1% TCS = 1072.62, rounded to 1073
    let totals = &body["data"]["totals"];
    assert_eq!(decimal_field(totals, "total_tax"), dec!(162));
    assert_eq!(decimal_field(totals, "total_tcs"), dec!(10.62));
    assert_eq!(decimal_field(totals, "final_amount"), dec!(1073));
    assert_eq!(decimal_field(totals, "round_off"), dec!(0.38));
}

#[tokio::test]
async fn trading_material_code_resolves_as_fallback() {
    let app = TestApp::new().await;

    let item = json!({
        "material_code": "MAT-300",
        "quantity": "5",
        "unit": "M2",
        "pcs": 5,
        "rate": "200",
    });
    let (status, body) = app
        .post_json("/api/v1/indents", submission(&app, "IND-1005", json!([item])))
        .await;
    assert_eq!(status, 201, "unexpected body: {body}");
    assert_eq!(decimal_field(&body["data"]["totals"], "base_amount"), dec!(1000));
}

#[tokio::test]
async fn missing_rate_is_rejected_before_any_write() {
    let app = TestApp::new().await;

    let item = json!({
        "material_code": "MAT-100",
        "quantity": "10",
        "unit": "M2",
        "pcs": 10,
    });
    let (status, body) = app
        .post_json("/api/v1/indents", submission(&app, "IND-1006", json!([item])))
        .await;
    assert_eq!(status, 422, "unexpected body: {body}");
    assert_eq!(body["details"], "field: rate");

    let (_, listing) = app.get("/api/v1/indents").await;
    assert_eq!(listing["data"]["total"], 0);
}

#[tokio::test]
async fn malformed_matched_calculation_line_is_rejected() {
    let app = TestApp::new().await;

    // Matched code with no amount: a hard failure, unlike unmatched codes.
    let item = json!({
        "material_code": "MAT-100",
        "quantity": "10",
        "unit": "M2",
        "pcs": 10,
        "rate": "100",
        "calculations": [ { "code": "DISC", "rate": "10" } ],
    });
    let (status, body) = app
        .post_json("/api/v1/indents", submission(&app, "IND-1007", json!([item])))
        .await;
    assert_eq!(status, 422, "unexpected body: {body}");

    let (_, listing) = app.get("/api/v1/indents").await;
    assert_eq!(listing["data"]["total"], 0);
}

#[tokio::test]
async fn unknown_org_code_is_rejected() {
    let app = TestApp::new().await;

    let mut payload = submission(
        &app,
        "IND-1008",
        json!([discounted_item("MAT-100", 10, 100, 100)]),
    );
    payload["org"]["plant"] = json!("PL99");

    let (status, body) = app.post_json("/api/v1/indents", payload).await;
    assert_eq!(status, 400, "unexpected body: {body}");
    assert_eq!(body["details"], "field: plant");
}

#[tokio::test]
async fn unknown_material_code_is_rejected() {
    let app = TestApp::new().await;

    let item = json!({
        "material_code": "MAT-999",
        "quantity": "10",
        "unit": "M2",
        "pcs": 10,
        "rate": "100",
    });
    let (status, body) = app
        .post_json("/api/v1/indents", submission(&app, "IND-1009", json!([item])))
        .await;
    assert_eq!(status, 400, "unexpected body: {body}");
    assert_eq!(body["message"], "Product not found for material code MAT-999");
}

#[tokio::test]
async fn blank_org_code_is_rejected_by_payload_validation() {
    let app = TestApp::new().await;

    // Structural validation catches the blank code before any resolution.
    let mut payload = submission(
        &app,
        "IND-1012",
        json!([discounted_item("MAT-100", 10, 100, 100)]),
    );
    payload["org"]["plant"] = json!("");

    let (status, body) = app.post_json("/api/v1/indents", payload).await;
    assert_eq!(status, 422, "unexpected body: {body}");
}

#[tokio::test]
async fn blank_material_code_is_rejected_by_payload_validation() {
    let app = TestApp::new().await;

    let item = json!({
        "material_code": "",
        "quantity": "10",
        "unit": "M2",
        "pcs": 10,
        "rate": "100",
    });
    let (status, body) = app
        .post_json("/api/v1/indents", submission(&app, "IND-1013", json!([item])))
        .await;
    assert_eq!(status, 422, "unexpected body: {body}");
}

#[tokio::test]
async fn duplicate_items_in_one_submission_are_rejected() {
    let app = TestApp::new().await;

    let payload = submission(
        &app,
        "IND-1010",
        json!([
            discounted_item("MAT-100", 10, 100, 100),
            discounted_item("MAT-100", 5, 100, 50),
        ]),
    );
    let (status, body) = app.post_json("/api/v1/indents", payload).await;
    assert_eq!(status, 422, "unexpected body: {body}");
}

#[tokio::test]
async fn quantity_defaults_to_pcs_without_conversion_service() {
    let app = TestApp::new().await;

    // No quantity submitted; with conversions disabled, pcs stands in.
    let item = json!({
        "material_code": "MAT-100",
        "unit": "M2",
        "pcs": 8,
        "rate": "100",
    });
    let (status, body) = app
        .post_json("/api/v1/indents", submission(&app, "IND-1011", json!([item])))
        .await;
    assert_eq!(status, 201, "unexpected body: {body}");
    assert_eq!(decimal_field(&body["data"]["totals"], "base_amount"), dec!(800));
}

#[tokio::test]
async fn get_unknown_indent_returns_not_found() {
    let app = TestApp::new().await;
    let (status, body) = app
        .get(&format!("/api/v1/indents/{}", Uuid::new_v4()))
        .await;
    assert_eq!(status, 404, "unexpected body: {body}");
    assert_eq!(body["error"], "Not Found");
}
