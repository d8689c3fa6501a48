//! Integration tests for reconciling, listing and deleting combinations.
//!
//! Each test builds its own in-memory catalog via `TestContext::new()`.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, Request, StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use product_variations_admin::db::{CatalogBackend, ProductRepository};
use product_variations_integration_tests::{SHOP, TestContext};

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        Value::Number(n) => n.to_string().parse().unwrap(),
        other => panic!("not a decimal: {other}"),
    }
}

/// Product data entry of the child with `sku`.
fn product_data<'a>(listing: &'a Value, sku: &str) -> &'a Value {
    listing["product_data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["sku"] == sku)
        .unwrap_or_else(|| panic!("no product data for {sku}"))
}

async fn live_children(ctx: &TestContext) -> Vec<String> {
    let mut tx = ctx.catalog.begin().await.unwrap();
    let mut skus: Vec<String> = tx
        .list_child_shop_products(ctx.parent.id, SHOP)
        .await
        .unwrap()
        .into_iter()
        .map(|child| child.product.sku.to_string())
        .collect();
    skus.sort();
    skus
}

async fn save(ctx: &TestContext, body: Value) -> (StatusCode, Value) {
    ctx.send(Method::POST, &ctx.combinations_path(), Some(body))
        .await
}

// ============================================================================
// End-to-end
// ============================================================================

#[tokio::test]
async fn test_create_update_and_delete_combinations() {
    let ctx = TestContext::new().await;

    let (status, saved) = save(
        &ctx,
        json!([
            {"combination": {"Color": "Red", "Size": "L"}, "sku": "red-l", "price": 15.5, "stock_count": 20},
            {"combination": {"Color": "Blue", "Size": "S"}, "sku": "blue-s", "price": 16, "stock_count": 2},
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{saved}");
    let red_id = saved[0]["product_id"].clone();
    assert_eq!(saved[0]["sku"], "red-l");
    assert_eq!(saved[1]["combination"]["Size"], "S");

    let (status, listing) = ctx.send(Method::GET, &ctx.combinations_path(), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["combinations"].as_array().unwrap().len(), 2);
    let red = product_data(&listing, "red-l");
    assert_eq!(decimal(&red["price"]), Decimal::new(155, 1));
    assert_eq!(decimal(&red["stock_count"]), Decimal::from(20));
    let blue = product_data(&listing, "blue-s");
    assert_eq!(decimal(&blue["price"]), Decimal::from(16));
    assert_eq!(decimal(&blue["stock_count"]), Decimal::from(2));

    // Update the first combination: new SKU, price and stock
    let (status, saved) = save(
        &ctx,
        json!([
            {"combination": {"Color": "Red", "Size": "L"}, "sku": "red-l2", "price": 21, "stock_count": 4},
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{saved}");
    assert_eq!(saved[0]["product_id"], red_id);

    let (_, listing) = ctx.send(Method::GET, &ctx.combinations_path(), None).await;
    let red = product_data(&listing, "red-l2");
    assert_eq!(decimal(&red["price"]), Decimal::from(21));
    assert_eq!(decimal(&red["stock_count"]), Decimal::from(4));
    let blue = product_data(&listing, "blue-s");
    assert_eq!(decimal(&blue["price"]), Decimal::from(16));
    assert_eq!(decimal(&blue["stock_count"]), Decimal::from(2));

    let adjustments = ctx.catalog.stock_adjustments().await;
    let last = adjustments.last().unwrap();
    assert_eq!(last.delta, Decimal::from(-16));
    assert_eq!(last.supplier_id, ctx.supplier.id);
    assert_eq!(live_children(&ctx).await, vec!["blue-s", "red-l2"]);

    // Grow to four combinations, then delete one by combination and one by SKU
    let (status, _) = save(
        &ctx,
        json!([
            {"combination": {"Color": "Red", "Size": "XL"}, "sku": "red-xl"},
            {"combination": {"Color": "Blue", "Size": "L"}, "sku": "blue-l"},
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(live_children(&ctx).await.len(), 4);

    let (status, body) = ctx
        .send(
            Method::DELETE,
            &ctx.combinations_path(),
            Some(json!([
                {"combination": {"Color": "Red", "Size": "L"}},
                {"sku": "red-xl"},
            ])),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body, json!({}));
    assert_eq!(live_children(&ctx).await, vec!["blue-l", "blue-s"]);

    // Red is no longer used by any visible child
    let (_, variations) = ctx
        .send(
            Method::GET,
            &format!("/api/products/{}/variations", ctx.parent.id),
            None,
        )
        .await;
    let names: Vec<&str> = variations["values"]
        .as_object()
        .unwrap()
        .values()
        .flat_map(|values| values.as_array().unwrap())
        .map(|value| value["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Blue"));
    assert!(names.contains(&"L"));
    assert!(!names.contains(&"Red"));
    assert!(!names.contains(&"XL"));
}

// ============================================================================
// Reconciler properties
// ============================================================================

#[tokio::test]
async fn test_resaving_is_idempotent() {
    let ctx = TestContext::new().await;
    let body = json!([
        {"combination": {"Color": "Red"}, "sku": "red", "price": 12, "stock_count": 3},
    ]);

    let (_, first) = save(&ctx, body.clone()).await;
    let (status, second) = save(&ctx, body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first[0]["product_id"], second[0]["product_id"]);
    assert_eq!(ctx.catalog.stock_adjustments().await.len(), 1);
    assert_eq!(live_children(&ctx).await, vec!["red"]);
}

#[tokio::test]
async fn test_sku_conflict_rolls_back_the_batch() {
    let ctx = TestContext::new().await;

    let (status, body) = save(
        &ctx,
        json!([
            {"combination": {"Color": "Red"}, "sku": "red"},
            {"combination": {"Color": "Blue"}, "sku": "shirt"},
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "sku-exists");
    assert!(live_children(&ctx).await.is_empty());

    let (_, listing) = ctx.send(Method::GET, &ctx.combinations_path(), None).await;
    assert_eq!(listing["combinations"], json!([]));
}

#[tokio::test]
async fn test_deleted_child_is_recovered() {
    let ctx = TestContext::new().await;
    let body = json!([{"combination": {"Color": "Red"}, "sku": "red", "price": 9}]);

    let (_, first) = save(&ctx, body.clone()).await;
    let (status, _) = ctx
        .send(
            Method::DELETE,
            &ctx.combinations_path(),
            Some(json!([{"sku": "red"}])),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(live_children(&ctx).await.is_empty());

    let (status, second) = save(&ctx, body).await;
    assert_eq!(status, StatusCode::OK, "{second}");
    assert_eq!(first[0]["product_id"], second[0]["product_id"]);
    assert_eq!(live_children(&ctx).await, vec!["red"]);
}

#[tokio::test]
async fn test_partial_updates_keep_other_fields() {
    let ctx = TestContext::new().await;
    save(
        &ctx,
        json!([{"combination": {"Color": "Red"}, "sku": "red", "price": 12, "stock_count": 5}]),
    )
    .await;

    save(&ctx, json!([{"combination": {"Color": "Red"}, "sku": "red", "price": 14}])).await;
    let (_, listing) = ctx.send(Method::GET, &ctx.combinations_path(), None).await;
    let red = product_data(&listing, "red");
    assert_eq!(decimal(&red["price"]), Decimal::from(14));
    assert_eq!(decimal(&red["stock_count"]), Decimal::from(5));

    save(&ctx, json!([{"combination": {"Color": "Red"}, "sku": "red", "stock_count": 1}])).await;
    let (_, listing) = ctx.send(Method::GET, &ctx.combinations_path(), None).await;
    let red = product_data(&listing, "red");
    assert_eq!(decimal(&red["price"]), Decimal::from(14));
    assert_eq!(decimal(&red["stock_count"]), Decimal::from(1));
}

#[tokio::test]
async fn test_parent_price_follows_cheapest_child() {
    let ctx = TestContext::new().await;
    save(
        &ctx,
        json!([
            {"combination": {"Color": "Red"}, "sku": "red", "price": 8},
            {"combination": {"Color": "Blue"}, "sku": "blue", "price": 6.5},
        ]),
    )
    .await;

    let mut tx = ctx.catalog.begin().await.unwrap();
    let shop_product = tx.get_shop_product(SHOP, ctx.parent.id).await.unwrap().unwrap();
    assert_eq!(shop_product.default_price, Some(Decimal::new(65, 1)));
}

// ============================================================================
// Request errors
// ============================================================================

#[tokio::test]
async fn test_validation_errors_are_keyed_by_entry() {
    let ctx = TestContext::new().await;
    let (status, body) = save(
        &ctx,
        json!([
            {"combination": {"Color": "Red"}, "sku": "red"},
            {"combination": {}, "sku": "", "price": -1},
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation-fail");
    assert!(body["error"]["1.sku"].is_array());
    assert!(body["error"]["1.combination"].is_array());
    assert!(body["error"]["1.price"].is_array());
}

#[tokio::test]
async fn test_malformed_bodies() {
    let ctx = TestContext::new().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri(ctx.combinations_path())
        .header("content-type", "application/json")
        .body(axum::body::Body::from("[{not json"))
        .unwrap();
    let (status, body) = ctx.send_request(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid-content");

    let (status, body) = ctx
        .send(
            Method::DELETE,
            &ctx.combinations_path(),
            Some(json!([{}])),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation-fail");
}

#[tokio::test]
async fn test_delete_of_unknown_combination_is_not_found() {
    let ctx = TestContext::new().await;
    save(&ctx, json!([{"combination": {"Color": "Red"}, "sku": "red"}])).await;

    let (status, body) = ctx
        .send(
            Method::DELETE,
            &ctx.combinations_path(),
            Some(json!([{"combination": {"Color": "Green"}}])),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not-found");
    assert_eq!(live_children(&ctx).await, vec!["red"]);
}

#[tokio::test]
async fn test_shop_and_supplier_scope() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .send(Method::GET, "/api/products/9999/combinations", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "product-not-found");

    let request = Request::builder()
        .uri(ctx.combinations_path())
        .header("x-shop-id", "2")
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, _) = ctx.send_request(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .uri(ctx.combinations_path())
        .header("x-supplier-id", ctx.supplier.id.to_string())
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, body) = ctx.send_request(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product_data"], json!([]));
}

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));

    let (status, _) = ctx.send(Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
}
