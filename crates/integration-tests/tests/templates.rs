//! Integration tests for variation templates and attribute detail views.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};

use product_variations_integration_tests::TestContext;

/// ID of the only variable in a `{variables, values}` listing.
fn only_variable_id(listing: &Value) -> String {
    let variables = listing["variables"].as_object().unwrap();
    assert_eq!(variables.len(), 1, "{listing}");
    variables.keys().next().unwrap().clone()
}

fn value_ids(listing: &Value, variable_id: &str) -> Vec<i64> {
    listing["values"][variable_id]
        .as_array()
        .unwrap()
        .iter()
        .map(|value| value["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_template_upsert_and_delete() {
    let ctx = TestContext::new().await;

    let (status, created) = ctx
        .send(
            Method::POST,
            "/api/variations",
            Some(json!({"name": "Color", "values": ["Red", "Blue"]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{created}");
    assert_eq!(created["name"], "Color");
    assert_eq!(created["values"], json!(["Red", "Blue"]));

    let (status, updated) = ctx
        .send(
            Method::POST,
            "/api/variations",
            Some(json!({"name": "Color", "values": ["Blue", "Green"]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);

    let (_, listing) = ctx.send(Method::GET, "/api/variations", None).await;
    let variable_id = only_variable_id(&listing);
    let names: Vec<&str> = listing["values"][&variable_id]
        .as_array()
        .unwrap()
        .iter()
        .map(|value| value["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Blue"));
    assert!(names.contains(&"Green"));

    // Unknown names are ignored
    let (status, body) = ctx
        .send(
            Method::DELETE,
            "/api/variations",
            Some(json!({"name": "Material"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (status, _) = ctx
        .send(Method::DELETE, "/api/variations", Some(json!({"name": "Color"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, listing) = ctx.send(Method::GET, "/api/variations", None).await;
    assert_eq!(listing["variables"], json!({}));
}

#[tokio::test]
async fn test_template_detail_translations() {
    let ctx = TestContext::new().await;
    let (_, created) = ctx
        .send(
            Method::POST,
            "/api/variations",
            Some(json!({"name": "Size", "values": ["Small"]})),
        )
        .await;
    let variable_path = format!("/api/variations/variables/{}", created["id"]);

    let (status, detail) = ctx.send(Method::GET, &variable_path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        detail,
        json!({
            "en": {"language_name": "English", "name": "Size"},
            "fi": {"language_name": "Finnish", "name": "Size"},
        })
    );

    let (status, body) = ctx
        .send(
            Method::POST,
            &variable_path,
            Some(json!({"language_code": "fi", "name": "Koko"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let (_, detail) = ctx.send(Method::GET, &variable_path, None).await;
    assert_eq!(detail["fi"]["name"], "Koko");
    assert_eq!(detail["en"]["name"], "Size");

    let (status, body) = ctx
        .send(Method::POST, &variable_path, Some(json!({"unexpected": true})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation-fail");

    let (_, listing) = ctx.send(Method::GET, "/api/variations", None).await;
    let variable_id = only_variable_id(&listing);
    let value_id = value_ids(&listing, &variable_id)[0];
    let value_path = format!("/api/variations/values/{value_id}");

    let (status, _) = ctx
        .send(Method::POST, &value_path, Some(json!({"ordering": 3})))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, listing) = ctx.send(Method::GET, "/api/variations", None).await;
    assert_eq!(listing["values"][&variable_id][0]["order"], 3);

    let (status, body) = ctx.send(Method::GET, "/api/variations/values/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not-found");
}

#[tokio::test]
async fn test_product_variable_detail_respects_shop_scope() {
    let ctx = TestContext::new().await;
    let (status, _) = ctx
        .send(
            Method::POST,
            &ctx.combinations_path(),
            Some(json!([{"combination": {"Color": "Red"}, "sku": "red"}])),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, listing) = ctx
        .send(
            Method::GET,
            &format!("/api/products/{}/variations", ctx.parent.id),
            None,
        )
        .await;
    let variable_id = only_variable_id(&listing);
    let path = format!("/api/product-variations/variables/{variable_id}");

    let (status, detail) = ctx.send(Method::GET, &path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["en"]["name"], "Color");

    let request = Request::builder()
        .uri(&path)
        .header("x-shop-id", "2")
        .body(Body::empty())
        .unwrap();
    let (status, body) = ctx.send_request(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "product-not-found");

    // Product-scoped variables are not templates
    let (status, _) = ctx
        .send(
            Method::GET,
            &format!("/api/variations/variables/{variable_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = ctx
        .send(
            Method::POST,
            &path,
            Some(json!({"language_code": "sv", "name": "Färg"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation-fail");
}
