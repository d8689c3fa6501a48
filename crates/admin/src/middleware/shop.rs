//! Shop and supplier scope extractor.

use axum::{extract::FromRequestParts, http::request::Parts};

use product_variations_core::{ShopId, SupplierId};

use crate::error::AppError;
use crate::services::ShopScope;
use crate::state::AppState;

/// Header naming the shop a request acts for.
pub const SHOP_HEADER: &str = "x-shop-id";

/// Header naming the supplier a request acts for.
pub const SUPPLIER_HEADER: &str = "x-supplier-id";

/// Shop and optional supplier of the current request.
///
/// The shop defaults to the configured default shop when `X-Shop-Id` is
/// absent. A header that is present but not a valid ID rejects the request.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(ShopContext(scope): ShopContext) -> impl IntoResponse {
///     format!("shop {}", scope.shop)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ShopContext(pub ShopScope);

impl FromRequestParts<AppState> for ShopContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let shop = parse_id(parts, SHOP_HEADER)?
            .map_or(state.config().default_shop_id, ShopId::new);
        let supplier = parse_id(parts, SUPPLIER_HEADER)?.map(SupplierId::new);

        Ok(Self(ShopScope { shop, supplier }))
    }
}

fn parse_id(parts: &Parts, header: &str) -> Result<Option<i32>, AppError> {
    let Some(value) = parts.headers.get(header) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|raw| raw.trim().parse::<i32>().ok())
        .map(Some)
        .ok_or_else(|| AppError::BadRequest(format!("invalid {header} header")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(&parts(&[]), SHOP_HEADER).unwrap(), None);
        assert_eq!(
            parse_id(&parts(&[("X-Shop-Id", " 4 ")]), SHOP_HEADER).unwrap(),
            Some(4)
        );
        let err = parse_id(&parts(&[("X-Supplier-Id", "main")]), SUPPLIER_HEADER).unwrap_err();
        assert_eq!(err.code(), "invalid-content");
    }
}
