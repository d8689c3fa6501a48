//! HTTP middleware and extractors for the variations admin.
//!
//! - [`request_id`] - Correlates logs, Sentry events and responses
//! - [`shop`] - Shop and supplier scope from request headers
//! - [`json`] - JSON bodies with errors in the API's error format

pub mod json;
pub mod request_id;
pub mod shop;

pub use json::JsonBody;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use shop::{SHOP_HEADER, SUPPLIER_HEADER, ShopContext};
