//! OpenAPI document for the product endpoints.

use crate::error::{ErrorBody, ErrorDetail};
use crate::handlers::product;
use crate::product::{Product, ProductPayload};
use crate::response::MetaCount;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Catalog API", description = "Product records of an e-commerce catalog"),
    paths(
        product::list_products,
        product::get_product,
        product::update_product,
        product::delete_product,
    ),
    components(schemas(Product, ProductPayload, MetaCount, ErrorBody, ErrorDetail)),
    tags((name = "products", description = "Product listing, lookup, update and removal"))
)]
pub struct ApiDoc;
