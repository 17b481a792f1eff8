//! REST API handlers for categories and products

use super::{models::*, service, service::UploadedImage};
use crate::{
    auth::{AdminUser, AuthUser, MaybeUser},
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    pagination::{PageParams, PagedResponse},
    state::SharedState,
};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use std::collections::HashMap;

/// Upper bound for request bodies on catalog routes (image uploads)
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Creates routes for catalog operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/public/categories", get(list_categories))
        .route("/admin/categories", post(create_category))
        .route("/public/products", get(get_all_products))
        .route("/public/categories/:category_id/products", get(products_by_category))
        .route("/public/products/keyword/:keyword", get(products_by_keyword))
        .route("/user/categories/:category_id/product", post(add_product))
        .route("/admin/categories/:category_id/product", post(add_product_admin))
        .route(
            "/user/categories/:category_id/product/with-image",
            post(add_product_with_image),
        )
        .route("/user/products", get(my_products))
        .route("/user/products/all", get(my_products_list))
        .route("/user/products/count", get(my_products_count))
        .route(
            "/user/products/:product_id",
            put(update_product).delete(delete_product),
        )
        .route(
            "/admin/products/:product_id",
            put(update_product_admin).delete(delete_product_admin),
        )
        .route("/user/products/:product_id/image", put(update_image))
        .route("/admin/products/:product_id/image", put(update_image_admin))
        .route("/products/user/:user_id", get(seller_products))
        .route("/products/user/:user_id/all", get(seller_products_list))
        .route("/products/user/:user_id/count", get(seller_products_count))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

// =============================================================================
// Categories
// =============================================================================

/// Endpoint: GET /api/public/categories
async fn list_categories(State(state): State<SharedState>) -> ApiResult<Json<Vec<CategoryDto>>> {
    Ok(Json(service::list_categories(&state).await?))
}

/// Endpoint: POST /api/admin/categories
async fn create_category(
    State(state): State<SharedState>,
    AdminUser(_admin): AdminUser,
    ApiJson(payload): ApiJson<CategoryRequest>,
) -> ApiResult<impl IntoResponse> {
    let category = service::create_category(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

// =============================================================================
// Public product queries
// =============================================================================

/// Endpoint: GET /api/public/products
async fn get_all_products(
    State(state): State<SharedState>,
    MaybeUser(viewer): MaybeUser,
    ApiQuery(filter): ApiQuery<ProductFilterParams>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<PagedResponse<ProductDto>>> {
    let page = service::get_all_products(&state, viewer.as_ref(), &filter, &params).await?;
    Ok(Json(page))
}

/// Endpoint: GET /api/public/categories/:category_id/products
async fn products_by_category(
    State(state): State<SharedState>,
    MaybeUser(viewer): MaybeUser,
    ApiPath(category_id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<PagedResponse<ProductDto>>> {
    let page = service::products_by_category(&state, viewer.as_ref(), category_id, &params).await?;
    Ok(Json(page))
}

/// Endpoint: GET /api/public/products/keyword/:keyword
async fn products_by_keyword(
    State(state): State<SharedState>,
    MaybeUser(viewer): MaybeUser,
    ApiPath(keyword): ApiPath<String>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<PagedResponse<ProductDto>>> {
    let page = service::products_by_keyword(&state, viewer.as_ref(), &keyword, &params).await?;
    Ok(Json(page))
}

// =============================================================================
// Product writes
// =============================================================================

/// Endpoint: POST /api/user/categories/:category_id/product
async fn add_product(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiPath(category_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<ProductRequest>,
) -> ApiResult<impl IntoResponse> {
    let product = service::add_product(&state, &caller, category_id, payload, None).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Endpoint: POST /api/admin/categories/:category_id/product
async fn add_product_admin(
    State(state): State<SharedState>,
    AdminUser(admin): AdminUser,
    ApiPath(category_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<ProductRequest>,
) -> ApiResult<impl IntoResponse> {
    let product = service::add_product(&state, &admin, category_id, payload, None).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Endpoint: POST /api/user/categories/:category_id/product/with-image
/// Multipart form: productName, description, quantity, price, discount?, image?
async fn add_product_with_image(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiPath(category_id): ApiPath<i64>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let form = ProductForm::read(multipart).await?;
    let request = form.product_request()?;
    let product = service::add_product(&state, &caller, category_id, request, form.image).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Endpoint: PUT /api/user/products/:product_id
async fn update_product(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiPath(product_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<ProductRequest>,
) -> ApiResult<Json<ProductDto>> {
    Ok(Json(service::update_product(&state, &caller, product_id, payload).await?))
}

/// Endpoint: PUT /api/admin/products/:product_id
async fn update_product_admin(
    State(state): State<SharedState>,
    AdminUser(admin): AdminUser,
    ApiPath(product_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<ProductRequest>,
) -> ApiResult<Json<ProductDto>> {
    Ok(Json(service::update_product(&state, &admin, product_id, payload).await?))
}

/// Endpoint: DELETE /api/user/products/:product_id
async fn delete_product(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiPath(product_id): ApiPath<i64>,
) -> ApiResult<Json<ProductDto>> {
    Ok(Json(service::delete_product(&state, &caller, product_id).await?))
}

/// Endpoint: DELETE /api/admin/products/:product_id
async fn delete_product_admin(
    State(state): State<SharedState>,
    AdminUser(admin): AdminUser,
    ApiPath(product_id): ApiPath<i64>,
) -> ApiResult<Json<ProductDto>> {
    Ok(Json(service::delete_product(&state, &admin, product_id).await?))
}

/// Endpoint: PUT /api/user/products/:product_id/image
async fn update_image(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiPath(product_id): ApiPath<i64>,
    multipart: Multipart,
) -> ApiResult<Json<ProductDto>> {
    let form = ProductForm::read(multipart).await?;
    Ok(Json(
        service::update_product_image(&state, &caller, product_id, form.image).await?,
    ))
}

/// Endpoint: PUT /api/admin/products/:product_id/image
async fn update_image_admin(
    State(state): State<SharedState>,
    AdminUser(admin): AdminUser,
    ApiPath(product_id): ApiPath<i64>,
    multipart: Multipart,
) -> ApiResult<Json<ProductDto>> {
    let form = ProductForm::read(multipart).await?;
    Ok(Json(
        service::update_product_image(&state, &admin, product_id, form.image).await?,
    ))
}

// =============================================================================
// Seller listings
// =============================================================================

/// Endpoint: GET /api/user/products
async fn my_products(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<PagedResponse<ProductDto>>> {
    Ok(Json(service::my_products(&state, &caller, &params).await?))
}

/// Endpoint: GET /api/user/products/all
async fn my_products_list(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<Vec<ProductDto>>> {
    Ok(Json(service::my_products_list(&state, &caller).await?))
}

/// Endpoint: GET /api/user/products/count
async fn my_products_count(
    State(state): State<SharedState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<i64>> {
    Ok(Json(service::my_products_count(&state, &caller).await?))
}

/// Endpoint: GET /api/products/user/:user_id
async fn seller_products(
    State(state): State<SharedState>,
    MaybeUser(viewer): MaybeUser,
    ApiPath(user_id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<Json<PagedResponse<ProductDto>>> {
    Ok(Json(
        service::seller_products(&state, viewer.as_ref(), user_id, &params).await?,
    ))
}

/// Endpoint: GET /api/products/user/:user_id/all
async fn seller_products_list(
    State(state): State<SharedState>,
    MaybeUser(viewer): MaybeUser,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<ProductDto>>> {
    Ok(Json(
        service::seller_products_list(&state, viewer.as_ref(), user_id).await?,
    ))
}

/// Endpoint: GET /api/products/user/:user_id/count
async fn seller_products_count(
    State(state): State<SharedState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<i64>> {
    Ok(Json(service::seller_products_count(&state, user_id).await?))
}

// =============================================================================
// Multipart forms
// =============================================================================

/// Text fields and the optional `image` part of a product form
#[derive(Debug, Default)]
struct ProductForm {
    fields: HashMap<String, String>,
    image: Option<UploadedImage>,
}

impl ProductForm {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = ProductForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::api(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| ApiError::api(e.body_text()))?;
                form.image = Some(UploadedImage {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            } else {
                let value = field.text().await.map_err(|e| ApiError::api(e.body_text()))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    fn number<T: std::str::FromStr + Default>(&self, name: &str, required: bool) -> ApiResult<T> {
        match self.fields.get(name).map(|v| v.trim()) {
            Some(raw) if !raw.is_empty() => raw
                .parse()
                .map_err(|_| ApiError::api(format!("Invalid value for {}: {}", name, raw))),
            _ if required => Err(ApiError::api(format!(
                "Required request parameter '{}' is not present",
                name
            ))),
            _ => Ok(T::default()),
        }
    }

    fn product_request(&self) -> ApiResult<ProductRequest> {
        Ok(ProductRequest {
            product_name: self.text("productName"),
            description: self.text("description"),
            quantity: self.number("quantity", true)?,
            price: self.number("price", true)?,
            discount: self.number("discount", false)?,
        })
    }
}
