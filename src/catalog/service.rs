//! Catalog operations shared by the user and admin endpoints.
//!
//! Authorization is decided here rather than in the routes: the user and
//! admin variants of an endpoint call the same function and the ownership
//! rule lets admins through.

use super::{
    helpers::*,
    images::store_image,
    models::*,
    repository,
    query::{ProductQuery, ProductSpec},
};
use crate::{
    auth::Principal,
    cart,
    db,
    error::{ApiError, ApiResult},
    pagination::{PageParams, PageRequest, PagedResponse, SortDirection, SortSpec},
    state::AppState,
};
use sqlx::SqliteConnection;

pub const PRODUCT_SORT: SortSpec = SortSpec {
    fields: &[
        ("productId", "p.product_id"),
        ("productName", "p.product_name"),
        ("price", "p.price"),
        ("specialPrice", "p.special_price"),
        ("discount", "p.discount"),
        ("quantity", "p.quantity"),
        ("categoryId", "p.category_id"),
    ],
    tiebreak: "p.product_id",
    default_field: "productId",
    default_direction: SortDirection::Asc,
    default_page_size: None,
};

/// A file received in a multipart upload
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

// =============================================================================
// Categories
// =============================================================================

pub async fn list_categories(state: &AppState) -> ApiResult<Vec<CategoryDto>> {
    let rows = repository::list_categories(&state.db).await?;
    Ok(rows.into_iter().map(CategoryDto::from).collect())
}

pub async fn create_category(state: &AppState, req: CategoryRequest) -> ApiResult<CategoryDto> {
    let errors = validate_category(&req);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let name = req.category_name.trim();
    if repository::category_name_taken(&state.db, name).await? {
        return Err(ApiError::api(format!("Category with the name {} already exists !!!", name)));
    }

    let category_id = repository::insert_category(&state.db, name).await?;
    tracing::info!(event = "catalog.category_created", category_id, name = %name);

    Ok(CategoryDto {
        category_id,
        category_name: name.to_string(),
    })
}

// =============================================================================
// Product writes
// =============================================================================

/// Creates a product owned by `caller` in `category_id`.
pub async fn add_product(
    state: &AppState,
    caller: &Principal,
    category_id: i64,
    req: ProductRequest,
    image: Option<UploadedImage>,
) -> ApiResult<ProductDto> {
    let errors = validate_product(&req);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    repository::find_category(&state.db, category_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", "categoryId", category_id))?;

    let image_name = match image {
        Some(upload) if !upload.bytes.is_empty() => {
            store_image(&state.config.upload_dir, &upload.file_name, &upload.bytes).await?
        }
        _ => DEFAULT_IMAGE.to_string(),
    };

    let product = NewProduct {
        product_name: req.product_name.trim().to_string(),
        image: image_name,
        description: req.description.trim().to_string(),
        quantity: req.quantity,
        price: req.price,
        discount: req.discount,
        special_price: special_price(req.price, req.discount),
        category_id,
        seller_id: caller.user_id,
    };
    let product_id = repository::insert_product(&state.db, &product).await?;

    tracing::info!(
        event = "catalog.product_created",
        product_id,
        category_id,
        seller_id = caller.user_id,
    );

    load_product(state, product_id, Some(caller)).await
}

pub async fn update_product(
    state: &AppState,
    caller: &Principal,
    product_id: i64,
    req: ProductRequest,
) -> ApiResult<ProductDto> {
    let errors = validate_product(&req);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let mut tx = db::begin_write(&state.db).await?;
    let row = find_product_or_404(&mut tx, product_id).await?;
    enforce_access(&mut tx, &row, caller, "update").await?;
    repository::update_product(&mut *tx, product_id, &req, special_price(req.price, req.discount)).await?;
    tx.commit().await?;

    tracing::info!(event = "catalog.product_updated", product_id, user_id = caller.user_id);
    load_product(state, product_id, Some(caller)).await
}

/// Hard-deletes a product after pulling it out of every cart.
pub async fn delete_product(state: &AppState, caller: &Principal, product_id: i64) -> ApiResult<ProductDto> {
    let mut tx = db::begin_write(&state.db).await?;
    let row = find_product_or_404(&mut tx, product_id).await?;
    enforce_access(&mut tx, &row, caller, "delete").await?;

    let cart_ids = cart::repository::carts_containing(&mut *tx, product_id).await?;
    for cart_id in &cart_ids {
        cart::service::delete_product_from_cart(&mut tx, *cart_id, product_id).await?;
    }
    repository::delete_product(&mut *tx, product_id).await?;
    tx.commit().await?;

    tracing::info!(
        event = "catalog.product_deleted",
        product_id,
        user_id = caller.user_id,
        carts_updated = cart_ids.len(),
    );
    Ok(to_product_dto(row, &state.config.image_base_url, Some(caller)))
}

pub async fn update_product_image(
    state: &AppState,
    caller: &Principal,
    product_id: i64,
    image: Option<UploadedImage>,
) -> ApiResult<ProductDto> {
    let upload = match image {
        Some(upload) if !upload.bytes.is_empty() => upload,
        _ => return Err(ApiError::api("Image file is required")),
    };

    let mut tx = db::begin_write(&state.db).await?;
    let row = find_product_or_404(&mut tx, product_id).await?;
    enforce_access(&mut tx, &row, caller, "update image for").await?;

    let file_name = store_image(&state.config.upload_dir, &upload.file_name, &upload.bytes).await?;
    repository::set_image(&mut *tx, product_id, &file_name).await?;
    tx.commit().await?;

    load_product(state, product_id, Some(caller)).await
}

async fn find_product_or_404(conn: &mut SqliteConnection, product_id: i64) -> ApiResult<ProductRow> {
    repository::find_product(&mut *conn, product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", "productId", product_id))
}

/// Applies the ownership rule; an unowned product is claimed by the caller.
async fn enforce_access(
    conn: &mut SqliteConnection,
    row: &ProductRow,
    caller: &Principal,
    operation: &str,
) -> ApiResult<()> {
    match product_access(row, caller) {
        ProductAccess::Allowed => Ok(()),
        ProductAccess::Claim => {
            repository::set_seller(&mut *conn, row.product_id, caller.user_id).await?;
            tracing::info!(
                event = "catalog.product_claimed",
                product_id = row.product_id,
                seller_id = caller.user_id,
            );
            Ok(())
        }
        ProductAccess::Denied => Err(ApiError::Forbidden(format!(
            "You are not authorised to {} this product",
            operation
        ))),
    }
}

async fn load_product(state: &AppState, product_id: i64, viewer: Option<&Principal>) -> ApiResult<ProductDto> {
    let row = repository::find_product(&state.db, product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", "productId", product_id))?;
    Ok(to_product_dto(row, &state.config.image_base_url, viewer))
}

// =============================================================================
// Product queries
// =============================================================================

async fn page_of(
    state: &AppState,
    viewer: Option<&Principal>,
    query: &ProductQuery,
    params: &PageParams,
    leading_order: Option<&str>,
) -> ApiResult<PagedResponse<ProductDto>> {
    let page = PageRequest::resolve(params, &PRODUCT_SORT, state.config.default_page_size)?;
    let (rows, total) = repository::fetch_page(&state.db, query, &page, leading_order).await?;
    let content = rows
        .into_iter()
        .map(|row| to_product_dto(row, &state.config.image_base_url, viewer))
        .collect();
    Ok(PagedResponse::new(content, &page, total))
}

/// Public listing filtered by keyword and category name; may be empty.
pub async fn get_all_products(
    state: &AppState,
    viewer: Option<&Principal>,
    filter: &ProductFilterParams,
    params: &PageParams,
) -> ApiResult<PagedResponse<ProductDto>> {
    let query = ProductQuery::all()
        .keyword(filter.keyword.as_deref())
        .category_name(filter.category.as_deref());
    page_of(state, viewer, &query, params, None).await
}

pub async fn products_by_category(
    state: &AppState,
    viewer: Option<&Principal>,
    category_id: i64,
    params: &PageParams,
) -> ApiResult<PagedResponse<ProductDto>> {
    let category = repository::find_category(&state.db, category_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", "categoryId", category_id))?;

    let query = ProductQuery::all().and(ProductSpec::CategoryIs(category_id));
    let page = page_of(state, viewer, &query, params, Some("p.price ASC")).await?;
    if page.content.is_empty() {
        return Err(ApiError::api(format!(
            "{} category does not have any products",
            category.category_name
        )));
    }
    Ok(page)
}

pub async fn products_by_keyword(
    state: &AppState,
    viewer: Option<&Principal>,
    keyword: &str,
    params: &PageParams,
) -> ApiResult<PagedResponse<ProductDto>> {
    let query = ProductQuery::all().and(ProductSpec::NameContains(keyword.to_string()));
    let page = page_of(state, viewer, &query, params, None).await?;
    if page.content.is_empty() {
        return Err(ApiError::api(format!("Products not found with keyword: {}", keyword)));
    }
    Ok(page)
}

/// Newest listings first on the seller views
const NEWEST_FIRST: &str = "p.product_id DESC";

/// Products sold by the caller, paged
pub async fn my_products(
    state: &AppState,
    caller: &Principal,
    params: &PageParams,
) -> ApiResult<PagedResponse<ProductDto>> {
    let query = ProductQuery::all().and(ProductSpec::SellerEmailIs(caller.email.clone()));
    let page = page_of(state, Some(caller), &query, params, Some(NEWEST_FIRST)).await?;
    if page.content.is_empty() {
        return Err(ApiError::api(format!("No products found for user: {}", caller.email)));
    }
    Ok(page)
}

pub async fn my_products_list(state: &AppState, caller: &Principal) -> ApiResult<Vec<ProductDto>> {
    let query = ProductQuery::all().and(ProductSpec::SellerEmailIs(caller.email.clone()));
    let rows = repository::fetch_all(&state.db, &query).await?;
    if rows.is_empty() {
        return Err(ApiError::api(format!("No products found for user: {}", caller.email)));
    }
    Ok(rows
        .into_iter()
        .map(|row| to_product_dto(row, &state.config.image_base_url, Some(caller)))
        .collect())
}

pub async fn my_products_count(state: &AppState, caller: &Principal) -> ApiResult<i64> {
    let query = ProductQuery::all().and(ProductSpec::SellerEmailIs(caller.email.clone()));
    Ok(repository::count(&state.db, &query).await?)
}

/// Products sold by `seller_id`, paged
pub async fn seller_products(
    state: &AppState,
    viewer: Option<&Principal>,
    seller_id: i64,
    params: &PageParams,
) -> ApiResult<PagedResponse<ProductDto>> {
    let query = ProductQuery::all().and(ProductSpec::SellerIs(seller_id));
    let page = page_of(state, viewer, &query, params, Some(NEWEST_FIRST)).await?;
    if page.content.is_empty() {
        return Err(ApiError::api(format!("No products found for user ID: {}", seller_id)));
    }
    Ok(page)
}

pub async fn seller_products_list(
    state: &AppState,
    viewer: Option<&Principal>,
    seller_id: i64,
) -> ApiResult<Vec<ProductDto>> {
    let query = ProductQuery::all().and(ProductSpec::SellerIs(seller_id));
    let rows = repository::fetch_all(&state.db, &query).await?;
    if rows.is_empty() {
        return Err(ApiError::api(format!("No products found for user ID: {}", seller_id)));
    }
    Ok(rows
        .into_iter()
        .map(|row| to_product_dto(row, &state.config.image_base_url, viewer))
        .collect())
}

pub async fn seller_products_count(state: &AppState, seller_id: i64) -> ApiResult<i64> {
    let query = ProductQuery::all().and(ProductSpec::SellerIs(seller_id));
    Ok(repository::count(&state.db, &query).await?)
}
