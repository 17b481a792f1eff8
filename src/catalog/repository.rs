use super::{
    models::{CategoryRow, NewProduct, ProductRequest, ProductRow, PRODUCT_COUNT, PRODUCT_SELECT},
    query::ProductQuery,
};
use crate::pagination::PageRequest;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

// =============================================================================
// Categories
// =============================================================================

pub async fn list_categories<'e>(db: impl SqliteExecutor<'e>) -> Result<Vec<CategoryRow>, sqlx::Error> {
    sqlx::query_as::<_, CategoryRow>(
        "SELECT category_id, category_name FROM categories ORDER BY category_id",
    )
    .fetch_all(db)
    .await
}

pub async fn find_category<'e>(
    db: impl SqliteExecutor<'e>,
    category_id: i64,
) -> Result<Option<CategoryRow>, sqlx::Error> {
    sqlx::query_as::<_, CategoryRow>(
        "SELECT category_id, category_name FROM categories WHERE category_id = ?",
    )
    .bind(category_id)
    .fetch_optional(db)
    .await
}

pub async fn category_name_taken<'e>(db: impl SqliteExecutor<'e>, name: &str) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE category_name = ?")
        .bind(name)
        .fetch_one(db)
        .await?;
    Ok(count > 0)
}

pub async fn insert_category<'e>(db: impl SqliteExecutor<'e>, name: &str) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO categories (category_name) VALUES (?)")
        .bind(name)
        .execute(db)
        .await?;
    Ok(result.last_insert_rowid())
}

// =============================================================================
// Products
// =============================================================================

/// One page of products matching `query`, plus the total match count.
///
/// `leading_order` is placed ahead of the requested sort, e.g. `p.price ASC`.
pub async fn fetch_page(
    pool: &SqlitePool,
    query: &ProductQuery,
    page: &PageRequest,
    leading_order: Option<&str>,
) -> Result<(Vec<ProductRow>, i64), sqlx::Error> {
    let mut select = QueryBuilder::<Sqlite>::new(PRODUCT_SELECT);
    query.push_where(&mut select);
    select.push(" ORDER BY ");
    if let Some(order) = leading_order {
        select.push(order).push(", ");
    }
    select
        .push(page.order_clause())
        .push(" LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows = select.build_query_as::<ProductRow>().fetch_all(pool).await?;
    let total = count(pool, query).await?;
    Ok((rows, total))
}

/// Every product matching `query`, newest first.
pub async fn fetch_all(pool: &SqlitePool, query: &ProductQuery) -> Result<Vec<ProductRow>, sqlx::Error> {
    let mut select = QueryBuilder::<Sqlite>::new(PRODUCT_SELECT);
    query.push_where(&mut select);
    select.push(" ORDER BY p.product_id DESC");
    select.build_query_as::<ProductRow>().fetch_all(pool).await
}

pub async fn count(pool: &SqlitePool, query: &ProductQuery) -> Result<i64, sqlx::Error> {
    let mut select = QueryBuilder::<Sqlite>::new(PRODUCT_COUNT);
    query.push_where(&mut select);
    select.build_query_scalar::<i64>().fetch_one(pool).await
}

pub async fn find_product<'e>(
    db: impl SqliteExecutor<'e>,
    product_id: i64,
) -> Result<Option<ProductRow>, sqlx::Error> {
    sqlx::query_as::<_, ProductRow>(&format!("{} WHERE p.product_id = ?", PRODUCT_SELECT))
        .bind(product_id)
        .fetch_optional(db)
        .await
}

pub async fn insert_product<'e>(db: impl SqliteExecutor<'e>, product: &NewProduct) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO products \
         (product_name, image, description, quantity, price, discount, special_price, category_id, seller_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&product.product_name)
    .bind(&product.image)
    .bind(&product.description)
    .bind(product.quantity)
    .bind(product.price)
    .bind(product.discount)
    .bind(product.special_price)
    .bind(product.category_id)
    .bind(product.seller_id)
    .execute(db)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update_product<'e>(
    db: impl SqliteExecutor<'e>,
    product_id: i64,
    req: &ProductRequest,
    special_price: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE products SET product_name = ?, description = ?, quantity = ?, price = ?, \
         discount = ?, special_price = ? WHERE product_id = ?",
    )
    .bind(req.product_name.trim())
    .bind(req.description.trim())
    .bind(req.quantity)
    .bind(req.price)
    .bind(req.discount)
    .bind(special_price)
    .bind(product_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn set_seller<'e>(db: impl SqliteExecutor<'e>, product_id: i64, seller_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE products SET seller_id = ? WHERE product_id = ?")
        .bind(seller_id)
        .bind(product_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn set_image<'e>(db: impl SqliteExecutor<'e>, product_id: i64, image: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE products SET image = ? WHERE product_id = ?")
        .bind(image)
        .bind(product_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete_product<'e>(db: impl SqliteExecutor<'e>, product_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM products WHERE product_id = ?")
        .bind(product_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Takes `quantity` units out of stock; `false` when not enough are left.
pub async fn decrement_stock<'e>(
    db: impl SqliteExecutor<'e>,
    product_id: i64,
    quantity: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE products SET quantity = quantity - ? WHERE product_id = ? AND quantity >= ?",
    )
    .bind(quantity)
    .bind(product_id)
    .bind(quantity)
    .execute(db)
    .await?;
    Ok(result.rows_affected() == 1)
}
