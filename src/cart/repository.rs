use super::models::{CartLineRow, CartProductRow, CartRow};
use crate::catalog::models::PRODUCT_SELECT;
use sqlx::{SqliteConnection, SqliteExecutor};

pub async fn find_by_user<'e>(db: impl SqliteExecutor<'e>, user_id: i64) -> Result<Option<CartRow>, sqlx::Error> {
    sqlx::query_as::<_, CartRow>("SELECT cart_id, user_id, total_price FROM carts WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(db)
        .await
}

pub async fn find_owned<'e>(
    db: impl SqliteExecutor<'e>,
    cart_id: i64,
    user_id: i64,
) -> Result<Option<CartRow>, sqlx::Error> {
    sqlx::query_as::<_, CartRow>(
        "SELECT cart_id, user_id, total_price FROM carts WHERE cart_id = ? AND user_id = ?",
    )
    .bind(cart_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

/// The user's cart, created empty when it does not exist yet.
pub async fn get_or_create(conn: &mut SqliteConnection, user_id: i64) -> Result<CartRow, sqlx::Error> {
    if let Some(cart) = find_by_user(&mut *conn, user_id).await? {
        return Ok(cart);
    }
    let result = sqlx::query("INSERT INTO carts (user_id, total_price) VALUES (?, 0)")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(CartRow {
        cart_id: result.last_insert_rowid(),
        user_id,
        total_price: 0.0,
    })
}

const LINE_SELECT: &str = "SELECT ci.cart_item_id, ci.cart_id, ci.product_id, p.product_name, \
     ci.quantity, ci.discount, ci.product_price \
     FROM cart_items ci JOIN products p ON p.product_id = ci.product_id";

pub async fn lines<'e>(db: impl SqliteExecutor<'e>, cart_id: i64) -> Result<Vec<CartLineRow>, sqlx::Error> {
    sqlx::query_as::<_, CartLineRow>(&format!(
        "{} WHERE ci.cart_id = ? ORDER BY ci.cart_item_id",
        LINE_SELECT
    ))
    .bind(cart_id)
    .fetch_all(db)
    .await
}

pub async fn find_line<'e>(
    db: impl SqliteExecutor<'e>,
    cart_id: i64,
    product_id: i64,
) -> Result<Option<CartLineRow>, sqlx::Error> {
    sqlx::query_as::<_, CartLineRow>(&format!(
        "{} WHERE ci.cart_id = ? AND ci.product_id = ?",
        LINE_SELECT
    ))
    .bind(cart_id)
    .bind(product_id)
    .fetch_optional(db)
    .await
}

pub async fn insert_line<'e>(
    db: impl SqliteExecutor<'e>,
    cart_id: i64,
    product_id: i64,
    quantity: i64,
    discount: f64,
    product_price: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO cart_items (cart_id, product_id, quantity, discount, product_price) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(cart_id)
    .bind(product_id)
    .bind(quantity)
    .bind(discount)
    .bind(product_price)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn delete_line<'e>(db: impl SqliteExecutor<'e>, cart_id: i64, product_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM cart_items WHERE cart_id = ? AND product_id = ?")
        .bind(cart_id)
        .bind(product_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Removes every line and zeroes the total.
pub async fn clear(conn: &mut SqliteConnection, cart_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
        .bind(cart_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("UPDATE carts SET total_price = 0 WHERE cart_id = ?")
        .bind(cart_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Sets the total to Σ(product_price × quantity) over the current lines.
pub async fn recalculate_total<'e>(db: impl SqliteExecutor<'e>, cart_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE carts SET total_price = \
         (SELECT COALESCE(SUM(product_price * quantity), 0) FROM cart_items WHERE cart_id = ?) \
         WHERE cart_id = ?",
    )
    .bind(cart_id)
    .bind(cart_id)
    .execute(db)
    .await?;
    Ok(())
}

/// Ids of carts holding `product_id`
pub async fn carts_containing<'e>(db: impl SqliteExecutor<'e>, product_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT DISTINCT cart_id FROM cart_items WHERE product_id = ?")
        .bind(product_id)
        .fetch_all(db)
        .await
}

pub async fn cart_products<'e>(
    db: impl SqliteExecutor<'e>,
    cart_id: i64,
) -> Result<Vec<CartProductRow>, sqlx::Error> {
    sqlx::query_as::<_, CartProductRow>(&format!(
        "SELECT prod.*, ci.quantity AS cart_quantity FROM cart_items ci \
         JOIN ({}) prod ON prod.product_id = ci.product_id \
         WHERE ci.cart_id = ? ORDER BY ci.cart_item_id",
        PRODUCT_SELECT
    ))
    .bind(cart_id)
    .fetch_all(db)
    .await
}
