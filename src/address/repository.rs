use super::models::{AddressRequest, AddressRow};
use sqlx::SqliteExecutor;

const ADDRESS_SELECT: &str = "SELECT address_id, street, building_name, city, state, country, pincode, user_id \
     FROM addresses";

pub async fn list_for_user<'e>(db: impl SqliteExecutor<'e>, user_id: i64) -> Result<Vec<AddressRow>, sqlx::Error> {
    sqlx::query_as::<_, AddressRow>(&format!("{} WHERE user_id = ? ORDER BY address_id", ADDRESS_SELECT))
        .bind(user_id)
        .fetch_all(db)
        .await
}

pub async fn find<'e>(db: impl SqliteExecutor<'e>, address_id: i64) -> Result<Option<AddressRow>, sqlx::Error> {
    sqlx::query_as::<_, AddressRow>(&format!("{} WHERE address_id = ?", ADDRESS_SELECT))
        .bind(address_id)
        .fetch_optional(db)
        .await
}

/// The address if it belongs to `user_id`
pub async fn find_owned<'e>(
    db: impl SqliteExecutor<'e>,
    address_id: i64,
    user_id: i64,
) -> Result<Option<AddressRow>, sqlx::Error> {
    sqlx::query_as::<_, AddressRow>(&format!(
        "{} WHERE address_id = ? AND user_id = ?",
        ADDRESS_SELECT
    ))
    .bind(address_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn insert<'e>(db: impl SqliteExecutor<'e>, user_id: i64, req: &AddressRequest) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO addresses (street, building_name, city, state, country, pincode, user_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(req.street.trim())
    .bind(req.building_name.trim())
    .bind(req.city.trim())
    .bind(req.state.trim())
    .bind(req.country.trim())
    .bind(req.pincode.trim())
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update<'e>(db: impl SqliteExecutor<'e>, address_id: i64, req: &AddressRequest) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE addresses SET street = ?, building_name = ?, city = ?, state = ?, country = ?, pincode = ? \
         WHERE address_id = ?",
    )
    .bind(req.street.trim())
    .bind(req.building_name.trim())
    .bind(req.city.trim())
    .bind(req.state.trim())
    .bind(req.country.trim())
    .bind(req.pincode.trim())
    .bind(address_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn is_referenced_by_orders<'e>(db: impl SqliteExecutor<'e>, address_id: i64) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE address_id = ?")
        .bind(address_id)
        .fetch_one(db)
        .await?;
    Ok(count > 0)
}

pub async fn delete<'e>(db: impl SqliteExecutor<'e>, address_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM addresses WHERE address_id = ?")
        .bind(address_id)
        .execute(db)
        .await?;
    Ok(())
}
