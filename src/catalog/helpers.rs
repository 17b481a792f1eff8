//! Catalog Business Logic Helpers
//!
//! Pricing, image URLs, DTO mapping with role-based field filtering,
//! validation and the product ownership rule.

use super::models::{CategoryRequest, ProductDto, ProductRequest, ProductRow, SellerDto};
use crate::{auth::Principal, error::FieldErrors};

/// Image name given to products created without an upload
pub const DEFAULT_IMAGE: &str = "default.png";

/// Price after applying a percentage discount; no discount keeps the price.
pub fn special_price(price: f64, discount: f64) -> f64 {
    if discount > 0.0 {
        price - (discount * 0.01 * price)
    } else {
        price
    }
}

/// Joins the configured base URL and a stored image name with a single `/`.
pub fn image_url(base_url: &str, image: &str) -> String {
    if base_url.ends_with('/') {
        format!("{}{}", base_url, image)
    } else {
        format!("{}/{}", base_url, image)
    }
}

/// Whether `viewer` may see seller details of `row`
pub fn can_view_seller(row: &ProductRow, viewer: Option<&Principal>) -> bool {
    match viewer {
        Some(p) if p.is_admin() => true,
        Some(p) => row.seller_id == Some(p.user_id),
        None => false,
    }
}

/// Maps a row to its DTO, exposing the seller only where [`can_view_seller`] allows.
pub fn to_product_dto(row: ProductRow, image_base_url: &str, viewer: Option<&Principal>) -> ProductDto {
    let seller = if can_view_seller(&row, viewer) {
        match (row.seller_id, row.seller_username.clone(), row.seller_email.clone()) {
            (Some(user_id), Some(username), Some(email)) => Some(SellerDto {
                user_id,
                username,
                email,
            }),
            _ => None,
        }
    } else {
        None
    };

    ProductDto {
        product_id: row.product_id,
        image: image_url(image_base_url, &row.image),
        product_name: row.product_name,
        description: row.description,
        quantity: row.quantity,
        price: row.price,
        discount: row.discount,
        special_price: row.special_price,
        category_id: row.category_id,
        category_name: row.category_name,
        seller,
    }
}

pub fn validate_product(req: &ProductRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if req.product_name.trim().chars().count() < 3 {
        errors.insert(
            "productName".into(),
            "Product name must contain at least 3 characters".into(),
        );
    }
    if req.description.trim().chars().count() < 6 {
        errors.insert(
            "description".into(),
            "Product description must contain at least 6 characters".into(),
        );
    }
    if req.quantity < 0 {
        errors.insert("quantity".into(), "Quantity must not be negative".into());
    }
    if !req.price.is_finite() || req.price < 0.0 {
        errors.insert("price".into(), "Price must not be negative".into());
    }
    if !(0.0..=100.0).contains(&req.discount) {
        errors.insert("discount".into(), "Discount must be between 0 and 100".into());
    }
    errors
}

pub fn validate_category(req: &CategoryRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if req.category_name.trim().chars().count() < 3 {
        errors.insert(
            "categoryName".into(),
            "Category name must contain at least 3 characters".into(),
        );
    }
    errors
}

/// Outcome of the ownership rule for a mutating product operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductAccess {
    Allowed,
    /// The product has no seller yet and becomes the caller's
    Claim,
    Denied,
}

/// Admins may touch any product; everyone else only their own or unowned ones.
pub fn product_access(row: &ProductRow, caller: &Principal) -> ProductAccess {
    if caller.is_admin() {
        return ProductAccess::Allowed;
    }
    match row.seller_id {
        None => ProductAccess::Claim,
        Some(id) if id == caller.user_id => ProductAccess::Allowed,
        Some(_) => ProductAccess::Denied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn row(seller_id: Option<i64>) -> ProductRow {
        ProductRow {
            product_id: 7,
            product_name: "Desk Lamp".into(),
            image: "lamp.png".into(),
            description: "Warm white lamp".into(),
            quantity: 4,
            price: 40.0,
            discount: 25.0,
            special_price: 30.0,
            category_id: 1,
            category_name: "Lighting".into(),
            seller_id,
            seller_username: seller_id.map(|_| "sam".to_string()),
            seller_email: seller_id.map(|_| "sam@shop.test".to_string()),
        }
    }

    fn principal(user_id: i64, roles: Vec<Role>) -> Principal {
        Principal {
            user_id,
            username: format!("user{}", user_id),
            email: format!("user{}@shop.test", user_id),
            roles,
        }
    }

    #[test]
    fn test_special_price() {
        assert_eq!(special_price(200.0, 10.0), 180.0);
        assert_eq!(special_price(99.5, 0.0), 99.5);
        assert_eq!(special_price(50.0, 100.0), 0.0);
    }

    #[test]
    fn test_image_url_single_slash() {
        assert_eq!(image_url("http://h/images", "a.png"), "http://h/images/a.png");
        assert_eq!(image_url("http://h/images/", "a.png"), "http://h/images/a.png");
    }

    #[test]
    fn test_seller_hidden_from_public_and_other_users() {
        let public = to_product_dto(row(Some(3)), "http://h", None);
        assert!(public.seller.is_none());
        assert_eq!(public.image, "http://h/lamp.png");

        let stranger = principal(9, vec![Role::User]);
        assert!(to_product_dto(row(Some(3)), "http://h", Some(&stranger)).seller.is_none());
    }

    #[test]
    fn test_seller_visible_to_owner_and_admin() {
        let owner = principal(3, vec![Role::User, Role::Seller]);
        let dto = to_product_dto(row(Some(3)), "http://h", Some(&owner));
        assert_eq!(dto.seller.unwrap().email, "sam@shop.test");

        let admin = principal(1, vec![Role::Admin]);
        assert!(to_product_dto(row(Some(3)), "http://h", Some(&admin)).seller.is_some());
    }

    #[test]
    fn test_product_access() {
        let owner = principal(3, vec![Role::User]);
        let other = principal(4, vec![Role::User]);
        let admin = principal(1, vec![Role::Admin]);

        assert_eq!(product_access(&row(Some(3)), &owner), ProductAccess::Allowed);
        assert_eq!(product_access(&row(Some(3)), &other), ProductAccess::Denied);
        assert_eq!(product_access(&row(Some(3)), &admin), ProductAccess::Allowed);
        assert_eq!(product_access(&row(None), &other), ProductAccess::Claim);
    }

    #[test]
    fn test_validate_product() {
        let errors = validate_product(&ProductRequest {
            product_name: "TV".into(),
            description: "short".into(),
            quantity: -1,
            price: -2.0,
            discount: 120.0,
        });
        assert_eq!(
            errors.keys().cloned().collect::<Vec<_>>(),
            vec!["description", "discount", "price", "productName", "quantity"]
        );

        let ok = validate_product(&ProductRequest {
            product_name: "Television".into(),
            description: "55 inch OLED panel".into(),
            quantity: 3,
            price: 999.0,
            discount: 10.0,
        });
        assert!(ok.is_empty());
    }
}
