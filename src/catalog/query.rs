//! Composable product filters rendered into a SQL WHERE clause.
//!
//! A [`ProductQuery`] is a conjunction of [`ProductSpec`] predicates. It is
//! rendered into the `WHERE` clause of both the page query and its count so
//! the two always agree.

use sqlx::{QueryBuilder, Sqlite};

#[derive(Debug, Clone, PartialEq)]
pub enum ProductSpec {
    /// Case-insensitive substring of the product name
    NameContains(String),
    /// SQL `LIKE` pattern on the category name
    CategoryNameLike(String),
    CategoryIs(i64),
    SellerIs(i64),
    SellerEmailIs(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    predicates: Vec<ProductSpec>,
}

impl ProductQuery {
    /// Matches every product
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, spec: ProductSpec) -> Self {
        self.predicates.push(spec);
        self
    }

    /// Adds a name filter unless `keyword` is absent or empty
    pub fn keyword(self, keyword: Option<&str>) -> Self {
        match keyword {
            Some(k) if !k.is_empty() => self.and(ProductSpec::NameContains(k.to_string())),
            _ => self,
        }
    }

    /// Adds a category-name filter unless `category` is absent or empty
    pub fn category_name(self, category: Option<&str>) -> Self {
        match category {
            Some(c) if !c.is_empty() => self.and(ProductSpec::CategoryNameLike(c.to_string())),
            _ => self,
        }
    }

    pub fn predicates(&self) -> &[ProductSpec] {
        &self.predicates
    }

    /// Appends ` WHERE ... AND ...` with bound parameters; nothing when empty.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        for (i, spec) in self.predicates.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            match spec {
                ProductSpec::NameContains(keyword) => {
                    qb.push("LOWER(p.product_name) LIKE ")
                        .push_bind(format!("%{}%", keyword.to_lowercase()));
                }
                ProductSpec::CategoryNameLike(pattern) => {
                    qb.push("c.category_name LIKE ").push_bind(pattern.clone());
                }
                ProductSpec::CategoryIs(id) => {
                    qb.push("p.category_id = ").push_bind(*id);
                }
                ProductSpec::SellerIs(id) => {
                    qb.push("p.seller_id = ").push_bind(*id);
                }
                ProductSpec::SellerEmailIs(email) => {
                    qb.push("u.email = ").push_bind(email.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters_are_skipped() {
        let query = ProductQuery::all().keyword(Some("")).category_name(None);
        assert!(query.predicates().is_empty());

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT 1 FROM products p");
        query.push_where(&mut qb);
        assert_eq!(qb.sql(), "SELECT 1 FROM products p");
    }

    #[test]
    fn test_predicates_are_conjoined() {
        let query = ProductQuery::all()
            .keyword(Some("Phone"))
            .category_name(Some("Electronics"))
            .and(ProductSpec::SellerIs(4));

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT 1 FROM products p");
        query.push_where(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM products p WHERE LOWER(p.product_name) LIKE ? \
             AND c.category_name LIKE ? AND p.seller_id = ?"
        );
    }
}
