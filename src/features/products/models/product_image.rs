use sqlx::FromRow;

/// Binary image attached to a product
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ProductImage {
    pub id: i64,
    pub image: Vec<u8>,
    pub product_id: i64,
    /// Display position within the product
    pub image_order: i32,
}

#[derive(Debug, Clone)]
pub struct NewProductImage {
    pub image: Vec<u8>,
    pub product_id: i64,
    pub image_order: i32,
}
