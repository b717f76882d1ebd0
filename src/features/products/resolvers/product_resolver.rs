use std::sync::Arc;

use async_graphql::{ComplexObject, Context, ErrorExtensions, Object, Result, ID};

use crate::features::categories::dtos::CategoryDto;
use crate::features::categories::services::CategoryService;
use crate::features::products::dtos::{ProductDto, ProductInput};
use crate::features::products::models::Product;
use crate::features::products::services::image_codec::encode_image;
use crate::features::products::services::ProductService;
use crate::shared::validation::parse_id;

fn to_dtos(products: Vec<Product>) -> Vec<ProductDto> {
    products.into_iter().map(ProductDto::from).collect()
}

#[derive(Default)]
pub struct ProductQuery;

#[Object]
impl ProductQuery {
    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<ProductDto>> {
        let service = ctx.data::<Arc<ProductService>>()?;
        let products = service.get_all_products().await.map_err(|e| e.extend())?;
        Ok(to_dtos(products))
    }

    async fn product(&self, ctx: &Context<'_>, id: ID) -> Result<Option<ProductDto>> {
        let service = ctx.data::<Arc<ProductService>>()?;
        let id = parse_id("id", &id).map_err(|e| e.extend())?;
        let product = service.get_product_by_id(id).await.map_err(|e| e.extend())?;
        Ok(product.map(ProductDto::from))
    }

    async fn products_by_category(
        &self,
        ctx: &Context<'_>,
        category_id: ID,
    ) -> Result<Vec<ProductDto>> {
        let service = ctx.data::<Arc<ProductService>>()?;
        let category_id = parse_id("categoryId", &category_id).map_err(|e| e.extend())?;
        let products = service
            .get_products_by_category(category_id)
            .await
            .map_err(|e| e.extend())?;
        Ok(to_dtos(products))
    }

    async fn search_products_by_name(
        &self,
        ctx: &Context<'_>,
        name: String,
    ) -> Result<Vec<ProductDto>> {
        let service = ctx.data::<Arc<ProductService>>()?;
        let products = service
            .search_products_by_name(&name)
            .await
            .map_err(|e| e.extend())?;
        Ok(to_dtos(products))
    }

    async fn search_products_by_category_and_name(
        &self,
        ctx: &Context<'_>,
        category_id: ID,
        name: String,
    ) -> Result<Vec<ProductDto>> {
        let service = ctx.data::<Arc<ProductService>>()?;
        let category_id = parse_id("categoryId", &category_id).map_err(|e| e.extend())?;
        let products = service
            .search_products_by_category_and_name(category_id, &name)
            .await
            .map_err(|e| e.extend())?;
        Ok(to_dtos(products))
    }
}

#[derive(Default)]
pub struct ProductMutation;

#[Object]
impl ProductMutation {
    async fn create_product(&self, ctx: &Context<'_>, input: ProductInput) -> Result<ProductDto> {
        let service = ctx.data::<Arc<ProductService>>()?;
        let product = service.create_product(input).await.map_err(|e| e.extend())?;
        Ok(product.into())
    }

    async fn update_product(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: ProductInput,
    ) -> Result<ProductDto> {
        let service = ctx.data::<Arc<ProductService>>()?;
        let id = parse_id("id", &id).map_err(|e| e.extend())?;
        let product = service
            .update_product(id, input)
            .await
            .map_err(|e| e.extend())?;
        Ok(product.into())
    }

    async fn delete_product(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let service = ctx.data::<Arc<ProductService>>()?;
        let id = parse_id("id", &id).map_err(|e| e.extend())?;
        service.delete_product(id).await.map_err(|e| e.extend())
    }
}

#[ComplexObject]
impl ProductDto {
    async fn category(&self, ctx: &Context<'_>) -> Result<Option<CategoryDto>> {
        let service = ctx.data::<Arc<CategoryService>>()?;
        let category = service
            .get_category_by_id(self.category_row_id)
            .await
            .map_err(|e| e.extend())?;
        Ok(category.map(CategoryDto::from))
    }

    /// Base64 image payloads in display order; empty when none
    async fn images(&self, ctx: &Context<'_>) -> Result<Vec<String>> {
        let service = ctx.data::<Arc<ProductService>>()?;
        let images = service
            .get_product_images(self.row_id)
            .await
            .map_err(|e| e.extend())?;
        Ok(images.iter().map(|i| encode_image(&i.image)).collect())
    }
}
