use std::sync::Arc;

use async_graphql::{ComplexObject, Context, ErrorExtensions, Object, Result, ID};

use crate::features::categories::dtos::{CategoryDto, CategoryInput};
use crate::features::categories::services::CategoryService;
use crate::features::products::dtos::ProductDto;
use crate::features::products::services::ProductService;
use crate::shared::datetime::LocalDateTime;
use crate::shared::validation::parse_id;

fn to_dtos(categories: Vec<crate::features::categories::models::Category>) -> Vec<CategoryDto> {
    categories.into_iter().map(CategoryDto::from).collect()
}

#[derive(Default)]
pub struct CategoryQuery;

#[Object]
impl CategoryQuery {
    async fn categories(&self, ctx: &Context<'_>) -> Result<Vec<CategoryDto>> {
        let service = ctx.data::<Arc<CategoryService>>()?;
        let categories = service.get_all_categories().await.map_err(|e| e.extend())?;
        Ok(to_dtos(categories))
    }

    async fn category(&self, ctx: &Context<'_>, id: ID) -> Result<Option<CategoryDto>> {
        let service = ctx.data::<Arc<CategoryService>>()?;
        let id = parse_id("id", &id).map_err(|e| e.extend())?;
        let category = service.get_category_by_id(id).await.map_err(|e| e.extend())?;
        Ok(category.map(CategoryDto::from))
    }

    /// Categories whose validity has not ended
    async fn active_categories(&self, ctx: &Context<'_>) -> Result<Vec<CategoryDto>> {
        let service = ctx.data::<Arc<CategoryService>>()?;
        let categories = service
            .get_active_categories()
            .await
            .map_err(|e| e.extend())?;
        Ok(to_dtos(categories))
    }

    async fn categories_valid_at(
        &self,
        ctx: &Context<'_>,
        date_time: LocalDateTime,
    ) -> Result<Vec<CategoryDto>> {
        let service = ctx.data::<Arc<CategoryService>>()?;
        let categories = service
            .get_categories_valid_at(date_time.0)
            .await
            .map_err(|e| e.extend())?;
        Ok(to_dtos(categories))
    }

    async fn search_categories(&self, ctx: &Context<'_>, name: String) -> Result<Vec<CategoryDto>> {
        let service = ctx.data::<Arc<CategoryService>>()?;
        let categories = service
            .search_categories_by_name(&name)
            .await
            .map_err(|e| e.extend())?;
        Ok(to_dtos(categories))
    }
}

#[derive(Default)]
pub struct CategoryMutation;

#[Object]
impl CategoryMutation {
    async fn create_category(&self, ctx: &Context<'_>, input: CategoryInput) -> Result<CategoryDto> {
        let service = ctx.data::<Arc<CategoryService>>()?;
        let category = service.create_category(input).await.map_err(|e| e.extend())?;
        Ok(category.into())
    }

    async fn update_category(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: CategoryInput,
    ) -> Result<CategoryDto> {
        let service = ctx.data::<Arc<CategoryService>>()?;
        let id = parse_id("id", &id).map_err(|e| e.extend())?;
        let category = service
            .update_category(id, input)
            .await
            .map_err(|e| e.extend())?;
        Ok(category.into())
    }

    /// False when no category had the id
    async fn delete_category(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let service = ctx.data::<Arc<CategoryService>>()?;
        let id = parse_id("id", &id).map_err(|e| e.extend())?;
        service.delete_category(id).await.map_err(|e| e.extend())
    }
}

#[ComplexObject]
impl CategoryDto {
    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<ProductDto>> {
        let service = ctx.data::<Arc<ProductService>>()?;
        let products = service
            .get_products_by_category(self.row_id)
            .await
            .map_err(|e| e.extend())?;
        Ok(products.into_iter().map(ProductDto::from).collect())
    }
}
