use std::sync::Arc;

use async_graphql::extensions::{Extension, ExtensionContext, ExtensionFactory, NextRequest};
use async_graphql::{EmptySubscription, ErrorExtensionValues, MergedObject, Response, Schema};
use async_trait::async_trait;

use crate::core::config::GraphQLConfig;
use crate::features::categories::{CategoryMutation, CategoryQuery, CategoryService};
use crate::features::products::{ProductMutation, ProductQuery, ProductService};

#[derive(MergedObject, Default)]
pub struct QueryRoot(CategoryQuery, ProductQuery);

#[derive(MergedObject, Default)]
pub struct MutationRoot(CategoryMutation, ProductMutation);

pub type CatalogSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Tags errors raised by the GraphQL layer itself, such as a query that does
/// not validate or an unparseable `DateTime` argument, as `BAD_REQUEST`.
/// Service errors always carry extensions and pass through untouched.
pub struct ClassifyRequestErrors;

impl ExtensionFactory for ClassifyRequestErrors {
    fn create(&self) -> Arc<dyn Extension> {
        Arc::new(ClassifyRequestErrorsExtension)
    }
}

struct ClassifyRequestErrorsExtension;

#[async_trait]
impl Extension for ClassifyRequestErrorsExtension {
    async fn request(&self, ctx: &ExtensionContext<'_>, next: NextRequest<'_>) -> Response {
        let mut response = next.run(ctx).await;
        for error in response.errors.iter_mut().filter(|e| e.extensions.is_none()) {
            let mut extensions = ErrorExtensionValues::default();
            extensions.set("classification", "BAD_REQUEST".to_string());
            error.extensions = Some(extensions);
        }
        response
    }
}

/// Build the executable schema with the services resolvers pull from context
pub fn build_schema(
    category_service: Arc<CategoryService>,
    product_service: Arc<ProductService>,
    config: &GraphQLConfig,
) -> CatalogSchema {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(category_service)
    .data(product_service)
    .limit_depth(config.max_depth)
    .limit_complexity(config.max_complexity)
    .extension(ClassifyRequestErrors)
    .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::Database;
    use crate::features::categories::models::NewCategory;
    use crate::shared::datetime::parse_local_date_time;
    use crate::shared::test_helpers::InMemoryDatabase;
    use async_graphql::{Request, Variables};
    use fake::faker::lorem::en::Word;
    use fake::Fake;
    use serde_json::{json, Value};

    fn schema() -> (CatalogSchema, InMemoryDatabase) {
        let db = InMemoryDatabase::new();
        let shared: Arc<dyn Database> = Arc::new(db.clone());
        let schema = build_schema(
            Arc::new(CategoryService::new(Arc::clone(&shared))),
            Arc::new(ProductService::new(shared)),
            &GraphQLConfig::default(),
        );
        (schema, db)
    }

    async fn run(schema: &CatalogSchema, query: &str, variables: Value) -> Value {
        let request = Request::new(query).variables(Variables::from_json(variables));
        let response = schema.execute(request).await;
        serde_json::to_value(&response).unwrap()
    }

    fn seed(db: &InMemoryDatabase, name: &str) -> String {
        db.seed_category(NewCategory {
            name: name.to_string(),
            valid_from: parse_local_date_time("2024-01-01 00:00").unwrap(),
            valid_to: None,
        })
        .id
        .to_string()
    }

    const CREATE_PRODUCT: &str = r#"
        mutation Create($input: ProductInput!) {
            createProduct(input: $input) { id name images category { name } }
        }
    "#;

    #[tokio::test]
    async fn test_create_category_returns_formatted_dates() {
        let (schema, _) = schema();
        let body = run(
            &schema,
            r#"mutation {
                createCategory(input: { name: "Shoes", validFrom: "2024-03-01 09:30", validTo: "2024-12-31T18:00:00" }) {
                    id name validFrom validTo
                }
            }"#,
            json!({}),
        )
        .await;

        let created = &body["data"]["createCategory"];
        assert_eq!(created["name"], "Shoes");
        assert_eq!(created["validFrom"], "2024-03-01T09:30:00");
        assert_eq!(created["validTo"], "2024-12-31T18:00:00");
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_image_round_trip_preserves_order() {
        let (schema, db) = schema();
        let category_id = seed(&db, "Shoes");

        let body = run(
            &schema,
            CREATE_PRODUCT,
            json!({ "input": {
                "name": "Boot",
                "categoryId": category_id,
                "images": ["AQID", "data:image/png;base64,BAUG"]
            }}),
        )
        .await;

        let product = &body["data"]["createProduct"];
        assert_eq!(product["images"], json!(["AQID", "BAUG"]));
        assert_eq!(product["category"]["name"], "Shoes");

        let id = product["id"].as_str().unwrap().to_string();
        let body = run(
            &schema,
            "query($id: ID!) { product(id: $id) { images } }",
            json!({ "id": id }),
        )
        .await;
        assert_eq!(body["data"]["product"]["images"], json!(["AQID", "BAUG"]));
    }

    #[tokio::test]
    async fn test_product_without_images_returns_empty_list() {
        let (schema, db) = schema();
        let category_id = seed(&db, "Hats");
        let name: String = Word().fake();

        let body = run(
            &schema,
            CREATE_PRODUCT,
            json!({ "input": { "name": name, "categoryId": category_id } }),
        )
        .await;
        assert_eq!(body["data"]["createProduct"]["images"], json!([]));
    }

    #[tokio::test]
    async fn test_unknown_category_is_not_found() {
        let (schema, _) = schema();
        let body = run(
            &schema,
            CREATE_PRODUCT,
            json!({ "input": { "name": "Boot", "categoryId": "999" } }),
        )
        .await;

        let error = &body["errors"][0];
        assert_eq!(error["message"], "Category not found with id: 999");
        assert_eq!(error["extensions"]["classification"], "NOT_FOUND");
        assert_eq!(error["path"], json!(["createProduct"]));
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_validation_errors_are_bad_request() {
        let (schema, db) = schema();
        let category_id = seed(&db, "Shoes");

        let body = run(
            &schema,
            CREATE_PRODUCT,
            json!({ "input": { "name": "  ", "categoryId": category_id } }),
        )
        .await;
        let error = &body["errors"][0];
        assert_eq!(error["extensions"]["classification"], "BAD_REQUEST");
        assert_eq!(error["extensions"]["field"], "name");

        let body = run(
            &schema,
            CREATE_PRODUCT,
            json!({ "input": { "name": "Boot" } }),
        )
        .await;
        let error = &body["errors"][0];
        assert_eq!(error["message"], "Category ID cannot be null");
        assert_eq!(error["extensions"]["field"], "categoryId");
    }

    #[tokio::test]
    async fn test_duplicate_category_name_is_bad_request() {
        let (schema, db) = schema();
        seed(&db, "Shoes");

        let body = run(
            &schema,
            r#"mutation { createCategory(input: { name: "Shoes" }) { id } }"#,
            json!({}),
        )
        .await;
        let error = &body["errors"][0];
        assert_eq!(error["message"], "Category with name 'Shoes' already exists");
        assert_eq!(error["extensions"]["classification"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_categories_valid_at_accepts_space_separated_time() {
        let (schema, db) = schema();
        seed(&db, "Shoes");
        db.seed_category(NewCategory {
            name: "Later".to_string(),
            valid_from: parse_local_date_time("2025-01-01 00:00").unwrap(),
            valid_to: None,
        });

        let body = run(
            &schema,
            r#"{ categoriesValidAt(dateTime: "2024-01-01 10:00") { name } }"#,
            json!({}),
        )
        .await;
        assert_eq!(
            body["data"]["categoriesValidAt"],
            json!([{ "name": "Shoes" }])
        );

        let body = run(
            &schema,
            r#"{ categoriesValidAt(dateTime: "yesterday") { name } }"#,
            json!({}),
        )
        .await;
        let error = &body["errors"][0];
        assert!(error["message"].as_str().unwrap().contains("yesterday"));
        assert_eq!(error["extensions"]["classification"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_unparseable_dates_are_bad_request() {
        let (schema, db) = schema();

        let body = run(
            &schema,
            "query($at: DateTime!) { categoriesValidAt(dateTime: $at) { name } }",
            json!({ "at": "31/12/2024" }),
        )
        .await;
        assert_eq!(body["errors"][0]["extensions"]["classification"], "BAD_REQUEST");

        let body = run(
            &schema,
            r#"mutation { createCategory(input: { name: "A", validFrom: "nope" }) { id } }"#,
            json!({}),
        )
        .await;
        let error = &body["errors"][0];
        assert!(error["message"].as_str().unwrap().contains("nope"));
        assert_eq!(error["extensions"]["classification"], "BAD_REQUEST");
        assert!(db.snapshot().categories.is_empty());
    }

    #[tokio::test]
    async fn test_service_classification_is_kept() {
        let (schema, _) = schema();
        let body = run(
            &schema,
            r#"mutation { updateCategory(id: "77", input: { name: "Ghost" }) { id } }"#,
            json!({}),
        )
        .await;
        assert_eq!(body["errors"][0]["extensions"]["classification"], "NOT_FOUND");

        let body = run(&schema, "{ categories { noSuchField } }", json!({})).await;
        assert_eq!(body["errors"][0]["extensions"]["classification"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_category_lists_its_products() {
        let (schema, db) = schema();
        let category_id = seed(&db, "Shoes");
        for name in ["Boot", "Sandal"] {
            run(
                &schema,
                CREATE_PRODUCT,
                json!({ "input": { "name": name, "categoryId": category_id } }),
            )
            .await;
        }

        let body = run(
            &schema,
            "query($id: ID!) { category(id: $id) { name products { name } } }",
            json!({ "id": category_id }),
        )
        .await;
        assert_eq!(
            body["data"]["category"]["products"],
            json!([{ "name": "Boot" }, { "name": "Sandal" }])
        );
    }

    #[tokio::test]
    async fn test_missing_lookups_return_null_and_false() {
        let (schema, _) = schema();
        let body = run(
            &schema,
            r#"{ category(id: "41") { id } product(id: "42") { id } }"#,
            json!({}),
        )
        .await;
        assert!(body["data"]["category"].is_null());
        assert!(body["data"]["product"].is_null());

        let body = run(
            &schema,
            r#"mutation { deleteCategory(id: "41") deleteProduct(id: "42") }"#,
            json!({}),
        )
        .await;
        assert_eq!(body["data"]["deleteCategory"], false);
        assert_eq!(body["data"]["deleteProduct"], false);
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let (schema, _) = schema();
        let body = run(&schema, r#"{ product(id: "abc") { id } }"#, json!({})).await;

        let error = &body["errors"][0];
        assert_eq!(error["extensions"]["classification"], "BAD_REQUEST");
        assert_eq!(error["extensions"]["field"], "id");
    }
}
