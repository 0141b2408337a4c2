use reqwest::StatusCode;
use serde_json::Value;

use easyway_catalog::{Page, PageQuery, Product, ProductDraft, ProductImages};
use easyway_core::ProductId;

use crate::api::ensure_success;
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::transport::ApiRequest;

const BASE: &str = "/v1/products";

const SKU_TAKEN: &str = "Product with this SKU already exists.";
const NOT_FOUND: &str = "Product not found.";

/// Outcome of a create; the backend echoes the new id when it has one.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCreated {
    pub product_id: Option<ProductId>,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct ProductsApi {
    client: ApiClient,
}

impl ProductsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create a product without images.
    pub async fn create(&self, draft: &ProductDraft) -> Result<ProductCreated, ClientError> {
        draft.validate()?;
        let request = ApiRequest::post(format!("{BASE}/create")).json(serde_json::to_value(draft)?);

        let response = ensure_success(self.client.request(request).await?, |status| {
            Some(match status {
                StatusCode::BAD_REQUEST => "Invalid product data. Please check all fields.",
                StatusCode::CONFLICT => SKU_TAKEN,
                _ => "Failed to create product. Please try again.",
            })
        })?;

        let body: Value = if response.body.is_empty() {
            Value::Null
        } else {
            response.json()?
        };
        let product_id = body
            .get("id")
            .or_else(|| body.pointer("/results/0/id"))
            .and_then(Value::as_i64)
            .map(ProductId::new);

        tracing::info!(?product_id, sku = %draft.sku, "product created");
        Ok(ProductCreated { product_id, body })
    }

    /// Replace a product's fields. Images are untouched.
    pub async fn update(&self, id: ProductId, draft: &ProductDraft) -> Result<(), ClientError> {
        draft.validate()?;
        let request = ApiRequest::put(format!("{BASE}/{id}")).json(serde_json::to_value(draft)?);

        ensure_success(self.client.request(request).await?, |status| {
            Some(match status {
                StatusCode::NOT_FOUND => NOT_FOUND,
                StatusCode::CONFLICT => SKU_TAKEN,
                _ => "Failed to update product. Please try again.",
            })
        })?;
        Ok(())
    }

    pub async fn get_by_id(&self, id: ProductId) -> Result<Product, ClientError> {
        self.client
            .fetch_first(ApiRequest::get(format!("{BASE}/get/{id}")))
            .await
    }

    pub async fn filter(&self, query: &PageQuery) -> Result<Page<Product>, ClientError> {
        let request = ApiRequest::get(format!("{BASE}/filter")).query(query.to_pairs());
        self.client.fetch_first(request).await
    }

    pub async fn images(&self, id: ProductId) -> Result<Vec<String>, ClientError> {
        let request = ApiRequest::get(format!("{BASE}/{id}/images"));
        let response = ensure_success(self.client.request(request).await?, |status| {
            Some(match status {
                StatusCode::NOT_FOUND => NOT_FOUND,
                _ => "Failed to load product images.",
            })
        })?;

        Ok(response.json::<ProductImages>()?.images)
    }

    /// Remove the given image URLs from a product.
    pub async fn delete_images(
        &self,
        id: ProductId,
        image_urls: &[String],
    ) -> Result<(), ClientError> {
        let request = ApiRequest::delete(format!("{BASE}/{id}/images"))
            .json(serde_json::json!({ "imageUrls": image_urls }));

        ensure_success(self.client.request(request).await?, |status| {
            Some(match status {
                StatusCode::NOT_FOUND => "Product or images not found.",
                _ => "Failed to delete images. Please try again.",
            })
        })?;

        tracing::info!(product_id = %id, deleted = image_urls.len(), "product images deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use easyway_catalog::ProductStatus;
    use easyway_core::{CategoryId, SubcategoryId};
    use reqwest::Method;

    use crate::api::testing;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Trail Runner".to_string(),
            description: "Lightweight trail running shoe".to_string(),
            category_id: Some(CategoryId::new(1)),
            sub_category_id: Some(SubcategoryId::new(2)),
            price: 89.5,
            sku: "TR-001".to_string(),
            status: ProductStatus::Active,
        }
    }

    fn api_message(err: ClientError) -> (StatusCode, String) {
        match err {
            ClientError::Api { status, message } => (status, message),
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_reads_echoed_id() {
        let (recorder, _auth, client) = testing::client();
        recorder.reply(StatusCode::CREATED, r#"{"id":42,"name":"Trail Runner"}"#);

        let created = ProductsApi::new(client).create(&draft()).await.unwrap();
        assert_eq!(created.product_id, Some(ProductId::new(42)));

        let (request, _) = recorder.last();
        assert_eq!(request.path, "/v1/products/create");
        let body = request.body.unwrap();
        assert_eq!(body["subCategoryId"], 2);
        assert_eq!(body["status"], "active");
    }

    #[tokio::test]
    async fn create_maps_statuses() {
        let cases = [
            (StatusCode::BAD_REQUEST, "Invalid product data. Please check all fields."),
            (StatusCode::CONFLICT, "Product with this SKU already exists."),
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create product. Please try again."),
        ];

        for (status, expected) in cases {
            let (recorder, _auth, client) = testing::client();
            recorder.reply(status, r#"{"message":"ignored"}"#);
            let err = ProductsApi::new(client).create(&draft()).await.unwrap_err();
            assert_eq!(api_message(err), (status, expected.to_string()));
        }
    }

    #[tokio::test]
    async fn update_maps_statuses() {
        let (recorder, _auth, client) = testing::client();
        recorder.reply(StatusCode::NOT_FOUND, "");
        let err = ProductsApi::new(client.clone())
            .update(ProductId::new(3), &draft())
            .await
            .unwrap_err();
        assert_eq!(api_message(err).1, "Product not found.");
        assert_eq!(recorder.last().0.path, "/v1/products/3");

        recorder.reply(StatusCode::CONFLICT, "");
        let err = ProductsApi::new(client)
            .update(ProductId::new(3), &draft())
            .await
            .unwrap_err();
        assert_eq!(api_message(err).1, "Product with this SKU already exists.");
    }

    #[tokio::test]
    async fn images_reads_bare_list() {
        let (recorder, _auth, client) = testing::client();
        recorder.reply(StatusCode::OK, r#"{"images":["a.png","b.png"]}"#);

        let images = ProductsApi::new(client.clone())
            .images(ProductId::new(3))
            .await
            .unwrap();
        assert_eq!(images, vec!["a.png".to_string(), "b.png".to_string()]);

        recorder.reply(StatusCode::OK, "{}");
        let images = ProductsApi::new(client).images(ProductId::new(3)).await.unwrap();
        assert!(images.is_empty());
    }

    #[tokio::test]
    async fn delete_images_sends_urls() {
        let (recorder, _auth, client) = testing::client();
        recorder.reply(StatusCode::NOT_FOUND, "");

        let urls = vec!["a.png".to_string()];
        let err = ProductsApi::new(client)
            .delete_images(ProductId::new(3), &urls)
            .await
            .unwrap_err();
        assert_eq!(api_message(err).1, "Product or images not found.");

        let (request, _) = recorder.last();
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.body.unwrap()["imageUrls"][0], "a.png");
    }

    #[tokio::test]
    async fn filter_reads_page() {
        let (recorder, _auth, client) = testing::client();
        recorder.reply(
            StatusCode::OK,
            r#"{"results":[{"items":[{"id":1,"name":"Trail Runner","price":89.5,"sku":"TR-001","status":"inactive"}],"totalCount":1}]}"#,
        );

        let page = ProductsApi::new(client)
            .filter(&PageQuery::default().active(false))
            .await
            .unwrap();
        assert_eq!(page.total_count, 1);
        assert!(!page.items[0].is_active());
        assert_eq!(recorder.last().0.path, "/v1/products/filter");
    }
}
