use easyway_catalog::{Category, CategoryDraft, Page, PageQuery};
use easyway_core::CategoryId;

use crate::api::ensure_success;
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::transport::ApiRequest;

const BASE: &str = "/v1/categories";

#[derive(Debug, Clone)]
pub struct CategoriesApi {
    client: ApiClient,
}

impl CategoriesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, draft: &CategoryDraft) -> Result<Category, ClientError> {
        draft.validate()?;
        let request = ApiRequest::post(format!("{BASE}/create")).json(serde_json::to_value(draft)?);
        self.client.fetch_first(request).await
    }

    pub async fn get_by_id(&self, id: CategoryId) -> Result<Category, ClientError> {
        self.client
            .fetch_first(ApiRequest::get(format!("{BASE}/get/{id}")))
            .await
    }

    pub async fn get_by_filter(&self, query: &PageQuery) -> Result<Page<Category>, ClientError> {
        let request = ApiRequest::get(format!("{BASE}/get-by-filter")).query(query.to_pairs());
        self.client.fetch_first(request).await
    }

    pub async fn get_all(&self) -> Result<Vec<Category>, ClientError> {
        self.client
            .fetch_all(ApiRequest::get(format!("{BASE}/get-all")))
            .await
    }

    pub async fn get_active(&self) -> Result<Vec<Category>, ClientError> {
        self.client
            .fetch_all(ApiRequest::get(format!("{BASE}/get-active")))
            .await
    }

    pub async fn update(&self, id: CategoryId, draft: &CategoryDraft) -> Result<(), ClientError> {
        draft.validate()?;
        let request =
            ApiRequest::put(format!("{BASE}/update/{id}")).json(serde_json::to_value(draft)?);
        ensure_success(self.client.request(request).await?, |_| None)?;
        Ok(())
    }

    /// Toggle active/inactive.
    pub async fn change_status(&self, id: CategoryId) -> Result<(), ClientError> {
        let request = ApiRequest::put(format!("{BASE}/change-status/{id}"));
        ensure_success(self.client.request(request).await?, |_| None)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use reqwest::{Method, StatusCode};

    use crate::api::testing;

    #[tokio::test]
    async fn filter_sends_page_query_and_reads_page() {
        let (recorder, _auth, client) = testing::client();
        recorder.reply(
            StatusCode::OK,
            r#"{"results":[{"items":[{"categoryId":1,"name":"Shoes","description":"","isActive":true}],"totalCount":11}]}"#,
        );

        let page = CategoriesApi::new(client)
            .get_by_filter(&PageQuery::page(2, 10).search("sho"))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_count, 11);
        assert_eq!(page.total_pages(10), 2);

        let (request, _) = recorder.last();
        assert_eq!(request.path, "/v1/categories/get-by-filter");
        assert!(request.query.contains(&("pageNumber".to_string(), "2".to_string())));
        assert!(request.query.contains(&("searchTerm".to_string(), "sho".to_string())));
    }

    #[tokio::test]
    async fn get_active_returns_every_result() {
        let (recorder, _auth, client) = testing::client();
        recorder.reply(
            StatusCode::OK,
            r#"{"results":[{"name":"Shoes","isActive":true},{"name":"Bags","isActive":true}]}"#,
        );

        let all = CategoriesApi::new(client).get_active().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(recorder.last().0.path, "/v1/categories/get-active");
    }

    #[tokio::test]
    async fn change_status_is_a_bare_put() {
        let (recorder, _auth, client) = testing::client();
        recorder.reply(StatusCode::OK, "");

        CategoriesApi::new(client)
            .change_status(CategoryId::new(9))
            .await
            .unwrap();

        let (request, _) = recorder.last();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.path, "/v1/categories/change-status/9");
        assert_eq!(request.body, None);
    }

    #[tokio::test]
    async fn conflict_surfaces_backend_message() {
        let (recorder, _auth, client) = testing::client();
        recorder.reply(
            StatusCode::CONFLICT,
            r#"{"results":[{"message":"Category already exists"}]}"#,
        );

        let err = CategoriesApi::new(client)
            .create(&CategoryDraft::new("Shoes"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        assert!(err.to_string().contains("Category already exists"));
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_locally() {
        let (recorder, _auth, client) = testing::client();
        let err = CategoriesApi::new(client)
            .update(CategoryId::new(1), &CategoryDraft::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(recorder.requests.lock().unwrap().is_empty());
    }
}
