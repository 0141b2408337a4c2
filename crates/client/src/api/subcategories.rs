use easyway_catalog::{Page, PageQuery, Subcategory, SubcategoryDraft};
use easyway_core::SubcategoryId;

use crate::api::ensure_success;
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::transport::ApiRequest;

const BASE: &str = "/v1/sub-categories";

#[derive(Debug, Clone)]
pub struct SubcategoriesApi {
    client: ApiClient,
}

impl SubcategoriesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, draft: &SubcategoryDraft) -> Result<Subcategory, ClientError> {
        draft.validate()?;
        let request = ApiRequest::post(format!("{BASE}/create")).json(serde_json::to_value(draft)?);
        self.client.fetch_first(request).await
    }

    pub async fn get_by_id(&self, id: SubcategoryId) -> Result<Subcategory, ClientError> {
        self.client
            .fetch_first(ApiRequest::get(format!("{BASE}/get/{id}")))
            .await
    }

    pub async fn get_by_filter(&self, query: &PageQuery) -> Result<Page<Subcategory>, ClientError> {
        let request = ApiRequest::get(format!("{BASE}/get-by-filter")).query(query.to_pairs());
        self.client.fetch_first(request).await
    }

    pub async fn get_all(&self) -> Result<Vec<Subcategory>, ClientError> {
        self.client
            .fetch_all(ApiRequest::get(format!("{BASE}/get-all")))
            .await
    }

    pub async fn update(
        &self,
        id: SubcategoryId,
        draft: &SubcategoryDraft,
    ) -> Result<(), ClientError> {
        draft.validate()?;
        let request =
            ApiRequest::put(format!("{BASE}/update/{id}")).json(serde_json::to_value(draft)?);
        ensure_success(self.client.request(request).await?, |_| None)?;
        Ok(())
    }

    pub async fn change_status(&self, id: SubcategoryId) -> Result<(), ClientError> {
        let request = ApiRequest::put(format!("{BASE}/change-status/{id}"));
        ensure_success(self.client.request(request).await?, |_| None)?;
        Ok(())
    }
}
