use async_trait::async_trait;
use shared::protocol::{AffordableExample, AffordableExamplesResponse, PricingAnalysis, PricingRequest};
use tracing::info;

use crate::{
    error::ClientError,
    http::{read_json, ApiEndpoint},
};

/// Remote service that turns a project description into a priced quote.
#[async_trait]
pub trait PricingBackend: Send + Sync {
    async fn analyze(
        &self,
        access_token: &str,
        request: &PricingRequest,
    ) -> Result<PricingAnalysis, ClientError>;

    async fn affordable_examples(&self) -> Result<Vec<AffordableExample>, ClientError>;
}

pub struct HttpPricingBackend {
    endpoint: ApiEndpoint,
}

impl HttpPricingBackend {
    pub fn new(endpoint: ApiEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl PricingBackend for HttpPricingBackend {
    async fn analyze(
        &self,
        access_token: &str,
        request: &PricingRequest,
    ) -> Result<PricingAnalysis, ClientError> {
        info!(
            project_type = %request.project_type,
            complexity = %request.complexity,
            "requesting pricing analysis"
        );
        let res = self
            .endpoint
            .post("/api/pricing/analyze")?
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await?;
        read_json(res).await
    }

    async fn affordable_examples(&self) -> Result<Vec<AffordableExample>, ClientError> {
        let res = self
            .endpoint
            .get("/api/pricing/affordable-examples")?
            .send()
            .await?;
        let body: AffordableExamplesResponse = read_json(res).await?;
        Ok(body.affordable_examples)
    }
}
