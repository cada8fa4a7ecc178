use std::{sync::Arc, time::Duration};

use shared::protocol::AffordableExample;

pub mod auth;
pub mod cart;
pub mod error;
pub mod http;
pub mod marketing;
pub mod pricing;
pub mod pricing_form;
pub mod whatsapp;

pub use auth::{AuthContext, AuthSession, AuthState};
pub use cart::{CartItem, CartSnapshot, CartStore};
pub use error::ClientError;
pub use http::ApiEndpoint;
pub use pricing::{HttpPricingBackend, PricingBackend};
pub use pricing_form::{PricingField, PricingForm, SubmitOutcome};

/// Everything a browsing session shares between pages: who is signed in, the
/// cart, and the remote pricing service.
pub struct StorefrontSession {
    pub auth: Arc<AuthContext>,
    pub cart: Arc<CartStore>,
    pricing: Arc<dyn PricingBackend>,
}

impl StorefrontSession {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let endpoint = ApiEndpoint::with_timeout(api_url, timeout)?;
        Ok(Self::with_dependencies(
            Arc::new(AuthContext::http(endpoint.clone())),
            Arc::new(HttpPricingBackend::new(endpoint)),
        ))
    }

    pub fn with_dependencies(auth: Arc<AuthContext>, pricing: Arc<dyn PricingBackend>) -> Self {
        Self {
            auth,
            cart: Arc::new(CartStore::new()),
            pricing,
        }
    }

    /// A blank quote form bound to this session's sign-in state.
    pub fn pricing_form(&self) -> PricingForm {
        PricingForm::new(self.auth.clone(), self.pricing.clone())
    }

    pub async fn affordable_examples(&self) -> Result<Vec<AffordableExample>, ClientError> {
        self.pricing.affordable_examples().await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
