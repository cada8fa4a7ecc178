use std::sync::Arc;

use shared::{
    domain::{CartItemId, ItemCategory, Zar},
    error::ValidationError,
    protocol::{PricingAnalysis, PricingRequest},
};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{auth::AuthState, cart::CartStore, pricing::PricingBackend};

pub const ANALYSIS_FAILED: &str = "Analysis failed";
pub const LOGIN_PROMPT: &str = "Affordable AI Pricing! Please login or register to get your \
     personalized project quote.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingField {
    Description,
    ProjectType,
    Complexity,
    Timeline,
    TeamSize,
}

impl PricingField {
    pub const ALL: [PricingField; 5] = [
        PricingField::Description,
        PricingField::ProjectType,
        PricingField::Complexity,
        PricingField::Timeline,
        PricingField::TeamSize,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PricingField::Description => "description",
            PricingField::ProjectType => "project_type",
            PricingField::Complexity => "complexity",
            PricingField::Timeline => "timeline",
            PricingField::TeamSize => "team_size",
        }
    }

    /// Suggested values and their labels. Empty for free-text fields.
    pub fn options(self) -> &'static [(&'static str, &'static str)] {
        match self {
            PricingField::Description => &[],
            PricingField::ProjectType => &[
                ("web", "Website / Web Application"),
                ("mobile", "Mobile App"),
                ("ecommerce", "E-commerce Store"),
                ("ai", "AI / Machine Learning"),
                ("enterprise", "Business Software"),
                ("other", "Other Project"),
            ],
            PricingField::Complexity => &[
                ("simple", "Simple (Basic features, standard design)"),
                ("medium", "Medium (Multiple features, custom design)"),
                ("complex", "Complex (Advanced features, complex logic)"),
                ("very-complex", "Very Complex (Cutting-edge technology)"),
            ],
            PricingField::Timeline => &[
                ("flexible", "Flexible (3+ months) - Most Affordable"),
                ("standard", "Standard (1-3 months) - Balanced"),
                ("urgent", "Urgent (2-4 weeks) - Faster Delivery"),
                ("asap", "ASAP (1-2 weeks) - Premium Rush"),
            ],
            PricingField::TeamSize => &[
                ("solo", "Solo Developer - Most Affordable"),
                ("small", "Small Team (2-3) - Recommended"),
                ("medium", "Medium Team (4-6) - Comprehensive"),
                ("large", "Large Team (7+) - Enterprise"),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Visitor is signed out; no request was made.
    LoginRequired,
    /// A required field was blank; no request was made.
    Invalid(String),
    Quoted(PricingAnalysis),
    Failed(String),
}

/// State behind the quote form: field values, the pending flag, and the last
/// result or error.
///
/// The pending flag lives in a watch channel so a view can show its loading
/// indicator while `submit` holds the form.
pub struct PricingForm {
    auth: Arc<dyn AuthState>,
    backend: Arc<dyn PricingBackend>,
    fields: PricingRequest,
    loading: watch::Sender<bool>,
    result: Option<PricingAnalysis>,
    error: Option<String>,
}

impl PricingForm {
    pub fn new(auth: Arc<dyn AuthState>, backend: Arc<dyn PricingBackend>) -> Self {
        Self {
            auth,
            backend,
            fields: PricingRequest::default(),
            loading: watch::channel(false).0,
            result: None,
            error: None,
        }
    }

    pub fn set_field(&mut self, field: PricingField, value: impl Into<String>) {
        *self.field_mut(field) = value.into();
    }

    pub fn field(&self, field: PricingField) -> &str {
        match field {
            PricingField::Description => &self.fields.description,
            PricingField::ProjectType => &self.fields.project_type,
            PricingField::Complexity => &self.fields.complexity,
            PricingField::Timeline => &self.fields.timeline,
            PricingField::TeamSize => &self.fields.team_size,
        }
    }

    pub fn fields(&self) -> &PricingRequest {
        &self.fields
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Yields `true` when a request goes out and `false` once it settles.
    pub fn loading_updates(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn result(&self) -> Option<&PricingAnalysis> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The form is only shown to signed-in visitors.
    pub fn login_prompt(&self) -> Option<&'static str> {
        (!self.auth.is_authenticated()).then_some(LOGIN_PROMPT)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for field in PricingField::ALL {
            if self.field(field).trim().is_empty() {
                return Err(ValidationError::MissingField(field.name()));
            }
        }
        Ok(())
    }

    /// Issues at most one request. No retry, and a failure only touches the
    /// form's own error slot.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let Some(access_token) = self.auth.access_token() else {
            return SubmitOutcome::LoginRequired;
        };

        self.error = None;
        self.result = None;

        if let Err(err) = self.validate() {
            let message = err.to_string();
            self.error = Some(message.clone());
            return SubmitOutcome::Invalid(message);
        }

        self.loading.send_replace(true);
        let outcome = self.backend.analyze(&access_token, &self.fields).await;
        self.loading.send_replace(false);

        match outcome {
            Ok(analysis) => {
                info!(
                    final_price = %analysis.pricing.final_price_zar,
                    "pricing analysis received"
                );
                self.result = Some(analysis.clone());
                SubmitOutcome::Quoted(analysis)
            }
            Err(err) => {
                warn!("pricing analysis failed: {err}");
                let message = err.server_message().unwrap_or(ANALYSIS_FAILED).to_string();
                self.error = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    pub fn quote_label(&self) -> String {
        format!(
            "{} Project - {} complexity",
            self.fields.project_type, self.fields.complexity
        )
    }

    /// Puts the current quote in the cart. Does nothing without a quote.
    pub fn add_result_to_cart(&self, cart: &CartStore) -> Option<CartItemId> {
        let analysis = self.result.as_ref()?;
        Some(cart.add_to_cart(
            self.quote_label(),
            analysis.pricing.final_price_zar,
            ItemCategory::Project,
            None,
        ))
    }

    /// Breakdown entries with the first underscore of each key shown as a space.
    pub fn breakdown_lines(&self) -> Vec<(String, Zar)> {
        let Some(analysis) = &self.result else {
            return Vec::new();
        };
        analysis
            .pricing
            .price_breakdown
            .iter()
            .map(|(key, amount)| (key.replacen('_', " ", 1), *amount))
            .collect()
    }

    fn field_mut(&mut self, field: PricingField) -> &mut String {
        match field {
            PricingField::Description => &mut self.fields.description,
            PricingField::ProjectType => &mut self.fields.project_type,
            PricingField::Complexity => &mut self.fields.complexity,
            PricingField::Timeline => &mut self.fields.timeline,
            PricingField::TeamSize => &mut self.fields.team_size,
        }
    }
}

#[cfg(test)]
#[path = "tests/pricing_form_tests.rs"]
mod tests;
