// File: swagship-core/src/services/redemption_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use swagship_common::error::Error;
use swagship_common::models::{RedeemRequest, RedemptionCode};
use swagship_common::traits::CodeRepository;

use crate::mailer::Mailer;
use crate::validate::{email_has_at, require};

pub const REDEEM_CONFIRMATION: &str =
    "Your request is being processed. Please check your email for a status update.";
pub const TRACKING_CONFIRMATION: &str = "Updated successfully!";

/// The redemption state machine: validates and applies the
/// unused -> pending-shipping transition and the tracking assignment.
pub struct RedemptionService {
    repo: Arc<dyn CodeRepository>,
    mailer: Arc<dyn Mailer>,
    tracking_template: String,
}

impl RedemptionService {
    pub fn new(
        repo: Arc<dyn CodeRepository>,
        mailer: Arc<dyn Mailer>,
        tracking_template: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            mailer,
            tracking_template: tracking_template.into(),
        }
    }

    /// Validates the request (reporting every violated rule at once, not
    /// just the first) and then fills the contact columns through the
    /// store's conditional update, so a code can never be redeemed twice.
    pub async fn redeem(&self, req: &RedeemRequest) -> Result<String, Error> {
        let mut problems = Vec::new();
        require(&mut problems, "redeemCode", &req.redeem_code);
        require(&mut problems, "firstName", &req.first_name);
        require(&mut problems, "lastName", &req.last_name);
        require(&mut problems, "address1", &req.address1);
        require(&mut problems, "city", &req.city);
        require(&mut problems, "state", &req.state);
        require(&mut problems, "phone", &req.phone);
        require(&mut problems, "postalCode", &req.postal_code);
        require(&mut problems, "email", &req.email);
        if !email_has_at(&req.email) {
            problems.push("Email is not properly formatted.".to_string());
        }
        if !problems.is_empty() {
            return Err(Error::Validation(problems));
        }

        let updated = self
            .repo
            .mark_redeemed(&req.redeem_code, &req.contact_info())
            .await?;
        info!(code = %updated.redeem_code, "redemption code claimed");
        Ok(REDEEM_CONFIRMATION.to_string())
    }

    /// Sets the tracking number on a redeemed code. Re-assigning is
    /// allowed and just rewrites the value and `updated` stamp.
    pub async fn assign_tracking(&self, code: &str, tracking: &str) -> Result<String, Error> {
        let mut problems = Vec::new();
        require(&mut problems, "redeemCode", code);
        require(&mut problems, "tracking", tracking);
        if !problems.is_empty() {
            return Err(Error::Validation(problems));
        }

        let mut rec = self
            .repo
            .get_by_code(code)
            .await?
            .ok_or_else(|| Error::InvalidCode(code.to_string()))?;
        // Shipping comes strictly after redemption; an unused code never
        // jumps straight to SHIPPED.
        if !rec.is_redeemed() {
            return Err(Error::Validation(vec![format!(
                "Redemption code {code} has not been redeemed; tracking cannot be assigned."
            )]));
        }
        rec.tracking = Some(tracking.to_string());
        let updated = self.repo.update(&rec).await?;
        info!(code = %updated.redeem_code, "tracking assigned");

        self.notify_shipped(&updated).await;
        Ok(TRACKING_CONFIRMATION.to_string())
    }

    /// Fire-and-forget: a mail failure is logged and never rolls back the
    /// transition that triggered it.
    async fn notify_shipped(&self, rec: &RedemptionCode) {
        let Some(email) = rec.email.as_deref() else {
            return;
        };
        let mut subs = HashMap::new();
        subs.insert(
            "firstName".to_string(),
            rec.first_name.clone().unwrap_or_default(),
        );
        subs.insert("redeemCode".to_string(), rec.redeem_code.clone());
        subs.insert(
            "tracking".to_string(),
            rec.tracking.clone().unwrap_or_default(),
        );
        if let Err(e) = self
            .mailer
            .send(&self.tracking_template, &[email.to_string()], &subs)
            .await
        {
            warn!("tracking notification for {} failed: {e}", rec.redeem_code);
        }
    }
}
