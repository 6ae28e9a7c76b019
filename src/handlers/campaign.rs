//! Campaign agent: multi-turn ad creation.
//!
//! Collects six required fields across turns (name, merchant, offer, media
//! type, both costs), keeps its progress in `workflow_data`, previews the ad
//! once everything is present, and persists it through the injected
//! [`AdStore`] once the user confirms.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::capabilities::{AdRecord, Capabilities, Notification};
use crate::directory;
use crate::extract;
use crate::message::Message;
use crate::node::{AgentNode, NodeContext, NodeError, StatePatch};
use crate::state::ConversationState;
use crate::templates::{self, ids};

const WORKFLOW_REQUIREMENTS_KEY: &str = "adRequirements";
const WORKFLOW_FLOW_KEY: &str = "conversationFlow";
const WORKFLOW_NAVIGATION_KEY: &str = "pendingNavigation";

const AD_CREATION_PAGE: &str = "ads-create";

/// Required fields, in the order they are asked for.
const REQUIRED_FIELDS: [RequiredField; 6] = [
    RequiredField::AdName,
    RequiredField::Merchant,
    RequiredField::Offer,
    RequiredField::MediaType,
    RequiredField::CostPerActivation,
    RequiredField::CostPerRedemption,
];

/// At most this many questions per reply; the rest wait for a later turn.
const MAX_QUESTIONS_PER_TURN: usize = 2;

const CONFIRMATION_PHRASES: &[&str] = &[
    "create it",
    "create this ad",
    "create the ad",
    "create it now",
    "looks good",
    "go ahead",
    "do it",
    "confirm",
    "yes, create",
];

/// Short affirmatives count as confirmation only right after a preview.
const BARE_AFFIRMATIVES: &[&str] = &["yes", "yep", "sure", "ok", "okay"];

/// Requirements collected so far for the ad being built.
///
/// Serialized into `workflow_data["adRequirements"]` between turns, so every
/// field is optional and the type round-trips through JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdRequirements {
    pub ad_name: Option<String>,
    pub merchant_id: Option<String>,
    pub merchant_name: Option<String>,
    pub offer_id: Option<String>,
    pub offer_name: Option<String>,
    pub media_type: Option<String>,
    pub cost_per_activation: Option<f64>,
    pub cost_per_redemption: Option<f64>,
    pub collection_status: Option<String>,
}

impl AdRequirements {
    fn missing_fields(&self) -> Vec<RequiredField> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| !self.has(*field))
            .collect()
    }

    fn has(&self, field: RequiredField) -> bool {
        match field {
            RequiredField::AdName => self.ad_name.is_some(),
            RequiredField::Merchant => self.merchant_id.is_some(),
            RequiredField::Offer => self.offer_id.is_some(),
            RequiredField::MediaType => self.media_type.is_some(),
            RequiredField::CostPerActivation => self.cost_per_activation.is_some(),
            RequiredField::CostPerRedemption => self.cost_per_redemption.is_some(),
        }
    }

    fn completeness(&self) -> f64 {
        let completed = REQUIRED_FIELDS.iter().filter(|f| self.has(**f)).count();
        completed as f64 / REQUIRED_FIELDS.len() as f64
    }

    fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Whether the chosen format needs an uploaded creative asset.
    fn needs_asset(&self) -> bool {
        self.media_type
            .as_deref()
            .and_then(directory::media_type)
            .is_some_and(|mt| mt.requires_asset)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RequiredField {
    AdName,
    Merchant,
    Offer,
    MediaType,
    CostPerActivation,
    CostPerRedemption,
}

impl RequiredField {
    fn wire_name(&self) -> &'static str {
        match self {
            RequiredField::AdName => "adName",
            RequiredField::Merchant => "merchantId",
            RequiredField::Offer => "offerId",
            RequiredField::MediaType => "mediaType",
            RequiredField::CostPerActivation => "costPerActivation",
            RequiredField::CostPerRedemption => "costPerRedemption",
        }
    }

    fn ask_template(&self) -> &'static str {
        match self {
            RequiredField::AdName => ids::ASK_FOR_NAME,
            RequiredField::Merchant => ids::ASK_FOR_MERCHANT,
            RequiredField::Offer => ids::ASK_FOR_OFFER,
            RequiredField::MediaType => ids::ASK_FOR_MEDIA_TYPE,
            RequiredField::CostPerActivation | RequiredField::CostPerRedemption => {
                ids::ASK_FOR_COSTS
            }
        }
    }

    /// One-line question, used when a second field is asked in the same
    /// turn.
    fn short_question(&self) -> String {
        match self {
            RequiredField::AdName => "What would you like to name this ad?".to_string(),
            RequiredField::Merchant => format!(
                "Which merchant is this ad for? I can help with: {}",
                directory::merchant_names()
            ),
            RequiredField::Offer => "Which specific offer would you like to promote?".to_string(),
            RequiredField::MediaType => {
                "What ad format would you prefer: Display Banner, Double Decker, or Native?"
                    .to_string()
            }
            RequiredField::CostPerActivation => {
                "What would you like to pay per activation? (e.g. $2.50)".to_string()
            }
            RequiredField::CostPerRedemption => {
                "What would you like to pay per redemption? (e.g. $5.00)".to_string()
            }
        }
    }
}

/// Conversation flow marker persisted between turns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ConversationFlow {
    action: String,
    missing_fields: Vec<String>,
}

/// The ad-creation handler node.
pub struct CampaignAgentNode {
    capabilities: Capabilities,
}

impl CampaignAgentNode {
    pub fn new(capabilities: Capabilities) -> Self {
        Self { capabilities }
    }

    fn load_requirements(state: &ConversationState) -> AdRequirements {
        state
            .workflow_data
            .get(WORKFLOW_REQUIREMENTS_KEY)
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    fn load_flow(state: &ConversationState) -> ConversationFlow {
        state
            .workflow_data
            .get(WORKFLOW_FLOW_KEY)
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    /// Fold everything the user just said into the requirements.
    fn absorb_input(input: &str, requirements: &mut AdRequirements, flow: &ConversationFlow) {
        let mut extracted_something = false;

        if requirements.ad_name.is_none()
            && let Some(name) = extract::extract_ad_name(input)
        {
            requirements.ad_name = Some(name);
            extracted_something = true;
        }

        if requirements.merchant_id.is_none()
            && let Some(merchant) = directory::find_merchant_mention(input)
        {
            requirements.merchant_id = Some(merchant.id.to_string());
            requirements.merchant_name = Some(merchant.dba.to_string());
            extracted_something = true;
        }

        if requirements.offer_id.is_none()
            && let Some(merchant_id) = requirements.merchant_id.clone()
            && let Some(offer) = directory::find_offer_mention(input, &merchant_id)
        {
            requirements.offer_id = Some(offer.id.to_string());
            requirements.offer_name = Some(offer.name.to_string());
            extracted_something = true;
        }

        if requirements.media_type.is_none()
            && let Some(media) = directory::find_media_type_mention(input)
        {
            requirements.media_type = Some(media.id.to_string());
            extracted_something = true;
        }

        let (per_activation, per_redemption) = extract::extract_cost_pair(input);
        if requirements.cost_per_activation.is_none() && per_activation.is_some() {
            requirements.cost_per_activation = per_activation;
            extracted_something = true;
        }
        if requirements.cost_per_redemption.is_none() && per_redemption.is_some() {
            requirements.cost_per_redemption = per_redemption;
            extracted_something = true;
        }

        // A short free-form reply right after "what should we name it?" is
        // the name, even without a naming phrase around it.
        if !extracted_something
            && requirements.ad_name.is_none()
            && flow.missing_fields.first().map(String::as_str) == Some("adName")
            && !input.trim().is_empty()
            && input.trim().len() <= 60
            && !input.contains('$')
            && !is_confirmation(input, flow)
        {
            requirements.ad_name = Some(input.trim().to_string());
        }

        requirements.collection_status = Some(
            if requirements.is_complete() {
                "complete"
            } else if REQUIRED_FIELDS.iter().any(|f| requirements.has(*f)) {
                "partial"
            } else {
                "started"
            }
            .to_string(),
        );
    }

    fn workflow_patch(
        requirements: &AdRequirements,
        flow: &ConversationFlow,
    ) -> Result<FxHashMap<String, Value>, NodeError> {
        let mut data = FxHashMap::default();
        data.insert(
            WORKFLOW_REQUIREMENTS_KEY.to_string(),
            serde_json::to_value(requirements)?,
        );
        data.insert(WORKFLOW_FLOW_KEY.to_string(), serde_json::to_value(flow)?);
        Ok(data)
    }

    fn progress_variables(requirements: &AdRequirements) -> FxHashMap<String, Value> {
        let progress = requirements.completeness();
        let filled = (progress * 10.0).floor() as usize;
        let bar: String = "▓".repeat(filled) + &"░".repeat(10 - filled);

        let mut vars = FxHashMap::default();
        vars.insert(
            "progress".to_string(),
            json!((progress * 100.0).round() as u64),
        );
        vars.insert("progressBar".to_string(), json!(bar));
        vars
    }

    /// Navigation reply for turns that start off the ad-creation page.
    fn navigate(
        state: &ConversationState,
        input: &str,
        requirements: &AdRequirements,
    ) -> Result<StatePatch, NodeError> {
        let merchant = directory::find_merchant_mention(input)
            .map(|m| m.dba.to_string())
            .or_else(|| requirements.merchant_name.clone())
            .unwrap_or_else(|| "your merchant".to_string());
        let ad_type = directory::find_media_type_mention(input)
            .map(|mt| mt.label.to_lowercase())
            .unwrap_or_else(|| "new".to_string());

        let mut vars = FxHashMap::default();
        vars.insert("adType".to_string(), json!(ad_type));
        vars.insert("merchant".to_string(), json!(merchant));
        vars.insert(
            "navigationContext".to_string(),
            json!(json!({ "rawInput": input }).to_string()),
        );

        let rendered = templates::render(ids::NAVIGATION_TO_AD_CREATION, vars, &state.context)?;
        let message = Message::assistant_with_actions(&rendered.template, rendered.actions);

        let mut data = FxHashMap::default();
        data.insert(
            WORKFLOW_NAVIGATION_KEY.to_string(),
            json!({ "destination": format!("/campaign-manager/{AD_CREATION_PAGE}") }),
        );
        data.insert(
            WORKFLOW_REQUIREMENTS_KEY.to_string(),
            serde_json::to_value(requirements)?,
        );

        Ok(StatePatch::new()
            .with_messages(vec![message])
            .with_workflow_data(data))
    }

    /// Ask for the next one or two missing fields.
    fn ask_questions(
        state: &ConversationState,
        requirements: &AdRequirements,
        missing: &[RequiredField],
    ) -> Result<StatePatch, NodeError> {
        let first = missing[0];
        let mut vars = Self::progress_variables(requirements);
        match first {
            RequiredField::Merchant => {
                vars.insert("availableMerchants".to_string(), json!(directory::merchant_names()));
            }
            RequiredField::Offer => {
                let merchant_id = requirements.merchant_id.as_deref().unwrap_or_default();
                let offers = directory::offers_for(merchant_id)
                    .map(|o| o.short_text)
                    .collect::<Vec<_>>()
                    .join(", ");
                vars.insert(
                    "merchant".to_string(),
                    json!(requirements.merchant_name.clone().unwrap_or_default()),
                );
                vars.insert("availableOffers".to_string(), json!(offers));
            }
            _ => {}
        }

        let rendered = templates::render(first.ask_template(), vars, &state.context)?;
        let mut content = rendered.template;

        // Cost questions share one template; any other second field gets a
        // short inline follow-up.
        let follow_ups: Vec<&RequiredField> = missing
            .iter()
            .skip(1)
            .take(MAX_QUESTIONS_PER_TURN - 1)
            .filter(|f| f.ask_template() != first.ask_template())
            .collect();
        for field in follow_ups {
            content.push_str("\n\nAlso: ");
            content.push_str(&field.short_question());
        }

        let flow = ConversationFlow {
            action: "ask_questions".to_string(),
            missing_fields: missing.iter().map(|f| f.wire_name().to_string()).collect(),
        };

        Ok(StatePatch::new()
            .with_messages(vec![Message::assistant_with_actions(
                &content,
                rendered.actions,
            )])
            .with_workflow_data(Self::workflow_patch(requirements, &flow)?))
    }

    fn preview(
        state: &ConversationState,
        requirements: &AdRequirements,
    ) -> Result<StatePatch, NodeError> {
        let media_label = requirements
            .media_type
            .as_deref()
            .and_then(directory::media_type)
            .map(|mt| mt.label)
            .unwrap_or("Unknown");
        let asset_note = if requirements.needs_asset() {
            "\n**Note:** this format needs a creative asset; you can upload the image on the creation page.\n"
        } else {
            ""
        };

        let mut vars = FxHashMap::default();
        vars.insert("adName".to_string(), json!(requirements.ad_name.clone().unwrap_or_default()));
        vars.insert(
            "merchant".to_string(),
            json!(requirements.merchant_name.clone().unwrap_or_default()),
        );
        vars.insert(
            "offer".to_string(),
            json!(requirements.offer_name.clone().unwrap_or_default()),
        );
        vars.insert("mediaType".to_string(), json!(media_label));
        vars.insert(
            "costPerActivation".to_string(),
            json!(requirements.cost_per_activation.unwrap_or_default()),
        );
        vars.insert(
            "costPerRedemption".to_string(),
            json!(requirements.cost_per_redemption.unwrap_or_default()),
        );
        vars.insert("assetNote".to_string(), json!(asset_note));

        let rendered = templates::render(ids::AD_PREVIEW, vars, &state.context)?;
        let flow = ConversationFlow {
            action: "show_preview".to_string(),
            missing_fields: Vec::new(),
        };

        Ok(StatePatch::new()
            .with_messages(vec![Message::assistant_with_actions(
                &rendered.template,
                rendered.actions,
            )])
            .with_workflow_data(Self::workflow_patch(requirements, &flow)?))
    }

    async fn create_ad(
        &self,
        state: &ConversationState,
        requirements: &mut AdRequirements,
    ) -> Result<StatePatch, NodeError> {
        let record = AdRecord {
            id: format!("ad_{}", Uuid::new_v4().simple()),
            name: requirements.ad_name.clone().unwrap_or_default(),
            merchant_id: requirements.merchant_id.clone().unwrap_or_default(),
            merchant_name: requirements.merchant_name.clone().unwrap_or_default(),
            offer_id: requirements.offer_id.clone().unwrap_or_default(),
            media_type: requirements.media_type.clone().unwrap_or_default(),
            cost_per_activation: requirements.cost_per_activation.unwrap_or_default(),
            cost_per_redemption: requirements.cost_per_redemption.unwrap_or_default(),
            created_at: chrono::Utc::now(),
        };
        let ad_name = record.name.clone();

        match self.capabilities.ad_store.create_ad_record(record).await {
            Ok(()) => {
                info!(ad_name = %ad_name, "ad created");
                self.capabilities
                    .notifications
                    .notify(Notification::success(format!(
                        "Ad \"{ad_name}\" created successfully!"
                    )));

                requirements.collection_status = Some("complete".to_string());
                let mut vars = FxHashMap::default();
                vars.insert("adName".to_string(), json!(ad_name));
                vars.insert(
                    "merchant".to_string(),
                    json!(requirements.merchant_name.clone().unwrap_or_default()),
                );
                let rendered = templates::render(ids::SUCCESS_AD_CREATED, vars, &state.context)?;
                let flow = ConversationFlow {
                    action: "created".to_string(),
                    missing_fields: Vec::new(),
                };
                Ok(StatePatch::new()
                    .with_messages(vec![Message::assistant_with_actions(
                        &rendered.template,
                        rendered.actions,
                    )])
                    .with_workflow_data(Self::workflow_patch(requirements, &flow)?))
            }
            Err(err) => {
                warn!(error = %err, "ad store rejected the record");
                self.capabilities
                    .notifications
                    .notify(Notification::error(format!(
                        "Could not create ad \"{ad_name}\""
                    )));

                requirements.collection_status = Some("partial".to_string());
                let mut vars = FxHashMap::default();
                vars.insert("adName".to_string(), json!(ad_name));
                vars.insert("errorMessage".to_string(), json!(err.to_string()));
                let rendered = templates::render(ids::AD_CREATION_FAILED, vars, &state.context)?;
                let flow = ConversationFlow {
                    action: "show_preview".to_string(),
                    missing_fields: Vec::new(),
                };
                Ok(StatePatch::new()
                    .with_messages(vec![Message::assistant_with_actions(
                        &rendered.template,
                        rendered.actions,
                    )])
                    .with_workflow_data(Self::workflow_patch(requirements, &flow)?))
            }
        }
    }

    fn help(state: &ConversationState, requirements: &AdRequirements) -> Result<StatePatch, NodeError> {
        let progress_note = if requirements.missing_fields().len() < REQUIRED_FIELDS.len() {
            format!(
                "So far we have {:.0}% of what we need.",
                requirements.completeness() * 100.0
            )
        } else {
            "We're starting fresh.".to_string()
        };

        let mut vars = FxHashMap::default();
        vars.insert("availableMerchants".to_string(), json!(directory::merchant_names()));
        vars.insert("currentProgress".to_string(), json!(progress_note));

        let rendered = templates::render(ids::AD_CREATION_HELP, vars, &state.context)?;
        let flow = ConversationFlow {
            action: "help".to_string(),
            missing_fields: requirements
                .missing_fields()
                .iter()
                .map(|f| f.wire_name().to_string())
                .collect(),
        };

        Ok(StatePatch::new()
            .with_messages(vec![Message::assistant_with_actions(
                &rendered.template,
                rendered.actions,
            )])
            .with_workflow_data(Self::workflow_patch(requirements, &flow)?))
    }
}

/// Whether the input confirms creating the previewed ad.
fn is_confirmation(input: &str, flow: &ConversationFlow) -> bool {
    let lowered = input.trim().to_lowercase();
    if CONFIRMATION_PHRASES.iter().any(|p| lowered.contains(p)) {
        return true;
    }
    flow.action == "show_preview"
        && BARE_AFFIRMATIVES
            .iter()
            .any(|p| lowered.trim_end_matches(['.', '!']) == *p)
}

#[async_trait]
impl AgentNode for CampaignAgentNode {
    async fn run(
        &self,
        state: &ConversationState,
        ctx: NodeContext,
    ) -> Result<StatePatch, NodeError> {
        let user_input = state
            .latest_user_input()
            .ok_or_else(|| NodeError::MissingInput {
                what: "user message for ad creation".to_string(),
            })?;

        let mut requirements = Self::load_requirements(state);
        let flow = Self::load_flow(state);

        // Off the creation page we only offer to navigate there.
        if !state.context.current_page.contains(AD_CREATION_PAGE) {
            ctx.emit("navigate", "redirecting to the ad creation page")?;
            return Self::navigate(state, user_input, &requirements);
        }

        let confirmed = is_confirmation(user_input, &flow);
        Self::absorb_input(user_input, &mut requirements, &flow);
        let missing = requirements.missing_fields();

        ctx.emit(
            "collect",
            format!(
                "{} of {} fields collected",
                REQUIRED_FIELDS.len() - missing.len(),
                REQUIRED_FIELDS.len()
            ),
        )?;

        if requirements.is_complete() {
            if confirmed {
                self.create_ad(state, &mut requirements).await
            } else {
                Self::preview(state, &requirements)
            }
        } else if missing.len() == REQUIRED_FIELDS.len() && flow.action.is_empty() {
            // First touch with nothing extractable: explain the process.
            Self::help(state, &requirements)
        } else {
            Self::ask_questions(state, &requirements, &missing)
        }
    }
}
