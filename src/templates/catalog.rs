//! Static response-template catalog.
//!
//! Entries are built once and shared; rendering always works on a clone.

use rustc_hash::FxHashMap;
use serde_json::json;
use std::sync::OnceLock;

use super::{ActionDescriptor, ActionKind, ResponseTemplate};

/// Catalog entry ids.
pub mod ids {
    pub const NAVIGATION_TO_AD_CREATION: &str = "navigation_to_ad_creation";
    pub const NAVIGATION_TO_ANALYTICS: &str = "navigation_to_analytics";
    pub const AD_CREATION_HELP: &str = "ad_creation_help";
    pub const ASK_FOR_NAME: &str = "ask_for_name";
    pub const ASK_FOR_MERCHANT: &str = "ask_for_merchant";
    pub const ASK_FOR_OFFER: &str = "ask_for_offer";
    pub const ASK_FOR_MEDIA_TYPE: &str = "ask_for_media_type";
    pub const ASK_FOR_COSTS: &str = "ask_for_costs";
    pub const AD_PREVIEW: &str = "ad_preview";
    pub const SUCCESS_AD_CREATED: &str = "success_ad_created";
    pub const AD_CREATION_FAILED: &str = "ad_creation_failed";
    pub const ERROR_GENERAL: &str = "error_general";
    pub const FILTER_OVERVIEW: &str = "filter_overview";
    pub const ANALYTICS_OVERVIEW: &str = "analytics_overview";
    pub const MERCHANT_OVERVIEW: &str = "merchant_overview";
    pub const GENERAL_OVERVIEW: &str = "general_overview";
}

fn suggestion(context: &str) -> ActionDescriptor {
    ActionDescriptor::new(ActionKind::Suggestion, "showPostResponseSuggestions")
        .with_parameter("context", json!(context))
}

fn build_catalog() -> FxHashMap<&'static str, ResponseTemplate> {
    let mut catalog = FxHashMap::default();

    catalog.insert(
        ids::NAVIGATION_TO_AD_CREATION,
        ResponseTemplate::entry(
            ids::NAVIGATION_TO_AD_CREATION,
            "Navigate to Ad Creation",
            "I'd be happy to help you create an ad! Let me take you to the ad creation page \
             where we can build your {{adType}} ad together step by step.\n\n\
             I'll navigate you there and then show you some helpful suggestions for getting \
             started with {{merchant}} ads.",
        )
        .with_action(
            ActionDescriptor::new(ActionKind::Navigation, "navigateToPageAndPerform")
                .with_parameter("destination", json!("/campaign-manager/ads-create"))
                .with_parameter("intent", json!("create_ad"))
                .with_parameter("context", json!("{{navigationContext}}"))
                .with_follow_up(suggestion("ad_creation")),
        ),
    );

    catalog.insert(
        ids::NAVIGATION_TO_ANALYTICS,
        ResponseTemplate::entry(
            ids::NAVIGATION_TO_ANALYTICS,
            "Navigate to Analytics",
            "Let me take you to the analytics dashboard where you can view {{metricType}} \
             metrics and insights.\n\n\
             You'll be able to see performance data for {{timeRange}} and export reports as \
             needed.",
        )
        .with_action(
            ActionDescriptor::new(ActionKind::Navigation, "navigateToPageAndPerform")
                .with_parameter("destination", json!("/analytics"))
                .with_parameter("intent", json!("view_analytics"))
                .with_parameter("context", json!("{{navigationContext}}"))
                .with_follow_up(suggestion("analytics")),
        ),
    );

    catalog.insert(
        ids::AD_CREATION_HELP,
        ResponseTemplate::entry(
            ids::AD_CREATION_HELP,
            "Ad Creation Assistance",
            "I'm here to help you create an ad! To get started, I'll need:\n\n\
             1. **Ad Name** - What would you like to call this ad?\n\
             2. **Merchant** - Which business is this for? ({{availableMerchants}})\n\
             3. **Offer** - What promotion or offer will you feature?\n\
             4. **Media Type** - Display Banner, Double Decker, or Native?\n\
             5. **Costs** - Cost per activation and redemption\n\n\
             {{currentProgress}}\n\n\
             Just provide any of these details and I'll guide you through the rest!",
        )
        .with_action(suggestion("ad_creation")),
    );

    catalog.insert(
        ids::ASK_FOR_NAME,
        ResponseTemplate::entry(
            ids::ASK_FOR_NAME,
            "Ask for Ad Name",
            "**Creating Your Ad** ({{progress}}% complete)\n{{progressBar}}\n\n\
             What would you like to name this ad?",
        ),
    );

    catalog.insert(
        ids::ASK_FOR_MERCHANT,
        ResponseTemplate::entry(
            ids::ASK_FOR_MERCHANT,
            "Ask for Merchant",
            "**Creating Your Ad** ({{progress}}% complete)\n{{progressBar}}\n\n\
             Which merchant is this ad for? I can help with: {{availableMerchants}}",
        ),
    );

    catalog.insert(
        ids::ASK_FOR_OFFER,
        ResponseTemplate::entry(
            ids::ASK_FOR_OFFER,
            "Ask for Offer",
            "**Creating Your Ad** ({{progress}}% complete)\n{{progressBar}}\n\n\
             Which specific offer would you like to promote? For {{merchant}} I have: \
             {{availableOffers}}",
        ),
    );

    catalog.insert(
        ids::ASK_FOR_MEDIA_TYPE,
        ResponseTemplate::entry(
            ids::ASK_FOR_MEDIA_TYPE,
            "Ask for Media Type",
            "**Creating Your Ad** ({{progress}}% complete)\n{{progressBar}}\n\n\
             What type of ad format would you prefer?\n\
             - **Display Banner** (728x90) - Standard banner with image\n\
             - **Double Decker** (728x180) - Larger banner with more space\n\
             - **Native** - Text-only ad that blends with content",
        ),
    );

    catalog.insert(
        ids::ASK_FOR_COSTS,
        ResponseTemplate::entry(
            ids::ASK_FOR_COSTS,
            "Ask for Costs",
            "**Creating Your Ad** ({{progress}}% complete)\n{{progressBar}}\n\n\
             What would you like to pay per activation and per redemption? \
             (e.g. \"$2.50 per activation, $5.00 per redemption\")",
        ),
    );

    catalog.insert(
        ids::AD_PREVIEW,
        ResponseTemplate::entry(
            ids::AD_PREVIEW,
            "Ad Preview",
            "Perfect! Here's a preview of your ad:\n\n\
             **Ad Name:** {{adName}}\n\
             **Merchant:** {{merchant}}\n\
             **Offer:** {{offer}}\n\
             **Media Type:** {{mediaType}}\n\
             **Cost per Activation:** ${{costPerActivation}}\n\
             **Cost per Redemption:** ${{costPerRedemption}}\n\
             {{assetNote}}\n\
             Does this look good? Say \"create it\" to proceed or tell me what to change.",
        )
        .with_action(
            ActionDescriptor::new(ActionKind::Approval, "startApprovalWorkflow")
                .with_parameter("workflowType", json!("ad_creation"))
                .with_parameter("title", json!("Review Ad: {{adName}}"))
                .with_parameter(
                    "description",
                    json!("Please review the ad details before creation"),
                ),
        ),
    );

    catalog.insert(
        ids::SUCCESS_AD_CREATED,
        ResponseTemplate::entry(
            ids::SUCCESS_AD_CREATED,
            "Ad Creation Success",
            "Excellent! I've successfully created your ad \"{{adName}}\" for {{merchant}}!\n\n\
             Your ad has been added to your campaigns and is ready to go. You can now:\n\
             - Preview how it will look to customers\n\
             - Set up additional targeting options\n\
             - Launch it when you're ready",
        )
        .with_action(suggestion("ad_creation_complete")),
    );

    catalog.insert(
        ids::AD_CREATION_FAILED,
        ResponseTemplate::entry(
            ids::AD_CREATION_FAILED,
            "Ad Creation Failed",
            "I apologize - I ran into a problem while creating your ad \"{{adName}}\": \
             {{errorMessage}}\n\n\
             Nothing has been saved. Your details are still here, so you can say \
             \"create it\" to try again or tell me what to change.",
        ),
    );

    catalog.insert(
        ids::ERROR_GENERAL,
        ResponseTemplate::entry(
            ids::ERROR_GENERAL,
            "General Error",
            "I apologize, but I encountered an error while {{errorContext}}.\n\n\
             Error: {{errorMessage}}\n\n\
             Please try again or let me know how I can help you differently.",
        )
        .with_action(suggestion("guidance")),
    );

    catalog.insert(
        ids::FILTER_OVERVIEW,
        ResponseTemplate::entry(
            ids::FILTER_OVERVIEW,
            "Product Filter Management",
            "**Product Filter Management**\n\n\
             I can help you create and manage product filters:\n\
             - **Create new filters** - Define targeting criteria\n\
             - **Edit existing filters** - Modify filter rules\n\
             - **Analyze coverage** - See how many products match\n\n\
             The filter assistant is still being enhanced; for now you can use the \
             Product Filters page directly. What filtering task did you have in mind?",
        )
        .with_action(suggestion("filters")),
    );

    catalog.insert(
        ids::ANALYTICS_OVERVIEW,
        ResponseTemplate::entry(
            ids::ANALYTICS_OVERVIEW,
            "Campaign Analytics & Insights",
            "**Campaign Analytics & Insights**\n\n\
             I can help you analyze campaign performance:\n\
             - **Performance reports** - ROI, conversions, click-through rates\n\
             - **Trend analysis** - Track performance over time\n\
             - **Optimization suggestions** - Improve campaign results\n\n\
             The analytics assistant is still being enhanced; the Analytics Dashboard has \
             everything available today. What metrics would you like to look at?",
        )
        .with_action(suggestion("analytics")),
    );

    catalog.insert(
        ids::MERCHANT_OVERVIEW,
        ResponseTemplate::entry(
            ids::MERCHANT_OVERVIEW,
            "Merchant Support & Guidance",
            "**Merchant Support & Guidance**\n\n\
             I can assist with merchant-related questions:\n\
             - **Account setup** - Getting merchants onboarded\n\
             - **Best practices** - Optimization tips and strategies\n\
             - **Troubleshooting** - Resolving common issues\n\n\
             What merchant-related question can I help you with?",
        )
        .with_action(suggestion("merchant_support")),
    );

    catalog.insert(
        ids::GENERAL_OVERVIEW,
        ResponseTemplate::entry(
            ids::GENERAL_OVERVIEW,
            "General Assistance",
            "I'm here to help you with the campaign platform! I can assist you with:\n\n\
             - Creating and optimizing advertising campaigns\n\
             - Managing product filters and targeting\n\
             - Analyzing campaign performance and analytics\n\
             - Merchant account setup and support\n\n\
             What would you like to work on today?",
        )
        .with_action(suggestion("general")),
    );

    catalog
}

/// Looks up a catalog entry by id.
pub(crate) fn entry(id: &str) -> Option<&'static ResponseTemplate> {
    static CATALOG: OnceLock<FxHashMap<&'static str, ResponseTemplate>> = OnceLock::new();
    CATALOG.get_or_init(build_catalog).get(id)
}
