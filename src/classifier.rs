//! Intent classification for the supervisor node.
//!
//! The [`Classifier`] trait is the seam for swapping in an LLM-backed
//! classifier later; [`KeywordClassifier`] is the deterministic default used
//! by [`default_graph`](crate::graph::default_graph).

use miette::Diagnostic;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::graph::node_ids;
use crate::state::ConversationContext;

/// The intents the supervisor can recognize, each mapped to one handler node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UserIntent {
    AdCreation,
    CampaignCreation,
    CampaignOptimization,
    FilterManagement,
    AnalyticsQuery,
    MerchantSupport,
    GeneralAssistance,
}

impl UserIntent {
    /// Stable wire name, stored in `ConversationState::user_intent`.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserIntent::AdCreation => "ad_creation",
            UserIntent::CampaignCreation => "campaign_creation",
            UserIntent::CampaignOptimization => "campaign_optimization",
            UserIntent::FilterManagement => "filter_management",
            UserIntent::AnalyticsQuery => "analytics_query",
            UserIntent::MerchantSupport => "merchant_support",
            UserIntent::GeneralAssistance => "general_assistance",
        }
    }

    /// The handler node this intent routes to.
    pub fn route(&self) -> &'static str {
        match self {
            UserIntent::AdCreation
            | UserIntent::CampaignCreation
            | UserIntent::CampaignOptimization => node_ids::CAMPAIGN_AGENT,
            UserIntent::FilterManagement => node_ids::FILTER_AGENT,
            UserIntent::AnalyticsQuery => node_ids::ANALYTICS_AGENT,
            UserIntent::MerchantSupport => node_ids::MERCHANT_AGENT,
            UserIntent::GeneralAssistance => node_ids::GENERAL_ASSISTANT,
        }
    }

    /// True for the intents whose workflow data is worth extracting.
    pub fn is_campaign_family(&self) -> bool {
        matches!(
            self,
            UserIntent::AdCreation
                | UserIntent::CampaignCreation
                | UserIntent::CampaignOptimization
        )
    }
}

impl std::fmt::Display for UserIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by classification.
#[derive(Debug, Error, Diagnostic)]
pub enum ClassifierError {
    /// The classifier backend failed (relevant for remote backends).
    #[error("classifier backend error: {reason}")]
    #[diagnostic(code(promograph::classifier::backend))]
    Backend { reason: String },
}

/// Maps the latest user utterance (plus conversation context) to an intent.
///
/// Implementations must be deterministic for the supervisor's routing to be
/// reproducible in tests.
pub trait Classifier: Send + Sync {
    fn classify(
        &self,
        text: &str,
        context: &ConversationContext,
    ) -> Result<UserIntent, ClassifierError>;
}

/// Ordered rule table: the first pattern hit claims the intent, so more
/// specific intents come before broader ones.
const RULE_PATTERNS: &[(UserIntent, &str)] = &[
    (
        UserIntent::AdCreation,
        r"(?i)\b(create|make|build|start|new|want|need|like)\b.{0,20}\b(ad|ads|advertisement|campaign)\b",
    ),
    (UserIntent::AdCreation, r"(?i)\bwanna\s+(create|make|build)\b"),
    (
        UserIntent::AdCreation,
        r"(?i)\b(i'd like|would like|want to|need to)\b.{0,20}\b(create|make|build)\b",
    ),
    (
        UserIntent::CampaignOptimization,
        r"(?i)\b(optimize|improve|enhance|better|performance|roi)\b",
    ),
    (
        UserIntent::FilterManagement,
        r"(?i)\b(filter|filters|target|targeting|criteria|product selection)\b",
    ),
    (
        UserIntent::AnalyticsQuery,
        r"(?i)\b(analytics|stats|metrics|data|report|reports|dashboard)\b",
    ),
    (
        UserIntent::MerchantSupport,
        r"(?i)\b(help|support|guidance|how to|need help|assistance)\b",
    ),
];

fn compiled_rules() -> &'static [(UserIntent, Regex)] {
    static RULES: OnceLock<Vec<(UserIntent, Regex)>> = OnceLock::new();
    RULES.get_or_init(|| {
        RULE_PATTERNS
            .iter()
            .map(|(intent, pattern)| {
                (
                    *intent,
                    Regex::new(pattern).expect("intent rule pattern is valid"),
                )
            })
            .collect()
    })
}

/// Deterministic pattern-based classifier.
///
/// Walks the rule table in order and falls back to the current page when no
/// pattern matches.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    fn page_fallback(context: &ConversationContext) -> UserIntent {
        let page = context.current_page.to_lowercase();
        if page.contains("ads-create") || page.contains("campaign") {
            UserIntent::AdCreation
        } else if page.contains("analytics") {
            UserIntent::AnalyticsQuery
        } else if page.contains("filter") {
            UserIntent::FilterManagement
        } else if page.contains("merchant") {
            UserIntent::MerchantSupport
        } else {
            UserIntent::GeneralAssistance
        }
    }
}

impl Classifier for KeywordClassifier {
    fn classify(
        &self,
        text: &str,
        context: &ConversationContext,
    ) -> Result<UserIntent, ClassifierError> {
        for (intent, pattern) in compiled_rules() {
            if pattern.is_match(text) {
                return Ok(*intent);
            }
        }
        Ok(Self::page_fallback(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_on(page: &str) -> ConversationContext {
        let mut ctx = ConversationContext::defaulted();
        ctx.current_page = page.to_string();
        ctx
    }

    #[test]
    fn ad_creation_phrases_win() {
        let ctx = ConversationContext::defaulted();
        let intent = KeywordClassifier
            .classify("I want to create an ad for Starbucks", &ctx)
            .unwrap();
        assert_eq!(intent, UserIntent::AdCreation);
        assert_eq!(intent.route(), node_ids::CAMPAIGN_AGENT);
    }

    #[test]
    fn campaign_phrases_route_to_campaign_agent() {
        let ctx = ConversationContext::defaulted();
        let intent = KeywordClassifier
            .classify(
                "I want to create a $2000 campaign for my restaurant targeting families",
                &ctx,
            )
            .unwrap();
        assert!(intent.is_campaign_family());
        assert_eq!(intent.route(), node_ids::CAMPAIGN_AGENT);
    }

    #[test]
    fn analytics_phrases_route_to_analytics() {
        let ctx = ConversationContext::defaulted();
        let intent = KeywordClassifier.classify("show me analytics", &ctx).unwrap();
        assert_eq!(intent, UserIntent::AnalyticsQuery);
    }

    #[test]
    fn earlier_rules_take_precedence() {
        // Mentions both an ad and analytics; ad creation is listed first.
        let ctx = ConversationContext::defaulted();
        let intent = KeywordClassifier
            .classify("create an ad and then check analytics", &ctx)
            .unwrap();
        assert_eq!(intent, UserIntent::AdCreation);
    }

    #[test]
    fn page_fallback_applies_when_no_phrase_matches() {
        let intent = KeywordClassifier
            .classify("hello there", &ctx_on("/analytics"))
            .unwrap();
        assert_eq!(intent, UserIntent::AnalyticsQuery);

        let intent = KeywordClassifier
            .classify("hello there", &ctx_on("/campaign-manager/ads-create"))
            .unwrap();
        assert_eq!(intent, UserIntent::AdCreation);
    }

    #[test]
    fn unknown_everything_is_general_assistance() {
        let intent = KeywordClassifier
            .classify("what's the weather", &ConversationContext::defaulted())
            .unwrap();
        assert_eq!(intent, UserIntent::GeneralAssistance);
    }

    #[test]
    fn classification_is_deterministic() {
        let ctx = ConversationContext::defaulted();
        let a = KeywordClassifier.classify("optimize my campaign", &ctx).unwrap();
        let b = KeywordClassifier.classify("optimize my campaign", &ctx).unwrap();
        assert_eq!(a, b);
    }
}
