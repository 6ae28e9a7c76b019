//! Deterministic field extraction from user utterances.
//!
//! Everything in here is plain pattern matching over lowercased input. The
//! supervisor uses [`extract_workflow_data`] to seed workflow state; the
//! campaign handler uses the finer-grained extractors to fill ad
//! requirements one turn at a time.

use chrono::Utc;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde_json::{Value, json};
use std::sync::OnceLock;

use crate::classifier::UserIntent;

fn budget_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$?(\d+(?:,\d{3})*(?:\.\d{2})?)").expect("budget regex is valid")
    })
}

/// Pulls the first dollar amount out of the input.
///
/// Accepts an optional `$` prefix, thousands separators, and cents:
/// `$2,000.50`, `2000`, `$2.50` all parse.
pub fn extract_budget(input: &str) -> Option<f64> {
    let caps = budget_regex().captures(input)?;
    caps[1].replace(',', "").parse().ok()
}

const BUSINESS_TYPES: &[(&str, &[&str])] = &[
    ("restaurant", &["restaurant", "pizza", "food", "dining", "cafe", "bar"]),
    ("retail", &["store", "shop", "retail", "clothing", "fashion"]),
    ("pharmacy", &["pharmacy", "drug store", "cvs", "walgreens"]),
    ("automotive", &["car", "auto", "vehicle", "dealership"]),
    ("technology", &["tech", "software", "app", "digital"]),
    ("healthcare", &["medical", "health", "doctor", "clinic"]),
    ("finance", &["bank", "financial", "insurance", "loan"]),
];

const AUDIENCES: &[(&str, &[&str])] = &[
    ("families", &["families", "family", "parents", "kids"]),
    ("students", &["students", "college", "university", "school"]),
    ("professionals", &["professionals", "business", "corporate", "office"]),
    ("seniors", &["seniors", "elderly", "retirement", "older"]),
    ("millennials", &["millennials", "young adults", "20s", "30s"]),
    ("gen z", &["gen z", "teenagers", "teens", "young people"]),
];

fn first_table_hit(input_lower: &str, table: &[(&'static str, &[&str])]) -> Option<&'static str> {
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| input_lower.contains(k)))
        .map(|(label, _)| *label)
}

/// Business category hinted at by the input, if any.
pub fn extract_business_type(input: &str) -> Option<&'static str> {
    first_table_hit(&input.to_lowercase(), BUSINESS_TYPES)
}

/// Target audience hinted at by the input, if any.
pub fn extract_target_audience(input: &str) -> Option<&'static str> {
    first_table_hit(&input.to_lowercase(), AUDIENCES)
}

/// Builds the workflow-data patch the supervisor attaches to every routed
/// turn.
///
/// Always records the timestamp, intent, and raw input. For campaign-family
/// intents it additionally mines budget, business type, and target audience
/// so the handler starts with whatever the user volunteered up front.
pub fn extract_workflow_data(input: &str, intent: UserIntent) -> FxHashMap<String, Value> {
    let mut data = FxHashMap::default();
    data.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));
    data.insert("intent".to_string(), json!(intent.as_str()));
    data.insert("rawInput".to_string(), json!(input));

    if intent.is_campaign_family() {
        if let Some(budget) = extract_budget(input) {
            data.insert("budget".to_string(), json!(budget));
        }
        if let Some(business_type) = extract_business_type(input) {
            data.insert("businessType".to_string(), json!(business_type));
        }
        if let Some(audience) = extract_target_audience(input) {
            data.insert("targetAudience".to_string(), json!(audience));
        }
    }

    data
}

fn ad_name_regexes() -> &'static [Regex; 3] {
    static RES: OnceLock<[Regex; 3]> = OnceLock::new();
    RES.get_or_init(|| {
        [
            Regex::new(
                r#"(?i)(?:ad|campaign) (?:name|called|named) (?:is |would be )?["“”]?([^"“”]+)["“”]?"#,
            )
            .expect("ad name regex is valid"),
            Regex::new(r#"(?i)(?:call|name) (?:it|this|the ad) ["“”]?([^"“”]+)["“”]?"#)
                .expect("ad name regex is valid"),
            Regex::new(r#"(?i)["“”]([^"“”]+)["“”] (?:ad|campaign)"#)
                .expect("ad name regex is valid"),
        ]
    })
}

/// Extracts an ad name from phrasings like `call it "Summer Sale"` or
/// `"Summer Sale" ad`.
pub fn extract_ad_name(input: &str) -> Option<String> {
    for pattern in ad_name_regexes() {
        if let Some(caps) = pattern.captures(input)
            && let Some(name) = caps.get(1)
        {
            let trimmed = name.as_str().trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// A per-event cost mentioned by the user.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CostMention {
    PerActivation(f64),
    PerRedemption(f64),
}

/// Interprets a dollar amount by its surrounding words: activation/click
/// versus redemption/conversion. An amount with neither cue is ignored.
pub fn extract_cost(input: &str) -> Option<CostMention> {
    let amount = extract_budget(input)?;
    let lowered = input.to_lowercase();
    if lowered.contains("activation") || lowered.contains("click") {
        Some(CostMention::PerActivation(amount))
    } else if lowered.contains("redemption") || lowered.contains("conversion") {
        Some(CostMention::PerRedemption(amount))
    } else {
        None
    }
}

/// Both costs in one utterance, e.g. `$2.50 per activation, $5.00 per
/// redemption`.
pub fn extract_cost_pair(input: &str) -> (Option<f64>, Option<f64>) {
    let mut per_activation = None;
    let mut per_redemption = None;
    // Each amount is attributed to the nearest cue word that follows it.
    for (idx, caps) in budget_regex().captures_iter(input).enumerate() {
        let Ok(amount) = caps[1].replace(',', "").parse::<f64>() else {
            continue;
        };
        let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let tail = input[end..].to_lowercase();
        let next_cue = tail
            .find("activation")
            .map(|p| ("activation", p))
            .into_iter()
            .chain(tail.find("click").map(|p| ("activation", p)))
            .chain(tail.find("redemption").map(|p| ("redemption", p)))
            .chain(tail.find("conversion").map(|p| ("redemption", p)))
            .min_by_key(|(_, p)| *p);
        match next_cue {
            Some(("activation", _)) if per_activation.is_none() => per_activation = Some(amount),
            Some(("redemption", _)) if per_redemption.is_none() => per_redemption = Some(amount),
            // No cue after the amount: positional fallback.
            _ if idx == 0 && per_activation.is_none() => per_activation = Some(amount),
            _ if per_redemption.is_none() => per_redemption = Some(amount),
            _ => {}
        }
    }
    (per_activation, per_redemption)
}
