//! Structured response templates with variable interpolation.
//!
//! Templates are static catalog entries with `{{placeholder}}` markers and
//! optional action descriptors. [`render`] copies an entry, interpolates the
//! supplied variables into the body and (recursively) into action parameter
//! strings, and attaches the variables and context to the instance. The
//! catalog itself is never mutated.
//!
//! Interpolation is lossless for unknown keys: a placeholder with no
//! corresponding variable is left literally in place, never deleted and never
//! an error.

mod catalog;

pub use catalog::ids;

use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

use miette::Diagnostic;

use crate::state::ConversationContext;

/// The kinds of side effect a UI layer can be asked to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Route the user to another screen.
    Navigation,
    /// Start an approval workflow over the attached items.
    Approval,
    /// Show follow-up suggestion pills.
    Suggestion,
    /// Pre-fill a form with the attached values.
    FormFill,
}

/// A declarative instruction for the UI layer.
///
/// Descriptors may chain: `follow_up` runs after the primary action (e.g.
/// navigate, then show suggestions on the destination screen).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    /// What category of side effect this is.
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Name of the UI-layer action to invoke.
    pub action: String,
    /// Action arguments; string values may contain placeholders.
    #[serde(default, skip_serializing_if = "FxHashMap::is_empty")]
    pub parameters: FxHashMap<String, Value>,
    /// Action to run after this one completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<Box<ActionDescriptor>>,
}

impl ActionDescriptor {
    /// Creates a descriptor with no parameters and no follow-up.
    #[must_use]
    pub fn new(kind: ActionKind, action: impl Into<String>) -> Self {
        Self {
            kind,
            action: action.into(),
            parameters: FxHashMap::default(),
            follow_up: None,
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: &str, value: Value) -> Self {
        self.parameters.insert(key.to_string(), value);
        self
    }

    /// Chains a follow-up action.
    #[must_use]
    pub fn with_follow_up(mut self, follow_up: ActionDescriptor) -> Self {
        self.follow_up = Some(Box::new(follow_up));
        self
    }
}

/// A response template: catalog entry or rendered instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseTemplate {
    /// Catalog identifier.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Body text; `{{placeholder}}` markers in catalog entries, fully
    /// interpolated in rendered instances.
    pub template: String,
    /// The variables used to render this instance (empty on catalog entries).
    #[serde(default, skip_serializing_if = "FxHashMap::is_empty")]
    pub variables: FxHashMap<String, Value>,
    /// The context this instance was rendered for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ConversationContext>,
    /// Side-effect instructions carried to the UI layer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDescriptor>,
}

impl ResponseTemplate {
    pub(crate) fn entry(id: &str, title: &str, template: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            template: template.to_string(),
            variables: FxHashMap::default(),
            context: None,
            actions: Vec::new(),
        }
    }

    pub(crate) fn with_action(mut self, action: ActionDescriptor) -> Self {
        self.actions.push(action);
        self
    }
}

/// Errors raised by template rendering.
#[derive(Debug, Error, Diagnostic)]
pub enum TemplateError {
    /// No catalog entry with the given id.
    #[error("template not found: {id}")]
    #[diagnostic(
        code(promograph::templates::unknown),
        help("Use one of the ids in promograph::templates::ids.")
    )]
    UnknownTemplate { id: String },
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder regex is valid"))
}

/// Renders a JSON scalar the way template text expects: strings verbatim,
/// everything else via its JSON form.
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Replaces every `{{key}}` with the corresponding variable.
///
/// A key with no variable is preserved literally rather than deleted.
///
/// # Examples
///
/// ```
/// use promograph::templates::interpolate;
/// use rustc_hash::FxHashMap;
/// use serde_json::json;
///
/// let mut vars = FxHashMap::default();
/// vars.insert("name".to_string(), json!("Summer Sale"));
///
/// assert_eq!(interpolate("Ad {{name}} is live", &vars), "Ad Summer Sale is live");
/// assert_eq!(interpolate("{{missing}}", &vars), "{{missing}}");
/// ```
#[must_use]
pub fn interpolate(template: &str, variables: &FxHashMap<String, Value>) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &regex::Captures<'_>| {
            match variables.get(&caps[1]) {
                Some(value) => scalar_to_string(value),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn interpolate_action(action: &mut ActionDescriptor, variables: &FxHashMap<String, Value>) {
    for value in action.parameters.values_mut() {
        if let Value::String(s) = value {
            *s = interpolate(s, variables);
        }
    }
    if let Some(follow_up) = &mut action.follow_up {
        interpolate_action(follow_up, variables);
    }
}

/// Renders a catalog entry into a new instance.
///
/// Looks up the entry by id, interpolates `variables` into the body and into
/// every string action parameter (recursively through follow-ups), and
/// attaches the variables and context. The catalog entry is untouched.
pub fn render(
    template_id: &str,
    variables: FxHashMap<String, Value>,
    context: &ConversationContext,
) -> Result<ResponseTemplate, TemplateError> {
    let entry = catalog::entry(template_id).ok_or_else(|| TemplateError::UnknownTemplate {
        id: template_id.to_string(),
    })?;

    let mut instance = entry.clone();
    instance.template = interpolate(&entry.template, &variables);
    for action in &mut instance.actions {
        interpolate_action(action, &variables);
    }
    instance.variables = variables;
    instance.context = Some(context.clone());
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, Value)]) -> FxHashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn interpolate_replaces_known_keys() {
        let v = vars(&[("a", json!("x")), ("n", json!(42))]);
        assert_eq!(interpolate("{{a}} = {{n}}", &v), "x = 42");
    }

    #[test]
    fn interpolate_preserves_unknown_keys() {
        let v = FxHashMap::default();
        assert_eq!(interpolate("{{x}}", &v), "{{x}}");
        assert_eq!(interpolate("no markers", &v), "no markers");
    }

    #[test]
    fn render_does_not_mutate_catalog() {
        let ctx = ConversationContext::defaulted();
        let first = render(
            ids::ERROR_GENERAL,
            vars(&[("errorMessage", json!("boom"))]),
            &ctx,
        )
        .unwrap();
        assert!(first.template.contains("boom"));

        // A second render of the same entry still sees raw placeholders.
        let second = render(ids::ERROR_GENERAL, FxHashMap::default(), &ctx).unwrap();
        assert!(second.template.contains("{{errorMessage}}"));
    }

    #[test]
    fn render_unknown_id_is_an_error() {
        let ctx = ConversationContext::defaulted();
        let err = render("no_such_template", FxHashMap::default(), &ctx).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownTemplate { .. }));
    }

    #[test]
    fn render_interpolates_action_parameters_recursively() {
        let ctx = ConversationContext::defaulted();
        let rendered = render(
            ids::NAVIGATION_TO_AD_CREATION,
            vars(&[
                ("adType", json!("banner")),
                ("merchant", json!("Starbucks")),
                ("navigationContext", json!("{\"source\":\"test\"}")),
            ]),
            &ctx,
        )
        .unwrap();

        let nav = &rendered.actions[0];
        assert_eq!(
            nav.parameters.get("context"),
            Some(&json!("{\"source\":\"test\"}"))
        );
        // The follow-up chain survives rendering.
        assert!(nav.follow_up.is_some());
    }
}
