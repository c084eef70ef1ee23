//! Workflow step registry.
//!
//! The host workflow framework drives screens from remotely-configured step
//! definitions. The mapping from step-type key to builder is a static finite
//! table: a closed registry validated at construction (duplicate keys
//! rejected), not open-ended dynamic dispatch. Only the email step's
//! recognized content keys (`requestPropertyIdentifiers`, `text`, `sendTo`)
//! are interpreted here; the rest of the host's JSON schema is opaque.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::defaults::EMAIL_STEP_TYPE;

/// Failures of step-registry construction and step building.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    /// Two factories claimed the same step-type key.
    #[error("duplicate step type registered: {step_type}")]
    DuplicateStepType {
        /// The contested key.
        step_type: String,
    },
    /// No factory is registered for the definition's step type.
    #[error("unknown step type: {step_type}")]
    UnknownStepType {
        /// The unrecognized key.
        step_type: String,
    },
    /// The definition's content does not match the step's expected shape.
    #[error("invalid step definition: {reason}")]
    InvalidDefinition {
        /// What was wrong with the content.
        reason: String,
    },
}

/// One step definition as delivered by the host workflow framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    /// Unique identifier of this step instance within the workflow.
    pub identifier: String,
    /// Step-type key selecting the factory.
    pub step_type: String,
    /// The definition's content object; recognized keys depend on the step.
    pub content: serde_json::Value,
}

/// A built workflow step.
pub trait Step: Send + Sync {
    /// The step instance's identifier.
    fn identifier(&self) -> &str;
}

/// Builds one kind of step from its definition.
pub trait StepFactory: Send + Sync {
    /// The step-type key this factory owns.
    fn step_type(&self) -> &'static str;

    /// Builds a step from `definition`.
    ///
    /// # Errors
    ///
    /// [`StepError::InvalidDefinition`] when the content does not match the
    /// step's expected shape.
    fn build(&self, definition: &StepDefinition) -> Result<Box<dyn Step>, StepError>;
}

/// Closed map from step-type key to factory.
pub struct StepRegistry {
    factories: HashMap<String, Arc<dyn StepFactory>>,
}

impl StepRegistry {
    /// Builds the registry, rejecting duplicate step-type keys.
    ///
    /// # Errors
    ///
    /// [`StepError::DuplicateStepType`] naming the first contested key.
    pub fn from_factories(
        factories: Vec<Arc<dyn StepFactory>>,
    ) -> Result<Self, StepError> {
        let mut map: HashMap<String, Arc<dyn StepFactory>> = HashMap::new();
        for factory in factories {
            let key = factory.step_type().to_owned();
            if map.insert(key.clone(), factory).is_some() {
                return Err(StepError::DuplicateStepType { step_type: key });
            }
        }
        Ok(Self { factories: map })
    }

    /// Builds the step described by `definition`.
    ///
    /// # Errors
    ///
    /// [`StepError::UnknownStepType`] when no factory owns the definition's
    /// key; otherwise whatever the factory reports.
    pub fn build(&self, definition: &StepDefinition) -> Result<Box<dyn Step>, StepError> {
        self.factories
            .get(&definition.step_type)
            .ok_or_else(|| StepError::UnknownStepType {
                step_type: definition.step_type.clone(),
            })?
            .build(definition)
    }

    /// The registered step-type keys, sorted.
    #[must_use]
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.factories.keys().cloned().collect();
        types.sort();
        types
    }
}

const fn default_checked() -> bool {
    true
}

/// One attachment property of the email step: a session key under which the
/// host stores files, plus whether the user left it selected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmailProperty {
    /// Session key path where the host keeps the candidate attachment.
    #[serde(alias = "sessionKeyPath")]
    pub identifier: String,
    /// Whether the property is currently selected for attachment.
    #[serde(default = "default_checked")]
    pub checked: bool,
}

#[derive(Debug, Deserialize)]
struct EmailStepContent {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "sendTo")]
    send_to: Option<String>,
    #[serde(default, rename = "requestPropertyIdentifiers")]
    request_property_identifiers: Vec<EmailProperty>,
}

/// The email composition step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailStep {
    /// Step instance identifier.
    pub identifier: String,
    /// Email subject; the host application's display name.
    pub subject: String,
    /// Pre-filled body text, when the definition provides one.
    pub body: Option<String>,
    /// Pre-filled recipient, when the definition provides one.
    pub send_to: Option<String>,
    /// Candidate attachment properties.
    pub properties: Vec<EmailProperty>,
}

impl EmailStep {
    /// Session keys of the properties currently selected for attachment.
    #[must_use]
    pub fn checked_property_keys(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|property| property.checked)
            .map(|property| property.identifier.as_str())
            .collect()
    }
}

impl Step for EmailStep {
    fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// Builds [`EmailStep`]s from definitions of type
/// [`EMAIL_STEP_TYPE`](crate::defaults::EMAIL_STEP_TYPE).
pub struct EmailStepFactory {
    /// Host application display name, used as the email subject.
    app_name: String,
}

impl EmailStepFactory {
    /// Creates the factory. `app_name` becomes the subject of every built
    /// step.
    #[must_use]
    pub const fn new(app_name: String) -> Self {
        Self { app_name }
    }

    /// Builds the concrete [`EmailStep`] from `definition`.
    ///
    /// # Errors
    ///
    /// [`StepError::InvalidDefinition`] when the content does not match the
    /// recognized keys' shapes.
    pub fn build_email(
        &self,
        definition: &StepDefinition,
    ) -> Result<EmailStep, StepError> {
        let content: EmailStepContent =
            serde_json::from_value(definition.content.clone()).map_err(|err| {
                StepError::InvalidDefinition {
                    reason: err.to_string(),
                }
            })?;
        Ok(EmailStep {
            identifier: definition.identifier.clone(),
            subject: self.app_name.clone(),
            body: content.text,
            send_to: content.send_to,
            properties: content.request_property_identifiers,
        })
    }
}

impl StepFactory for EmailStepFactory {
    fn step_type(&self) -> &'static str {
        EMAIL_STEP_TYPE
    }

    fn build(&self, definition: &StepDefinition) -> Result<Box<dyn Step>, StepError> {
        self.build_email(definition)
            .map(|step| Box::new(step) as Box<dyn Step>)
    }
}
