use crate::ast::{FieldDescriptor, Segment, Template};
use crate::config::FormConfig;
use crate::error::{FieldErrors, RuntimeError, ValidationError};
use crate::validator::validate;
use crate::value::{RawValue, SubmissionRecord};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Where a mounted form is in its edit/submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    /// Values may be changed freely. The initial phase.
    Editing,
    /// Transient while `submit` checks the fields.
    Validating,
    /// The last submit succeeded and the form was not reset.
    Submitted,
    /// The last submit failed; `errors()` says why.
    Rejected,
}

/// Live values and errors of one mounted form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub values: HashMap<String, RawValue>,
    pub errors: FieldErrors,
}

type SubmitHandler = Box<dyn FnMut(&SubmissionRecord)>;

/// A template bound to editable state.
///
/// Each `Form` owns its state; mounting the same template twice gives two
/// independent forms.
pub struct Form {
    template: Template,
    state: FormState,
    phase: FormPhase,
    config: FormConfig,
    on_submit: Option<SubmitHandler>,
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("template", &self.template.name)
            .field("state", &self.state)
            .field("phase", &self.phase)
            .field("config", &self.config)
            .field("on_submit", &self.on_submit.is_some())
            .finish()
    }
}

impl Form {
    pub fn mount(template: Template) -> Self {
        Self {
            template,
            state: FormState::default(),
            phase: FormPhase::Editing,
            config: FormConfig::default(),
            on_submit: None,
        }
    }

    /// Mounts a pre-filled form.
    ///
    /// # Errors
    /// Returns `RuntimeError::UnknownFieldName` if an initial value names a field the template lacks.
    pub fn mount_with_values<I, K, V>(template: Template, initial: I) -> Result<Self, RuntimeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RawValue>,
    {
        let mut form = Self::mount(template);
        for (name, value) in initial {
            form.set_field_value(name, value)?;
        }
        Ok(form)
    }

    #[must_use]
    pub fn with_config(mut self, config: FormConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers the completion handler called with every successful submission.
    #[must_use]
    pub fn on_submit(mut self, handler: impl FnMut(&SubmissionRecord) + 'static) -> Self {
        self.on_submit = Some(Box::new(handler));
        self
    }

    /// Stores a value for a field and clears that field's error. No validation happens here.
    ///
    /// # Errors
    /// Returns `RuntimeError::UnknownFieldName` if the template has no such field.
    pub fn set_field_value(
        &mut self,
        name: impl Into<String>,
        value: impl Into<RawValue>,
    ) -> Result<(), RuntimeError> {
        let name = name.into();
        if self.descriptor(&name).is_none() {
            return Err(RuntimeError::UnknownFieldName { name });
        }

        let value = value.into();
        log::trace!("set '{name}' = {value:?}");
        self.state.errors.remove(&name);
        self.state.values.insert(name, value);
        self.phase = FormPhase::Editing;
        Ok(())
    }

    /// Validates every field and, if all pass, builds the submission record.
    ///
    /// All failures are collected, not just the first one. A failed submit is
    /// an expected outcome: the errors stay available through `errors()` and
    /// the user can correct the fields and try again.
    ///
    /// # Errors
    /// Returns the map of field name to validation error when any field is refused.
    pub fn submit(&mut self) -> Result<SubmissionRecord, FieldErrors> {
        self.phase = FormPhase::Validating;
        self.state.errors.clear();

        let mut values = BTreeMap::new();
        let mut errors: FieldErrors = BTreeMap::new();

        for descriptor in self.fields() {
            let raw = self
                .state
                .values
                .get(&descriptor.name)
                .unwrap_or(&RawValue::Empty);
            match validate(descriptor, raw) {
                Ok(Some(value)) => {
                    values.insert(descriptor.name.clone(), value);
                }
                Ok(None) => {}
                Err(err) => {
                    errors.insert(descriptor.name.clone(), err);
                }
            }
        }

        if !errors.is_empty() {
            log::debug!(
                "submit of '{}' rejected: {} invalid field(s)",
                self.template.name,
                errors.len()
            );
            self.state.errors = errors.clone();
            self.phase = FormPhase::Rejected;
            return Err(errors);
        }

        let record = SubmissionRecord::new(values);
        log::debug!(
            "submit of '{}' accepted with {} value(s)",
            self.template.name,
            record.len()
        );
        if let Some(handler) = self.on_submit.as_mut() {
            handler(&record);
        }

        if self.config.reset_on_submit {
            self.reset();
        } else {
            self.phase = FormPhase::Submitted;
        }
        Ok(record)
    }

    /// Clears all values and errors and returns to editing.
    pub fn reset(&mut self) {
        self.state.values.clear();
        self.state.errors.clear();
        self.phase = FormPhase::Editing;
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn segments(&self) -> &[Segment] {
        &self.template.segments
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.template.fields()
    }

    pub fn descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        self.template.descriptor(name)
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn value(&self, name: &str) -> Option<&RawValue> {
        self.state.values.get(name)
    }

    pub fn values(&self) -> &HashMap<String, RawValue> {
        &self.state.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.state.errors
    }

    pub fn error(&self, name: &str) -> Option<&ValidationError> {
        self.state.errors.get(name)
    }
}
