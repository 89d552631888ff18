use crate::ast::{FieldDescriptor, Segment, Template};
use crate::config::FormConfig;
use crate::error::SentenceError;
use crate::parser::Parser;
use crate::runtime::Form;
use crate::utils::get_line_and_column;

impl Template {
    /// The field descriptors in template order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.segments.iter().filter_map(Segment::as_field)
    }

    pub fn descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields().find(|field| field.name == name)
    }

    /// A template with no fields is a plain sentence and always submits.
    pub fn is_literal(&self) -> bool {
        self.fields().next().is_none()
    }

    /// Finds the field whose `{...}` block covers the given byte offset.
    /// This is what an editor uses for hover and go-to-field.
    #[must_use]
    pub fn field_at(&self, position: usize) -> Option<&FieldDescriptor> {
        self.fields().find(|field| field.contains(position))
    }

    /// The 1-based line and column where a field's block starts.
    #[must_use]
    pub fn location_of(&self, name: &str) -> Option<(usize, usize)> {
        let field = self.descriptor(name)?;
        Some(get_line_and_column(&self.source, field.span.offset()))
    }

    /// Serializes the parsed segments into a pretty-printed JSON string for the view layer.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serializes the parsed segments into a YAML string.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Binds the template to a fresh, empty form.
    pub fn mount(self) -> Form {
        Form::mount(self)
    }
}

/// Compiles a sentence template with the default configuration.
///
/// This is the primary entry point. `name` identifies the template in
/// diagnostics (a file name, a component id, ...).
///
/// # Errors
///
/// Returns a `SentenceError::Parser` for the first malformed field block.
pub fn compile(source: &str, name: &str) -> Result<Template, SentenceError> {
    compile_with(source, name, &FormConfig::default())
}

/// Compiles a template, applying the parse-time parts of `config`.
///
/// # Errors
///
/// Returns a `SentenceError::Parser` for the first malformed field block.
pub fn compile_with(
    source: &str,
    name: &str,
    config: &FormConfig,
) -> Result<Template, SentenceError> {
    Parser::new_with_name(source, name.to_string())
        .with_policy(config.empty_option_policy)
        .parse_template()
}

/// Parses a template into its ordered segments.
///
/// # Errors
///
/// Returns a `SentenceError::Parser` for the first malformed field block.
pub fn parse(source: &str) -> Result<Vec<Segment>, SentenceError> {
    Ok(Parser::new(source).parse_template()?.segments)
}

/// Compiles a template and mounts it as a form configured by `config`.
///
/// # Errors
///
/// Returns a `SentenceError::Parser` if the template does not compile.
pub fn mount(source: &str, name: &str, config: FormConfig) -> Result<Form, SentenceError> {
    let template = compile_with(source, name, &config)?;
    Ok(Form::mount(template).with_config(config))
}
