use miette::{Diagnostic, NamedSource, SourceSpan};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum SentenceError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parser(#[from] ParserError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParserError {
    #[error("Unterminated field starting at offset {offset}")]
    #[diagnostic(
        code(parser::unterminated_field),
        help("Every field block opened with '{{' must be closed with '}}'.")
    )]
    UnterminatedField {
        #[source_code]
        src: NamedSource<String>,
        #[label("This field is never closed")]
        span: SourceSpan,
        offset: usize,
    },

    #[error("Unknown type '{raw_type}' for field '{name}'")]
    #[diagnostic(
        code(parser::unknown_field_type),
        help("Supported types are: text, number, date, email, select.")
    )]
    UnknownFieldType {
        #[source_code]
        src: NamedSource<String>,
        #[label("Unknown type here")]
        span: SourceSpan,
        name: String,
        raw_type: String,
    },

    #[error("Field '{name}' has no type")]
    #[diagnostic(
        code(parser::missing_field_type),
        help("A field is written as `{{name:type:TYPE,...}}`.")
    )]
    MissingFieldType {
        #[source_code]
        src: NamedSource<String>,
        #[label("Expected `:type:` after the field name")]
        span: SourceSpan,
        name: String,
    },

    #[error("Invalid boolean '{value}' for field '{name}'")]
    #[diagnostic(
        code(parser::invalid_boolean_value),
        help("Boolean options accept only `true` or `false`.")
    )]
    InvalidBooleanValue {
        #[source_code]
        src: NamedSource<String>,
        #[label("Expected true or false")]
        span: SourceSpan,
        name: String,
        value: String,
    },

    #[error("Select field '{name}' has no options")]
    #[diagnostic(
        code(parser::missing_select_options),
        help("Add `options:A|B|C` to the field. Empty options are rejected unless the empty option policy allows them.")
    )]
    MissingSelectOptions {
        #[source_code]
        src: NamedSource<String>,
        #[label("This select field needs a non-empty option list")]
        span: SourceSpan,
        name: String,
    },

    #[error("Duplicate field name '{name}'")]
    #[diagnostic(
        code(parser::duplicate_field_name),
        help("Field names must be unique within a template.")
    )]
    DuplicateFieldName {
        #[source_code]
        src: NamedSource<String>,
        #[label("First defined here")]
        first: SourceSpan,
        #[label("Defined again here")]
        span: SourceSpan,
        name: String,
    },

    #[error("Invalid field name '{name}'")]
    #[diagnostic(
        code(parser::invalid_field_name),
        help("Field names must be non-empty and cannot contain ':' or ','.")
    )]
    InvalidFieldName {
        #[source_code]
        src: NamedSource<String>,
        #[label("Invalid name in this field")]
        span: SourceSpan,
        name: String,
    },
}

impl ParserError {
    /// The byte span the error points at.
    pub fn span(&self) -> SourceSpan {
        match self {
            ParserError::UnterminatedField { span, .. }
            | ParserError::UnknownFieldType { span, .. }
            | ParserError::MissingFieldType { span, .. }
            | ParserError::InvalidBooleanValue { span, .. }
            | ParserError::MissingSelectOptions { span, .. }
            | ParserError::DuplicateFieldName { span, .. }
            | ParserError::InvalidFieldName { span, .. } => *span,
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Unknown field name '{name}'")]
    #[diagnostic(
        code(runtime::unknown_field_name),
        help("Only fields declared in the template can be set.")
    )]
    UnknownFieldName { name: String },
}

#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("Invalid JSON configuration: {0}")]
    #[diagnostic(code(config::json))]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML configuration: {0}")]
    #[diagnostic(code(config::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

/// A recoverable, per-field validation failure. The `Display` text is shown to the end user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{name} is required")]
    Required { name: String },

    #[error("invalid email")]
    InvalidEmail,

    #[error("invalid number")]
    InvalidNumber,

    #[error("invalid date")]
    InvalidDate,

    #[error("value not in allowed options")]
    NotInOptions,
}

/// Validation failures of one submit attempt, keyed by field name.
pub type FieldErrors = BTreeMap<String, ValidationError>;
