use miette::SourceSpan;
use serde::{Serialize, Serializer};
use std::fmt::{self, Display};
use std::str::FromStr;

/// A compiled sentence template: the ordered segments plus the source they came from.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Template {
    #[serde(skip)]
    pub name: String,
    #[serde(skip)]
    pub source: String,
    pub segments: Vec<Segment>,
}

/// One atomic unit of a parsed template.
#[derive(Debug, PartialEq, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// Text rendered verbatim, never editable.
    Literal { value: String },
    /// An inline form control.
    Field { descriptor: FieldDescriptor },
}

impl Segment {
    pub fn as_field(&self) -> Option<&FieldDescriptor> {
        match self {
            Segment::Field { descriptor } => Some(descriptor),
            Segment::Literal { .. } => None,
        }
    }
}

/// The kind of control a field renders as, and the validation rule applied to it.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Email,
    Select,
}

impl FieldType {
    pub const ALL: [FieldType; 5] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Date,
        FieldType::Email,
        FieldType::Select,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Email => "email",
            FieldType::Select => "select",
        }
    }
}

impl FromStr for FieldType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The structured form of one `{...}` block.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub placeholder: Option<String>,
    pub required: bool,
    pub icon: Option<String>,
    /// Allowed values, in template order. Only populated for `select` fields.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Byte span of the whole `{...}` block in the template source.
    #[serde(serialize_with = "serialize_span")]
    pub span: SourceSpan,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            placeholder: None,
            required: false,
            icon: None,
            options: Vec::new(),
            span: (0, 0).into(),
        }
    }

    /// Two descriptors describe the same field if everything but their position matches.
    pub fn same_shape(&self, other: &FieldDescriptor) -> bool {
        self.name == other.name
            && self.field_type == other.field_type
            && self.placeholder == other.placeholder
            && self.required == other.required
            && self.icon == other.icon
            && self.options == other.options
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.span.offset() && offset < self.span.offset() + self.span.len()
    }
}

/// Writes the field specification as it appears between the braces.
impl Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:type:{}", self.name, self.field_type)?;
        if let Some(placeholder) = &self.placeholder {
            write!(f, ",placeholder:{placeholder}")?;
        }
        if self.required {
            write!(f, ",required:true")?;
        }
        if let Some(icon) = &self.icon {
            write!(f, ",icon:{icon}")?;
        }
        if !self.options.is_empty() {
            write!(f, ",options:{}", self.options.join("|"))?;
        }
        Ok(())
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal { value } => f.write_str(value),
            Segment::Field { descriptor } => write!(f, "{{{descriptor}}}"),
        }
    }
}

impl Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

fn serialize_span<S>(span: &SourceSpan, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    (span.offset(), span.len()).serialize(serializer)
}
