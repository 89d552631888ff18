pub mod api;
pub mod ast;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod utils;
pub mod validator;
pub mod value;

pub use api::{compile, compile_with, mount, parse};
pub use ast::{FieldDescriptor, FieldType, Segment, Template};
pub use config::{EmptyOptionPolicy, FormConfig};
pub use error::{FieldErrors, RuntimeError, SentenceError, ValidationError};
pub use runtime::{Form, FormPhase, FormState};
pub use validator::validate;
pub use value::{RawValue, SubmissionRecord, TypedValue};
