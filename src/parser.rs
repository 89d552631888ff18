use crate::ast::*;
use crate::config::EmptyOptionPolicy;
use crate::error::{ParserError, SentenceError};
use crate::lexer::{Lexer, Token, TokenType};
use miette::{GraphicalReportHandler, NamedSource, Report, SourceSpan};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const TYPE_MARKER: &str = ":type:";

/// Parser for sentence templates.
///
/// ```text
/// template := (literal | field)*
/// field    := '{' name ':' 'type' ':' type (',' option)* '}'
/// option   := key ':' value
/// ```
///
/// Parsing is fail-fast: the first malformed field aborts the whole template.
#[derive(Debug)]
pub struct Parser<'a> {
    source: Arc<NamedSource<String>>,
    name: String,
    tokens: Vec<Token>,
    position: usize,
    source_text: &'a str,
    policy: EmptyOptionPolicy,
}

impl<'a> Parser<'a> {
    pub fn new(source_text: &'a str) -> Self {
        Self::new_with_name(source_text, "template".to_string())
    }

    pub fn new_with_name(source_text: &'a str, name: String) -> Self {
        let source = Arc::new(NamedSource::new(name.clone(), source_text.to_string()));
        let tokens = Lexer::new(source_text).lex();

        Self {
            source,
            name,
            tokens,
            position: 0,
            source_text,
            policy: EmptyOptionPolicy::default(),
        }
    }

    /// Sets how empty tokens in select option lists are handled.
    #[must_use]
    pub fn with_policy(mut self, policy: EmptyOptionPolicy) -> Self {
        self.policy = policy;
        self
    }

    // === Main Parsing Methods ===

    /// Template ::= { Literal | Field }
    pub fn parse_template(&mut self) -> Result<Template, SentenceError> {
        let mut segments = Vec::new();
        let mut seen: HashMap<String, SourceSpan> = HashMap::new();

        loop {
            let token = self.current_token().clone();
            self.advance();

            match &token.ttype {
                TokenType::Eof => break,
                TokenType::Literal(value) => segments.push(Segment::Literal {
                    value: value.clone(),
                }),
                TokenType::Unterminated(_) => {
                    return Err(ParserError::UnterminatedField {
                        src: (*self.source).clone(),
                        span: (token.pos_start, token.pos_end - token.pos_start).into(),
                        offset: token.pos_start,
                    }
                    .into());
                }
                TokenType::Field(inner) => {
                    let descriptor = self.parse_field(inner, &token)?;
                    if let Some(first) = seen.get(&descriptor.name) {
                        return Err(ParserError::DuplicateFieldName {
                            src: (*self.source).clone(),
                            first: *first,
                            span: descriptor.span,
                            name: descriptor.name,
                        }
                        .into());
                    }
                    seen.insert(descriptor.name.clone(), descriptor.span);
                    segments.push(Segment::Field { descriptor });
                }
            }
        }

        log::debug!(
            "parsed template '{}': {} segments, {} fields",
            self.name,
            segments.len(),
            seen.len()
        );

        Ok(Template {
            name: self.name.clone(),
            source: self.source_text.to_string(),
            segments,
        })
    }

    /// Field ::= Name ":type:" Type { "," Option }
    fn parse_field(&self, inner: &str, token: &Token) -> Result<FieldDescriptor, SentenceError> {
        let block_span: SourceSpan = (token.pos_start, token.pos_end - token.pos_start).into();
        // Offsets inside `inner` are relative to the byte after '{'.
        let base = token.pos_start + 1;
        let parts = split_with_offsets(inner, ',');
        let (head_offset, head) = parts[0];

        let Some(marker) = head.find(TYPE_MARKER) else {
            // `a,b:type:text` is a name containing ',' rather than an untyped field.
            if let Some(end) = inner.find(TYPE_MARKER) {
                return Err(ParserError::InvalidFieldName {
                    src: (*self.source).clone(),
                    span: block_span,
                    name: inner[..end].trim().to_string(),
                }
                .into());
            }
            let name = head.split_once(':').map_or(head, |(name, _)| name).trim();
            return Err(ParserError::MissingFieldType {
                src: (*self.source).clone(),
                span: block_span,
                name: name.to_string(),
            }
            .into());
        };

        let name = head[..marker].trim();
        if name.is_empty() || name.contains(':') {
            return Err(ParserError::InvalidFieldName {
                src: (*self.source).clone(),
                span: (base + head_offset, marker).into(),
                name: name.to_string(),
            }
            .into());
        }

        let type_offset = marker + TYPE_MARKER.len();
        let raw_type = head[type_offset..].trim();
        let field_type: FieldType = raw_type.parse().map_err(|()| ParserError::UnknownFieldType {
            src: (*self.source).clone(),
            span: (base + head_offset + type_offset, head.len() - type_offset).into(),
            name: name.to_string(),
            raw_type: raw_type.to_string(),
        })?;

        let mut descriptor = FieldDescriptor::new(name, field_type);
        descriptor.span = block_span;

        let mut raw_options: Option<(&str, SourceSpan)> = None;
        let mut seen_keys = HashSet::new();

        for &(offset, part) in &parts[1..] {
            let part_span: SourceSpan = (base + offset, part.len()).into();
            let Some((key, value)) = part.split_once(':') else {
                if !part.trim().is_empty() {
                    log::warn!("field '{name}': ignoring option '{part}' without a value");
                }
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if !seen_keys.insert(key) {
                log::warn!("field '{name}': option '{key}' given more than once, last one wins");
            }

            match key {
                "placeholder" => descriptor.placeholder = non_empty(value),
                "icon" => descriptor.icon = non_empty(value),
                "required" => {
                    descriptor.required = match value {
                        "true" => true,
                        "false" => false,
                        _ => {
                            return Err(ParserError::InvalidBooleanValue {
                                src: (*self.source).clone(),
                                span: part_span,
                                name: name.to_string(),
                                value: value.to_string(),
                            }
                            .into())
                        }
                    }
                }
                "options" => raw_options = Some((value, part_span)),
                _ => log::debug!("field '{name}': ignoring unknown option '{key}'"),
            }
        }

        match field_type {
            FieldType::Select => {
                descriptor.options = self.parse_options(name, raw_options, block_span)?;
            }
            _ => {
                if raw_options.is_some() {
                    log::debug!("field '{name}': options ignored for {field_type} field");
                }
            }
        }

        log::trace!("parsed field {descriptor}");
        Ok(descriptor)
    }

    /// OptionList ::= Token { "|" Token }
    fn parse_options(
        &self,
        name: &str,
        raw: Option<(&str, SourceSpan)>,
        block_span: SourceSpan,
    ) -> Result<Vec<String>, SentenceError> {
        let missing = |span: SourceSpan| -> SentenceError {
            ParserError::MissingSelectOptions {
                src: (*self.source).clone(),
                span,
                name: name.to_string(),
            }
            .into()
        };

        let Some((value, span)) = raw else {
            return Err(missing(block_span));
        };
        if value.is_empty() {
            return Err(missing(span));
        }

        let mut options = Vec::new();
        for token in value.split('|').map(str::trim) {
            if token.is_empty() {
                match self.policy {
                    EmptyOptionPolicy::Reject => return Err(missing(span)),
                    EmptyOptionPolicy::Skip => continue,
                    EmptyOptionPolicy::Keep if options.iter().any(String::is_empty) => continue,
                    EmptyOptionPolicy::Keep => {}
                }
            }
            options.push(token.to_string());
        }

        // A lone "" is a blank choice, which counts as no value at all.
        if options.iter().all(String::is_empty) {
            return Err(missing(span));
        }
        Ok(options)
    }

    // === Token Helper Methods ===

    fn current_token(&self) -> &Token {
        // The lexer always terminates the stream with Eof, and `advance` never steps past it.
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }
}

/// Splits `input` on `sep`, keeping each piece's byte offset.
fn split_with_offsets(input: &str, sep: char) -> Vec<(usize, &str)> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, c) in input.char_indices() {
        if c == sep {
            parts.push((start, &input[start..i]));
            start = i + c.len_utf8();
        }
    }
    parts.push((start, &input[start..]));
    parts
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

// internal debug function, renders an error the way a terminal user would see it
#[allow(dead_code)]
fn pretty_result(out: Result<Template, SentenceError>) -> String {
    match out {
        Ok(template) => format!("{:#?}", template),
        Err(err) => {
            let report: Report = Report::new(err);
            let handler = GraphicalReportHandler::new();
            let mut buffer = String::new();
            if handler.render_report(&mut buffer, &*report).is_err() {
                return format!("{report:?}");
            }
            buffer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> Template {
        let mut parser = Parser::new_with_name(source, "test.tpl".to_string());
        match parser.parse_template() {
            Ok(template) => template,
            Err(err) => {
                let report = Report::from(err);
                panic!("{:?}", report);
            }
        }
    }

    fn parse_err(source: &str) -> ParserError {
        parse_err_with(source, EmptyOptionPolicy::Reject)
    }

    fn parse_err_with(source: &str, policy: EmptyOptionPolicy) -> ParserError {
        let mut parser = Parser::new(source).with_policy(policy);
        match parser.parse_template() {
            Err(SentenceError::Parser(err)) => err,
            other => panic!("expected a parser error, got {}", pretty_result(other)),
        }
    }

    fn only_field(template: &Template) -> &FieldDescriptor {
        let fields: Vec<_> = template.segments.iter().filter_map(Segment::as_field).collect();
        assert_eq!(fields.len(), 1);
        fields[0]
    }

    #[test]
    fn test_empty_template() {
        let template = parse_ok("");
        assert!(template.segments.is_empty());
    }

    #[test]
    fn test_pure_literal() {
        let template = parse_ok("Nothing to fill in here.");
        assert_eq!(
            template.segments,
            vec![Segment::Literal {
                value: "Nothing to fill in here.".to_string()
            }]
        );
    }

    #[test]
    fn test_booking_sentence() {
        let template = parse_ok(
            "I would like to book {eventType:type:select,placeholder:event type,options:Wedding|Birthday,required:true,icon:calendar} for {guestCount:type:number,placeholder:guests}",
        );
        assert_eq!(template.segments.len(), 4);

        match &template.segments[0] {
            Segment::Literal { value } => assert_eq!(value, "I would like to book "),
            _ => panic!(),
        }
        let event = template.segments[1].as_field().unwrap();
        assert_eq!(event.name, "eventType");
        assert_eq!(event.field_type, FieldType::Select);
        assert_eq!(event.placeholder.as_deref(), Some("event type"));
        assert!(event.required);
        assert_eq!(event.icon.as_deref(), Some("calendar"));
        assert_eq!(event.options, vec!["Wedding", "Birthday"]);

        match &template.segments[2] {
            Segment::Literal { value } => assert_eq!(value, " for "),
            _ => panic!(),
        }
        let guests = template.segments[3].as_field().unwrap();
        assert_eq!(guests.field_type, FieldType::Number);
        assert!(!guests.required);
        assert!(guests.options.is_empty());
    }

    #[test]
    fn test_no_trailing_empty_literal() {
        let template = parse_ok("Name: {n:type:text}");
        assert_eq!(template.segments.len(), 2);
    }

    #[test]
    fn test_field_span() {
        let template = parse_ok("Hi {n:type:text}!");
        let field = only_field(&template);
        assert_eq!(field.span.offset(), 3);
        assert_eq!(field.span.len(), 13);
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let template = parse_ok("{ who :type: email , required : true , icon: mail }");
        let field = only_field(&template);
        assert_eq!(field.name, "who");
        assert_eq!(field.field_type, FieldType::Email);
        assert!(field.required);
        assert_eq!(field.icon.as_deref(), Some("mail"));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let template = parse_ok("{d:type:date,min:2020-01-01,flag,}");
        let field = only_field(&template);
        assert_eq!(field.field_type, FieldType::Date);
    }

    #[test]
    fn test_last_repeated_key_wins() {
        let template = parse_ok("{t:type:text,placeholder:one,placeholder:two}");
        assert_eq!(only_field(&template).placeholder.as_deref(), Some("two"));
    }

    #[test]
    fn test_options_ignored_for_non_select() {
        let template = parse_ok("{t:type:text,options:A|B}");
        assert!(only_field(&template).options.is_empty());
    }

    #[test]
    fn test_reserved_word_names_are_allowed() {
        let template = parse_ok("{type:type:text} {required:type:text}");
        let names: Vec<_> = template
            .segments
            .iter()
            .filter_map(Segment::as_field)
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["type", "required"]);
    }

    #[test]
    fn test_unterminated_field() {
        match parse_err("Hi {name:type:text") {
            ParserError::UnterminatedField { offset, .. } => assert_eq!(offset, 3),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_unknown_field_type() {
        match parse_err("{n:type:colour}") {
            ParserError::UnknownFieldType { name, raw_type, .. } => {
                assert_eq!(name, "n");
                assert_eq!(raw_type, "colour");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_field_type() {
        match parse_err("I want to {action}") {
            ParserError::MissingFieldType { name, .. } => assert_eq!(name, "action"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_invalid_boolean() {
        match parse_err("{n:type:text,required:yes}") {
            ParserError::InvalidBooleanValue { name, value, .. } => {
                assert_eq!(name, "n");
                assert_eq!(value, "yes");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_select_without_options() {
        assert!(matches!(
            parse_err("{s:type:select}"),
            ParserError::MissingSelectOptions { .. }
        ));
        assert!(matches!(
            parse_err("{s:type:select,options:}"),
            ParserError::MissingSelectOptions { .. }
        ));
    }

    #[test]
    fn test_empty_option_policies() {
        assert!(matches!(
            parse_err("{s:type:select,options:Wedding|}"),
            ParserError::MissingSelectOptions { .. }
        ));

        let mut parser =
            Parser::new("{s:type:select,options:Wedding|}").with_policy(EmptyOptionPolicy::Skip);
        let template = parser.parse_template().unwrap();
        assert_eq!(only_field(&template).options, vec!["Wedding"]);

        let mut parser =
            Parser::new("{s:type:select,options:Wedding|}").with_policy(EmptyOptionPolicy::Keep);
        let template = parser.parse_template().unwrap();
        assert_eq!(only_field(&template).options, vec!["Wedding", ""]);

        let mut parser = Parser::new("{s:type:select,options:|Wedding||Birthday|}")
            .with_policy(EmptyOptionPolicy::Keep);
        let template = parser.parse_template().unwrap();
        assert_eq!(only_field(&template).options, vec!["", "Wedding", "Birthday"]);

        for source in ["{s:type:select,options:|}", "{s:type:select,options: | | }"] {
            assert!(matches!(
                parse_err_with(source, EmptyOptionPolicy::Keep),
                ParserError::MissingSelectOptions { .. }
            ));
        }

        assert!(matches!(
            parse_err_with("{s:type:select,options:|}", EmptyOptionPolicy::Skip),
            ParserError::MissingSelectOptions { .. }
        ));
    }

    #[test]
    fn test_duplicate_field_name() {
        match parse_err("{a:type:text} and {a:type:number}") {
            ParserError::DuplicateFieldName { name, first, span, .. } => {
                assert_eq!(name, "a");
                assert_eq!(first.offset(), 0);
                assert_eq!(span.offset(), 18);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_invalid_field_names() {
        assert!(matches!(
            parse_err("{:type:text}"),
            ParserError::InvalidFieldName { .. }
        ));
        assert!(matches!(
            parse_err("{a:b:type:text}"),
            ParserError::InvalidFieldName { ref name, .. } if name == "a:b"
        ));
        assert!(matches!(
            parse_err("{a,b:type:text}"),
            ParserError::InvalidFieldName { ref name, .. } if name == "a,b"
        ));
    }

    #[test]
    fn test_split_with_offsets() {
        assert_eq!(
            split_with_offsets("a,bc,,d", ','),
            vec![(0, "a"), (2, "bc"), (5, ""), (6, "d")]
        );
        assert_eq!(split_with_offsets("", ','), vec![(0, "")]);
    }

    #[test]
    fn test_pretty_result_renders_diagnostic() {
        let mut parser = Parser::new_with_name("{n:type:colour}", "pretty.tpl".to_string());
        let rendered = pretty_result(parser.parse_template());
        assert!(rendered.contains("colour"));
    }
}
