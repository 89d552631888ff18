use sentence_core::{compile, parse, FieldType, Segment};

#[test]
fn test_empty_template() {
    assert!(parse("").unwrap().is_empty());
}

#[test]
fn test_single_literal() {
    let segments = parse("Just words.").unwrap();
    assert_eq!(
        segments,
        vec![Segment::Literal {
            value: "Just words.".to_string()
        }]
    );
}

#[test]
fn test_segment_order_is_preserved() {
    let template = compile(
        "From {start:type:date} to {end:type:date}, {n:type:number} people",
        "trip.tpl",
    )
    .unwrap();

    let order: Vec<String> = template
        .segments
        .iter()
        .map(|s| match s {
            Segment::Literal { value } => format!("'{value}'"),
            Segment::Field { descriptor } => descriptor.name.clone(),
        })
        .collect();
    assert_eq!(
        order,
        vec!["'From '", "start", "' to '", "end", "', '", "n", "' people'"]
    );
    assert_eq!(template.to_string(), template.source);
}

#[test]
fn test_descriptor_defaults() {
    let template = compile("{t:type:text}", "t").unwrap();
    let field = template.descriptor("t").unwrap();
    assert_eq!(field.field_type, FieldType::Text);
    assert_eq!(field.placeholder, None);
    assert_eq!(field.icon, None);
    assert!(!field.required);
    assert!(field.options.is_empty());
}

#[test]
fn test_schema_json_for_view_layer() {
    let template = compile("Send {freq:type:select,options:daily|weekly,icon:bell}", "t").unwrap();
    let json: serde_json::Value = serde_json::from_str(&template.to_json().unwrap()).unwrap();
    let descriptor = &json["segments"][1]["descriptor"];
    assert_eq!(descriptor["type"], "select");
    assert_eq!(descriptor["options"], serde_json::json!(["daily", "weekly"]));
    assert_eq!(descriptor["icon"], "bell");
}

#[test]
fn test_diagnostic_renders_with_name() {
    let err = compile("{n:type:text,required:maybe}", "invite.tpl").unwrap_err();
    let rendered = format!("{:?}", miette::Report::new(err));
    assert!(rendered.contains("invite.tpl"));
    assert!(rendered.contains("maybe"));
}
