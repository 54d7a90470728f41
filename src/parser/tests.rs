use super::*;

fn parse(text: &str) -> Result<Vec<Node>, ConfigError> {
    Parser::from_scanner(Scanner::from_str("test.cpp", text)).parse()
}

#[test]
fn test_empty_unit() {
    assert_eq!(parse("").unwrap(), vec![]);
}

#[test]
fn test_simple_property() {
    let nodes = parse("x = 1;").unwrap();
    assert_eq!(
        nodes,
        vec![Node::Property(PropertyNode {
            name: "x".into(),
            is_array: false,
            value: RawValue::Scalar("1".into()),
        })]
    );
}

#[test]
fn test_string_property_keeps_quotes_in_raw_value() {
    let nodes = parse(r#"s = "hi";"#).unwrap();
    match &nodes[0] {
        Node::Property(p) => assert_eq!(p.value, RawValue::Scalar("\"hi\"".into())),
        other => panic!("expected property, got {:?}", other),
    }
}

#[test]
fn test_semicolon_inside_string_does_not_terminate() {
    let nodes = parse(r#"s = "a;b";"#).unwrap();
    match &nodes[0] {
        Node::Property(p) => assert_eq!(p.value, RawValue::Scalar("\"a;b\"".into())),
        other => panic!("expected property, got {:?}", other),
    }
}

#[test]
fn test_class_with_members() {
    let nodes = parse("class A { x = 1; y = 2; };").unwrap();
    match &nodes[0] {
        Node::Class(c) => {
            assert_eq!(c.name, "A");
            assert_eq!(c.inherits, None);
            assert_eq!(c.members.len(), 2);
        }
        other => panic!("expected class, got {:?}", other),
    }
}

#[test]
fn test_class_inheritance() {
    let nodes = parse("class A {}; class B: A {};").unwrap();
    match &nodes[1] {
        Node::Class(c) => {
            assert_eq!(c.name, "B");
            assert_eq!(c.inherits.as_deref(), Some("A"));
        }
        other => panic!("expected class, got {:?}", other),
    }
}

#[test]
fn test_nested_classes() {
    let nodes = parse("class A { class B { z = 3; }; };").unwrap();
    match &nodes[0] {
        Node::Class(c) => match &c.members[0] {
            Node::Class(inner) => assert_eq!(inner.name, "B"),
            other => panic!("expected nested class, got {:?}", other),
        },
        other => panic!("expected class, got {:?}", other),
    }
}

#[test]
fn test_array_property() {
    let nodes = parse("arr[] = {1,2,3};").unwrap();
    match &nodes[0] {
        Node::Property(p) => {
            assert!(p.is_array);
            assert_eq!(
                p.value,
                RawValue::Array(vec![
                    RawValue::Scalar("1".into()),
                    RawValue::Scalar("2".into()),
                    RawValue::Scalar("3".into()),
                ])
            );
        }
        other => panic!("expected property, got {:?}", other),
    }
}

#[test]
fn test_nested_array() {
    let nodes = parse("arr[] = {1,{2,{3}},4};").unwrap();
    match &nodes[0] {
        Node::Property(p) => assert_eq!(
            p.value,
            RawValue::Array(vec![
                RawValue::Scalar("1".into()),
                RawValue::Array(vec![
                    RawValue::Scalar("2".into()),
                    RawValue::Array(vec![RawValue::Scalar("3".into())]),
                ]),
                RawValue::Scalar("4".into()),
            ])
        ),
        other => panic!("expected property, got {:?}", other),
    }
}

#[test]
fn test_empty_array() {
    let nodes = parse("arr[] = {};").unwrap();
    match &nodes[0] {
        Node::Property(p) => assert_eq!(p.value, RawValue::Array(vec![])),
        other => panic!("expected property, got {:?}", other),
    }
}

#[test]
fn test_stray_semicolons_skipped() {
    let nodes = parse(";; x = 1; ;").unwrap();
    assert_eq!(nodes.len(), 1);
}

#[test]
fn test_class_missing_trailing_semicolon() {
    let err = parse("class A {}").unwrap_err();
    assert!(matches!(err, ConfigError::UnexpectedEof { .. }));
}

#[test]
fn test_class_missing_opener() {
    let err = parse("class A x").unwrap_err();
    // 'x' is an identifier where an Unknown token was required.
    assert!(matches!(err, ConfigError::UnexpectedType { .. }));
}

#[test]
fn test_property_missing_equals() {
    let err = parse("x ; 1;").unwrap_err();
    assert!(matches!(err, ConfigError::UnexpectedValue { .. }));
}

#[test]
fn test_unexpected_token_at_top_level() {
    let err = parse("{").unwrap_err();
    assert!(matches!(err, ConfigError::UnexpectedType { .. }));
}

#[test]
fn test_error_carries_location() {
    let err = parse("class A {};\n{").unwrap_err();
    match err {
        ConfigError::UnexpectedType { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error {:?}", other),
    }
}
