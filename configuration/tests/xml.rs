use configuration::{
    apply_defaults, is_valid_element_name, parameter_sets_from_xml, parameter_sets_to_xml,
    ConfigurationError, ParameterKind, ParameterSets, ParameterType, Parameters,
};

fn params(pairs: &[(&str, &str)]) -> Parameters {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn writes_configuration_schema() {
    let mut sets = ParameterSets::new();
    sets.insert(
        "warehouse".to_string(),
        params(&[("url", "jdbc:pg://db"), ("user", "etl")]),
    );
    let xml = parameter_sets_to_xml("database", &sets).unwrap();
    assert!(xml.contains("<configuration>"));
    assert!(xml.contains(r#"<database name="warehouse">"#));
    assert!(xml.contains("<url>jdbc:pg://db</url>"));
    assert!(xml.contains("<user>etl</user>"));
    assert!(xml.ends_with("</configuration>"));
}

#[test]
fn round_trip_preserves_names_and_values() {
    let mut sets = ParameterSets::new();
    sets.insert(
        "a & b".to_string(),
        params(&[("query", "select * from t where x < 3 && y > \"q\""), ("pad", "  spaced  ")]),
    );
    sets.insert("empty".to_string(), Parameters::new());
    sets.insert("blank_value".to_string(), params(&[("note", "")]));

    let xml = parameter_sets_to_xml("database", &sets).unwrap();
    let parsed = parameter_sets_from_xml(&xml, "database").unwrap();
    assert_eq!(parsed, sets);
}

#[test]
fn reading_ignores_other_types_and_whitespace() {
    let xml = r#"<?xml version="1.0"?>
<configuration>
  <mail name="smtp"><host>mx</host></mail>
  <database name="crm">
    <url>jdbc:crm</url>
    <flag/>
  </database>
</configuration>"#;
    let parsed = parameter_sets_from_xml(xml, "database").unwrap();
    assert_eq!(parsed.len(), 1);
    let crm = &parsed["crm"];
    assert_eq!(crm["url"], "jdbc:crm");
    assert_eq!(crm["flag"], "");
}

#[test]
fn empty_root_and_empty_objects_are_read() {
    assert!(parameter_sets_from_xml("<configuration/>", "database")
        .unwrap()
        .is_empty());
    let parsed =
        parameter_sets_from_xml(r#"<configuration><database name="x"/></configuration>"#, "database")
            .unwrap();
    assert_eq!(parsed["x"], Parameters::new());
}

#[test]
fn cdata_values_are_kept_verbatim() {
    let xml = r#"<configuration><database name="x"><q><![CDATA[a < b]]></q></database></configuration>"#;
    let parsed = parameter_sets_from_xml(xml, "database").unwrap();
    assert_eq!(parsed["x"]["q"], "a < b");
}

#[test]
fn wrong_root_is_rejected() {
    let err = parameter_sets_from_xml("<settings/>", "database").unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidRoot(tag) if tag == "settings"));
    let err = parameter_sets_from_xml("", "database").unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidRoot(_)));
}

#[test]
fn malformed_documents_are_errors() {
    let err = parameter_sets_from_xml("<configuration><database name=\"x\"></configuration>", "database")
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::Xml(_)));
}

#[test]
fn invalid_keys_and_type_ids_are_rejected_when_writing() {
    let mut sets = ParameterSets::new();
    sets.insert("x".to_string(), params(&[("bad key", "v")]));
    assert!(matches!(
        parameter_sets_to_xml("database", &sets),
        Err(ConfigurationError::InvalidParameter { .. })
    ));
    assert!(matches!(
        parameter_sets_to_xml("1type", &ParameterSets::new()),
        Err(ConfigurationError::InvalidTypeId(_))
    ));
}

#[test]
fn element_name_rules() {
    assert!(is_valid_element_name("database"));
    assert!(is_valid_element_name("web_service-2.v"));
    assert!(!is_valid_element_name(""));
    assert!(!is_valid_element_name("2fast"));
    assert!(!is_valid_element_name("xmlthing"));
    assert!(!is_valid_element_name("with space"));
    assert!(!is_valid_element_name("ns:tag"));
}

#[test]
fn defaults_fill_only_missing_keys() {
    let types = vec![
        ParameterType::new("port", ParameterKind::Integer).with_default("5432"),
        ParameterType::new("user", ParameterKind::String).with_default("admin"),
        ParameterType::new("password", ParameterKind::String),
    ];
    let mut values = params(&[("user", "etl")]);
    apply_defaults(&mut values, &types);
    assert_eq!(values["port"], "5432");
    assert_eq!(values["user"], "etl");
    assert!(!values.contains_key("password"));
}

#[test]
fn parameter_kinds_validate_values() {
    let port = ParameterType::new("port", ParameterKind::Integer);
    assert!(port.validate("80").is_ok());
    assert!(port.validate("eighty").is_err());
    let ratio = ParameterType::new("ratio", ParameterKind::Real);
    assert!(ratio.validate("0.5").is_ok());
    let flag = ParameterType::new("ssl", ParameterKind::Boolean);
    assert!(flag.validate("true").is_ok());
    assert!(flag.validate("yes").is_err());
    let method = ParameterType::new(
        "method",
        ParameterKind::Category(vec!["GET".to_string(), "POST".to_string()]),
    );
    assert!(method.validate("POST").is_ok());
    assert!(matches!(
        method.validate("PUT"),
        Err(ConfigurationError::InvalidParameter { key, .. }) if key == "method"
    ));
}
