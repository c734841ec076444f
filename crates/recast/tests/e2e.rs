//! Batch behavior of the public entry point.

use recast::{
    synthesize, BasicKind, ConversionRequest, ExtendRoutine, Field, QualifiedName, RequestConfig,
    TypeId, TypeStore,
};

fn named_struct(store: &mut TypeStore, name: &str, fields: Vec<Field>) -> TypeId {
    let body = store.strukt(fields);
    store.named(QualifiedName::new("models", name), body)
}

#[test]
fn a_failing_request_does_not_stop_the_batch() {
    let mut store = TypeStore::new();
    let s = store.basic(BasicKind::String);
    let int = store.basic(BasicKind::Int);
    let person = named_struct(&mut store, "Person", vec![Field::new("Name", s)]);
    let aperson = named_struct(&mut store, "APerson", vec![Field::new("Name", s)]);
    let order = named_struct(&mut store, "Order", vec![Field::new("Id", s)]);
    let aorder = named_struct(
        &mut store,
        "AOrder",
        vec![Field::new("Id", s), Field::new("Total", int)],
    );

    let result = synthesize(
        &store,
        vec![
            ConversionRequest::new("ConvertPerson", person, aperson),
            ConversionRequest::new("ConvertOrder", order, aorder),
        ],
        Vec::new(),
    );

    assert_eq!(result.routines.len(), 1);
    assert_eq!(result.routines[0].name, "ConvertPerson");
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].request, "ConvertOrder");
    assert!(result.failures[0].diagnostic.contains("target.Total"));
    assert!(result.failures[0].diagnostic.contains("has no matching source field"));
}

#[test]
fn a_broken_shared_routine_fails_every_caller_the_same_way() {
    let mut store = TypeStore::new();
    let s = store.basic(BasicKind::String);
    let int = store.basic(BasicKind::Int);
    let pet = named_struct(&mut store, "Pet", vec![Field::new("Age", s)]);
    let apet = named_struct(&mut store, "APet", vec![Field::new("Age", int)]);
    let wrap_a = named_struct(&mut store, "WrapA", vec![Field::new("Pet", pet)]);
    let twrap_a = named_struct(&mut store, "TWrapA", vec![Field::new("Pet", apet)]);
    let wrap_b = named_struct(&mut store, "WrapB", vec![Field::new("Pet", pet)]);
    let twrap_b = named_struct(&mut store, "TWrapB", vec![Field::new("Pet", apet)]);

    let result = synthesize(
        &store,
        vec![
            ConversionRequest::new("ConvertA", wrap_a, twrap_a),
            ConversionRequest::new("ConvertB", wrap_b, twrap_b),
        ],
        Vec::new(),
    );

    assert!(result.routines.is_empty());
    assert_eq!(result.failures.len(), 2);
    for failure in &result.failures {
        assert!(failure.diagnostic.contains("no viable conversion from string to int"));
    }
}

#[test]
fn extends_are_called_but_never_returned() {
    let mut store = TypeStore::new();
    let s = store.basic(BasicKind::String);
    let int = store.basic(BasicKind::Int);
    let person = named_struct(&mut store, "Person", vec![Field::new("Age", s)]);
    let aperson = named_struct(&mut store, "APerson", vec![Field::new("Age", int)]);

    let mut config = RequestConfig::default();
    config.may_fail = true;
    let result = synthesize(
        &store,
        vec![ConversionRequest::new("Convert", person, aperson).with_config(config)],
        vec![ExtendRoutine::new("parse", s, int).may_fail()],
    );

    assert!(result.failures.is_empty());
    let names: Vec<&str> = result.routines.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Convert"]);
    assert!(result.render().contains("tmp, err := parse(source.Age)"));
}

#[test]
fn context_aware_extends_resolve_through_the_batch() {
    let mut store = TypeStore::new();
    let s = store.basic(BasicKind::String);
    let int = store.basic(BasicKind::Int);
    let person = named_struct(&mut store, "Person", vec![Field::new("Value", s)]);
    let aperson = named_struct(&mut store, "APerson", vec![Field::new("Value", int)]);

    let mut config = RequestConfig::default();
    config.context = vec!["locale".to_string()];
    let result = synthesize(
        &store,
        vec![ConversionRequest::new("Convert", person, aperson).with_config(config)],
        vec![ExtendRoutine::new("localizedParse", s, int).with_context(&["locale"])],
    );

    assert!(result.failures.is_empty());
    assert!(result.render().contains("localizedParse(source.Value, locale)"));
}

#[test]
fn ambiguous_extend_registration_is_reported_not_fatal() {
    let mut store = TypeStore::new();
    let s = store.basic(BasicKind::String);
    let int = store.basic(BasicKind::Int);
    let person = named_struct(&mut store, "Person", vec![Field::new("Name", s)]);
    let aperson = named_struct(&mut store, "APerson", vec![Field::new("Name", s)]);

    let result = synthesize(
        &store,
        vec![ConversionRequest::new("Convert", person, aperson)],
        vec![
            ExtendRoutine::new("parse", s, int),
            ExtendRoutine::new("parseToo", s, int),
        ],
    );

    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].request, "parseToo");
    assert!(result.failures[0].diagnostic.contains("ambiguous overload"));
    // The unrelated request still went through.
    assert_eq!(result.routines.len(), 1);
    assert_eq!(result.routines[0].name, "Convert");
}
