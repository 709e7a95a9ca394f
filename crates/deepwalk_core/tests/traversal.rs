//! End-to-end walks over composite values.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use deepwalk_core::{
    Adapter, ContainerVisit, ContextKey, HandlerError, TaggedPropertyResolver, TravContext,
    TraverseConfig, TraverseError, Traveller, Visit,
};
use deepwalk_value::{FieldDef, Kind, TypeTag, Value};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

const TRACE: ContextKey<Mutex<Vec<String>>> = ContextKey::new("tests", "trace");

fn record(ctx: &TravContext, line: String) {
    ctx.get_or_insert_with(&TRACE, || Mutex::new(Vec::new()))
        .lock()
        .push(line);
}

fn trace(ctx: &TravContext) -> Vec<String> {
    ctx.get(&TRACE)
        .map(|lines| lines.lock().clone())
        .unwrap_or_default()
}

fn index(index: Option<usize>) -> String {
    index.map_or_else(|| "-".to_string(), |i| i.to_string())
}

fn leaf(ctx: &TravContext, visit: &Visit<'_>, value: &Value) -> Result<(), HandlerError> {
    record(
        ctx,
        format!(
            "leaf {} d={} i={} n={}",
            value,
            visit.depth,
            index(visit.index),
            visit.name
        ),
    );
    Ok(())
}

fn container(ctx: &TravContext, visit: &ContainerVisit<'_>, value: &Value) -> Result<bool, HandlerError> {
    record(
        ctx,
        format!(
            "{:?} {} d={} i={} n={} s={}",
            visit.phase,
            value.ty(),
            visit.depth,
            index(visit.index),
            visit.name,
            visit.size
        ),
    );
    Ok(true)
}

fn tracing_adapter() -> Adapter {
    Adapter::new()
        .for_container(Kind::Struct, container)
        .for_container(Kind::Slice, container)
        .for_container(Kind::Map, container)
        .for_container(Kind::Ptr, container)
        .for_kind(Kind::String, leaf)
        .for_int_x(leaf)
}

fn int() -> TypeTag {
    TypeTag::builtin(Kind::Int)
}

fn string() -> TypeTag {
    TypeTag::builtin(Kind::String)
}

fn inner_type() -> TypeTag {
    TypeTag::record("Inner")
        .field(FieldDef::new("A"))
        .field(FieldDef::new("B"))
        .build()
}

/// `Outer{Name: "x", Items: [1, 2], Inner: &Inner{A: 3, B: "y"}, Meta: map["k": 4], secret: 0}`
fn outer_value() -> Value {
    let outer = TypeTag::record("Outer")
        .field(FieldDef::new("Name"))
        .field(FieldDef::new("Items"))
        .field(FieldDef::new("Inner"))
        .field(FieldDef::new("Meta"))
        .field(FieldDef::private("secret"))
        .build();
    let inner = Value::record(&inner_type(), vec![Value::int(3), Value::string("y")]);
    Value::record(
        &outer,
        vec![
            Value::string("x"),
            Value::slice(&int(), vec![Value::int(1), Value::int(2)]),
            Value::ptr(inner),
            Value::map(&string(), &int(), vec![(Value::string("k"), Value::int(4))]),
            Value::int(0),
        ],
    )
}

fn walk(traveller: &Traveller, value: &Value) -> Vec<String> {
    let ctx = TravContext::new();
    traveller.traverse_with(&ctx, value).unwrap();
    trace(&ctx)
}

#[test]
fn test_preorder_with_brackets() {
    let traveller = Traveller::new(
        tracing_adapter(),
        TraverseConfig::new().bracket_containers(true),
    )
    .unwrap();

    let lines = walk(&traveller, &outer_value());

    insta::assert_snapshot!(lines.join("\n"), @r#"
    Start Outer d=0 i=- n= s=4
    leaf "x" d=1 i=0 n=Name
    Start []int d=1 i=1 n=Items s=2
    leaf 1 d=2 i=0 n=
    leaf 2 d=2 i=1 n=
    End []int d=1 i=1 n=Items s=2
    Start *Inner d=1 i=2 n=Inner s=1
    Start Inner d=2 i=0 n= s=2
    leaf 3 d=3 i=0 n=A
    leaf "y" d=3 i=1 n=B
    End Inner d=2 i=0 n= s=2
    End *Inner d=1 i=2 n=Inner s=1
    Start map[string]int d=1 i=3 n=Meta s=2
    leaf "k" d=2 i=0 n=
    leaf 4 d=2 i=1 n=
    End map[string]int d=1 i=3 n=Meta s=2
    End Outer d=0 i=- n= s=4
    "#);
}

#[test]
fn test_walks_are_deterministic() {
    let traveller = Traveller::new(tracing_adapter(), TraverseConfig::new()).unwrap();
    let value = outer_value();

    let first = walk(&traveller, &value);
    let second = walk(&traveller, &value);

    assert_eq!(first, second);
    assert!(!first.iter().any(|line| line.starts_with("End")));
}

#[test]
fn test_map_yields_alternating_key_value_slots() {
    let traveller = Traveller::new(
        Adapter::new()
            .for_container(Kind::Map, container)
            .for_kind(Kind::String, leaf)
            .for_int_x(leaf),
        TraverseConfig::new(),
    )
    .unwrap();
    let value = Value::map(
        &string(),
        &int(),
        vec![
            (Value::string("a"), Value::int(1)),
            (Value::string("b"), Value::int(2)),
            (Value::string("c"), Value::int(3)),
        ],
    );

    let lines = walk(&traveller, &value);

    assert_eq!(
        lines,
        vec![
            "Start map[string]int d=0 i=- n= s=6",
            "leaf \"a\" d=1 i=0 n=",
            "leaf 1 d=1 i=1 n=",
            "leaf \"b\" d=1 i=2 n=",
            "leaf 2 d=1 i=3 n=",
            "leaf \"c\" d=1 i=4 n=",
            "leaf 3 d=1 i=5 n=",
        ]
    );
}

#[test]
fn test_missing_binding_fails_walk() {
    let traveller = Traveller::new(
        Adapter::new()
            .for_container(Kind::Slice, container)
            .for_int_x(leaf),
        TraverseConfig::new(),
    )
    .unwrap();
    let value = Value::slice(&string(), vec![Value::string("a")]);

    let err = traveller.traverse(&value).unwrap_err();

    assert!(err.is_binding_missing());
    assert_eq!(err.to_string(), "type:string kind:String binding is missing");
}

#[test]
fn test_tolerated_missing_binding_skips_value() {
    let traveller = Traveller::new(
        Adapter::new()
            .for_container(Kind::Struct, container)
            .for_int_x(leaf),
        TraverseConfig::new().tolerates_missing_binding(true),
    )
    .unwrap();
    let value = Value::record(&inner_type(), vec![Value::int(3), Value::string("y")]);

    assert_eq!(
        walk(&traveller, &value),
        vec!["Start Inner d=0 i=- n= s=2", "leaf 3 d=1 i=0 n=A"]
    );
}

#[test]
fn test_nil_pointer_binding_intercepts_pointer_rule() {
    let nil_calls = Arc::new(AtomicUsize::new(0));
    let ptr_calls = Arc::new(AtomicUsize::new(0));
    let traveller = Traveller::new(
        Adapter::new()
            .for_container(Kind::Slice, |_, _, _| Ok(true))
            .for_container(Kind::Ptr, {
                let ptr_calls = Arc::clone(&ptr_calls);
                move |_, _, _| {
                    ptr_calls.fetch_add(1, Ordering::SeqCst);
                    Ok(true)
                }
            })
            .for_kind(Kind::Int, |_, _, _| Ok(()))
            .for_nil_ptr({
                let nil_calls = Arc::clone(&nil_calls);
                move |_, visit, value| {
                    assert!(value.is_nil_ptr());
                    assert_eq!(visit.index, Some(0));
                    nil_calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
        TraverseConfig::new(),
    )
    .unwrap();
    let value = Value::slice(
        &TypeTag::ptr_to(&int()),
        vec![Value::nil_ptr(&int()), Value::ptr(Value::int(1))],
    );

    traveller.traverse(&value).unwrap();

    assert_eq!(nil_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ptr_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_auto_dereference_resolves_long_chains_in_place() {
    let traveller = Traveller::new(
        Adapter::new().for_kind(Kind::Int, leaf),
        TraverseConfig::new().auto_dereference_pointers(true),
    )
    .unwrap();
    let value = (0..2000).fold(Value::int(5), |value, _| Value::ptr(value));

    assert_eq!(walk(&traveller, &value), vec!["leaf 5 d=0 i=- n="]);
}

#[test]
fn test_auto_dereference_skips_nil_pointer() {
    let traveller = Traveller::new(
        Adapter::new().for_kind(Kind::Int, leaf),
        TraverseConfig::new().auto_dereference_pointers(true),
    )
    .unwrap();
    let value = Value::ptr(Value::nil_ptr(&int()));

    assert_eq!(walk(&traveller, &value), Vec::<String>::new());
}

#[test]
fn test_handler_error_aborts_walk() {
    let traveller = Traveller::new(
        Adapter::new()
            .for_container(Kind::Slice, container)
            .for_int_x(|ctx, visit, value| {
                if value.as_int() == Some(2) {
                    return Err("boom".into());
                }
                leaf(ctx, visit, value)
            }),
        TraverseConfig::new().bracket_containers(true),
    )
    .unwrap();
    let value = Value::slice(&int(), vec![Value::int(1), Value::int(2), Value::int(3)]);
    let ctx = TravContext::new();

    let err = traveller.traverse_with(&ctx, &value).unwrap_err();

    assert!(matches!(err, TraverseError::Handler(_)));
    assert_eq!(err.to_string(), "handler failed: boom");
    assert_eq!(
        trace(&ctx),
        vec!["Start []int d=0 i=- n= s=3", "leaf 1 d=1 i=0 n="]
    );
}

#[test]
fn test_container_end_error() {
    let traveller = Traveller::new(
        Adapter::new()
            .for_container(Kind::Slice, |_, visit, _| {
                if visit.phase.is_start() {
                    Ok(true)
                } else {
                    Err("closing".into())
                }
            })
            .for_int_x(|_, _, _| Ok(())),
        TraverseConfig::new().bracket_containers(true),
    )
    .unwrap();
    let value = Value::slice(&int(), vec![Value::int(1)]);

    let err = traveller.traverse(&value).unwrap_err();

    assert!(matches!(err, TraverseError::ContainerEnd(_)));
    assert_eq!(err.to_string(), "call container end failed: closing");
}

#[test]
fn test_declined_container_is_not_entered_or_closed() {
    let traveller = Traveller::new(
        Adapter::new()
            .for_container(Kind::Struct, |ctx, visit, value| {
                container(ctx, visit, value)?;
                Ok(value.ty().name() != Some("Inner"))
            })
            .for_container(Kind::Ptr, container)
            .for_container(Kind::Slice, container)
            .for_container(Kind::Map, container)
            .for_kind(Kind::String, leaf)
            .for_int_x(leaf),
        TraverseConfig::new().bracket_containers(true),
    )
    .unwrap();

    let lines = walk(&traveller, &outer_value());

    assert!(lines.contains(&"Start Inner d=2 i=0 n= s=2".to_string()));
    assert!(!lines.iter().any(|line| line.contains("n=A")));
    assert!(!lines.contains(&"End Inner d=2 i=0 n= s=2".to_string()));
    assert!(lines.contains(&"End *Inner d=1 i=2 n=Inner s=1".to_string()));
}

#[test]
fn test_tagged_record_reports_effective_orders() {
    let tagged = TypeTag::record("Tagged")
        .field(FieldDef::new("A").with_tag("order", "0"))
        .field(FieldDef::new("E").with_tag("order", "5"))
        .field(FieldDef::new("B").with_tag("order", "1"))
        .field(FieldDef::new("C").with_tag("order", "3"))
        .field(FieldDef::new("D").with_tag("order", "4"))
        .field(FieldDef::new("Hidden").with_tag("walk", "-"))
        .build();
    let value = Value::record(
        &tagged,
        vec![
            Value::int(0),
            Value::int(5),
            Value::int(1),
            Value::int(3),
            Value::int(4),
            Value::string("not visited"),
        ],
    );
    let traveller = Traveller::new(
        Adapter::new()
            .for_container(Kind::Struct, container)
            .for_int_x(leaf),
        TraverseConfig::new().property_resolver(TaggedPropertyResolver::new()),
    )
    .unwrap();

    assert_eq!(
        walk(&traveller, &value),
        vec![
            "Start Tagged d=0 i=- n= s=6",
            "leaf 0 d=1 i=0 n=A",
            "leaf 1 d=1 i=1 n=B",
            "leaf 3 d=1 i=3 n=C",
            "leaf 4 d=1 i=4 n=D",
            "leaf 5 d=1 i=5 n=E",
        ]
    );
}

#[test]
fn test_assignable_type_binding_precedes_kind() {
    let celsius = TypeTag::named("Celsius", &TypeTag::builtin(Kind::Float64));
    let traveller = Traveller::new(
        Adapter::new()
            .for_container(Kind::Slice, |_, _, _| Ok(true))
            .for_type(&celsius, |ctx, _, value| {
                record(ctx, format!("celsius {}", value));
                Ok(())
            })
            .for_kind(Kind::Float64, |ctx, _, value| {
                record(ctx, format!("float {}", value));
                Ok(())
            }),
        TraverseConfig::new(),
    )
    .unwrap();
    let value = Value::slice(
        &TypeTag::builtin(Kind::Float64),
        vec![Value::float(1.5).with_type(celsius.clone()), Value::float(2.5)],
    );

    assert_eq!(walk(&traveller, &value), vec!["celsius 1.5", "float 2.5"]);
}

#[test]
fn test_shared_traveller_across_threads() {
    let traveller = Traveller::new(tracing_adapter(), TraverseConfig::new()).unwrap();
    let value = outer_value();
    let expected = walk(&traveller, &value);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let traveller = traveller.clone();
                let value = &value;
                scope.spawn(move || walk(&traveller, value))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_context_survives_across_walks() {
    const VISITS: ContextKey<AtomicUsize> = ContextKey::new("tests", "visits");
    let traveller = Traveller::new(
        Adapter::new().for_int_x(|ctx, _, _| {
            ctx.get_or_insert_with(&VISITS, || AtomicUsize::new(0))
                .fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
        TraverseConfig::new(),
    )
    .unwrap();
    let ctx = TravContext::new();

    traveller.traverse_with(&ctx, &Value::int(1)).unwrap();
    traveller.traverse_with(&ctx, &Value::int(2)).unwrap();

    let visits = ctx.get(&VISITS).unwrap();
    assert_eq!(visits.load(Ordering::SeqCst), 2);
}

#[test]
fn test_config_loaded_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"toleratesMissingBinding": true, "bracketContainers": true}}"#).unwrap();
    let config = TraverseConfig::from_file(file.path()).unwrap();
    let traveller = Traveller::new(
        Adapter::new()
            .for_container(Kind::Slice, container)
            .for_int_x(leaf),
        config,
    )
    .unwrap();
    let value = Value::slice(&string(), vec![Value::string("skipped")]);

    assert_eq!(
        walk(&traveller, &value),
        vec!["Start []string d=0 i=- n= s=1", "End []string d=0 i=- n= s=1"]
    );
}
