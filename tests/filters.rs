use idset::construct::{Record, RecordSet};
use idset::datatype::{Kind, Value};
use idset::filter::{FilterOp, Predicate};
use idset::operate::Operation;
use idset::IdsetError;

fn setup() -> RecordSet {
    // 432 hits with scores spread over 0.0..=64.5, every id appearing twice
    (0..432)
        .map(|i| {
            let score = (i % 130) as f64 * 0.5;
            Record::new("pdb", format!("{}abc-{}", i % 216, i % 3))
                .with("_pdbId", format!("{}abc", i % 216))
                .with("_DaliZscore", score)
                .with("_DaliSeqLength", (100 + i % 50) as i64)
                .with(
                    "_DaliDescription",
                    if i % 4 == 0 { "CARBOXYLESTERASE" } else { "LIPASE" },
                )
        })
        .collect()
}

fn scores(set: &RecordSet) -> Vec<f64> {
    set.iter()
        .map(|r| r.attribute("_DaliZscore").and_then(Value::as_f64).unwrap())
        .collect()
}

fn distinct_matching<F: Fn(&Record) -> bool>(set: &RecordSet, keep: F) -> usize {
    let kept: RecordSet = set.iter().filter(|r| keep(*r)).cloned().collect();
    kept.distinct_ids()
}

#[test]
fn greater_or_equal_on_float_column() {
    let set = setup();
    let out = Operation::filter("_DaliZscore", FilterOp::GreaterOrEqual, "40")
        .apply(&[&set], true)
        .expect("filter ok");
    let expected = distinct_matching(&set, |r| {
        r.attribute("_DaliZscore").and_then(Value::as_f64).unwrap() >= 40.0
    });
    assert_eq!(out.len(), expected);
    assert!(scores(&out).iter().all(|s| *s >= 40.0));
    // 40.0 itself is kept
    assert!(scores(&out).contains(&40.0));
    assert_eq!(out.len(), out.distinct_ids(), "dedup must not leave repeated ids");
}

#[test]
fn between_takes_upper_bound_first() {
    let set = setup();
    let out = Operation::between("_DaliZscore", "52", "25")
        .apply(&[&set], false)
        .expect("filter ok");
    let expected = set
        .iter()
        .filter(|r| {
            let s = r.attribute("_DaliZscore").and_then(Value::as_f64).unwrap();
            (25.0..=52.0).contains(&s)
        })
        .count();
    assert_eq!(out.len(), expected);
    assert!(scores(&out).contains(&25.0) && scores(&out).contains(&52.0), "bounds are inclusive");
}

#[test]
fn comparison_operators_on_integer_column() {
    let set = setup();
    let count = |op: FilterOp, value: &str| {
        Operation::filter("_DaliSeqLength", op, value)
            .apply(&[&set], false)
            .expect("filter ok")
            .len()
    };
    let length = |r: &Record| match r.attribute("_DaliSeqLength") {
        Some(Value::Int(i)) => *i,
        other => panic!("unexpected value {other:?}"),
    };
    assert_eq!(count(FilterOp::Equal, "120"), set.iter().filter(|r| length(*r) == 120).count());
    assert_eq!(count(FilterOp::NotEqual, "120"), set.iter().filter(|r| length(*r) != 120).count());
    assert_eq!(count(FilterOp::Greater, "140"), set.iter().filter(|r| length(*r) > 140).count());
    assert_eq!(count(FilterOp::Less, "110"), set.iter().filter(|r| length(*r) < 110).count());
    assert_eq!(count(FilterOp::LessOrEqual, "110"), set.iter().filter(|r| length(*r) <= 110).count());
}

#[test]
fn string_predicates() {
    let set = setup();
    let count = |op: FilterOp, column: &str, value: &str| {
        Operation::filter(column, op, value)
            .apply(&[&set], false)
            .expect("filter ok")
            .len()
    };
    let contains = count(FilterOp::Contains, "_DaliDescription", "ESTERASE");
    assert_eq!(contains, 108);
    assert_eq!(count(FilterOp::NotContains, "_DaliDescription", "ESTERASE"), 432 - 108);
    let starts = count(FilterOp::StartsWith, "_pdbId", "1");
    assert_eq!(starts + count(FilterOp::NotStartsWith, "_pdbId", "1"), 432);
    assert_eq!(count(FilterOp::EndsWith, "_DaliDescription", "LIPASE"), 432 - 108);
    assert_eq!(count(FilterOp::NotEndsWith, "_DaliDescription", "LIPASE"), 108);
}

#[test]
fn equal_on_string_column_is_exact() {
    let set = setup();
    let out = Operation::filter("_pdbId", FilterOp::Equal, "7abc")
        .apply(&[&set], false)
        .expect("filter ok");
    // 7abc-1 sits at rows 7 and 223
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|r| r.attribute("_pdbId") == Some(&Value::from("7abc"))));
}

#[test]
fn literal_type_follows_first_record() {
    // the first record holds an integer, so "2.5" cannot be read
    let set: RecordSet = vec![
        Record::new("pdb", "a").with("_n", 1i64),
        Record::new("pdb", "b").with("_n", 2.5),
    ]
    .into_iter()
    .collect();
    let err = Operation::filter("_n", FilterOp::Greater, "2.5")
        .apply(&[&set], false)
        .unwrap_err();
    assert!(matches!(err, IdsetError::Validation(_)), "unexpected error: {err}");
    // integers and floats still compare with each other
    let out = Operation::filter("_n", FilterOp::Greater, "2")
        .apply(&[&set], false)
        .expect("filter ok");
    assert_eq!(out.len(), 1);
    assert_eq!(out.get(0).unwrap().id(), "b");
}

#[test]
fn numeric_text_on_string_column_compares_as_text() {
    let set: RecordSet = vec![
        Record::new("zinc", "a").with("_code", "9"),
        Record::new("zinc", "b").with("_code", "10"),
    ]
    .into_iter()
    .collect();
    let out = Operation::filter("_code", FilterOp::Greater, "5")
        .apply(&[&set], false)
        .expect("filter ok");
    // "10" < "5" as text
    assert_eq!(out.len(), 1);
    assert_eq!(out.get(0).unwrap().id(), "a");
}

#[test]
fn missing_column_is_a_validation_error() {
    let set = setup();
    let err = Operation::filter("_nope", FilterOp::Equal, "1")
        .apply(&[&set], false)
        .unwrap_err();
    assert!(format!("{}", err).contains("not in the set"));
    let err = Operation::filter("", FilterOp::Equal, "1")
        .apply(&[&set], false)
        .unwrap_err();
    assert!(matches!(err, IdsetError::Validation(_)));
}

#[test]
fn malformed_numeric_literal_is_rejected() {
    let set = setup();
    let err = Operation::filter("_DaliZscore", FilterOp::Greater, "forty")
        .apply(&[&set], false)
        .unwrap_err();
    assert!(matches!(err, IdsetError::Validation(_)), "unexpected error: {err}");
}

#[test]
fn text_predicate_on_numeric_column_is_misuse() {
    let set = setup();
    let err = Operation::filter("_DaliZscore", FilterOp::StartsWith, "4")
        .apply(&[&set], false)
        .unwrap_err();
    assert!(matches!(err, IdsetError::TypeMisuse(_)), "unexpected error: {err}");
}

#[test]
fn text_predicate_on_numeric_value_is_misuse() {
    // the schema says string, a later record disagrees
    let set: RecordSet = vec![
        Record::new("pdb", "a").with("_label", "alpha"),
        Record::new("pdb", "b").with("_label", 3i64),
    ]
    .into_iter()
    .collect();
    let err = Operation::filter("_label", FilterOp::Contains, "a")
        .apply(&[&set], false)
        .unwrap_err();
    assert!(matches!(err, IdsetError::TypeMisuse(_)), "unexpected error: {err}");
    let err = Operation::filter("_label", FilterOp::Less, "b")
        .apply(&[&set], false)
        .unwrap_err();
    assert!(matches!(err, IdsetError::TypeMisuse(_)), "unexpected error: {err}");
    // equality just fails to match
    let out = Operation::filter("_label", FilterOp::Equal, "alpha")
        .apply(&[&set], false)
        .expect("filter ok");
    assert_eq!(out.len(), 1);
}

#[test]
fn records_without_the_column_are_left_out() {
    let set: RecordSet = vec![
        Record::new("pdb", "a").with("_score", 5.0),
        Record::new("pdb", "b"),
        Record::new("pdb", "c").with("_score", 7.0),
    ]
    .into_iter()
    .collect();
    let out = Operation::filter("_score", FilterOp::NotEqual, "1")
        .apply(&[&set], false)
        .expect("filter ok");
    assert_eq!(out.iter().map(Record::id).collect::<Vec<_>>(), vec!["a", "c"]);
}

#[test]
fn filtering_an_empty_set_gives_an_empty_set() {
    let set = RecordSet::new();
    let out = Operation::filter("_anything", FilterOp::Equal, "1")
        .apply(&[&set], true)
        .expect("filter ok");
    assert!(out.is_empty());
}

#[test]
fn between_without_lower_bound_is_rejected() {
    let set = setup();
    let operation = Operation::Filter {
        column: "_DaliZscore".into(),
        op: FilterOp::Between,
        value: "52".into(),
        lower: None,
    };
    let err = operation.apply(&[&set], false).unwrap_err();
    assert!(format!("{}", err).contains("lower value"));
}

#[test]
fn predicate_reads_column_kind_from_schema() {
    let set = setup();
    let schema = set.schema();
    assert_eq!(
        &schema.columns()[1..3],
        &[
            ("_DaliZscore".to_string(), Kind::Float),
            ("_DaliSeqLength".to_string(), Kind::Integer),
        ]
    );
    let predicate =
        Predicate::compile("_DaliSeqLength", FilterOp::LessOrEqual, "120", None, &schema)
            .expect("compile ok");
    assert_eq!(predicate.column(), "_DaliSeqLength");
    assert_eq!(predicate.kind(), Kind::Integer);
    assert_eq!(predicate.op(), FilterOp::LessOrEqual);
    let matching = set
        .iter()
        .filter(|r| predicate.matches(r).expect("comparable"))
        .count();
    // lengths are 100 + i % 50, so i % 50 <= 20 matches
    assert_eq!(matching, (0..432).filter(|i| i % 50 <= 20).count());
}
