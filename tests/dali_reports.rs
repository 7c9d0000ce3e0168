use std::path::Path;

use idset::dali::{parse_report, read_report, subset_of};
use idset::datatype::{Kind, Value};
use idset::filter::FilterOp;
use idset::operate::Operation;
use idset::IdsetError;

const REPORT: &str = "# Job: s001
# Query: s001A
# No:  Chain   Z    rmsd lali nres  %id Description
   1:  5xjh-A 57.5  0.0  285   285  100   MOLECULE: CARBOXYLESTERASE;
   2:  1qz3-A 41.2  1.3  280   310   38   MOLECULE: HORMONE-SENSITIVE LIPASE;
   3:  6eb3-B 38.0  1.6  279   319   31   MOLECULE: ESTERASE;

   4:  6eb3-A 37.9  1.6  279   319   31   MOLECULE: ESTERASE;
   5:  2c7b   25.1  2.4  250   300   22
# Structural equivalences
   1: s001-A 5xjh-A     1 -  285 <=>    1 -  285   (MET    1  - GLN  285  )
";

#[test]
fn hits_become_records() {
    let set = parse_report(REPORT).expect("report ok");
    assert_eq!(set.len(), 5, "structural equivalences are not hits");
    let first = set.first().unwrap();
    assert_eq!(first.database(), "pdb");
    assert_eq!(first.id(), "5xjh-A");
    assert_eq!(first.attribute("_pdbId"), Some(&Value::from("5xjh")));
    assert_eq!(first.attribute("_chain"), Some(&Value::from("A")));
    assert_eq!(
        first.attribute("_PDBLink"),
        Some(&Value::from("https://www.rcsb.org/structure/5xjh"))
    );
    assert_eq!(first.attribute("_DaliZscore"), Some(&Value::Float(57.5)));
    assert_eq!(first.attribute("_DaliSuperpositionLength"), Some(&Value::Int(285)));
    assert_eq!(
        first.attribute("_DaliDescription"),
        Some(&Value::from("MOLECULE: CARBOXYLESTERASE;"))
    );
    // 2 fixed columns + 9 attributes
    assert_eq!(first.attributes().len() + 2, 11);
}

#[test]
fn schema_follows_report_columns() {
    let set = parse_report(REPORT).expect("report ok");
    let schema = set.schema();
    let names: Vec<&str> = schema.names().collect();
    assert_eq!(
        names,
        vec![
            "_pdbId",
            "_chain",
            "_PDBLink",
            "_DaliZscore",
            "_DaliRMSD",
            "_DaliSuperpositionLength",
            "_DaliSeqLength",
            "_DaliSeqIdentity",
            "_DaliDescription",
        ]
    );
    assert_eq!(schema.kind_of("_DaliZscore"), Some(Kind::Float));
    assert_eq!(schema.kind_of("_DaliSeqLength"), Some(Kind::Integer));
    assert_eq!(schema.kind_of("_DaliDescription"), Some(Kind::String));
}

#[test]
fn chainless_hit_has_no_chain_and_empty_description() {
    let set = parse_report(REPORT).expect("report ok");
    let last = set.get(4).unwrap();
    assert_eq!(last.id(), "2c7b");
    assert!(!last.has_attribute("_chain"));
    assert_eq!(last.attribute("_DaliDescription"), Some(&Value::from("")));
}

#[test]
fn report_feeds_the_algebra() {
    let set = parse_report(REPORT).expect("report ok");
    let esterases = Operation::filter("_DaliDescription", FilterOp::Contains, "ESTERASE")
        .apply(&[&set], true)
        .expect("filter ok");
    assert_eq!(esterases.len(), 3);
    let strong = Operation::filter("_DaliZscore", FilterOp::GreaterOrEqual, "38")
        .apply(&[&set], true)
        .expect("filter ok");
    assert_eq!(strong.len(), 3);
    let structures = Operation::change_id("pdb", "_pdbId")
        .apply(&[&set], true)
        .expect("change ok");
    assert_eq!(structures.len(), 4, "both chains of 6eb3 collapse");
}

#[test]
fn malformed_hit_reports_its_line() {
    let report = "# No:  Chain   Z    rmsd lali nres  %id Description\n   1:  5xjh-A high  0.0  285   285  100   X\n";
    match parse_report(report) {
        Err(IdsetError::Parse { line, message }) => {
            assert_eq!(line, Some(2));
            assert!(message.contains("Z-score"));
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
    let err = parse_report("   1:  5xjh-A\n").unwrap_err();
    assert!(format!("{}", err).contains("unrecognized hit"));
}

#[test]
fn subsets_come_from_file_names() {
    assert_eq!(subset_of(Path::new("results/s001A-90.txt")), "90");
    assert_eq!(subset_of(Path::new("s001A-25.txt")), "25");
    assert_eq!(subset_of(Path::new("s001A.txt")), "");
    // only the first dash-separated part after the name counts
    assert_eq!(subset_of(Path::new("s001A-90-x.txt")), "90");
}

#[test]
fn report_files_are_named_after_their_subset() {
    let path = std::env::temp_dir().join("idset_test_s001A-50.txt");
    std::fs::write(&path, REPORT).expect("write report");
    let set = read_report(&path).expect("read ok");
    assert_eq!(set.name(), Some("dali50"));
    assert_eq!(set.len(), 5);
    let _ = std::fs::remove_file(&path);
    assert!(matches!(read_report(&path), Err(IdsetError::Io(_))));
}
