//! End-to-end conversion: fixture in, Cobertura XML out.

use j2cov::{parser, transform, writer};

fn sample_report() -> j2cov::jacoco::Report {
    parser::parse(include_bytes!("fixtures/sample_jacoco.xml")).unwrap()
}

#[test]
fn convert_sample_report() {
    let report = sample_report();
    let coverage = transform::transform(&report, &[], None);
    let xml = writer::to_xml_string(&coverage).unwrap();

    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));

    // Root attributes come from the report-level counters.
    assert!(xml.contains(r#"line-rate="0.8571428571428571""#));
    assert!(xml.contains(r#"branch-rate="0.5""#));
    assert!(xml.contains(r#"lines-covered="6""#));
    assert!(xml.contains(r#"lines-valid="7""#));
    assert!(xml.contains(r#"branches-covered="1""#));
    assert!(xml.contains(r#"branches-valid="2""#));
    assert!(xml.contains(r#"complexity="4""#));
    assert!(xml.contains(r#"version="1.0""#));
    assert!(xml.contains(r#"timestamp="1700000000""#));

    // No source dirs given: default root.
    assert!(xml.contains("<source>.</source>"));

    // Package and class names are dotted, filenames package-relative.
    assert!(xml.contains(r#"<package name="com.example""#));
    assert!(xml.contains(r#"<class name="com.example.Foo" filename="com/example/Foo.java""#));
    assert!(
        xml.contains(r#"<class name="com.example.util.Helper" filename="com/example/util/Helper.kt""#)
    );

    // Method signatures carry the JVM descriptor; special characters are
    // escaped.
    assert!(xml.contains(r#"<method name="&lt;init&gt;" signature="()V""#));
    assert!(xml.contains(r#"<method name="doStuff" signature="(I)I" line-rate="0.75" branch-rate="0.5""#));

    // The branch line collapses to a single synthetic jump condition.
    assert!(xml.contains(r#"condition-coverage="50% (1/2)""#));
    assert!(xml.contains(r#"<condition number="0" type="jump" coverage="50%"/>"#));
}

#[test]
fn convert_attributes_lines_to_methods() {
    let report = sample_report();
    let coverage = transform::transform(&report, &[], None);

    let foo = &coverage.packages[0].classes[0];
    let init_lines: Vec<u32> = foo.methods[0].lines.iter().map(|l| l.number).collect();
    let do_stuff_lines: Vec<u32> = foo.methods[1].lines.iter().map(|l| l.number).collect();

    // <init> starts at 3 and is bounded by doStuff's declaration at 10;
    // doStuff runs to the end of the file.
    assert_eq!(init_lines, vec![3]);
    assert_eq!(do_stuff_lines, vec![10, 11, 12, 15]);

    // Class lines are the methods' lines, flattened.
    let class_lines: Vec<u32> = foo.lines.iter().map(|l| l.number).collect();
    assert_eq!(class_lines, vec![3, 10, 11, 12, 15]);

    // Line 12 had no covered instructions.
    assert_eq!(foo.lines.iter().find(|l| l.number == 12).unwrap().hits, 0);
    assert_eq!(foo.lines.iter().find(|l| l.number == 11).unwrap().hits, 1);

    // The Helper class has no sourcefilename; its lines come from the
    // base-name match against Helper.kt.
    let helper = &coverage.packages[1].classes[0];
    let helper_lines: Vec<u32> = helper.lines.iter().map(|l| l.number).collect();
    assert_eq!(helper_lines, vec![5, 6]);
}

#[test]
fn convert_with_root_package_strips_prefix() {
    let report = sample_report();
    let coverage = transform::transform(&report, &[], Some("com.example"));

    assert_eq!(coverage.packages[0].classes[0].filename, "Foo.java");
    assert_eq!(coverage.packages[1].classes[0].filename, "util/Helper.kt");
}

#[test]
fn convert_with_explicit_sources() {
    let report = sample_report();
    let sources = vec!["/builds/app/src/main/java/".to_string()];
    let coverage = transform::transform(&report, &sources, None);
    let xml = writer::to_xml_string(&coverage).unwrap();
    assert!(xml.contains("<source>/builds/app/src/main/java/</source>"));
}

#[test]
fn convert_grouped_report_flattens_packages() {
    let report = parser::parse(include_bytes!("fixtures/jacoco_groups.xml")).unwrap();
    let coverage = transform::transform(&report, &[], None);

    let names: Vec<&str> = coverage
        .packages
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["core.com.example.core", "api.com.example.api"]);

    // Class filenames keep the group-qualified package path.
    assert_eq!(
        coverage.packages[0].classes[0].filename,
        "core/com/example/core/Engine.java"
    );
}

#[test]
fn convert_empty_report() {
    let report = parser::parse(include_bytes!("fixtures/empty_jacoco.xml")).unwrap();
    let coverage = transform::transform(&report, &[], None);

    assert!(coverage.packages.is_empty());
    assert_eq!(coverage.sources, vec!["."]);
    assert_eq!(coverage.timestamp, 1700000000);
    assert_eq!(coverage.line_rate, 0.0);
}

#[test]
fn convert_split_by_package() {
    let report = sample_report();
    let split = transform::transform_split(&report, &[], None);

    assert_eq!(split.len(), 2);
    assert_eq!(split[0].0, "com.example");
    assert_eq!(split[1].0, "com.example.util");

    // Each sub-report contains only its own package and rates itself from
    // that package's counters.
    let (_, example) = &split[0];
    assert_eq!(example.packages.len(), 1);
    assert_eq!(example.packages[0].name, "com.example");
    assert_eq!(example.line_rate, 0.8);
    assert_eq!(example.lines_valid, 5);
    assert_eq!(example.timestamp, 1700000000);

    let (_, util) = &split[1];
    assert_eq!(util.line_rate, 1.0);
    assert_eq!(util.lines_valid, 2);
}

#[test]
fn convert_twice_is_identical() {
    let report = sample_report();
    let first = writer::to_xml_string(&transform::transform(&report, &[], None)).unwrap();
    let second = writer::to_xml_string(&transform::transform(&report, &[], None)).unwrap();
    assert_eq!(first, second);
}
