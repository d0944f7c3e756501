//! Cobertura XML serialization.
//!
//! Cobertura XML structure:
//!   <coverage line-rate="0.8" branch-rate="0.5" ... version="1.0" timestamp="...">
//!     <sources><source>.</source></sources>
//!     <packages>
//!       <package name="com.example" line-rate="..." ...>
//!         <classes>
//!           <class name="com.example.Foo" filename="com/example/Foo.java" ...>
//!             <methods>
//!               <method name="doStuff" signature="(I)I" ...>
//!                 <lines><line number="10" hits="1" branch="false"/></lines>
//!               </method>
//!             </methods>
//!             <lines>
//!               <line number="11" hits="1" branch="true"
//!                     condition-coverage="50% (1/2)">
//!                 <conditions>
//!                   <condition number="0" type="jump" coverage="50%"/>
//!                 </conditions>
//!               </line>
//!             </lines>
//!           </class>
//!         </classes>
//!       </package>
//!     </packages>
//!   </coverage>
//!
//! The document is always built fully in memory before anything touches the
//! output file, so a failed conversion never leaves partial output behind.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::cobertura::{Class, Coverage, Line, Method, Package, VERSION};
use crate::error::Result;

/// Serialize a report to an XML string.
pub fn to_xml_string(coverage: &Coverage) -> Result<String> {
    let mut buf = Vec::new();
    write_report(coverage, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Serialize a report to a writer, with XML declaration and 2-space indent.
pub fn write_report<W: Write>(coverage: &Coverage, out: W) -> Result<()> {
    let mut w = Writer::new_with_indent(out, b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let line_rate = coverage.line_rate.to_string();
    let branch_rate = coverage.branch_rate.to_string();
    let lines_covered = coverage.lines_covered.to_string();
    let lines_valid = coverage.lines_valid.to_string();
    let branches_covered = coverage.branches_covered.to_string();
    let branches_valid = coverage.branches_valid.to_string();
    let complexity = coverage.complexity.to_string();
    let timestamp = coverage.timestamp.to_string();

    let mut root = BytesStart::new("coverage");
    root.push_attribute(("line-rate", line_rate.as_str()));
    root.push_attribute(("branch-rate", branch_rate.as_str()));
    root.push_attribute(("lines-covered", lines_covered.as_str()));
    root.push_attribute(("lines-valid", lines_valid.as_str()));
    root.push_attribute(("branches-covered", branches_covered.as_str()));
    root.push_attribute(("branches-valid", branches_valid.as_str()));
    root.push_attribute(("complexity", complexity.as_str()));
    root.push_attribute(("version", VERSION));
    root.push_attribute(("timestamp", timestamp.as_str()));
    w.write_event(Event::Start(root))?;

    w.write_event(Event::Start(BytesStart::new("sources")))?;
    for source in &coverage.sources {
        w.write_event(Event::Start(BytesStart::new("source")))?;
        w.write_event(Event::Text(BytesText::new(source)))?;
        w.write_event(Event::End(BytesEnd::new("source")))?;
    }
    w.write_event(Event::End(BytesEnd::new("sources")))?;

    w.write_event(Event::Start(BytesStart::new("packages")))?;
    for package in &coverage.packages {
        write_package(&mut w, package)?;
    }
    w.write_event(Event::End(BytesEnd::new("packages")))?;

    w.write_event(Event::End(BytesEnd::new("coverage")))?;
    Ok(())
}

fn write_package<W: Write>(w: &mut Writer<W>, package: &Package) -> Result<()> {
    let line_rate = package.line_rate.to_string();
    let branch_rate = package.branch_rate.to_string();
    let complexity = package.complexity.to_string();

    let mut e = BytesStart::new("package");
    e.push_attribute(("name", package.name.as_str()));
    e.push_attribute(("line-rate", line_rate.as_str()));
    e.push_attribute(("branch-rate", branch_rate.as_str()));
    e.push_attribute(("complexity", complexity.as_str()));
    w.write_event(Event::Start(e))?;

    w.write_event(Event::Start(BytesStart::new("classes")))?;
    for class in &package.classes {
        write_class(w, class)?;
    }
    w.write_event(Event::End(BytesEnd::new("classes")))?;

    w.write_event(Event::End(BytesEnd::new("package")))?;
    Ok(())
}

fn write_class<W: Write>(w: &mut Writer<W>, class: &Class) -> Result<()> {
    let line_rate = class.line_rate.to_string();
    let branch_rate = class.branch_rate.to_string();
    let complexity = class.complexity.to_string();

    let mut e = BytesStart::new("class");
    e.push_attribute(("name", class.name.as_str()));
    e.push_attribute(("filename", class.filename.as_str()));
    e.push_attribute(("line-rate", line_rate.as_str()));
    e.push_attribute(("branch-rate", branch_rate.as_str()));
    e.push_attribute(("complexity", complexity.as_str()));
    w.write_event(Event::Start(e))?;

    w.write_event(Event::Start(BytesStart::new("methods")))?;
    for method in &class.methods {
        write_method(w, method)?;
    }
    w.write_event(Event::End(BytesEnd::new("methods")))?;

    write_lines(w, &class.lines)?;

    w.write_event(Event::End(BytesEnd::new("class")))?;
    Ok(())
}

fn write_method<W: Write>(w: &mut Writer<W>, method: &Method) -> Result<()> {
    let line_rate = method.line_rate.to_string();
    let branch_rate = method.branch_rate.to_string();

    let mut e = BytesStart::new("method");
    e.push_attribute(("name", method.name.as_str()));
    e.push_attribute(("signature", method.signature.as_str()));
    e.push_attribute(("line-rate", line_rate.as_str()));
    e.push_attribute(("branch-rate", branch_rate.as_str()));
    w.write_event(Event::Start(e))?;

    write_lines(w, &method.lines)?;

    w.write_event(Event::End(BytesEnd::new("method")))?;
    Ok(())
}

fn write_lines<W: Write>(w: &mut Writer<W>, lines: &[Line]) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new("lines")))?;
    for line in lines {
        write_line(w, line)?;
    }
    w.write_event(Event::End(BytesEnd::new("lines")))?;
    Ok(())
}

fn write_line<W: Write>(w: &mut Writer<W>, line: &Line) -> Result<()> {
    let number = line.number.to_string();
    let hits = line.hits.to_string();

    let mut e = BytesStart::new("line");
    e.push_attribute(("number", number.as_str()));
    e.push_attribute(("hits", hits.as_str()));
    e.push_attribute(("branch", if line.branch { "true" } else { "false" }));
    if let Some(condition_coverage) = &line.condition_coverage {
        e.push_attribute(("condition-coverage", condition_coverage.as_str()));
    }

    if line.conditions.is_empty() {
        w.write_event(Event::Empty(e))?;
        return Ok(());
    }

    w.write_event(Event::Start(e))?;
    w.write_event(Event::Start(BytesStart::new("conditions")))?;
    for condition in &line.conditions {
        let number = condition.number.to_string();
        let mut ce = BytesStart::new("condition");
        ce.push_attribute(("number", number.as_str()));
        ce.push_attribute(("type", condition.kind.as_str()));
        ce.push_attribute(("coverage", condition.coverage.as_str()));
        w.write_event(Event::Empty(ce))?;
    }
    w.write_event(Event::End(BytesEnd::new("conditions")))?;
    w.write_event(Event::End(BytesEnd::new("line")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cobertura::Condition;

    fn empty_coverage() -> Coverage {
        Coverage {
            timestamp: 1700000000,
            line_rate: 0.8,
            branch_rate: 0.5,
            complexity: 3.0,
            lines_covered: 4,
            lines_valid: 5,
            branches_covered: 1,
            branches_valid: 2,
            sources: vec![".".to_string()],
            packages: Vec::new(),
        }
    }

    #[test]
    fn test_write_declaration_and_root() {
        let xml = to_xml_string(&empty_coverage()).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"line-rate="0.8""#));
        assert!(xml.contains(r#"branch-rate="0.5""#));
        assert!(xml.contains(r#"lines-covered="4""#));
        assert!(xml.contains(r#"lines-valid="5""#));
        assert!(xml.contains(r#"complexity="3""#));
        assert!(xml.contains(r#"version="1.0""#));
        assert!(xml.contains(r#"timestamp="1700000000""#));
        assert!(xml.contains("<sources>"));
        assert!(xml.contains("<source>.</source>"));
        assert!(xml.contains("<packages>"));
        assert!(xml.ends_with("</coverage>"));
    }

    #[test]
    fn test_write_branch_line_with_condition() {
        let mut coverage = empty_coverage();
        coverage.packages.push(Package {
            name: "com.example".to_string(),
            line_rate: 1.0,
            branch_rate: 0.5,
            complexity: 2.0,
            classes: vec![Class {
                name: "com.example.Foo".to_string(),
                filename: "com/example/Foo.java".to_string(),
                line_rate: 1.0,
                branch_rate: 0.5,
                complexity: 2.0,
                methods: vec![Method {
                    name: "doStuff".to_string(),
                    signature: "(I)I".to_string(),
                    line_rate: 1.0,
                    branch_rate: 0.5,
                    lines: vec![Line {
                        number: 11,
                        hits: 1,
                        branch: true,
                        condition_coverage: Some("50% (1/2)".to_string()),
                        conditions: vec![Condition {
                            number: 0,
                            kind: "jump".to_string(),
                            coverage: "50%".to_string(),
                        }],
                    }],
                }],
                lines: vec![Line {
                    number: 12,
                    hits: 0,
                    branch: false,
                    condition_coverage: None,
                    conditions: Vec::new(),
                }],
            }],
        });

        let xml = to_xml_string(&coverage).unwrap();
        assert!(xml.contains(r#"<package name="com.example""#));
        assert!(xml.contains(r#"<class name="com.example.Foo" filename="com/example/Foo.java""#));
        assert!(xml.contains(r#"<method name="doStuff" signature="(I)I""#));
        assert!(xml.contains(r#"condition-coverage="50% (1/2)""#));
        assert!(xml.contains(r#"<condition number="0" type="jump" coverage="50%"/>"#));
        // The branchless class line is self-closing, with no conditions block.
        assert!(xml.contains(r#"<line number="12" hits="0" branch="false"/>"#));
    }

    #[test]
    fn test_write_escapes_names() {
        let mut coverage = empty_coverage();
        coverage.packages.push(Package {
            name: "com.example".to_string(),
            line_rate: 0.0,
            branch_rate: 0.0,
            complexity: 0.0,
            classes: vec![Class {
                name: "com.example.Foo".to_string(),
                filename: "com/example/Foo.java".to_string(),
                line_rate: 0.0,
                branch_rate: 0.0,
                complexity: 0.0,
                methods: vec![Method {
                    name: "<init>".to_string(),
                    signature: "()V".to_string(),
                    line_rate: 0.0,
                    branch_rate: 0.0,
                    lines: Vec::new(),
                }],
                lines: Vec::new(),
            }],
        });

        let xml = to_xml_string(&coverage).unwrap();
        assert!(xml.contains(r#"name="&lt;init&gt;""#));
        assert!(!xml.contains(r#"name="<init>""#));
    }

    #[test]
    fn test_write_deterministic() {
        let coverage = empty_coverage();
        assert_eq!(
            to_xml_string(&coverage).unwrap(),
            to_xml_string(&coverage).unwrap()
        );
    }
}
