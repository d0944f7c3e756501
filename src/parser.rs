//! Streaming parser for JaCoCo XML reports.
//!
//! JaCoCo XML structure:
//!   <report name="...">
//!     <sessioninfo id="..." start="..." dump="..."/>
//!     <package name="com/example">
//!       <class name="com/example/Foo" sourcefilename="Foo.java">
//!         <method name="doStuff" desc="(I)I" line="10">
//!           <counter type="LINE" missed="0" covered="3"/>
//!         </method>
//!         <counter type="LINE" missed="1" covered="5"/>
//!       </class>
//!       <sourcefile name="Foo.java">
//!         <line nr="10" mi="0" ci="3" mb="0" cb="2"/>
//!         <counter type="LINE" missed="1" covered="5"/>
//!       </sourcefile>
//!     </package>
//!   </report>
//!
//! Aggregated reports wrap packages in one or more `<group>` levels; the
//! parser flattens those by prefixing the group name path onto each
//! contained package's name, so the in-memory tree is always a flat package
//! list.
//!
//! Fields the data model requires (report/package/class/sourcefile names,
//! method name and descriptor, line numbers) are enforced here: a document
//! missing them is rejected at load instead of turning into fabricated
//! coverage data downstream.

use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{J2covError, Result};
use crate::jacoco::{
    ClassElement, Counter, CounterKind, Line, MethodElement, Package, Report, SessionInfo,
    SourceFile,
};

/// Parse a JaCoCo XML document into a [`Report`].
pub fn parse(input: &[u8]) -> Result<Report> {
    let mut xml = Reader::from_reader(input);
    xml.trim_text(true);
    let mut buf = Vec::new();

    let mut report: Option<Report> = None;
    let mut group_stack: Vec<String> = Vec::new();
    let mut current_package: Option<Package> = None;
    let mut current_class: Option<ClassElement> = None;
    let mut current_method: Option<MethodElement> = None;
    let mut current_sourcefile: Option<SourceFile> = None;

    loop {
        let event = xml.read_event_into(&mut buf);
        let is_start_event = matches!(&event, Ok(Event::Start(_)));
        match event {
            Err(e) => {
                return Err(J2covError::Xml {
                    source: e,
                    position: xml.buffer_position(),
                })
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"report" => {
                    report = Some(Report {
                        name: require_attr(e, b"name", "report")?,
                        session_infos: Vec::new(),
                        counters: Vec::new(),
                        packages: Vec::new(),
                    });
                }
                b"sessioninfo" => {
                    if let Some(r) = report.as_mut() {
                        r.session_infos.push(SessionInfo {
                            id: get_attr(e, b"id"),
                            start: get_attr(e, b"start"),
                            dump: get_attr(e, b"dump"),
                        });
                    }
                }
                b"group" if is_start_event => {
                    group_stack.push(require_attr(e, b"name", "group")?);
                }
                b"package" => {
                    let name = require_attr(e, b"name", "package")?;
                    let name = if group_stack.is_empty() {
                        name
                    } else {
                        format!("{}/{}", group_stack.join("/"), name)
                    };
                    let package = Package {
                        name,
                        classes: Vec::new(),
                        sourcefiles: Vec::new(),
                        counters: Vec::new(),
                    };
                    if is_start_event {
                        current_package = Some(package);
                    } else if let Some(r) = report.as_mut() {
                        r.packages.push(package);
                    }
                }
                b"class" => {
                    let class = ClassElement {
                        name: require_attr(e, b"name", "class")?,
                        sourcefilename: get_attr(e, b"sourcefilename"),
                        methods: Vec::new(),
                        counters: Vec::new(),
                    };
                    if is_start_event {
                        current_class = Some(class);
                    } else if let Some(p) = current_package.as_mut() {
                        p.classes.push(class);
                    }
                }
                b"method" => {
                    let method = MethodElement {
                        name: require_attr(e, b"name", "method")?,
                        desc: require_attr(e, b"desc", "method")?,
                        line: opt_num_attr(e, b"line", "method")?,
                        counters: Vec::new(),
                    };
                    if is_start_event {
                        current_method = Some(method);
                    } else if let Some(c) = current_class.as_mut() {
                        c.methods.push(method);
                    }
                }
                b"sourcefile" => {
                    let sourcefile = SourceFile {
                        name: require_attr(e, b"name", "sourcefile")?,
                        lines: Vec::new(),
                        counters: Vec::new(),
                    };
                    if is_start_event {
                        current_sourcefile = Some(sourcefile);
                    } else if let Some(p) = current_package.as_mut() {
                        p.sourcefiles.push(sourcefile);
                    }
                }
                b"line" => {
                    if let Some(sf) = current_sourcefile.as_mut() {
                        sf.lines.push(Line {
                            nr: req_num_attr(e, b"nr", "line")?,
                            mi: num_attr(e, b"mi", "line")?,
                            ci: num_attr(e, b"ci", "line")?,
                            mb: num_attr(e, b"mb", "line")?,
                            cb: num_attr(e, b"cb", "line")?,
                        });
                    }
                }
                b"counter" => {
                    // Attach to the innermost open entity. Counters inside a
                    // <group> wrapper describe the group itself and have no
                    // Cobertura counterpart; they are dropped.
                    if let Some(counter) = parse_counter(e)? {
                        if let Some(m) = current_method.as_mut() {
                            m.counters.push(counter);
                        } else if let Some(c) = current_class.as_mut() {
                            c.counters.push(counter);
                        } else if let Some(sf) = current_sourcefile.as_mut() {
                            sf.counters.push(counter);
                        } else if let Some(p) = current_package.as_mut() {
                            p.counters.push(counter);
                        } else if group_stack.is_empty() {
                            if let Some(r) = report.as_mut() {
                                r.counters.push(counter);
                            }
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"group" => {
                    group_stack.pop();
                }
                b"package" => {
                    if let (Some(package), Some(r)) = (current_package.take(), report.as_mut()) {
                        r.packages.push(package);
                    }
                }
                b"class" => {
                    if let (Some(class), Some(p)) = (current_class.take(), current_package.as_mut())
                    {
                        p.classes.push(class);
                    }
                }
                b"method" => {
                    if let (Some(method), Some(c)) = (current_method.take(), current_class.as_mut())
                    {
                        c.methods.push(method);
                    }
                }
                b"sourcefile" => {
                    if let (Some(sourcefile), Some(p)) =
                        (current_sourcefile.take(), current_package.as_mut())
                    {
                        p.sourcefiles.push(sourcefile);
                    }
                }
                _ => {}
            },
            _ => {}
        }
        buf.clear();
    }

    report.ok_or_else(|| {
        J2covError::Malformed("not a JaCoCo report: missing <report> root element".to_string())
    })
}

/// Parse one `<counter>` element. Counters with an unknown type tag are
/// skipped (they can never be looked up); missing missed/covered attributes
/// default to 0, non-numeric ones are load errors.
fn parse_counter(e: &BytesStart) -> Result<Option<Counter>> {
    let kind = match CounterKind::from_attr(&require_attr(e, b"type", "counter")?) {
        Some(kind) => kind,
        None => return Ok(None),
    };
    Ok(Some(Counter {
        kind,
        missed: num_attr(e, b"missed", "counter")?,
        covered: num_attr(e, b"covered", "counter")?,
    }))
}

/// Extract an attribute value from an XML element.
fn get_attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.to_string())
}

fn require_attr(e: &BytesStart, name: &[u8], element: &str) -> Result<String> {
    get_attr(e, name).ok_or_else(|| {
        J2covError::Malformed(format!(
            "<{element}> element missing '{}' attribute",
            String::from_utf8_lossy(name)
        ))
    })
}

/// Numeric attribute defaulting to 0 when absent.
fn num_attr<T: FromStr + Default>(e: &BytesStart, name: &[u8], element: &str) -> Result<T> {
    match get_attr(e, name) {
        None => Ok(T::default()),
        Some(value) => parse_num(&value, name, element),
    }
}

/// Numeric attribute that must be present.
fn req_num_attr<T: FromStr>(e: &BytesStart, name: &[u8], element: &str) -> Result<T> {
    parse_num(&require_attr(e, name, element)?, name, element)
}

/// Numeric attribute that may be absent, but must parse when present.
fn opt_num_attr<T: FromStr>(e: &BytesStart, name: &[u8], element: &str) -> Result<Option<T>> {
    match get_attr(e, name) {
        None => Ok(None),
        Some(value) => parse_num(&value, name, element).map(Some),
    }
}

fn parse_num<T: FromStr>(value: &str, name: &[u8], element: &str) -> Result<T> {
    value.parse().map_err(|_| {
        J2covError::Malformed(format!(
            "<{element}> attribute '{}' is not a number: '{value}'",
            String::from_utf8_lossy(name)
        ))
    })
}
