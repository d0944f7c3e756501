//! Mapping from the JaCoCo tree to the Cobertura tree.
//!
//! The two schemas disagree on granularity: JaCoCo records per-line hit data
//! per source file and gives each method only its declaration line, while
//! Cobertura wants every method to carry its own line list. The gap is
//! bridged here by `lines_for_method`, which attributes to a method the
//! block of source lines from its own declaration up to (but excluding) the
//! next method declaration in the same class.
//!
//! The whole mapping is a pure function of (report, source roots, root
//! package); nothing is shared between conversions.

use crate::cobertura::{Class, Condition, Coverage, Line, Method, Package};
use crate::jacoco::{self, CounterKind};

/// Build one Cobertura report covering all packages of the JaCoCo report.
///
/// `sources` is the resolved source-root list; when empty, a single default
/// root `"."` is emitted. `root_package` optionally names a package prefix
/// (dot or slash form) to strip from class file paths.
#[must_use]
pub fn transform(
    report: &jacoco::Report,
    sources: &[String],
    root_package: Option<&str>,
) -> Coverage {
    build_coverage(
        report.timestamp(),
        &report.counters,
        sources,
        report
            .packages
            .iter()
            .map(|p| map_package(p, root_package))
            .collect(),
    )
}

/// Split mode: one independent Cobertura report per package, keyed by the
/// dotted package name. Root attributes come from the package's own
/// counters so each output is a self-consistent document; the timestamp and
/// source list are carried over from the report.
#[must_use]
pub fn transform_split(
    report: &jacoco::Report,
    sources: &[String],
    root_package: Option<&str>,
) -> Vec<(String, Coverage)> {
    report
        .packages
        .iter()
        .map(|p| {
            (
                p.name.replace('/', "."),
                build_coverage(
                    report.timestamp(),
                    &p.counters,
                    sources,
                    vec![map_package(p, root_package)],
                ),
            )
        })
        .collect()
}

fn build_coverage(
    timestamp: i64,
    counters: &[jacoco::Counter],
    sources: &[String],
    packages: Vec<Package>,
) -> Coverage {
    Coverage {
        timestamp,
        line_rate: jacoco::rate(CounterKind::Line, counters),
        branch_rate: jacoco::rate(CounterKind::Branch, counters),
        complexity: jacoco::complexity(counters),
        lines_covered: jacoco::covered_count(CounterKind::Line, counters),
        lines_valid: jacoco::valid_count(CounterKind::Line, counters),
        branches_covered: jacoco::covered_count(CounterKind::Branch, counters),
        branches_valid: jacoco::valid_count(CounterKind::Branch, counters),
        sources: if sources.is_empty() {
            vec![".".to_string()]
        } else {
            sources.to_vec()
        },
        packages,
    }
}

fn map_package(p: &jacoco::Package, root_package: Option<&str>) -> Package {
    Package {
        name: p.name.replace('/', "."),
        line_rate: jacoco::rate(CounterKind::Line, &p.counters),
        branch_rate: jacoco::rate(CounterKind::Branch, &p.counters),
        complexity: jacoco::complexity(&p.counters),
        classes: p
            .classes
            .iter()
            .map(|c| map_class(c, p, root_package))
            .collect(),
    }
}

fn map_class(c: &jacoco::ClassElement, pkg: &jacoco::Package, root_package: Option<&str>) -> Class {
    let methods: Vec<Method> = c.methods.iter().map(|m| map_method(m, c, pkg)).collect();
    let lines = methods.iter().flat_map(|m| m.lines.clone()).collect();
    Class {
        name: c.name.replace('/', "."),
        filename: format!(
            "{}{}",
            clean_package_path(&pkg.name, root_package),
            resolve_source_name(c, pkg)
        ),
        line_rate: jacoco::rate(CounterKind::Line, &c.counters),
        branch_rate: jacoco::rate(CounterKind::Branch, &c.counters),
        complexity: jacoco::complexity(&c.counters),
        methods,
        lines,
    }
}

fn map_method(
    m: &jacoco::MethodElement,
    class: &jacoco::ClassElement,
    pkg: &jacoco::Package,
) -> Method {
    Method {
        name: m.name.clone(),
        signature: m.desc.clone(),
        line_rate: jacoco::rate(CounterKind::Line, &m.counters),
        branch_rate: jacoco::rate(CounterKind::Branch, &m.counters),
        lines: lines_for_method(m, class, pkg)
            .into_iter()
            .map(map_line)
            .collect(),
    }
}

/// Attribute source lines to a method.
///
/// JaCoCo only records where a method starts, so the range is inferred: all
/// lines of the class's source file from the method's declaration line up
/// to (but excluding) the smallest strictly-greater declaration line among
/// the other methods of the class. A method without a declaration line, or
/// a class whose source file cannot be identified, gets no lines. Two
/// methods declared on the same line produce overlapping ranges; the tie
/// is not resolved.
fn lines_for_method<'a>(
    m: &jacoco::MethodElement,
    class: &jacoco::ClassElement,
    pkg: &'a jacoco::Package,
) -> Vec<&'a jacoco::Line> {
    let Some(start) = m.line else {
        return Vec::new();
    };
    let source = class.sourcefilename.as_deref();
    let base = class_base_name(&class.name);
    if source.is_none() && base.is_empty() {
        return Vec::new();
    }

    let next_method_line = class
        .methods
        .iter()
        .filter_map(|other| other.line)
        .filter(|&line| line > start)
        .min()
        .unwrap_or(u32::MAX);

    pkg.sourcefiles
        .iter()
        .filter(|sf| {
            Some(sf.name.as_str()) == source || (!base.is_empty() && file_stem(&sf.name) == base)
        })
        .flat_map(|sf| sf.lines.iter())
        .filter(|line| line.nr >= start && line.nr < next_method_line)
        .collect()
}

/// Reshape one source line into its Cobertura form: hit flag from covered
/// instructions, branch data collapsed to a percentage string plus a single
/// synthetic `jump` condition.
fn map_line(l: &jacoco::Line) -> Line {
    let mut line = Line {
        number: l.nr,
        hits: u32::from(l.ci > 0),
        branch: false,
        condition_coverage: None,
        conditions: Vec::new(),
    };
    let total = l.mb + l.cb;
    if total > 0 {
        let percentage = 100 * u64::from(l.cb) / u64::from(total);
        line.branch = true;
        line.condition_coverage = Some(format!("{percentage}% ({}/{total})", l.cb));
        line.conditions.push(Condition {
            number: 0,
            kind: "jump".to_string(),
            coverage: format!("{percentage}%"),
        });
    }
    line
}

/// Package path prefix for a class filename: slash form, with the configured
/// root package (if any) stripped off the front. A root package that is not
/// actually a prefix strips nothing. Non-empty results carry a trailing `/`.
fn clean_package_path(package: &str, root_package: Option<&str>) -> String {
    let pkg = package.replace('.', "/");
    let to_remove = root_package.unwrap_or("").replace('.', "/");
    let stripped = pkg.strip_prefix(&to_remove).unwrap_or(&pkg);
    let path = stripped.strip_prefix('.').unwrap_or(stripped);
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() {
        String::new()
    } else {
        format!("{path}/")
    }
}

/// File name for a class: the explicit `sourcefilename` when present,
/// otherwise the class base name matched against the package's source files
/// by `"<base>."` prefix (the extension is unknown, e.g. `.java` vs `.kt`),
/// falling back to the bare base name.
fn resolve_source_name(c: &jacoco::ClassElement, pkg: &jacoco::Package) -> String {
    if let Some(name) = &c.sourcefilename {
        return name.clone();
    }
    let base = class_base_name(&c.name);
    if base.is_empty() {
        return String::new();
    }
    let prefix = format!("{base}.");
    pkg.sourcefiles
        .iter()
        .map(|sf| sf.name.as_str())
        .find(|name| name.starts_with(&prefix))
        .unwrap_or(base)
        .to_string()
}

/// Final path segment of a class name, truncated at the first nested-class
/// separator: `com/example/Foo$Inner` → `Foo`.
fn class_base_name(name: &str) -> &str {
    let last = name.rsplit('/').next().unwrap_or(name);
    last.split('$').next().unwrap_or(last)
}

fn file_stem(name: &str) -> &str {
    name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
}
