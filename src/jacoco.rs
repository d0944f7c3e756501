//! In-memory model of a JaCoCo XML report, plus the counter aggregation
//! helpers the Cobertura mapping is built on. Parsing lives in `parser`.
//!
//! JaCoCo attaches `<counter>` elements at every level of the tree (report,
//! package, class, method, source file). Each counter is a missed/covered
//! pair for one measurement kind; aggregation never walks children, it only
//! reads the counters of the entity at hand.

use chrono::DateTime;

/// Counter type tags JaCoCo emits. Unknown tags in a document are skipped
/// at load time; an absent kind aggregates to 0 anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    Instruction,
    Branch,
    Line,
    Complexity,
    Method,
    Class,
}

impl CounterKind {
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "INSTRUCTION" => Some(CounterKind::Instruction),
            "BRANCH" => Some(CounterKind::Branch),
            "LINE" => Some(CounterKind::Line),
            "COMPLEXITY" => Some(CounterKind::Complexity),
            "METHOD" => Some(CounterKind::Method),
            "CLASS" => Some(CounterKind::Class),
            _ => None,
        }
    }
}

/// A missed/covered pair for one measurement kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    pub kind: CounterKind,
    pub missed: u64,
    pub covered: u64,
}

/// Coverage ratio for the first counter of the given kind: `covered /
/// (covered + missed)`. Returns 0 when the kind is absent and treats `0/0`
/// as 0.
#[must_use]
pub fn rate(kind: CounterKind, counters: &[Counter]) -> f64 {
    counters
        .iter()
        .find(|c| c.kind == kind)
        .map(|c| fraction(c.covered, c.missed))
        .unwrap_or(0.0)
}

/// McCabe complexity total: the COMPLEXITY counter is a covered/missed pair
/// like the others, but combines by sum, not by ratio.
#[must_use]
pub fn complexity(counters: &[Counter]) -> f64 {
    counters
        .iter()
        .find(|c| c.kind == CounterKind::Complexity)
        .map(|c| (c.covered + c.missed) as f64)
        .unwrap_or(0.0)
}

/// Covered count for the given kind, 0 when absent.
#[must_use]
pub fn covered_count(kind: CounterKind, counters: &[Counter]) -> u64 {
    counters
        .iter()
        .find(|c| c.kind == kind)
        .map(|c| c.covered)
        .unwrap_or(0)
}

/// Valid (covered + missed) count for the given kind, 0 when absent.
#[must_use]
pub fn valid_count(kind: CounterKind, counters: &[Counter]) -> u64 {
    counters
        .iter()
        .find(|c| c.kind == kind)
        .map(|c| c.covered + c.missed)
        .unwrap_or(0)
}

fn fraction(covered: u64, missed: u64) -> f64 {
    let total = covered + missed;
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64
    }
}

/// One `<sessioninfo>` entry. The timestamps are raw millisecond strings as
/// found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: Option<String>,
    pub start: Option<String>,
    pub dump: Option<String>,
}

/// A single instrumentable line of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub nr: u32,
    /// Missed instructions.
    pub mi: u64,
    /// Covered instructions.
    pub ci: u64,
    /// Missed branches.
    pub mb: u32,
    /// Covered branches.
    pub cb: u32,
}

/// Per-line coverage for one source file of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub lines: Vec<Line>,
    pub counters: Vec<Counter>,
}

/// A method of a class. JaCoCo records only the declaration line, never an
/// end line; the transform infers each method's line range from the other
/// declarations in the class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodElement {
    pub name: String,
    /// JVM descriptor, e.g. `(I)V`.
    pub desc: String,
    pub line: Option<u32>,
    pub counters: Vec<Counter>,
}

/// A class of a package. The name is slash-separated and may carry nested
/// class segments (`com/example/Foo$Inner`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassElement {
    pub name: String,
    pub sourcefilename: Option<String>,
    pub methods: Vec<MethodElement>,
    pub counters: Vec<Counter>,
}

/// A package: classes plus the per-line data of its source files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Slash-separated; group-qualified when the report nests packages in
    /// `<group>` wrappers (the parser flattens those).
    pub name: String,
    pub classes: Vec<ClassElement>,
    pub sourcefiles: Vec<SourceFile>,
    pub counters: Vec<Counter>,
}

/// The parsed report. Groups from the document are already flattened into
/// the package list, so nothing downstream deals with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub name: String,
    pub session_infos: Vec<SessionInfo>,
    pub counters: Vec<Counter>,
    pub packages: Vec<Package>,
}

impl Report {
    /// Report timestamp in seconds: the first session's `start` value is
    /// string milliseconds. 0 when absent or unparseable.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.session_infos
            .first()
            .and_then(|s| s.start.as_deref())
            .and_then(|s| s.parse::<i64>().ok())
            .map(|ms| ms / 1000)
            .unwrap_or(0)
    }

    /// Distinct package names in document order.
    #[must_use]
    pub fn package_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for p in &self.packages {
            if !names.contains(&p.name) {
                names.push(p.name.clone());
            }
        }
        names
    }

    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            name: self.name.clone(),
            sessions: self.session_infos.iter().map(SessionSummary::new).collect(),
            packages: self.packages.len(),
            classes: self.packages.iter().map(|p| p.classes.len()).sum(),
            methods: self
                .packages
                .iter()
                .flat_map(|p| &p.classes)
                .map(|c| c.methods.len())
                .sum(),
            source_files: self.packages.iter().map(|p| p.sourcefiles.len()).sum(),
            line_rate: rate(CounterKind::Line, &self.counters),
            branch_rate: rate(CounterKind::Branch, &self.counters),
            complexity: complexity(&self.counters),
            lines_covered: covered_count(CounterKind::Line, &self.counters),
            lines_valid: valid_count(CounterKind::Line, &self.counters),
            branches_covered: covered_count(CounterKind::Branch, &self.counters),
            branches_valid: valid_count(CounterKind::Branch, &self.counters),
        }
    }
}

/// Summary stats for one report, as shown by `inspect`.
#[derive(Debug, serde::Serialize)]
pub struct ReportSummary {
    pub name: String,
    pub sessions: Vec<SessionSummary>,
    pub packages: usize,
    pub classes: usize,
    pub methods: usize,
    pub source_files: usize,
    pub line_rate: f64,
    pub branch_rate: f64,
    pub complexity: f64,
    pub lines_covered: u64,
    pub lines_valid: u64,
    pub branches_covered: u64,
    pub branches_valid: u64,
}

/// One session with its timestamps rendered as RFC 3339, when parseable.
#[derive(Debug, serde::Serialize)]
pub struct SessionSummary {
    pub id: Option<String>,
    pub start: Option<String>,
    pub dump: Option<String>,
}

impl SessionSummary {
    fn new(session: &SessionInfo) -> Self {
        Self {
            id: session.id.clone(),
            start: session.start.as_deref().and_then(format_millis),
            dump: session.dump.as_deref().and_then(format_millis),
        }
    }
}

fn format_millis(raw: &str) -> Option<String> {
    let millis = raw.parse::<i64>().ok()?;
    DateTime::from_timestamp_millis(millis).map(|dt| dt.to_rfc3339())
}
