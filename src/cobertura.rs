//! In-memory model of a Cobertura coverage report.
//!
//! Plain data, built fresh per conversion: every mapping rule lives in
//! `transform` and serialization in `writer`. All types derive `PartialEq`
//! so structural equality of two conversions is directly assertable.

/// Schema version emitted on the `<coverage>` root element.
pub const VERSION: &str = "1.0";

/// The `<coverage>` root.
#[derive(Debug, Clone, PartialEq)]
pub struct Coverage {
    /// Seconds, derived from the JaCoCo session start.
    pub timestamp: i64,
    pub line_rate: f64,
    pub branch_rate: f64,
    pub complexity: f64,
    pub lines_covered: u64,
    pub lines_valid: u64,
    pub branches_covered: u64,
    pub branches_valid: u64,
    /// Source roots the per-class `filename` paths are relative to.
    pub sources: Vec<String>,
    pub packages: Vec<Package>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    /// Dot-separated.
    pub name: String,
    pub line_rate: f64,
    pub branch_rate: f64,
    pub complexity: f64,
    pub classes: Vec<Class>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    /// Dot-separated, nested segments included.
    pub name: String,
    /// Source-relative file path, `<package-path>/<file-name>`.
    pub filename: String,
    pub line_rate: f64,
    pub branch_rate: f64,
    pub complexity: f64,
    pub methods: Vec<Method>,
    /// All method lines, flattened in method order.
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    /// JVM descriptor carried over from JaCoCo.
    pub signature: String,
    pub line_rate: f64,
    pub branch_rate: f64,
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub number: u32,
    /// 0 or 1: a line counts as hit when any instruction on it executed.
    pub hits: u32,
    pub branch: bool,
    /// `"<p>% (<covered>/<total>)"`, only on branch lines.
    pub condition_coverage: Option<String>,
    /// At most one synthetic `jump` condition; empty on branchless lines.
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub number: u32,
    /// Serialized as the `type` attribute.
    pub kind: String,
    /// Percentage string, e.g. `"60%"`.
    pub coverage: String,
}
