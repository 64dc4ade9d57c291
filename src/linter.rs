//! Model linting - static analysis of people annotations in model files.
//!
//! Checks model files for:
//! - Unreadable files
//! - XML syntax errors
//! - Empty annotation items
//! - Annotations that are silently changed when read (ignored `selectable`,
//!   discarded `details`, merged tags, duplicate title fields)
//! - References to fields the schema does not declare

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use xmltree::Element;

use crate::codec::{children, text};
use crate::error::LoadError;
use crate::loader::{load_model, schema_from_node, schema_nodes};
use crate::schema::Schema;
use crate::types::{tags, XmlNamespace, DEFAULT_POSITION};

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic message from linting.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub file: PathBuf,
    /// Element path to the issue (e.g., "/member/columns[0]/column[1]")
    pub path: String,
    pub message: String,
}

/// Result of linting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Status of a linted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
    Warning,
}

/// Result of linting a directory or set of files.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    /// Returns true if all files passed (no errors).
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

/// Lint a file or directory.
///
/// If path is a directory, recursively finds all .xml files.
/// If `strict` is true, warnings are treated as errors.
pub fn lint(path: &Path, strict: bool) -> LintResult {
    let files = collect_model_files(path);
    let mut results = Vec::new();
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &files {
        let file_result = lint_file(file, path);
        total_errors += file_result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        total_warnings += file_result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        results.push(file_result);
    }

    let failed = results
        .iter()
        .filter(|r| {
            if strict {
                r.status != FileStatus::Ok
            } else {
                r.status == FileStatus::Error
            }
        })
        .count();

    tracing::debug!(files = files.len(), failed, "lint finished");

    LintResult {
        path: path.to_path_buf(),
        files_checked: files.len(),
        passed: files.len() - failed,
        failed,
        errors: total_errors,
        warnings: total_warnings,
        results,
    }
}

/// Lint a single model file.
pub fn lint_file(file: &Path, base_path: &Path) -> FileResult {
    let display = file.strip_prefix(base_path).unwrap_or(file).to_path_buf();
    let mut checker = Checker {
        file,
        ns: XmlNamespace::people(),
        diagnostics: Vec::new(),
    };

    let model = match load_model(file) {
        Ok(model) => model,
        Err(e) => {
            let (code, message) = match e {
                LoadError::InvalidXml { .. } => ("E001", format!("syntax error: {}", e)),
                _ => ("E003", format!("cannot read file: {}", e)),
            };
            checker.push(Severity::Error, code, "/", message);
            return FileResult {
                file: display,
                status: FileStatus::Error,
                diagnostics: checker.diagnostics,
            };
        }
    };

    for (index, node) in schema_nodes(&model).into_iter().enumerate() {
        checker.check_schema(node, index);
    }

    let diagnostics = checker.diagnostics;
    let status = if diagnostics.iter().any(|d| d.severity == Severity::Error) {
        FileStatus::Error
    } else if diagnostics.iter().any(|d| d.severity == Severity::Warning) {
        FileStatus::Warning
    } else {
        FileStatus::Ok
    };

    FileResult {
        file: display,
        status,
        diagnostics,
    }
}

struct Checker<'a> {
    file: &'a Path,
    ns: XmlNamespace,
    diagnostics: Vec<Diagnostic>,
}

impl Checker<'_> {
    fn push(&mut self, severity: Severity, code: &str, path: &str, message: String) {
        self.diagnostics.push(Diagnostic {
            severity,
            code: code.to_string(),
            file: self.file.to_path_buf(),
            path: path.to_string(),
            message,
        });
    }

    fn check_schema(&mut self, node: &Element, index: usize) {
        let ns = self.ns.clone();
        let schema = schema_from_node(node);
        let root = if schema.name.is_empty() {
            format!("/{}", index)
        } else {
            format!("/{}", schema.name)
        };

        for tag in [tags::TITLE, tags::ORDER, tags::COLUMNS] {
            let count = children(node, &ns, tag).count();
            if count > 1 {
                self.push(
                    Severity::Warning,
                    "W004",
                    &format!("{}/{}", root, tag),
                    format!("{} {} tags are merged into one when written", count, tag),
                );
            }
        }

        let mut title_seen = HashSet::new();
        for (i, tag) in children(node, &ns, tags::TITLE).enumerate() {
            let path = format!("{}/{}[{}]", root, tags::TITLE, i);
            for value in self.check_items(tag, &path, &schema) {
                if !title_seen.insert(value.clone()) {
                    self.push(
                        Severity::Warning,
                        "W005",
                        &path,
                        format!("duplicate title field \"{}\" is dropped", value),
                    );
                }
            }
        }

        for (i, tag) in children(node, &ns, tags::ORDER).enumerate() {
            let path = format!("{}/{}[{}]", root, tags::ORDER, i);
            self.check_items(tag, &path, &schema);
        }

        let mut positions = HashSet::new();
        for (i, tag) in children(node, &ns, tags::DETAILS).enumerate() {
            let path = format!("{}/{}[{}]", root, tags::DETAILS, i);
            let position = tag
                .attributes
                .get(tags::POSITION)
                .filter(|p| !p.is_empty())
                .cloned()
                .unwrap_or_else(|| DEFAULT_POSITION.to_string());
            if !positions.insert(position.clone()) {
                self.push(
                    Severity::Warning,
                    "W003",
                    &path,
                    format!(
                        "details position \"{}\" repeated: earlier fields are discarded",
                        position
                    ),
                );
            }
            self.check_items(tag, &path, &schema);
        }

        for (i, tag) in children(node, &ns, tags::COLUMNS).enumerate() {
            for (j, column) in children(tag, &ns, tags::COLUMN).enumerate() {
                let path = format!("{}/{}[{}]/{}[{}]", root, tags::COLUMNS, i, tags::COLUMN, j);
                let items = self.check_items(column, &path, &schema);
                let marked = column
                    .attributes
                    .get(tags::SELECTABLE)
                    .is_some_and(|v| !v.is_empty());
                if marked && items.len() != 1 {
                    self.push(
                        Severity::Warning,
                        "W002",
                        &path,
                        format!(
                            "selectable is ignored on a column with {} fields",
                            items.len()
                        ),
                    );
                }
            }
        }
    }

    /// Checks the items of one tag and returns their values.
    fn check_items(&mut self, tag: &Element, path: &str, schema: &Schema) -> Vec<String> {
        let values: Vec<String> = children(tag, &self.ns, tags::ITEM).map(text).collect();

        for (i, value) in values.iter().enumerate() {
            if value.is_empty() {
                self.push(
                    Severity::Error,
                    "E002",
                    &format!("{}/{}[{}]", path, tags::ITEM, i),
                    "empty item".to_string(),
                );
            } else if !schema.fields.is_empty() && !schema.has_field(value) {
                self.push(
                    Severity::Warning,
                    "W001",
                    &format!("{}/{}[{}]", path, tags::ITEM, i),
                    format!("unknown field \"{}\"", value),
                );
            }
        }
        values
    }
}

/// Collect all .xml files in a path (file or directory).
fn collect_model_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        if is_xml(path) {
            return vec![path.to_path_buf()];
        }
        return vec![];
    }

    let mut files = Vec::new();
    collect_files_recursive(path, &mut files);
    files.sort();
    files
}

fn is_xml(path: &Path) -> bool {
    path.extension().map(|e| e == "xml").unwrap_or(false)
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, files);
        } else if is_xml(&path) {
            files.push(path);
        }
    }
}
