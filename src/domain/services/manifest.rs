//! Parsing of requirements-style dependency manifests.
//!
//! Every line is blank, a `#` comment, or a requirement of the form
//! `name[extras]<op><version>[, <op><version>...]` with an optional trailing
//! comment. Comment lines act as section headers for the requirements that
//! follow them.

use std::fmt;

use serde::Serialize;

use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VersionOperator {
    #[serde(rename = "===")]
    Arbitrary,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "~=")]
    Compatible,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
}

impl VersionOperator {
    /// Longest operators first so `>=` is not read as `>`.
    const ALL: [VersionOperator; 8] = [
        VersionOperator::Arbitrary,
        VersionOperator::GreaterOrEqual,
        VersionOperator::LessOrEqual,
        VersionOperator::Equal,
        VersionOperator::NotEqual,
        VersionOperator::Compatible,
        VersionOperator::Greater,
        VersionOperator::Less,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VersionOperator::Arbitrary => "===",
            VersionOperator::GreaterOrEqual => ">=",
            VersionOperator::LessOrEqual => "<=",
            VersionOperator::Equal => "==",
            VersionOperator::NotEqual => "!=",
            VersionOperator::Compatible => "~=",
            VersionOperator::Greater => ">",
            VersionOperator::Less => "<",
        }
    }

    fn strip_from(text: &str) -> Option<(VersionOperator, &str)> {
        Self::ALL
            .iter()
            .find_map(|op| text.strip_prefix(op.as_str()).map(|rest| (*op, rest)))
    }
}

impl fmt::Display for VersionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionConstraint {
    pub operator: VersionOperator,
    pub version: String,
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub name: String,
    pub extras: Vec<String>,
    pub constraints: Vec<VersionConstraint>,
    pub section: Option<String>,
    pub line_number: usize,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        let constraints: Vec<String> = self.constraints.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", constraints.join(", "))
    }
}

/// A line that is neither blank, a comment, nor a valid requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestIssue {
    pub line_number: usize,
    pub line: String,
    pub reason: String,
}

impl fmt::Display for ManifestIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({})", self.line_number, self.reason, self.line)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Manifest {
    pub requirements: Vec<Requirement>,
    pub issues: Vec<ManifestIssue>,
}

impl Manifest {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Requirements grouped by section, in order of first appearance.
    pub fn sections(&self) -> Vec<(Option<&str>, Vec<&Requirement>)> {
        let mut sections: Vec<(Option<&str>, Vec<&Requirement>)> = Vec::new();
        for requirement in &self.requirements {
            let section = requirement.section.as_deref();
            match sections.iter_mut().find(|(name, _)| *name == section) {
                Some((_, items)) => items.push(requirement),
                None => sections.push((section, vec![requirement])),
            }
        }
        sections
    }

    pub fn find(&self, name: &str) -> Option<&Requirement> {
        let wanted = normalize_name(name);
        self.requirements
            .iter()
            .find(|r| normalize_name(&r.name) == wanted)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.issues.is_empty() {
            return Ok(());
        }
        let details: Vec<String> = self.issues.iter().map(|i| i.to_string()).collect();
        Err(DomainError::invalid_input(format!(
            "manifest has {} invalid line(s): {}",
            self.issues.len(),
            details.join("; ")
        )))
    }
}

pub fn parse_manifest(text: &str) -> Manifest {
    let mut manifest = Manifest::default();
    let mut section: Option<String> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            let header = comment.trim();
            if !header.is_empty() {
                section = Some(header.to_string());
            }
            continue;
        }

        match parse_requirement(line) {
            Ok((name, extras, constraints)) => manifest.requirements.push(Requirement {
                name,
                extras,
                constraints,
                section: section.clone(),
                line_number,
            }),
            Err(reason) => manifest.issues.push(ManifestIssue {
                line_number,
                line: raw.to_string(),
                reason,
            }),
        }
    }

    manifest
}

type ParsedRequirement = (String, Vec<String>, Vec<VersionConstraint>);

fn parse_requirement(line: &str) -> Result<ParsedRequirement, String> {
    let requirement = line.split('#').next().unwrap_or_default().trim();

    let name_end = requirement
        .find(|c: char| !is_name_char(c))
        .unwrap_or(requirement.len());
    let name = &requirement[..name_end];
    validate_name(name)?;

    let mut rest = requirement[name_end..].trim_start();
    let mut extras = Vec::new();
    if let Some(after_bracket) = rest.strip_prefix('[') {
        let close = after_bracket
            .find(']')
            .ok_or_else(|| "unclosed extras bracket".to_string())?;
        for extra in after_bracket[..close].split(',') {
            let extra = extra.trim();
            validate_name(extra).map_err(|e| format!("invalid extra: {}", e))?;
            extras.push(extra.to_string());
        }
        rest = after_bracket[close + 1..].trim_start();
    }

    if rest.is_empty() {
        return Err("missing version constraint".to_string());
    }

    let constraints = rest
        .split(',')
        .map(parse_constraint)
        .collect::<Result<Vec<_>, _>>()?;

    Ok((name.to_string(), extras, constraints))
}

fn parse_constraint(text: &str) -> Result<VersionConstraint, String> {
    let text = text.trim();
    let (operator, version) = VersionOperator::strip_from(text)
        .ok_or_else(|| format!("expected a version operator in '{}'", text))?;
    let version = version.trim();

    if version.is_empty() {
        return Err(format!("missing version after '{}'", operator));
    }
    if let Some(bad) = version.chars().find(|c| !is_version_char(*c)) {
        return Err(format!("invalid character '{}' in version '{}'", bad, version));
    }

    Ok(VersionConstraint {
        operator,
        version: version.to_string(),
    })
}

fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("missing package name".to_string());
    }
    let starts_ok = name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
    let ends_ok = name.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());
    if !starts_ok || !ends_ok || !name.chars().all(is_name_char) {
        return Err(format!("invalid package name '{}'", name));
    }
    Ok(())
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

fn is_version_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '*' | '+' | '!' | '_' | '-')
}

/// Package names compare case-insensitively with `-`, `_` and `.` treated alike.
fn normalize_name(name: &str) -> String {
    name.to_ascii_lowercase().replace(['_', '.'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# core
streamlit>=1.28.0
langchain>=0.1.0  # orchestration

# database
psycopg2-binary>=2.9.9

# embeddings and vector storage
sentence-transformers>=2.2.2
uvicorn[standard]>=0.23, <1.0
";

    #[test]
    fn test_parses_sections() {
        let manifest = parse_manifest(SAMPLE);

        assert!(manifest.is_valid());
        assert_eq!(manifest.requirements.len(), 5);

        let sections = manifest.sections();
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].0, Some("core"));
        assert_eq!(sections[0].1.len(), 2);
        assert_eq!(sections[1].0, Some("database"));
        assert_eq!(sections[2].0, Some("embeddings and vector storage"));
    }

    #[test]
    fn test_parses_requirement_parts() {
        let manifest = parse_manifest(SAMPLE);
        let uvicorn = manifest.find("uvicorn").unwrap();

        assert_eq!(uvicorn.extras, vec!["standard"]);
        assert_eq!(uvicorn.constraints.len(), 2);
        assert_eq!(uvicorn.constraints[0].operator, VersionOperator::GreaterOrEqual);
        assert_eq!(uvicorn.constraints[1].operator, VersionOperator::Less);
        assert_eq!(uvicorn.to_string(), "uvicorn[standard]>=0.23, <1.0");
        assert_eq!(uvicorn.line_number, 10);

        let langchain = manifest.find("LangChain").unwrap();
        assert_eq!(langchain.constraints[0].version, "0.1.0");
    }

    #[test]
    fn test_operators() {
        for (line, op) in [
            ("a===1", VersionOperator::Arbitrary),
            ("a~=1.4", VersionOperator::Compatible),
            ("a!=2", VersionOperator::NotEqual),
            ("a<=3", VersionOperator::LessOrEqual),
            ("a>3", VersionOperator::Greater),
        ] {
            let manifest = parse_manifest(line);
            assert!(manifest.is_valid(), "{} should parse", line);
            assert_eq!(manifest.requirements[0].constraints[0].operator, op);
        }
    }

    #[test]
    fn test_reports_invalid_lines() {
        let manifest = parse_manifest("# core\nstreamlit\n-bad>=1\nok>=\nfine==1.0\nx>=1;y\n");

        assert_eq!(manifest.requirements.len(), 1);
        let lines: Vec<usize> = manifest.issues.iter().map(|i| i.line_number).collect();
        assert_eq!(lines, vec![2, 3, 4, 6]);
        assert!(manifest.issues[0].reason.contains("missing version"));

        let err = manifest.validate().unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_blank_and_comment_only() {
        let manifest = parse_manifest("\n   \n# just a comment\n");
        assert!(manifest.is_valid());
        assert!(manifest.requirements.is_empty());
        assert!(manifest.validate().is_ok());
    }
}
