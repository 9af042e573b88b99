//! Format-preserving INI documents.
//!
//! Comments, blank lines and ordering are kept verbatim so that writing the
//! user file back only touches the lines that were actually changed.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniParseError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    preamble: Vec<String>,
    sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    name: String,
    header: String,
    lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Entry { key: String, value: String, raw: String },
    Other(String),
}

impl IniDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, IniParseError> {
        let mut doc = IniDocument::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = trim_blanks(raw);

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                match doc.sections.last_mut() {
                    Some(section) => section.lines.push(Line::Other(raw.to_string())),
                    None => doc.preamble.push(raw.to_string()),
                }
                continue;
            }

            if trimmed.starts_with('[') {
                let name = parse_header(trimmed).ok_or_else(|| IniParseError {
                    line: line_no,
                    message: format!("malformed section header '{trimmed}'"),
                })?;
                doc.sections.push(Section {
                    name,
                    header: raw.to_string(),
                    lines: Vec::new(),
                });
                continue;
            }

            let Some((key, value)) = split_entry(trimmed) else {
                return Err(IniParseError {
                    line: line_no,
                    message: format!("expected 'key = value', found '{trimmed}'"),
                });
            };

            let Some(section) = doc.sections.last_mut() else {
                return Err(IniParseError {
                    line: line_no,
                    message: format!("entry '{key}' appears before any section header"),
                });
            };

            section.lines.push(Line::Entry {
                key,
                value,
                raw: raw.to_string(),
            });
        }

        Ok(doc)
    }

    /// Raw (still escaped) value; the last occurrence of a key wins.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .rev()
            .filter(|s| s.name == section)
            .find_map(|s| s.find(key))
    }

    pub fn section_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for section in &self.sections {
            if !names.contains(&section.name.as_str()) {
                names.push(&section.name);
            }
        }
        names
    }

    /// Keys of a section in file order with their effective raw values.
    pub fn entries(&self, section: &str) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = Vec::new();
        for s in self.sections.iter().filter(|s| s.name == section) {
            for line in &s.lines {
                if let Line::Entry { key, value, .. } = line {
                    match entries.iter_mut().find(|(k, _)| *k == key.as_str()) {
                        Some(existing) => existing.1 = value.as_str(),
                        None => entries.push((key.as_str(), value.as_str())),
                    }
                }
            }
        }
        entries
    }

    /// Stores a raw value, rewriting the existing line when the key is
    /// already present and appending otherwise.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let raw = format!("{key} = {value}");

        let existing = self
            .sections
            .iter_mut()
            .rev()
            .filter(|s| s.name == section)
            .find_map(|s| {
                s.lines.iter_mut().rev().find(
                    |line| matches!(line, Line::Entry { key: k, .. } if k == key),
                )
            });

        if let Some(line) = existing {
            *line = Line::Entry {
                key: key.to_string(),
                value: value.to_string(),
                raw,
            };
            return;
        }

        let entry = Line::Entry {
            key: key.to_string(),
            value: value.to_string(),
            raw,
        };

        if let Some(target) = self.sections.iter_mut().rev().find(|s| s.name == section) {
            let insert_at = target
                .lines
                .iter()
                .rposition(|line| matches!(line, Line::Entry { .. }))
                .map(|pos| pos + 1)
                .unwrap_or(0);
            target.lines.insert(insert_at, entry);
            return;
        }

        if let Some(previous) = self.sections.last_mut() {
            let ends_blank =
                matches!(previous.lines.last(), Some(Line::Other(l)) if l.trim().is_empty());
            if !ends_blank {
                previous.lines.push(Line::Other(String::new()));
            }
        }

        self.sections.push(Section {
            name: section.to_string(),
            header: format!("[{section}]"),
            lines: vec![entry],
        });
    }
}

impl Section {
    fn find(&self, key: &str) -> Option<&str> {
        self.lines.iter().rev().find_map(|line| match line {
            Line::Entry { key: k, value, .. } if k == key => Some(value.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.preamble {
            writeln!(f, "{line}")?;
        }
        for section in &self.sections {
            writeln!(f, "{}", section.header)?;
            for line in &section.lines {
                match line {
                    Line::Entry { raw, .. } => writeln!(f, "{raw}")?,
                    Line::Other(raw) => writeln!(f, "{raw}")?,
                }
            }
        }
        Ok(())
    }
}

/// Only ASCII blanks count as layout; any other whitespace belongs to the
/// key or value.
fn trim_blanks(text: &str) -> &str {
    text.trim_matches([' ', '\t'])
}

fn parse_header(trimmed: &str) -> Option<String> {
    let inner = trimmed.strip_prefix('[')?;
    let end = inner.find(']')?;
    let name = trim_blanks(&inner[..end]);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn split_entry(trimmed: &str) -> Option<(String, String)> {
    let split_at = trimmed.find(['=', ':'])?;
    let key = trim_blanks(&trimmed[..split_at]);
    if key.is_empty() {
        return None;
    }
    let value = trim_blanks(&trimmed[split_at + 1..]);
    Some((key.to_string(), value.to_string()))
}
