//! Structured config documents
//!
//! A [`ConfigDocument`] is an ordered list of named [`Section`]s, each an
//! ordered list of unique `key=value` pairs. Order is significant: sections
//! and keys serialize in the order they were read or inserted.
//!
//! Grammar accepted by [`ConfigDocument::parse`]:
//!
//! ```text
//! ; comment            # also a comment
//! [SECTION]
//! KEY=value
//! OTHER: value         (':' is accepted as a delimiter, '=' is written back)
//! ```
//!
//! Keys are case-sensitive. Duplicate keys in a section, duplicate section
//! names and entries before the first header are errors. Comments are not
//! preserved.

use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;

/// A parse failure with its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// Line the error was detected on
    pub line: usize,
    /// Human readable reason
    pub message: String,
}

impl ParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// One named section of a config document
#[derive(Debug, Clone, Eq)]
pub struct Section {
    name: String,
    entries: IndexMap<String, String>,
}

impl Section {
    /// Create an empty section
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: IndexMap::new(),
        }
    }

    /// Section name as written in its header
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a value by exact key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Set a value, returning the previous one
    ///
    /// An existing key keeps its position; a new key goes to the end.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Builder form of [`Section::set`]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the section has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Whether this section is the `DELETE=1` removal marker
    ///
    /// Exactly one entry is required: the key compared case-insensitively,
    /// the value literally `1`. Extra keys make it an ordinary section.
    pub fn is_deletion_sentinel(&self) -> bool {
        match self.entries.first() {
            Some((key, value)) if self.entries.len() == 1 => {
                key.eq_ignore_ascii_case("DELETE") && value == "1"
            }
            _ => false,
        }
    }
}

// Order-sensitive, unlike IndexMap's own equality
impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.entries.iter().eq(other.entries.iter())
    }
}

/// An ordered config document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    sections: Vec<Section>,
}

impl ConfigDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from text
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for entries outside a section, malformed lines,
    /// duplicate keys and duplicate sections.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut doc = Self::new();
        let mut current: Option<usize> = None;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let Some(close) = rest.rfind(']') else {
                    return Err(ParseError::new(line_no, "unterminated section header"));
                };
                let name = rest[..close].trim();
                if name.is_empty() {
                    return Err(ParseError::new(line_no, "empty section name"));
                }
                if doc.section(name).is_some() {
                    return Err(ParseError::new(
                        line_no,
                        format!("duplicate section [{name}]"),
                    ));
                }
                doc.sections.push(Section::new(name));
                current = Some(doc.sections.len() - 1);
                continue;
            }

            let Some(delimiter) = line.find(['=', ':']) else {
                return Err(ParseError::new(
                    line_no,
                    format!("expected 'key=value', found '{line}'"),
                ));
            };
            let key = line[..delimiter].trim();
            let value = line[delimiter + 1..].trim();

            if key.is_empty() {
                return Err(ParseError::new(line_no, "entry without a key"));
            }

            let Some(index) = current else {
                return Err(ParseError::new(
                    line_no,
                    format!("entry '{key}' appears before any section header"),
                ));
            };

            let section = &mut doc.sections[index];
            if section.get(key).is_some() {
                return Err(ParseError::new(
                    line_no,
                    format!("duplicate key '{key}' in section [{}]", section.name),
                ));
            }
            section.set(key, value);
        }

        Ok(doc)
    }

    /// Look up a section by name
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Look up a section by name for modification
    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.name == name)
    }

    /// Get a section, appending an empty one if it does not exist yet
    pub fn section_or_insert(&mut self, name: &str) -> &mut Section {
        let index = match self.sections.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }

    /// Append a section, replacing any section of the same name in place
    pub fn push_section(&mut self, section: Section) {
        match self.section_mut(&section.name) {
            Some(existing) => *existing = section,
            None => self.sections.push(section),
        }
    }

    /// Builder form of [`ConfigDocument::push_section`]
    #[must_use]
    pub fn with_section(mut self, section: Section) -> Self {
        self.push_section(section);
        self
    }

    /// Remove a section by name
    pub fn remove_section(&mut self, name: &str) -> Option<Section> {
        let index = self.sections.iter().position(|s| s.name == name)?;
        Some(self.sections.remove(index))
    }

    /// Sections in order
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Section names in order
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(Section::name)
    }

    /// Number of sections
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the document has no sections
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl fmt::Display for ConfigDocument {
    /// `[NAME]`, one `key=value` line per entry, then a blank line
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            writeln!(f, "[{}]", section.name)?;
            for (key, value) in &section.entries {
                writeln!(f, "{key}={value}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_parse_basic() {
        let doc = ConfigDocument::parse(
            "; header comment\n[HEADER]\nVERSION=3\n\n[LOD_0]\nFILE=model.kn5\nIN=0\nOUT=15\n",
        )
        .unwrap();

        assert_eq!(doc.section_names().collect::<Vec<_>>(), vec!["HEADER", "LOD_0"]);
        let lod = doc.section("LOD_0").unwrap();
        assert_eq!(lod.keys().collect::<Vec<_>>(), vec!["FILE", "IN", "OUT"]);
        assert_eq!(lod.get("FILE"), Some("model.kn5"));
    }

    #[test]
    fn test_parse_trims_and_keeps_case() {
        let doc = ConfigDocument::parse("[Engine]\n  Limiter = 7500 \nlimiter=1\r\n").unwrap();
        let engine = doc.section("Engine").unwrap();

        assert_eq!(engine.get("Limiter"), Some("7500"));
        assert_eq!(engine.get("limiter"), Some("1"));
        assert!(doc.section("ENGINE").is_none());
    }

    #[test]
    fn test_parse_value_with_delimiters() {
        let doc = ConfigDocument::parse("[A]\nPATH=c:/x=y\nURL: http://host\n").unwrap();
        let a = doc.section("A").unwrap();

        assert_eq!(a.get("PATH"), Some("c:/x=y"));
        assert_eq!(a.get("URL"), Some("http://host"));
    }

    #[test]
    fn test_parse_empty_value_and_bom() {
        let doc = ConfigDocument::parse("\u{feff}[A]\nEMPTY=\n").unwrap();
        assert_eq!(doc.section("A").unwrap().get("EMPTY"), Some(""));
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let cases = [
            ("KEY=1\n", 1, "before any section header"),
            ("[A]\nK=1\nK=2\n", 3, "duplicate key 'K'"),
            ("[A]\n[B]\n[A]\n", 3, "duplicate section [A]"),
            ("[A]\njust text\n", 2, "expected 'key=value'"),
            ("[A\n", 1, "unterminated"),
            ("[ ]\n", 1, "empty section name"),
            ("[A]\n=value\n", 2, "without a key"),
        ];

        for (text, line, needle) in cases {
            let err = ConfigDocument::parse(text).unwrap_err();
            assert_eq!(err.line, line, "{text:?}");
            assert!(err.message.contains(needle), "{text:?}: {}", err.message);
        }
    }

    #[test]
    fn test_serialize_format() {
        let doc = ConfigDocument::new()
            .with_section(Section::new("A").with("k", "1").with("K2", "x y"))
            .with_section(Section::new("B"));

        assert_eq!(doc.to_string(), "[A]\nk=1\nK2=x y\n\n[B]\n\n");
    }

    #[test]
    fn test_serialize_reparses_equal() {
        let text = "[HEADER]\nVERSION=3\n; dropped\n[DATA]\nB=2\nA=1\nC=\n";
        let doc = ConfigDocument::parse(text).unwrap();

        let reparsed = ConfigDocument::parse(&doc.to_string()).unwrap();
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn test_section_equality_is_order_sensitive() {
        let ab = Section::new("S").with("a", "1").with("b", "2");
        let ba = Section::new("S").with("b", "2").with("a", "1");
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_set_keeps_position() {
        let mut section = Section::new("S").with("a", "1").with("b", "2");
        assert_eq!(section.set("a", "9"), Some("1".to_string()));
        section.set("c", "3");

        assert_eq!(section.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(section.get("a"), Some("9"));
    }

    #[test]
    fn test_deletion_sentinel_detection() {
        assert!(Section::new("X").with("DELETE", "1").is_deletion_sentinel());
        assert!(Section::new("X").with("delete", "1").is_deletion_sentinel());
        assert!(!Section::new("X").with("DELETE", "true").is_deletion_sentinel());
        assert!(!Section::new("X").with("DELETE", "01").is_deletion_sentinel());
        assert!(
            !Section::new("X")
                .with("DELETE", "1")
                .with("OTHER", "2")
                .is_deletion_sentinel()
        );
        assert!(!Section::new("X").is_deletion_sentinel());
    }

    #[test]
    fn test_section_or_insert_and_remove() {
        let mut doc = ConfigDocument::new();
        doc.section_or_insert("A").set("k", "1");
        doc.section_or_insert("B");
        doc.section_or_insert("A").set("j", "2");

        assert_eq!(doc.len(), 2);
        assert_eq!(doc.section("A").unwrap().len(), 2);

        let removed = doc.remove_section("A").unwrap();
        assert_eq!(removed.name(), "A");
        assert!(doc.remove_section("A").is_none());
        assert_eq!(doc.section_names().collect::<Vec<_>>(), vec!["B"]);
    }
}
