//! Generic ordered labeled tree used for interchange.
//!
//! Serializes to Newick (`(child1,child2)name;`), optionally with NHX leaf
//! annotations (`name[&&NHX:taxid=7070:score=0.5]`), parses the same grammar
//! back, and draws a box-drawing diagram through `termtree`.

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use termtree::Tree;

use crate::domain::error::{DomainError, DomainResult};

/// Characters that force a Newick label to be quoted.
const RESERVED: &[char] = &['(', ')', '[', ']', '\'', ':', ';', ','];

const NHX_PREFIX: &str = "&&NHX:";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabeledNode {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<LabeledNode>,
}

impl LabeledNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.insert(key.into(), value.to_string());
        self
    }

    pub fn push(&mut self, child: LabeledNode) {
        self.children.push(child);
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn leaves(&self) -> Vec<&LabeledNode> {
        if self.is_leaf() {
            return vec![self];
        }
        self.children.iter().flat_map(|c| c.leaves()).collect()
    }

    /// Bare Newick without any annotation.
    pub fn to_newick(&self) -> String {
        let mut out = String::new();
        self.write_newick(&mut out, None);
        out.push(';');
        out
    }

    /// Newick where leaves carry an NHX annotation holding only the attributes
    /// named in `allowlist`, in allowlist order. Internal nodes are written bare.
    pub fn to_newick_with<S: AsRef<str>>(&self, allowlist: &[S]) -> String {
        let keys: Vec<&str> = allowlist.iter().map(AsRef::as_ref).collect();
        let mut out = String::new();
        self.write_newick(&mut out, Some(&keys));
        out.push(';');
        out
    }

    fn write_newick(&self, out: &mut String, allowlist: Option<&[&str]>) {
        if !self.children.is_empty() {
            out.push('(');
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                child.write_newick(out, allowlist);
            }
            out.push(')');
        }
        out.push_str(&quote_label(&self.name));

        if let (true, Some(keys)) = (self.is_leaf(), allowlist) {
            let pairs = keys
                .iter()
                .filter_map(|key| {
                    self.attributes
                        .get(*key)
                        .map(|value| format!("{}={}", key, sanitize_nhx(value)))
                })
                .join(":");
            if !pairs.is_empty() {
                out.push('[');
                out.push_str(NHX_PREFIX);
                out.push_str(&pairs);
                out.push(']');
            }
        }
    }

    /// `name [k=v, ...]` as shown in the ASCII diagram.
    pub fn display_label(&self) -> String {
        if self.attributes.is_empty() {
            self.name.clone()
        } else {
            format!(
                "{} [{}]",
                self.name,
                self.attributes
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .join(", ")
            )
        }
    }

    pub fn to_term_tree(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_term_tree()).collect();
        Tree::new(self.display_label()).with_leaves(leaves)
    }

    /// Box-drawing diagram with every node's name and attributes.
    pub fn to_ascii(&self) -> String {
        self.to_term_tree().to_string()
    }
}

impl fmt::Display for LabeledNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_newick())
    }
}

fn quote_label(name: &str) -> String {
    if name.chars().any(|c| c.is_whitespace() || RESERVED.contains(&c)) {
        format!("'{}'", name.replace('\'', "''"))
    } else {
        name.to_string()
    }
}

fn sanitize_nhx(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            ':' | '=' | '[' | ']' | ',' | '(' | ')' | ';' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

/// Parse a single Newick tree.
///
/// Accepts bare and single-quoted labels, ignores `:length` suffixes and
/// non-NHX comments, and reads `[&&NHX:k=v:...]` annotations into attributes.
pub fn parse_newick(input: &str) -> DomainResult<LabeledNode> {
    let mut parser = NewickParser { input, pos: 0 };
    let root = parser.parse_node()?;
    parser.skip_whitespace();
    parser.expect(';')?;
    parser.skip_whitespace();
    if parser.pos < input.len() {
        return Err(parser.error("trailing input after ';'"));
    }
    Ok(root)
}

struct NewickParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> NewickParser<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> DomainError {
        DomainError::Newick {
            position: self.pos,
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: char) -> DomainResult<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn parse_node(&mut self) -> DomainResult<LabeledNode> {
        self.skip_whitespace();
        let mut node = LabeledNode::default();

        if self.peek() == Some('(') {
            self.bump();
            loop {
                node.children.push(self.parse_node()?);
                self.skip_whitespace();
                match self.bump() {
                    Some(',') => continue,
                    Some(')') => break,
                    Some(c) => return Err(self.error(format!("unexpected '{}' in child list", c))),
                    None => return Err(self.error("unterminated child list")),
                }
            }
        }

        self.skip_whitespace();
        node.name = self.parse_label()?;
        self.skip_whitespace();

        if self.peek() == Some(':') {
            self.bump();
            self.skip_length();
            self.skip_whitespace();
        }
        if self.peek() == Some('[') {
            self.parse_comment(&mut node)?;
        }

        Ok(node)
    }

    fn parse_label(&mut self) -> DomainResult<String> {
        if self.peek() == Some('\'') {
            self.bump();
            let mut label = String::new();
            loop {
                match self.bump() {
                    Some('\'') if self.peek() == Some('\'') => {
                        self.bump();
                        label.push('\'');
                    }
                    Some('\'') => return Ok(label),
                    Some(c) => label.push(c),
                    None => return Err(self.error("unterminated quoted label")),
                }
            }
        }

        let start = self.pos;
        while matches!(self.peek(), Some(c) if !c.is_whitespace() && !RESERVED.contains(&c)) {
            self.bump();
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn skip_length(&mut self) {
        self.skip_whitespace();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        {
            self.bump();
        }
    }

    fn parse_comment(&mut self, node: &mut LabeledNode) -> DomainResult<()> {
        self.expect('[')?;
        let start = self.pos;
        while !matches!(self.peek(), Some(']') | None) {
            self.bump();
        }
        let body = &self.input[start..self.pos];
        self.expect(']')?;

        if let Some(pairs) = body.strip_prefix(NHX_PREFIX) {
            for pair in pairs.split(':').filter(|p| !p.is_empty()) {
                match pair.split_once('=') {
                    Some((key, value)) => {
                        node.attributes.insert(key.to_string(), value.to_string());
                    }
                    None => return Err(self.error(format!("NHX entry without '=': {}", pair))),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_label_with_space_when_serializing_then_quoted() {
        let node = LabeledNode::new("Tenebrio molitor");
        assert_eq!(node.to_newick(), "'Tenebrio molitor';");
    }

    #[test]
    fn given_label_with_quote_when_serializing_then_quote_doubled() {
        let node = LabeledNode::new("O'Brien");
        assert_eq!(node.to_newick(), "'O''Brien';");
        assert_eq!(parse_newick("'O''Brien';").unwrap().name, "O'Brien");
    }

    #[test]
    fn given_branch_lengths_when_parsing_then_ignored() {
        let tree = parse_newick("((A:0.1,B:2e-3):0.5,C)root;").unwrap();
        assert_eq!(tree.name, "root");
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].children[1].name, "B");
    }

    #[test]
    fn given_missing_terminator_when_parsing_then_errors() {
        let err = parse_newick("(A,B)root").unwrap_err();
        assert!(matches!(err, DomainError::Newick { .. }));
    }

    #[test]
    fn given_unbalanced_parens_when_parsing_then_errors() {
        assert!(parse_newick("((A,B)root;").is_err());
    }

    #[test]
    fn given_value_with_separator_when_annotating_then_sanitized() {
        let leaf = LabeledNode::new("A").with_attribute("note", "a:b=c");
        assert_eq!(leaf.to_newick_with(&["note"]), "A[&&NHX:note=a_b_c];");
    }
}
