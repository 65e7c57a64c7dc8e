use crate::document::Document;
use crate::document::NodeId;
use crate::error::DomError;
use crate::error::Result;

/// A selector-list of compound selectors (`tag.class#id[attr="v"], ...`).
///
/// Combinators are intentionally absent: every query is scoped to a subtree
/// through [`Document::query_all`], which covers the descendant case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Vec<Simple>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Simple {
    Tag(String),
    Class(String),
    Id(String),
    Attr(String),
    AttrEq(String, String),
}

impl Selector {
    pub fn tag(tag: &str) -> Self {
        Self::single(Simple::Tag(tag.to_ascii_lowercase()))
    }

    pub fn class(class: &str) -> Self {
        Self::single(Simple::Class(class.to_string()))
    }

    pub fn id(id: &str) -> Self {
        Self::single(Simple::Id(id.to_string()))
    }

    pub fn attr(name: &str) -> Self {
        Self::single(Simple::Attr(name.to_string()))
    }

    pub fn attr_eq(name: &str, value: &str) -> Self {
        Self::single(Simple::AttrEq(name.to_string(), value.to_string()))
    }

    /// Union of selectors, matching when any alternative matches.
    pub fn any_of(selectors: impl IntoIterator<Item = Selector>) -> Self {
        Self {
            alternatives: selectors
                .into_iter()
                .flat_map(|selector| selector.alternatives)
                .collect(),
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        let mut alternatives = Vec::new();
        for part in input.split(',') {
            let compound = parse_compound(part.trim(), input)?;
            alternatives.push(compound);
        }
        Ok(Self { alternatives })
    }

    pub fn matches(&self, document: &Document, node: NodeId) -> bool {
        if !document.is_element(node) {
            return false;
        }
        self.alternatives.iter().any(|compound| {
            compound
                .iter()
                .all(|simple| simple.matches(document, node))
        })
    }

    fn single(simple: Simple) -> Self {
        Self {
            alternatives: vec![vec![simple]],
        }
    }
}

impl Simple {
    fn matches(&self, document: &Document, node: NodeId) -> bool {
        match self {
            Simple::Tag(tag) => document.tag(node) == Some(tag.as_str()),
            Simple::Class(class) => document.has_class(node, class),
            Simple::Id(id) => document.attr(node, "id") == Some(id.as_str()),
            Simple::Attr(name) => document.has_attr(node, name),
            Simple::AttrEq(name, value) => document.attr(node, name) == Some(value.as_str()),
        }
    }
}

fn parse_compound(part: &str, whole: &str) -> Result<Vec<Simple>> {
    if part.is_empty() {
        return Err(DomError::invalid_selector(whole, "empty compound selector"));
    }
    let chars: Vec<char> = part.chars().collect();
    let mut pos = 0;
    let mut simples = Vec::new();

    let tag = take_ident(&chars, &mut pos);
    if !tag.is_empty() {
        simples.push(Simple::Tag(tag.to_ascii_lowercase()));
    }

    while pos < chars.len() {
        match chars[pos] {
            '.' => {
                pos += 1;
                let class = take_ident(&chars, &mut pos);
                if class.is_empty() {
                    return Err(DomError::invalid_selector(whole, "expected class name"));
                }
                simples.push(Simple::Class(class));
            }
            '#' => {
                pos += 1;
                let id = take_ident(&chars, &mut pos);
                if id.is_empty() {
                    return Err(DomError::invalid_selector(whole, "expected id"));
                }
                simples.push(Simple::Id(id));
            }
            '[' => {
                pos += 1;
                simples.push(parse_attribute(&chars, &mut pos, whole)?);
            }
            c if c.is_whitespace() => {
                return Err(DomError::invalid_selector(
                    whole,
                    "combinators are not supported",
                ));
            }
            other => {
                return Err(DomError::invalid_selector(
                    whole,
                    format!("unexpected character `{other}`"),
                ));
            }
        }
    }
    Ok(simples)
}

fn parse_attribute(chars: &[char], pos: &mut usize, whole: &str) -> Result<Simple> {
    let name = take_ident(chars, pos);
    if name.is_empty() {
        return Err(DomError::invalid_selector(whole, "expected attribute name"));
    }
    match chars.get(*pos) {
        Some(']') => {
            *pos += 1;
            Ok(Simple::Attr(name))
        }
        Some('=') => {
            *pos += 1;
            let value = match chars.get(*pos) {
                Some(quote @ ('"' | '\'')) => {
                    let quote = *quote;
                    *pos += 1;
                    let start = *pos;
                    while *pos < chars.len() && chars[*pos] != quote {
                        *pos += 1;
                    }
                    if *pos >= chars.len() {
                        return Err(DomError::invalid_selector(whole, "unterminated string"));
                    }
                    let value: String = chars[start..*pos].iter().collect();
                    *pos += 1;
                    value
                }
                _ => take_ident(chars, pos),
            };
            if chars.get(*pos) != Some(&']') {
                return Err(DomError::invalid_selector(whole, "expected `]`"));
            }
            *pos += 1;
            Ok(Simple::AttrEq(name, value))
        }
        _ => Err(DomError::invalid_selector(whole, "expected `]` or `=`")),
    }
}

fn take_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len()
        && (chars[*pos].is_ascii_alphanumeric() || matches!(chars[*pos], '-' | '_' | ':'))
    {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}
