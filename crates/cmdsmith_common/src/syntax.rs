//! Template language parser
//!
//! ```text
//! template    := (literal | simple | conditional)*
//! simple      := '{' name '}'
//! conditional := '{' name '|' branch ('|' branch)* '}'
//! branch      := [case ':'] (text | '{' name '}')*
//! name        := [A-Za-z_][A-Za-z0-9_.-]*
//! ```
//!
//! A `{` that does not start a well-formed token is literal text. This keeps
//! shell constructs such as `-exec md5sum {} \;` or `awk '{print $1}'` intact.
//! Inside a branch, literal braces nest so `|`, `:` and `}` between them stay
//! part of the branch text.

/// Piece of a conditional branch body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchPart {
    Text(String),
    /// Nested simple reference, resolved like a top-level `{name}`
    Ref(String),
}

/// `case:text` alternative
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub case: String,
    pub body: Vec<BranchPart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    pub name: String,
    pub branches: Vec<Branch>,
    /// Trailing bare branch, used when no case matches
    pub fallback: Option<Vec<BranchPart>>,
    /// Source text, emitted verbatim when `name` is unbound
    pub raw: String,
}

impl Conditional {
    /// Branch body selected by `value`; empty when nothing matches
    pub fn select(&self, value: &str) -> &[BranchPart] {
        self.branches
            .iter()
            .find(|b| b.case == value)
            .map(|b| b.body.as_slice())
            .or(self.fallback.as_deref())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Simple(String),
    Conditional(Conditional),
}

/// Parsed form of a template string
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedTemplate {
    segments: Vec<Segment>,
}

impl ParsedTemplate {
    /// Parse template text. Never fails: malformed tokens become literals.
    pub fn parse(src: &str) -> Self {
        let mut parser = Parser { src, pos: 0 };
        Self {
            segments: parser.template(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Every referenced name in first-appearance order, without duplicates.
    /// Includes conditional heads and references nested in branches.
    pub fn referenced_names(&self) -> Vec<&str> {
        fn push<'t>(name: &'t str, names: &mut Vec<&'t str>) {
            if !names.contains(&name) {
                names.push(name);
            }
        }

        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(_) => {}
                Segment::Simple(name) => push(name.as_str(), &mut names),
                Segment::Conditional(cond) => {
                    push(cond.name.as_str(), &mut names);
                    let bodies = cond
                        .branches
                        .iter()
                        .map(|b| b.body.as_slice())
                        .chain(cond.fallback.as_deref());
                    for body in bodies {
                        for part in body {
                            if let BranchPart::Ref(name) = part {
                                push(name.as_str(), &mut names);
                            }
                        }
                    }
                }
            }
        }
        names
    }

    /// Conditionals in source order
    pub fn conditionals(&self) -> impl Iterator<Item = &Conditional> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Conditional(c) => Some(c),
            _ => None,
        })
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn byte(&self, at: usize) -> Option<u8> {
        self.src.as_bytes().get(at).copied()
    }

    fn template(&mut self) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut literal = String::new();

        while self.pos < self.src.len() {
            let rest = &self.src[self.pos..];
            let Some(offset) = rest.find('{') else {
                literal.push_str(rest);
                self.pos = self.src.len();
                break;
            };
            literal.push_str(&rest[..offset]);
            self.pos += offset;

            match self.token(self.pos) {
                Some((segment, end)) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                    self.pos = end;
                }
                None => {
                    literal.push('{');
                    self.pos += 1;
                }
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        segments
    }

    /// End of a name starting at `at`, if one is there
    fn name_end(&self, at: usize) -> Option<usize> {
        let first = self.byte(at)?;
        if !(first.is_ascii_alphabetic() || first == b'_') {
            return None;
        }
        let mut end = at + 1;
        while let Some(b) = self.byte(end) {
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b == b'-' {
                end += 1;
            } else {
                break;
            }
        }
        Some(end)
    }

    /// `{name}` at `at`, returning the name and the index after `}`
    fn simple_ref(&self, at: usize) -> Option<(&'a str, usize)> {
        let end = self.name_end(at + 1)?;
        if self.byte(end) == Some(b'}') {
            Some((&self.src[at + 1..end], end + 1))
        } else {
            None
        }
    }

    fn token(&self, start: usize) -> Option<(Segment, usize)> {
        let name_end = self.name_end(start + 1)?;
        let name = &self.src[start + 1..name_end];
        match self.byte(name_end)? {
            b'}' => Some((Segment::Simple(name.to_string()), name_end + 1)),
            b'|' => {
                let (branches, fallback, end) = self.branches(name_end + 1)?;
                Some((
                    Segment::Conditional(Conditional {
                        name: name.to_string(),
                        branches,
                        fallback,
                        raw: self.src[start..end].to_string(),
                    }),
                    end,
                ))
            }
            _ => None,
        }
    }

    #[allow(clippy::type_complexity)]
    fn branches(&self, mut pos: usize) -> Option<(Vec<Branch>, Option<Vec<BranchPart>>, usize)> {
        let mut branches = Vec::new();
        let mut fallback = None;

        let mut case: Option<String> = None;
        let mut body: Vec<BranchPart> = Vec::new();
        let mut text = String::new();
        let mut depth = 0usize;

        loop {
            let b = self.byte(pos)?;
            match b {
                b'|' | b'}' if depth == 0 => {
                    if !text.is_empty() {
                        body.push(BranchPart::Text(std::mem::take(&mut text)));
                    }
                    let parts = std::mem::take(&mut body);
                    match case.take() {
                        Some(case) => branches.push(Branch { case, body: parts }),
                        None => fallback = Some(parts),
                    }
                    pos += 1;
                    if b == b'}' {
                        return Some((branches, fallback, pos));
                    }
                }
                b':' if depth == 0 && case.is_none() && body.is_empty() => {
                    case = Some(std::mem::take(&mut text));
                    pos += 1;
                }
                b'{' => {
                    if let Some((name, end)) = self.simple_ref(pos) {
                        if !text.is_empty() {
                            body.push(BranchPart::Text(std::mem::take(&mut text)));
                        }
                        body.push(BranchPart::Ref(name.to_string()));
                        pos = end;
                    } else {
                        depth += 1;
                        text.push('{');
                        pos += 1;
                    }
                }
                b'}' => {
                    depth -= 1;
                    text.push('}');
                    pos += 1;
                }
                _ => {
                    let ch = self.src[pos..].chars().next()?;
                    text.push(ch);
                    pos += ch.len_utf8();
                }
            }
        }
    }
}
