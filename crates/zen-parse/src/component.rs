//! Component taxonomy: the typed syntactic units the factory (`factory.rs`)
//! produces from a `Chunk` + `ScopeType` (spec §3 "Component", §4.C).

use std::collections::{HashMap, HashSet};

use regex::Regex;
use zen_core::Chunk;

use crate::scope::ScopeType;

fn tag_regex() -> &'static Regex {
    use std::sync::OnceLock;
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"//\s*ZEN\(([^)]*)\)").expect("static regex"))
}

macro_rules! component_variants {
    ($($variant:ident($ty:ident)),* $(,)?) => {
        /// A typed syntactic unit recognized in source: preprocessor
        /// directive, namespace, class declaration/definition, function
        /// declaration/definition, control block, label, misc statement,
        /// using-directive, or a containing block.
        pub enum Component {
            $($variant($ty)),*
        }

        impl Component {
            pub fn chunk(&self) -> &Chunk {
                match self {
                    $(Component::$variant(v) => &v.chunk),*
                }
            }

            pub fn kind_name(&self) -> &'static str {
                match self {
                    $(Component::$variant(_) => stringify!($variant)),*
                }
            }
        }
    };
}

pub struct Preprocessor {
    pub chunk: Chunk,
}

pub struct Using {
    pub chunk: Chunk,
}

pub struct Namespace {
    pub chunk: Chunk,
    pub prefix: Chunk,
    pub name: String,
    pub children: Vec<Component>,
}

pub struct ClassForwardDecl {
    pub chunk: Chunk,
    pub name: String,
}

pub struct ClassDefinition {
    pub chunk: Chunk,
    pub prefix: Chunk,
    pub name: String,
    pub members: Vec<Component>,
}

pub struct FunctionDeclaration {
    pub chunk: Chunk,
    pub name: String,
}

pub struct MemberFunctionDeclaration {
    pub chunk: Chunk,
    pub name: String,
}

pub struct FunctionDefinition {
    pub chunk: Chunk,
    pub prefix: Chunk,
    pub name: String,
    pub signature: Box<Component>,
    pub body: Vec<Component>,
}

pub struct MemberFunctionDefinition {
    pub chunk: Chunk,
    pub prefix: Chunk,
    pub name: String,
    pub signature: Box<Component>,
    pub body: Vec<Component>,
}

pub struct ControlBlock {
    pub chunk: Chunk,
    pub prefix: Chunk,
    pub body: Vec<Component>,
}

pub struct Label {
    pub chunk: Chunk,
    pub name: String,
}

pub struct MiscStatement {
    pub chunk: Chunk,
}

pub struct Block {
    pub chunk: Chunk,
    pub scope: ScopeType,
    pub children: Vec<Component>,
}

component_variants! {
    Preprocessor(Preprocessor),
    Using(Using),
    Namespace(Namespace),
    ClassForwardDecl(ClassForwardDecl),
    ClassDefinition(ClassDefinition),
    FunctionDeclaration(FunctionDeclaration),
    MemberFunctionDeclaration(MemberFunctionDeclaration),
    FunctionDefinition(FunctionDefinition),
    MemberFunctionDefinition(MemberFunctionDefinition),
    ControlBlock(ControlBlock),
    Label(Label),
    MiscStatement(MiscStatement),
    Block(Block),
}

impl Component {
    /// Name this component declares, if any (used to exclude self-reference
    /// from `used_constructs`).
    pub fn own_name(&self) -> Option<&str> {
        match self {
            Component::Namespace(n) => Some(&n.name),
            Component::ClassForwardDecl(c) => Some(&c.name),
            Component::ClassDefinition(c) => Some(&c.name),
            Component::FunctionDeclaration(f) => Some(&f.name),
            Component::MemberFunctionDeclaration(f) => Some(&f.name),
            Component::FunctionDefinition(f) => Some(&f.name),
            Component::MemberFunctionDefinition(f) => Some(&f.name),
            Component::Label(l) => Some(&l.name),
            _ => None,
        }
    }

    /// Identifiers in the component's signature, excluding nested bodies
    /// when it has one (spec's Component.tokens contract).
    pub fn tokens(&self) -> HashSet<String> {
        match self {
            Component::Preprocessor(p) => p.chunk.scope_tokens(None),
            Component::Using(u) => u.chunk.scope_tokens(None),
            Component::Namespace(n) => n.prefix.scope_tokens(None),
            Component::ClassForwardDecl(c) => c.chunk.scope_tokens(None),
            Component::ClassDefinition(c) => c.prefix.scope_tokens(None),
            Component::FunctionDeclaration(f) => f.chunk.scope_tokens(None),
            Component::MemberFunctionDeclaration(f) => f.chunk.scope_tokens(None),
            Component::FunctionDefinition(f) => f.prefix.scope_tokens(None),
            Component::MemberFunctionDefinition(f) => f.prefix.scope_tokens(None),
            Component::ControlBlock(c) => c.prefix.scope_tokens(None),
            Component::Label(l) => l.chunk.scope_tokens(None),
            Component::MiscStatement(m) => m.chunk.scope_tokens(None),
            Component::Block(_) => HashSet::new(),
        }
    }

    /// Direct children.
    pub fn sub_components(&self) -> &[Component] {
        match self {
            Component::Namespace(n) => &n.children,
            Component::ClassDefinition(c) => &c.members,
            Component::FunctionDefinition(f) => &f.body,
            Component::MemberFunctionDefinition(f) => &f.body,
            Component::ControlBlock(c) => &c.body,
            Component::Block(b) => &b.children,
            _ => &[],
        }
    }

    /// Depth-first: each direct child, then that child's own descendants.
    pub fn recursive_components(&self) -> Vec<&Component> {
        let mut out = Vec::new();
        for child in self.sub_components() {
            out.push(child);
            out.extend(child.recursive_components());
        }
        out
    }

    /// Chunks that affect compilation even when no construct from this
    /// component is referenced (preprocessor directives, namespace/class
    /// prefixes, member declarations that affect layout).
    pub fn exposed_content(&self) -> Vec<&Chunk> {
        match self {
            Component::Preprocessor(p) => vec![&p.chunk],
            Component::Using(u) => vec![&u.chunk],
            Component::Namespace(n) => {
                let mut v = vec![&n.prefix];
                v.extend(n.children.iter().flat_map(Component::exposed_content));
                v
            }
            Component::ClassForwardDecl(c) => vec![&c.chunk],
            Component::ClassDefinition(c) => vec![&c.prefix],
            Component::FunctionDeclaration(_) => vec![],
            Component::MemberFunctionDeclaration(f) => vec![&f.chunk],
            Component::FunctionDefinition(_) => vec![],
            Component::MemberFunctionDefinition(f) => vec![&f.prefix],
            Component::ControlBlock(c) => vec![&c.prefix],
            Component::Label(_) => vec![],
            Component::MiscStatement(_) => vec![],
            Component::Block(b) => b.children.iter().flat_map(Component::exposed_content).collect(),
        }
    }

    /// `name -> contributing components` for the construct(s) this
    /// component (and, transparently, its container descendants) declares.
    pub fn construct_content(&self) -> HashMap<String, Vec<&Component>> {
        let mut map: HashMap<String, Vec<&Component>> = HashMap::new();
        match self {
            Component::FunctionDeclaration(f) => {
                map.entry(f.name.clone()).or_default().push(self);
            }
            Component::MemberFunctionDeclaration(f) => {
                map.entry(f.name.clone()).or_default().push(self);
            }
            Component::ClassForwardDecl(c) => {
                map.entry(c.name.clone()).or_default().push(self);
            }
            Component::FunctionDefinition(f) => {
                let entry = map.entry(f.name.clone()).or_default();
                entry.push(&f.signature);
                entry.extend(f.body.iter());
            }
            Component::MemberFunctionDefinition(f) => {
                let entry = map.entry(f.name.clone()).or_default();
                entry.push(&f.signature);
                entry.extend(f.body.iter());
            }
            Component::ClassDefinition(c) => {
                map.entry(c.name.clone()).or_default().extend(c.members.iter());
                for m in &c.members {
                    for (k, v) in m.construct_content() {
                        map.entry(k).or_default().extend(v);
                    }
                }
            }
            Component::Namespace(n) => {
                for ch in &n.children {
                    for (k, v) in ch.construct_content() {
                        map.entry(k).or_default().extend(v);
                    }
                }
            }
            Component::ControlBlock(c) => {
                for ch in &c.body {
                    for (k, v) in ch.construct_content() {
                        map.entry(k).or_default().extend(v);
                    }
                }
            }
            Component::Block(b) => {
                for ch in &b.children {
                    for (k, v) in ch.construct_content() {
                        map.entry(k).or_default().extend(v);
                    }
                }
            }
            Component::Preprocessor(_) | Component::Using(_) | Component::Label(_) | Component::MiscStatement(_) => {}
        }
        map
    }

    /// Subset of `available` names appearing in this component's tokens,
    /// excluding the component's own name.
    pub fn used_construct_names(&self, available: &HashSet<String>) -> HashSet<String> {
        let own = self.own_name();
        self.tokens()
            .into_iter()
            .filter(|t| Some(t.as_str()) != own)
            .filter(|t| available.contains(t))
            .collect()
    }

    /// Tags attached via `// ZEN(tag1, tag2)` comments on lines that belong
    /// solely to this component (not to one of its direct sub-components).
    pub fn tags(&self) -> HashSet<String> {
        let chunk = self.chunk();
        let content = chunk.content_ref();
        let mut excluded: HashSet<usize> = HashSet::new();
        for sub in self.sub_components() {
            let c = sub.chunk();
            excluded.extend(c.start().line_i()..=c.end().line_i());
        }
        let mut tags = HashSet::new();
        for line_i in chunk.start().line_i()..=chunk.end().line_i() {
            if excluded.contains(&line_i) {
                continue;
            }
            let raw = content.line(line_i).raw();
            for caps in tag_regex().captures_iter(raw) {
                for tag in caps[1].split(',') {
                    let t = tag.trim();
                    if !t.is_empty() {
                        tags.insert(t.to_string());
                    }
                }
            }
        }
        tags
    }
}
