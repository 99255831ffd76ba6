//! AST for the Petrel model language: a PRISM-style guarded-command
//! subset describing one consumption MDP.

/// Source span for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A spanned AST node.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A parsed model file.
///
/// The parser is purely syntactic: it keeps every module, rewards block
/// and label it finds. Count/shape restrictions (exactly one module, a
/// `cost` rewards structure, `reload`/`target` labels) are enforced during
/// lowering, where they surface as unsupported-model errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub constants: Vec<ConstDecl>,
    pub modules: Vec<Spanned<ModuleDecl>>,
    pub rewards: Vec<Spanned<RewardsDecl>>,
    pub labels: Vec<Spanned<LabelDecl>>,
}

impl Model {
    /// The value of an integer constant, if declared.
    pub fn constant(&self, name: &str) -> Option<i64> {
        self.constants
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value)
    }
}

/// `const int name = value;`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub name: String,
    pub value: i64,
    pub span: Span,
}

/// `module name … endmodule`
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDecl {
    pub name: String,
    pub var: VarDecl,
    pub commands: Vec<Spanned<Command>>,
}

/// The module's single state variable: `v : [low..high] init init;`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub low: i64,
    pub high: i64,
    pub init: i64,
    pub span: Span,
}

/// `[action] var=guard_value -> p1:(var'=k1) + … ;`
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub action: String,
    pub guard: Guard,
    pub updates: Vec<UpdateArm>,
}

/// An exact test on a variable: `var = value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Guard {
    pub var: String,
    pub value: i64,
    pub span: Span,
}

/// One probability-weighted branch of a command: `p:(var'=value)`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateArm {
    pub probability: f64,
    pub var: String,
    pub value: i64,
    pub span: Span,
}

/// `rewards "name" … endrewards`
#[derive(Debug, Clone, PartialEq)]
pub struct RewardsDecl {
    pub name: String,
    pub items: Vec<Spanned<RewardItem>>,
}

/// `[action] var=k : reward;`
#[derive(Debug, Clone, PartialEq)]
pub struct RewardItem {
    pub action: String,
    pub guard: Guard,
    pub reward: i64,
}

/// `label "name" = var=k | var=k' | … ;`
#[derive(Debug, Clone, PartialEq)]
pub struct LabelDecl {
    pub name: String,
    pub atoms: Vec<Guard>,
}
