//! Specification tree node types.
//!
//! Every node kind is the same ordered, heterogeneous sequence of
//! [`Element`]s; what a sequence *is* comes only from its [`NodeKind`] tag.
//! Nodes are plain data. Nothing here checks that a node is well formed, that
//! is the job of [`validate`](crate::validate). The read helpers return
//! `None` or empty iterators on malformed input instead of panicking.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::slot::Target;
use crate::value::{Value, ValueType};

/// Kind tag of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Root of a specification tree.
    Application,
    /// One-line description, at most 80 characters.
    Brief,
    /// Invocation example line, at most 80 characters.
    Usage,
    /// Markdown free text.
    Help,
    /// Single-character alias.
    Short,
    /// Tag used to group related items in help output.
    Group,
    /// Three version numbers and an optional build tag.
    Version,
    /// Fallback value of a `Var`.
    Default,
    /// Command run when none is named in the invocation.
    DefaultCommand,
    /// Trigger is enabled unless named in the invocation.
    DefaultOn,
    /// Trigger ends the program once it has run.
    Terminates,
    /// Trigger runs at shutdown instead of startup.
    RunAfter,
    /// Pairs of invocation snippet and explanation.
    Examples,
    /// Storage locations receiving a `Var`'s resolved value.
    Slot,
    /// A configuration variable.
    Var,
    /// A one-shot action.
    Trigger,
    /// A subcommand.
    Command,
    /// The set of subcommands of an `Application`.
    Commands,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "Application",
            Self::Brief => "Brief",
            Self::Usage => "Usage",
            Self::Help => "Help",
            Self::Short => "Short",
            Self::Group => "Group",
            Self::Version => "Version",
            Self::Default => "Default",
            Self::DefaultCommand => "DefaultCommand",
            Self::DefaultOn => "DefaultOn",
            Self::Terminates => "Terminates",
            Self::RunAfter => "RunAfter",
            Self::Examples => "Examples",
            Self::Slot => "Slot",
            Self::Var => "Var",
            Self::Trigger => "Trigger",
            Self::Command => "Command",
            Self::Commands => "Commands",
        }
    }

    /// Whether element 0 of this kind is its name.
    pub fn is_named(&self) -> bool {
        matches!(
            self,
            Self::Application | Self::Command | Self::Trigger | Self::Var
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handler of a `Command` or `Trigger`.
///
/// Receives the tree it was declared in and returns the process exit status.
#[derive(Clone)]
pub struct Action(Arc<dyn Fn(&Node) -> i32 + Send + Sync>);

impl Action {
    pub fn new(f: impl Fn(&Node) -> i32 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn run(&self, tree: &Node) -> i32 {
        (self.0)(tree)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action")
    }
}

/// One entry of a node's element sequence.
#[derive(Debug, Clone)]
pub enum Element {
    /// A primitive value (names, text, numbers, defaults).
    Value(Value),
    /// A single-character symbol.
    Symbol(char),
    /// A storage location.
    Target(Target),
    /// A handler; `None` is the nil action and never validates.
    Action(Option<Action>),
    /// A nested node.
    Node(Node),
}

impl Element {
    /// The nil action, which a declaration may contain but never validates.
    pub fn nil_action() -> Self {
        Self::Action(None)
    }

    /// Returns the runtime kind of this element.
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Value(v) => ElementKind::Value(v.value_type()),
            Self::Symbol(_) => ElementKind::Symbol,
            Self::Target(t) => ElementKind::Target(t.value_type()),
            Self::Action(_) => ElementKind::Action,
            Self::Node(n) => ElementKind::Node(n.kind),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Value(v) => v.as_text(),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Value(v) => v.as_integer(),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(n) => Some(n),
            _ => None,
        }
    }
}

/// Runtime kind of an [`Element`], used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Value(ValueType),
    Symbol,
    Target(ValueType),
    Action,
    Node(NodeKind),
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(t) => write!(f, "{t}"),
            Self::Symbol => f.write_str("symbol"),
            Self::Target(t) => write!(f, "{t} slot target"),
            Self::Action => f.write_str("action"),
            Self::Node(k) => write!(f, "{k}"),
        }
    }
}

impl From<Value> for Element {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

impl From<&str> for Element {
    fn from(v: &str) -> Self {
        Self::Value(v.into())
    }
}

impl From<String> for Element {
    fn from(v: String) -> Self {
        Self::Value(v.into())
    }
}

impl From<i32> for Element {
    fn from(v: i32) -> Self {
        Self::Value(v.into())
    }
}

impl From<i64> for Element {
    fn from(v: i64) -> Self {
        Self::Value(v.into())
    }
}

impl From<f64> for Element {
    fn from(v: f64) -> Self {
        Self::Value(v.into())
    }
}

impl From<char> for Element {
    fn from(v: char) -> Self {
        Self::Symbol(v)
    }
}

impl From<Target> for Element {
    fn from(v: Target) -> Self {
        Self::Target(v)
    }
}

impl From<Action> for Element {
    fn from(v: Action) -> Self {
        Self::Action(Some(v))
    }
}

impl From<Node> for Element {
    fn from(v: Node) -> Self {
        Self::Node(v)
    }
}

/// A node of a specification tree.
///
/// # Examples
///
/// ```
/// use tri_core::build::*;
/// use tri_core::NodeKind;
///
/// let cmd = command("ctl")
///     .with(short('c'))
///     .with(brief("control the node"))
///     .with_action(|_| 0);
///
/// assert_eq!(cmd.kind, NodeKind::Command);
/// assert_eq!(cmd.name(), Some("ctl"));
/// assert_eq!(cmd.symbol(NodeKind::Short), Some('c'));
/// assert_eq!(cmd.text(NodeKind::Brief), Some("control the node"));
/// assert!(cmd.action().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Node {
    /// What this sequence is.
    pub kind: NodeKind,
    /// Ordered contents.
    pub elements: Vec<Element>,
}

impl Node {
    pub fn new(kind: NodeKind, elements: Vec<Element>) -> Self {
        Self { kind, elements }
    }

    /// Creates a node with no elements.
    pub fn empty(kind: NodeKind) -> Self {
        Self::new(kind, Vec::new())
    }

    /// Appends an element.
    pub fn with(mut self, element: impl Into<Element>) -> Self {
        self.elements.push(element.into());
        self
    }

    /// Appends a handler built from `f`.
    pub fn with_action(self, f: impl Fn(&Node) -> i32 + Send + Sync + 'static) -> Self {
        self.with(Action::new(f))
    }

    pub fn push(&mut self, element: impl Into<Element>) {
        self.elements.push(element.into());
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the name of an `Application`, `Command`, `Trigger` or `Var`.
    pub fn name(&self) -> Option<&str> {
        if !self.kind.is_named() {
            return None;
        }
        self.elements.first().and_then(Element::as_text)
    }

    /// Iterates over the nested nodes, in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.elements.iter().filter_map(Element::as_node)
    }

    /// Iterates over the nested nodes of one kind.
    pub fn children(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes().filter(move |n| n.kind == kind)
    }

    /// Returns the first nested node of `kind`.
    pub fn find(&self, kind: NodeKind) -> Option<&Node> {
        self.children(kind).next()
    }

    pub fn has(&self, kind: NodeKind) -> bool {
        self.find(kind).is_some()
    }

    /// Returns the string held by the first nested node of `kind`, e.g. the
    /// text of a `Brief` or the name in a `DefaultCommand`.
    pub fn text(&self, kind: NodeKind) -> Option<&str> {
        self.find(kind)?.elements.first()?.as_text()
    }

    /// Returns the symbol held by the first nested node of `kind`.
    pub fn symbol(&self, kind: NodeKind) -> Option<char> {
        match self.find(kind)?.elements.first()? {
            Element::Symbol(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the first non-nil handler.
    pub fn action(&self) -> Option<&Action> {
        self.elements.iter().find_map(|e| match e {
            Element::Action(Some(action)) => Some(action),
            _ => None,
        })
    }

    /// Iterates over the commands of an `Application`.
    pub fn commands(&self) -> impl Iterator<Item = &Node> {
        self.find(NodeKind::Commands)
            .into_iter()
            .flat_map(|c| c.children(NodeKind::Command))
    }

    /// Finds a command of an `Application` by name.
    pub fn find_command(&self, name: &str) -> Option<&Node> {
        self.commands().find(|c| c.name() == Some(name))
    }

    pub fn vars(&self) -> impl Iterator<Item = &Node> {
        self.children(NodeKind::Var)
    }

    pub fn triggers(&self) -> impl Iterator<Item = &Node> {
        self.children(NodeKind::Trigger)
    }

    /// Returns the value declared in a `Var`'s `Default`.
    pub fn default_value(&self) -> Option<&Value> {
        match self.find(NodeKind::Default)?.elements.first()? {
            Element::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Iterates over the targets of a `Var`'s `Slot`.
    pub fn slot_targets(&self) -> impl Iterator<Item = &Target> {
        self.find(NodeKind::Slot)
            .into_iter()
            .flat_map(|slot| slot.elements.iter())
            .filter_map(|e| match e {
                Element::Target(t) => Some(t),
                _ => None,
            })
    }

    /// Returns the value type of a `Var`'s `Slot`.
    pub fn slot_type(&self) -> Option<ValueType> {
        self.slot_targets().next().map(Target::value_type)
    }

    /// Formats an `Application`'s `Version` as `major.minor.patch[-tag]`.
    pub fn version_string(&self) -> Option<String> {
        let version = self.find(NodeKind::Version)?;
        let parts = version
            .elements
            .iter()
            .take(3)
            .map(|e| e.as_integer().map(|n| n.to_string()))
            .collect::<Option<Vec<_>>>()?;
        if parts.len() < 3 {
            return None;
        }
        let mut out = parts.join(".");
        if let Some(tag) = version.elements.get(3).and_then(Element::as_text) {
            if !tag.is_empty() {
                out.push('-');
                out.push_str(tag);
            }
        }
        Some(out)
    }

    /// Validates this node and its subtree with the default policy.
    pub fn validate(&self) -> Result<(), crate::ValidationError> {
        crate::validate(self)
    }
}

/// Constructors for every node kind, named after the kinds they build.
///
/// Intended for glob import where a specification tree is declared:
///
/// ```
/// use tri_core::build::*;
///
/// let app = application("appname")
///     .with(brief("an example application"))
///     .with(version(0, 1, 1).with("alpha"))
///     .with(commands([command("ctl")
///         .with(brief("control"))
///         .with_action(|_| 0)]));
///
/// assert!(app.validate().is_ok());
/// assert_eq!(app.version_string().as_deref(), Some("0.1.1-alpha"));
/// ```
pub mod build {
    use super::{Element, Node, NodeKind};
    use crate::slot::Target;
    use crate::value::Value;

    fn named(kind: NodeKind, name: &str) -> Node {
        Node::new(kind, vec![name.into()])
    }

    fn text(kind: NodeKind, s: &str) -> Node {
        Node::new(kind, vec![s.into()])
    }

    pub fn application(name: &str) -> Node {
        named(NodeKind::Application, name)
    }

    pub fn command(name: &str) -> Node {
        named(NodeKind::Command, name)
    }

    pub fn trigger(name: &str) -> Node {
        named(NodeKind::Trigger, name)
    }

    pub fn var(name: &str) -> Node {
        named(NodeKind::Var, name)
    }

    pub fn brief(s: &str) -> Node {
        text(NodeKind::Brief, s)
    }

    pub fn usage(s: &str) -> Node {
        text(NodeKind::Usage, s)
    }

    pub fn help(s: &str) -> Node {
        text(NodeKind::Help, s)
    }

    pub fn group(name: &str) -> Node {
        text(NodeKind::Group, name)
    }

    pub fn default_command(name: &str) -> Node {
        text(NodeKind::DefaultCommand, name)
    }

    pub fn short(symbol: char) -> Node {
        Node::new(NodeKind::Short, vec![symbol.into()])
    }

    /// A three-component `Version`; chain `.with("tag")` for a build tag.
    pub fn version(major: i64, minor: i64, patch: i64) -> Node {
        Node::new(
            NodeKind::Version,
            vec![major.into(), minor.into(), patch.into()],
        )
    }

    pub fn default(value: impl Into<Value>) -> Node {
        Node::new(NodeKind::Default, vec![Element::Value(value.into())])
    }

    pub fn default_on() -> Node {
        Node::empty(NodeKind::DefaultOn)
    }

    pub fn terminates() -> Node {
        Node::empty(NodeKind::Terminates)
    }

    pub fn run_after() -> Node {
        Node::empty(NodeKind::RunAfter)
    }

    /// An `Examples` node from (snippet, explanation) pairs.
    pub fn examples(pairs: &[(&str, &str)]) -> Node {
        let elements = pairs
            .iter()
            .flat_map(|(snippet, explanation)| {
                [Element::from(*snippet), Element::from(*explanation)]
            })
            .collect();
        Node::new(NodeKind::Examples, elements)
    }

    pub fn slot(targets: impl IntoIterator<Item = Target>) -> Node {
        Node::new(
            NodeKind::Slot,
            targets.into_iter().map(Element::Target).collect(),
        )
    }

    pub fn commands(commands: impl IntoIterator<Item = Node>) -> Node {
        Node::new(
            NodeKind::Commands,
            commands.into_iter().map(Element::Node).collect(),
        )
    }
}
