//! Specification tree validation.
//!
//! Validation walks the whole tree and stops at the first violation. A
//! failure inside a child is wrapped in [`ValidationError::Within`] with the
//! parent kind and the child's element index, so the returned error carries
//! the path from the node that was validated down to the offending element.
//!
//! Indexes are positions in the parent's element sequence, counting the name
//! at index 0.
//!
//! # Examples
//!
//! ```
//! use tri_core::build::*;
//! use tri_core::{NodeKind, ValidationError, validate};
//!
//! assert!(validate(&version(0, 1, 1).with("alpha")).is_ok());
//! assert!(validate(&version(100, 1, 1)).is_err());
//!
//! // Missing mandatory parts are named.
//! let app = application("appname").with(brief("brief"));
//! assert_eq!(
//!     validate(&app),
//!     Err(ValidationError::MissingNode {
//!         container: NodeKind::Application,
//!         kind: NodeKind::Version,
//!     })
//! );
//! ```

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;
use tracing::{debug, trace};
use unicode_general_category::{GeneralCategory, get_general_category};

use crate::node::{Element, ElementKind, Node, NodeKind};
use crate::policy::ValidationPolicy;
use crate::value::ValueType;

/// Permitted number of elements in a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    Between(usize, usize),
    AtLeast(usize),
    /// An even number, at least the given count.
    EvenAtLeast(usize),
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(n) => write!(f, "exactly {n}"),
            Self::Between(lo, hi) => write!(f, "{lo} to {hi}"),
            Self::AtLeast(n) => write!(f, "at least {n}"),
            Self::EvenAtLeast(n) => write!(f, "an even number (at least {n}) of"),
        }
    }
}

/// Declaration errors found by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A failure inside the child at `index` of a `kind` node.
    #[error("{kind} element {index}: {source}")]
    Within {
        kind: NodeKind,
        index: usize,
        source: Box<ValidationError>,
    },
    /// Wrong number of elements.
    #[error("{kind} must contain {expected} element(s), found {found}")]
    Count {
        kind: NodeKind,
        expected: Arity,
        found: usize,
    },
    /// A named node without any elements.
    #[error("{kind} is missing its name")]
    MissingName { kind: NodeKind },
    /// An element of the wrong kind at a fixed position.
    #[error("{kind} element {index} must be {expected}, found {found}")]
    WrongElement {
        kind: NodeKind,
        index: usize,
        expected: &'static str,
        found: ElementKind,
    },
    /// A one-line text longer than the policy allows.
    #[error("{kind} element {index} is {len} characters long, may not be longer than {max}")]
    TextTooLong {
        kind: NodeKind,
        index: usize,
        len: usize,
        max: usize,
    },
    /// A one-line text containing a control character.
    #[error("{kind} element {index} contains a control character at position {position}")]
    ControlCharacter {
        kind: NodeKind,
        index: usize,
        position: usize,
    },
    /// A name containing something other than letters.
    #[error("{kind} name {name:?} contains non-letter {found:?} at position {position}")]
    NameNotLetters {
        kind: NodeKind,
        name: String,
        position: usize,
        found: char,
    },
    /// A name shorter than the policy allows.
    #[error("{kind} name {name:?} is shorter than {min} characters")]
    NameTooShort {
        kind: NodeKind,
        name: String,
        min: usize,
    },
    /// A version number outside `0..=max`.
    #[error("Version element {index} is {value}, must be between 0 and {max}")]
    VersionOutOfRange { index: usize, value: i64, max: i64 },
    /// A version build tag with a character that is not a letter or digit.
    #[error("Version tag {tag:?} contains {found:?} at position {position}, only letters and digits are allowed")]
    VersionTag {
        tag: String,
        position: usize,
        found: char,
    },
    /// A second occurrence of a kind that may appear once.
    #[error("{container} contains more than one {kind}, second found at index {index}")]
    Duplicate {
        container: NodeKind,
        kind: NodeKind,
        index: usize,
    },
    /// A mandatory node kind is absent.
    #[error("{container} is missing its {kind}")]
    MissingNode {
        container: NodeKind,
        kind: NodeKind,
    },
    /// A `Command` or `Trigger` without a handler.
    #[error("{container} is missing its action")]
    MissingAction { container: NodeKind },
    /// A nil handler.
    #[error("{container} action at index {index} may not be nil")]
    NilAction { container: NodeKind, index: usize },
    /// A second handler.
    #[error("{container} contains more than one action, second found at index {index}")]
    DuplicateAction { container: NodeKind, index: usize },
    /// An element kind the container does not permit.
    #[error("{container} may not contain a {found}, found at index {index}")]
    Unexpected {
        container: NodeKind,
        index: usize,
        found: ElementKind,
    },
    /// Two siblings of the same kind sharing a name.
    #[error("{container} contains more than one {kind} named {name:?}")]
    DuplicateName {
        container: NodeKind,
        kind: NodeKind,
        name: String,
    },
    /// Slot targets of differing value types.
    #[error("Slot contains more than one type of target, found {found} at index {index} after {expected}")]
    SlotTypeMismatch {
        index: usize,
        expected: ValueType,
        found: ValueType,
    },
    /// A `Default` that cannot be stored in the `Var`'s `Slot`.
    #[error("Default of type {found} cannot be stored in a {slot} Slot")]
    DefaultTypeMismatch { found: ElementKind, slot: ValueType },
    /// A `DefaultCommand` naming no sibling command.
    #[error("DefaultCommand {name:?} does not name a command in Commands")]
    UnknownDefaultCommand { name: String },
}

impl ValidationError {
    /// Returns the (container kind, element index) chain leading to the
    /// innermost error, outermost first.
    ///
    /// # Examples
    ///
    /// ```
    /// use tri_core::build::*;
    /// use tri_core::{NodeKind, validate};
    ///
    /// let app = application("appname")
    ///     .with(brief("brief"))
    ///     .with(version(0, 1, 0))
    ///     .with(commands([command("ctl").with(brief("x\ty")).with_action(|_| 0)]));
    ///
    /// let err = validate(&app).unwrap_err();
    /// assert_eq!(
    ///     err.path(),
    ///     vec![(NodeKind::Application, 3), (NodeKind::Commands, 0), (NodeKind::Command, 1)]
    /// );
    /// ```
    pub fn path(&self) -> Vec<(NodeKind, usize)> {
        let mut path = Vec::new();
        let mut current = self;
        while let Self::Within {
            kind,
            index,
            source,
        } = current
        {
            path.push((*kind, *index));
            current = source.as_ref();
        }
        path
    }

    /// Returns the innermost error, without positional wrapping.
    pub fn root_cause(&self) -> &ValidationError {
        let mut current = self;
        while let Self::Within { source, .. } = current {
            current = source.as_ref();
        }
        current
    }
}

/// Convenience alias for validation results.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Which children a composite node kind accepts.
struct Rules {
    container: NodeKind,
    /// Must appear exactly once.
    required: &'static [NodeKind],
    /// May appear at most once.
    optional: &'static [NodeKind],
    /// May appear any number of times.
    repeated: &'static [NodeKind],
    /// Whether exactly one non-nil action is required.
    action: bool,
}

const APPLICATION: Rules = Rules {
    container: NodeKind::Application,
    required: &[NodeKind::Brief, NodeKind::Version, NodeKind::Commands],
    optional: &[NodeKind::Usage, NodeKind::DefaultCommand],
    repeated: &[NodeKind::Var, NodeKind::Trigger],
    action: false,
};

const COMMAND: Rules = Rules {
    container: NodeKind::Command,
    required: &[NodeKind::Brief],
    optional: &[
        NodeKind::Short,
        NodeKind::Usage,
        NodeKind::Help,
        NodeKind::Examples,
        NodeKind::Group,
    ],
    repeated: &[NodeKind::Var, NodeKind::Trigger],
    action: true,
};

const TRIGGER: Rules = Rules {
    container: NodeKind::Trigger,
    required: &[NodeKind::Brief],
    optional: &[
        NodeKind::Short,
        NodeKind::Usage,
        NodeKind::Help,
        NodeKind::DefaultOn,
        NodeKind::Terminates,
        NodeKind::RunAfter,
    ],
    repeated: &[],
    action: true,
};

const VAR: Rules = Rules {
    container: NodeKind::Var,
    required: &[NodeKind::Brief, NodeKind::Slot],
    optional: &[
        NodeKind::Short,
        NodeKind::Usage,
        NodeKind::Help,
        NodeKind::Default,
        NodeKind::Group,
    ],
    repeated: &[],
    action: false,
};

/// Validates specification trees against a [`ValidationPolicy`].
#[derive(Debug, Clone, Default)]
pub struct Validator {
    policy: ValidationPolicy,
}

/// Validates `node` and its subtree with the default policy.
pub fn validate(node: &Node) -> Result<()> {
    Validator::default().validate(node)
}

impl Validator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    /// Validates `node` and its subtree, returning the first violation.
    pub fn validate(&self, node: &Node) -> Result<()> {
        let result = self.check(node);
        if let Err(err) = &result {
            debug!(kind = %node.kind, name = node.name(), error = %err, "specification rejected");
        }
        result
    }

    fn check(&self, node: &Node) -> Result<()> {
        match node.kind {
            NodeKind::Application => self.check_application(node),
            NodeKind::Command => self.check_composite(node, &COMMAND),
            NodeKind::Trigger => self.check_composite(node, &TRIGGER),
            NodeKind::Var => self.check_var(node),
            NodeKind::Commands => self.check_commands(node),
            NodeKind::Brief | NodeKind::Usage => {
                let text = self.single_text(node)?;
                self.check_line(node.kind, 0, text, self.policy.max_text_len)
            }
            NodeKind::Help => self.single_text(node).map(drop),
            NodeKind::Group | NodeKind::DefaultCommand => {
                let name = self.single_text(node)?;
                self.check_name(node.kind, name)
            }
            NodeKind::Short => match exactly_one(node)? {
                Element::Symbol(_) => Ok(()),
                other => Err(wrong(node.kind, 0, "a symbol", other)),
            },
            NodeKind::Default => exactly_one(node).map(drop),
            NodeKind::DefaultOn | NodeKind::Terminates | NodeKind::RunAfter => {
                expect_count(node, Arity::Exactly(0), node.is_empty())
            }
            NodeKind::Version => self.check_version(node),
            NodeKind::Examples => self.check_examples(node),
            NodeKind::Slot => check_slot(node).map(drop),
        }
    }

    /// Validates the child at `index` of `parent`, wrapping any failure with
    /// its position.
    fn check_child(&self, parent: NodeKind, index: usize, child: &Node) -> Result<()> {
        self.check(child).map_err(|source| ValidationError::Within {
            kind: parent,
            index,
            source: Box::new(source),
        })
    }

    fn check_application(&self, node: &Node) -> Result<()> {
        self.check_composite(node, &APPLICATION)?;

        if let Some(name) = node.text(NodeKind::DefaultCommand) {
            if node.find_command(name).is_none() {
                return Err(ValidationError::UnknownDefaultCommand {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_var(&self, node: &Node) -> Result<()> {
        self.check_composite(node, &VAR)?;

        // Both were checked above; the Slot is non-empty and uniform.
        let Some(slot_type) = node.slot_type() else {
            return Ok(());
        };
        let Some(default) = node.find(NodeKind::Default) else {
            return Ok(());
        };
        match default.elements.first() {
            Some(Element::Value(v)) if v.value_type() == slot_type => Ok(()),
            Some(other) => Err(ValidationError::DefaultTypeMismatch {
                found: other.kind(),
                slot: slot_type,
            }),
            None => Ok(()),
        }
    }

    fn check_commands(&self, node: &Node) -> Result<()> {
        trace!(elements = node.len(), "validating Commands");
        let mut names = HashSet::new();
        for (index, element) in node.elements.iter().enumerate() {
            match element {
                Element::Node(command) if command.kind == NodeKind::Command => {
                    self.check_child(NodeKind::Commands, index, command)?;
                    if let Some(name) = command.name() {
                        if !names.insert(name) {
                            return Err(ValidationError::DuplicateName {
                                container: NodeKind::Commands,
                                kind: NodeKind::Command,
                                name: name.to_string(),
                            });
                        }
                    }
                }
                other => {
                    return Err(ValidationError::Unexpected {
                        container: NodeKind::Commands,
                        index,
                        found: other.kind(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Checks the name at index 0, then dispatches every remaining element
    /// according to `rules`.
    fn check_composite(&self, node: &Node, rules: &Rules) -> Result<()> {
        let container = rules.container;
        trace!(kind = %container, name = node.name(), elements = node.len(), "validating node");

        let name = match node.elements.first() {
            None => return Err(ValidationError::MissingName { kind: container }),
            Some(element) => element
                .as_text()
                .ok_or_else(|| wrong(container, 0, "a name string", element))?,
        };
        self.check_name(container, name)?;

        let mut seen: Vec<NodeKind> = Vec::with_capacity(rules.required.len());
        let mut names: HashSet<(NodeKind, &str)> = HashSet::new();
        let mut has_action = false;

        for (index, element) in node.elements.iter().enumerate().skip(1) {
            match element {
                Element::Node(child)
                    if rules.required.contains(&child.kind)
                        || rules.optional.contains(&child.kind) =>
                {
                    if seen.contains(&child.kind) {
                        return Err(ValidationError::Duplicate {
                            container,
                            kind: child.kind,
                            index,
                        });
                    }
                    seen.push(child.kind);
                    self.check_child(container, index, child)?;
                }
                Element::Node(child) if rules.repeated.contains(&child.kind) => {
                    self.check_child(container, index, child)?;
                    if let Some(child_name) = child.name() {
                        if !names.insert((child.kind, child_name)) {
                            return Err(ValidationError::DuplicateName {
                                container,
                                kind: child.kind,
                                name: child_name.to_string(),
                            });
                        }
                    }
                }
                Element::Action(action) if rules.action => {
                    if action.is_none() {
                        return Err(ValidationError::NilAction { container, index });
                    }
                    if has_action {
                        return Err(ValidationError::DuplicateAction { container, index });
                    }
                    has_action = true;
                }
                other => {
                    return Err(ValidationError::Unexpected {
                        container,
                        index,
                        found: other.kind(),
                    });
                }
            }
        }

        if let Some(kind) = rules.required.iter().find(|k| !seen.contains(*k)) {
            return Err(ValidationError::MissingNode {
                container,
                kind: *kind,
            });
        }
        if rules.action && !has_action {
            return Err(ValidationError::MissingAction { container });
        }
        Ok(())
    }

    fn check_version(&self, node: &Node) -> Result<()> {
        expect_count(
            node,
            Arity::Between(3, 4),
            (3..=4).contains(&node.len()),
        )?;

        let max = self.policy.max_version_component;
        for (index, element) in node.elements.iter().take(3).enumerate() {
            let n = element
                .as_integer()
                .ok_or_else(|| wrong(NodeKind::Version, index, "an integer", element))?;
            if !(0..=max).contains(&n) {
                return Err(ValidationError::VersionOutOfRange {
                    index,
                    value: n,
                    max,
                });
            }
        }

        if let Some(element) = node.elements.get(3) {
            let tag = element
                .as_text()
                .ok_or_else(|| wrong(NodeKind::Version, 3, "a string", element))?;
            if let Some((position, found)) =
                tag.chars().enumerate().find(|&(_, c)| !is_letter(c) && !is_digit(c))
            {
                return Err(ValidationError::VersionTag {
                    tag: tag.to_string(),
                    position,
                    found,
                });
            }
        }
        Ok(())
    }

    fn check_examples(&self, node: &Node) -> Result<()> {
        let len = node.len();
        expect_count(
            node,
            Arity::EvenAtLeast(2),
            len >= 2 && len % 2 == 0,
        )?;

        for (index, element) in node.elements.iter().enumerate() {
            let text = element
                .as_text()
                .ok_or_else(|| wrong(NodeKind::Examples, index, "a string", element))?;
            let max = if index % 2 == 0 {
                self.policy.max_snippet_len
            } else {
                self.policy.max_text_len
            };
            self.check_line(NodeKind::Examples, index, text, max)?;
        }
        Ok(())
    }

    fn single_text<'a>(&self, node: &'a Node) -> Result<&'a str> {
        let element = exactly_one(node)?;
        element
            .as_text()
            .ok_or_else(|| wrong(node.kind, 0, "a string", element))
    }

    /// One-line human-readable text: bounded length, no control characters.
    fn check_line(&self, kind: NodeKind, index: usize, text: &str, max: usize) -> Result<()> {
        let len = text.chars().count();
        if len > max {
            return Err(ValidationError::TextTooLong {
                kind,
                index,
                len,
                max,
            });
        }
        if let Some(position) = text.chars().position(char::is_control) {
            return Err(ValidationError::ControlCharacter {
                kind,
                index,
                position,
            });
        }
        Ok(())
    }

    /// Names are letters only and at least `min_name_len` long.
    fn check_name(&self, kind: NodeKind, name: &str) -> Result<()> {
        if let Some((position, found)) = name.chars().enumerate().find(|&(_, c)| !is_letter(c)) {
            return Err(ValidationError::NameNotLetters {
                kind,
                name: name.to_string(),
                position,
                found,
            });
        }
        if name.chars().count() < self.policy.min_name_len {
            return Err(ValidationError::NameTooShort {
                kind,
                name: name.to_string(),
                min: self.policy.min_name_len,
            });
        }
        Ok(())
    }
}

/// Letters are the `L*` general categories. Letter-numbers such as `Ⅻ` and
/// combining marks are not letters.
fn is_letter(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
    )
}

/// Decimal digits (`Nd`) only; `²` and `½` do not count.
fn is_digit(c: char) -> bool {
    matches!(get_general_category(c), GeneralCategory::DecimalNumber)
}

/// Checks that every element is a target of one value type and returns it.
fn check_slot(node: &Node) -> Result<ValueType> {
    expect_count(node, Arity::AtLeast(1), !node.is_empty())?;

    let mut expected = None;
    for (index, element) in node.elements.iter().enumerate() {
        let Element::Target(target) = element else {
            return Err(wrong(NodeKind::Slot, index, "a slot target", element));
        };
        let found = target.value_type();
        match expected {
            None => expected = Some(found),
            Some(expected) if expected != found => {
                return Err(ValidationError::SlotTypeMismatch {
                    index,
                    expected,
                    found,
                });
            }
            Some(_) => {}
        }
    }
    expected.ok_or(ValidationError::Count {
        kind: NodeKind::Slot,
        expected: Arity::AtLeast(1),
        found: 0,
    })
}

fn exactly_one(node: &Node) -> Result<&Element> {
    match node.elements.as_slice() {
        [element] => Ok(element),
        _ => Err(ValidationError::Count {
            kind: node.kind,
            expected: Arity::Exactly(1),
            found: node.len(),
        }),
    }
}

fn expect_count(node: &Node, expected: Arity, ok: bool) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(ValidationError::Count {
            kind: node.kind,
            expected,
            found: node.len(),
        })
    }
}

fn wrong(kind: NodeKind, index: usize, expected: &'static str, found: &Element) -> ValidationError {
    ValidationError::WrongElement {
        kind,
        index,
        expected,
        found: found.kind(),
    }
}
