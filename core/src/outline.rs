//! Serializable summary of a specification tree.
//!
//! Handlers and storage locations cannot be serialized, so an [`Outline`]
//! keeps only the declarative parts: names, text, version, the type and
//! default of each variable, trigger flags and commands. Build it from a
//! tree that passed validation; on a malformed tree missing parts are left
//! empty rather than reported.

use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeKind};
use crate::value::{Value, ValueType};

/// Summary of an `Application`.
///
/// # Examples
///
/// ```
/// use tri_core::build::*;
/// use tri_core::Outline;
///
/// let app = application("appname")
///     .with(brief("an example"))
///     .with(version(0, 1, 1).with("alpha"))
///     .with(default_command("ctl"))
///     .with(commands([command("ctl").with(brief("control")).with_action(|_| 0)]));
///
/// let outline = Outline::from_tree(&app);
/// assert_eq!(outline.version.as_deref(), Some("0.1.1-alpha"));
/// assert!(outline.commands[0].is_default);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub name: String,
    pub brief: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_command: Option<String>,
    #[serde(default)]
    pub vars: Vec<VarOutline>,
    #[serde(default)]
    pub triggers: Vec<TriggerOutline>,
    #[serde(default)]
    pub commands: Vec<CommandOutline>,
}

/// Summary of a `Var`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarOutline {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    pub brief: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub value_type: Option<ValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Number of storage locations in the slot.
    pub targets: usize,
}

/// Summary of a `Trigger`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerOutline {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    pub brief: Option<String>,
    pub default_on: bool,
    pub terminates: bool,
    pub run_after: bool,
}

/// An invocation snippet and its explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleOutline {
    pub snippet: String,
    pub explanation: String,
}

/// Summary of a `Command`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutline {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    pub brief: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<ExampleOutline>,
    #[serde(default)]
    pub vars: Vec<VarOutline>,
    #[serde(default)]
    pub triggers: Vec<TriggerOutline>,
    /// Whether the application's `DefaultCommand` names this command.
    pub is_default: bool,
}

impl Outline {
    pub fn from_tree(app: &Node) -> Self {
        let default_command = owned(app.text(NodeKind::DefaultCommand));
        let commands = app
            .commands()
            .map(|c| CommandOutline::from_node(c, default_command.as_deref()))
            .collect();
        Self {
            name: owned(app.name()).unwrap_or_default(),
            brief: owned(app.text(NodeKind::Brief)),
            usage: owned(app.text(NodeKind::Usage)),
            version: app.version_string(),
            default_command,
            vars: app.vars().map(VarOutline::from_node).collect(),
            triggers: app.triggers().map(TriggerOutline::from_node).collect(),
            commands,
        }
    }

    /// Finds a command by name.
    pub fn command(&self, name: &str) -> Option<&CommandOutline> {
        self.commands.iter().find(|c| c.name == name)
    }
}

impl VarOutline {
    fn from_node(var: &Node) -> Self {
        Self {
            name: owned(var.name()).unwrap_or_default(),
            short: var.symbol(NodeKind::Short),
            brief: owned(var.text(NodeKind::Brief)),
            group: owned(var.text(NodeKind::Group)),
            value_type: var.slot_type(),
            default: var.default_value().cloned(),
            targets: var.slot_targets().count(),
        }
    }
}

impl TriggerOutline {
    fn from_node(trigger: &Node) -> Self {
        Self {
            name: owned(trigger.name()).unwrap_or_default(),
            short: trigger.symbol(NodeKind::Short),
            brief: owned(trigger.text(NodeKind::Brief)),
            default_on: trigger.has(NodeKind::DefaultOn),
            terminates: trigger.has(NodeKind::Terminates),
            run_after: trigger.has(NodeKind::RunAfter),
        }
    }
}

impl CommandOutline {
    fn from_node(command: &Node, default_command: Option<&str>) -> Self {
        let name = owned(command.name()).unwrap_or_default();
        let examples = command
            .find(NodeKind::Examples)
            .map(|ex| {
                ex.elements
                    .chunks_exact(2)
                    .map(|pair| ExampleOutline {
                        snippet: pair[0].as_text().unwrap_or_default().to_string(),
                        explanation: pair[1].as_text().unwrap_or_default().to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            is_default: default_command == Some(name.as_str()),
            short: command.symbol(NodeKind::Short),
            brief: owned(command.text(NodeKind::Brief)),
            group: owned(command.text(NodeKind::Group)),
            examples,
            vars: command.vars().map(VarOutline::from_node).collect(),
            triggers: command.triggers().map(TriggerOutline::from_node).collect(),
            name,
        }
    }
}

fn owned(s: Option<&str>) -> Option<String> {
    s.map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::*;
    use crate::slot::{Target, shared};

    fn sample() -> Node {
        let datadir = shared(String::new());
        application("appname")
            .with(brief("brief"))
            .with(version(0, 1, 1))
            .with(
                var("datadir")
                    .with(short('d'))
                    .with(brief("data directory"))
                    .with(default("~/.pod"))
                    .with(slot([Target::bind(&datadir), Target::bind(&datadir)])),
            )
            .with(
                trigger("init")
                    .with(brief("initialise"))
                    .with(default_on())
                    .with(run_after())
                    .with_action(|_| 0),
            )
            .with(commands([
                command("ctl")
                    .with(brief("control"))
                    .with(group("admin"))
                    .with(examples(&[("ctl stop", "stops the node")]))
                    .with_action(|_| 0),
                command("node").with(brief("run")).with_action(|_| 0),
            ]))
    }

    #[test]
    fn test_outline_contents() {
        let outline = Outline::from_tree(&sample());

        assert_eq!(outline.name, "appname");
        assert_eq!(outline.version.as_deref(), Some("0.1.1"));
        assert_eq!(outline.default_command, None);

        let var = &outline.vars[0];
        assert_eq!(var.short, Some('d'));
        assert_eq!(var.value_type, Some(ValueType::Text));
        assert_eq!(var.default, Some(Value::from("~/.pod")));
        assert_eq!(var.targets, 2);

        let trigger = &outline.triggers[0];
        assert!(trigger.default_on);
        assert!(trigger.run_after);
        assert!(!trigger.terminates);

        let ctl = outline.command("ctl").unwrap();
        assert_eq!(ctl.group.as_deref(), Some("admin"));
        assert_eq!(
            ctl.examples,
            vec![ExampleOutline {
                snippet: "ctl stop".into(),
                explanation: "stops the node".into(),
            }]
        );
        assert!(!ctl.is_default);
        assert!(outline.command("wallet").is_none());
    }

    #[test]
    fn test_outline_json_shape() {
        let json = serde_json::to_value(Outline::from_tree(&sample())).unwrap();
        assert_eq!(json["vars"][0]["value_type"], "text");
        assert_eq!(json["vars"][0]["default"]["value"], "~/.pod");
        assert_eq!(json["commands"][1]["name"], "node");
        assert!(json.get("usage").is_none());
        assert!(json["commands"][1].get("examples").is_none());
    }
}
