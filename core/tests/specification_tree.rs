use std::time::Duration;

use tri_core::build::*;
use tri_core::{
    DefaultsReport, Element, ElementKind, Node, NodeKind, Outline, Shared, Target,
    ValidationError, ValidationPolicy, Validator, ValueType, apply_all_defaults, shared,
    validate,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Config {
    datadir: Shared<String>,
    ctl_datadir: Shared<String>,
    timeout: Shared<Duration>,
}

impl Config {
    fn new() -> Self {
        Self {
            datadir: shared("/not/the/default/path".to_string()),
            ctl_datadir: shared("/not/the/default/path".to_string()),
            timeout: shared(Duration::ZERO),
        }
    }
}

fn sample_tree(cfg: &Config) -> Node {
    application("appname")
        .with(brief("brief"))
        .with(version(0, 1, 1).with("alpha"))
        .with(default_command("ctl"))
        .with(
            var("datadir")
                .with(short('d'))
                .with(brief("brief"))
                .with(usage("usage"))
                .with(help("help"))
                .with(default("~/.pod"))
                .with(slot([Target::bind(&cfg.datadir)])),
        )
        .with(
            trigger("init")
                .with(short('I'))
                .with(brief("brief"))
                .with(usage("usage"))
                .with(help("help"))
                .with(default_on())
                .with(run_after())
                .with_action(|_| 0),
        )
        .with(commands([
            command("ctl")
                .with(short('c'))
                .with(brief("brief"))
                .with(usage("usage"))
                .with(help("help"))
                .with(examples(&[
                    ("example 1", "explaining text"),
                    ("example 2", "explaining text"),
                ]))
                .with(
                    var("datadir")
                        .with(short('d'))
                        .with(brief("brief"))
                        .with(default("~/.pod"))
                        .with(group("groupname"))
                        .with(slot([
                            Target::bind(&cfg.datadir),
                            Target::bind(&cfg.ctl_datadir),
                        ])),
                )
                .with(
                    var("timeout")
                        .with(brief("how long to wait"))
                        .with(default(Duration::from_secs(30)))
                        .with(slot([Target::bind(&cfg.timeout)])),
                )
                .with(
                    trigger("wallet")
                        .with(short('w'))
                        .with(brief("brief"))
                        .with(default_on())
                        .with(terminates())
                        .with_action(|_| 0),
                )
                .with_action(|_| 0),
            command("node")
                .with(short('n'))
                .with(brief("brief"))
                .with(usage("usage"))
                .with(help("help"))
                .with(examples(&[("example", "example")]))
                .with_action(|_| 0),
        ]))
}

/// Returns the tree with its element at `index` replaced.
fn replace(mut tree: Node, index: usize, element: impl Into<Element>) -> Node {
    tree.elements[index] = element.into();
    tree
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn test_sample_tree_is_valid() {
    let cfg = Config::new();
    assert_eq!(validate(&sample_tree(&cfg)), Ok(()));
}

#[test]
fn test_validation_is_idempotent() {
    let cfg = Config::new();
    let tree = sample_tree(&cfg);
    let first = validate(&tree);
    let second = validate(&tree);
    assert_eq!(first, second);
    assert!(first.is_ok());
}

#[test]
fn test_validation_does_not_write_slots() {
    let cfg = Config::new();
    validate(&sample_tree(&cfg)).unwrap();
    assert_eq!(*cfg.datadir.lock().unwrap(), "/not/the/default/path");
}

#[test]
fn test_missing_mandatory_kinds_are_named() {
    let cfg = Config::new();
    for (index, kind) in [(1, NodeKind::Brief), (2, NodeKind::Version)] {
        let mut tree = sample_tree(&cfg);
        tree.elements.remove(index);
        assert_eq!(
            validate(&tree),
            Err(ValidationError::MissingNode {
                container: NodeKind::Application,
                kind,
            })
        );
    }

    let mut tree = sample_tree(&cfg);
    tree.elements.pop();
    let err = validate(&tree).unwrap_err();
    assert_eq!(err.to_string(), "Application is missing its Commands");
}

#[test]
fn test_unknown_default_command() {
    let cfg = Config::new();
    let tree = replace(sample_tree(&cfg), 3, default_command("wallet"));
    assert_eq!(
        validate(&tree),
        Err(ValidationError::UnknownDefaultCommand {
            name: "wallet".into()
        })
    );
}

#[test]
fn test_error_deep_in_tree_reports_path() {
    let cfg = Config::new();
    let mut tree = sample_tree(&cfg);

    // ctl's datadir slot gets a boolean target next to the string ones.
    let Some(Element::Node(commands)) = tree.elements.last_mut() else {
        panic!("sample tree ends with Commands");
    };
    let Element::Node(ctl) = &mut commands.elements[0] else {
        panic!("first command is a node");
    };
    let Element::Node(datadir) = &mut ctl.elements[6] else {
        panic!("ctl element 6 is the datadir Var");
    };
    let Element::Node(slot) = &mut datadir.elements[5] else {
        panic!("datadir element 5 is the Slot");
    };
    slot.push(Target::bind(&shared(false)));

    let err = validate(&tree).unwrap_err();
    assert_eq!(
        err.path(),
        vec![
            (NodeKind::Application, 6),
            (NodeKind::Commands, 0),
            (NodeKind::Command, 6),
            (NodeKind::Var, 5),
        ]
    );
    assert_eq!(
        err.root_cause(),
        &ValidationError::SlotTypeMismatch {
            index: 2,
            expected: ValueType::Text,
            found: ValueType::Bool,
        }
    );
}

#[test]
fn test_foreign_element_in_application() {
    let cfg = Config::new();
    let tree = sample_tree(&cfg).with(slot([Target::bind(&cfg.datadir)]));
    assert_eq!(
        validate(&tree),
        Err(ValidationError::Unexpected {
            container: NodeKind::Application,
            index: 7,
            found: ElementKind::Node(NodeKind::Slot),
        })
    );
}

#[test]
fn test_policy_changes_outcome() {
    let cfg = Config::new();
    let tree = sample_tree(&cfg);

    // "ctl" and "init" are too short once names need five letters.
    let strict = Validator::new(ValidationPolicy::default().with_min_name_len(5));
    let err = strict.validate(&tree).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        ValidationError::NameTooShort { name, min: 5, .. } if name == "init"
    ));
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[test]
fn test_apply_all_defaults_fills_shared_slots() {
    let cfg = Config::new();
    let tree = sample_tree(&cfg);
    validate(&tree).unwrap();

    let report = apply_all_defaults(&tree).unwrap();
    assert_eq!(
        report,
        DefaultsReport {
            vars_found: 3,
            filled: 3,
        }
    );
    assert_eq!(*cfg.datadir.lock().unwrap(), "~/.pod");
    assert_eq!(*cfg.ctl_datadir.lock().unwrap(), "~/.pod");
    assert_eq!(*cfg.timeout.lock().unwrap(), Duration::from_secs(30));
}

#[test]
fn test_apply_defaults_twice_yields_same_contents() {
    let cfg = Config::new();
    let tree = sample_tree(&cfg);

    apply_all_defaults(&tree).unwrap();
    let first = (
        cfg.datadir.lock().unwrap().clone(),
        cfg.ctl_datadir.lock().unwrap().clone(),
        *cfg.timeout.lock().unwrap(),
    );
    apply_all_defaults(&tree).unwrap();
    let second = (
        cfg.datadir.lock().unwrap().clone(),
        cfg.ctl_datadir.lock().unwrap().clone(),
        *cfg.timeout.lock().unwrap(),
    );
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Outline
// ---------------------------------------------------------------------------

#[test]
fn test_outline_of_sample_tree() {
    let cfg = Config::new();
    let outline = Outline::from_tree(&sample_tree(&cfg));

    assert_eq!(outline.name, "appname");
    assert_eq!(outline.version.as_deref(), Some("0.1.1-alpha"));
    assert_eq!(outline.default_command.as_deref(), Some("ctl"));
    assert_eq!(outline.commands.len(), 2);

    let ctl = outline.command("ctl").unwrap();
    assert!(ctl.is_default);
    assert_eq!(ctl.vars.len(), 2);
    assert_eq!(ctl.vars[0].targets, 2);
    assert_eq!(ctl.vars[1].value_type, Some(ValueType::Duration));
    assert!(ctl.triggers[0].terminates);
    assert!(!outline.command("node").unwrap().is_default);
}
