//! Shapes shared by the unit tests: a small mail stack plus generic nodes.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::container::Container;
use crate::instance::Arguments;
use crate::shape::ComponentShape;

pub trait Transport: Send + Sync {
    fn describe(&self) -> String;
}

pub struct Config {
    pub sender: String,
}

pub struct Smtp {
    pub config: Arc<Config>,
}

impl Transport for Smtp {
    fn describe(&self) -> String {
        format!("smtp as {}", self.config.sender)
    }
}

pub struct Sendmail;

impl Transport for Sendmail {
    fn describe(&self) -> String {
        "sendmail".into()
    }
}

pub struct Mailer {
    pub transport: Arc<dyn Transport>,
    pub retries: u32,
}

/// Accepts any arguments and keeps them.
pub struct Node {
    pub name: String,
    pub arguments: Arguments,
}

impl Transport for Node {
    fn describe(&self) -> String {
        format!("node {}", self.name)
    }
}

fn config() -> ComponentShape {
    ComponentShape::builder::<Config>("Config")
        .param(None)
        .constructor(|args| Ok(Config { sender: args.get(0)? }))
        .build()
}

fn smtp() -> ComponentShape {
    ComponentShape::builder::<Smtp>("Smtp")
        .param(Some("Config"))
        .implements::<dyn Transport>("Transport", |smtp| smtp)
        .constructor(|args| Ok(Smtp { config: args.get(0)? }))
        .build()
}

fn sendmail() -> ComponentShape {
    ComponentShape::builder::<Sendmail>("Sendmail")
        .implements::<dyn Transport>("Transport", |sendmail| sendmail)
        .constructor(|_| Ok(Sendmail))
        .build()
}

fn mailer() -> ComponentShape {
    ComponentShape::builder::<Mailer>("Mailer")
        .param(Some("Transport"))
        .optional_param(None)
        .annotate(1, 3)
        .constructor(|args| {
            Ok(Mailer {
                transport: args.get(0)?,
                retries: args.get_or_default(1)?,
            })
        })
        .build()
}

/// A node requiring `required` arguments.
pub fn node(identity: &'static str, required: usize) -> ComponentShape {
    (0..required)
        .fold(ComponentShape::builder::<Node>(identity), |builder, _| builder.param(None))
        .constructor(move |args| {
            Ok(Node {
                name: identity.to_owned(),
                arguments: args.clone(),
            })
        })
        .build()
}

/// A node that also implements `Transport`.
pub fn transport_node(identity: &'static str) -> ComponentShape {
    implementor(identity, "Transport")
}

/// A node registered as implementing `capability`, viewed as a `Transport`.
pub fn implementor(identity: &'static str, capability: &'static str) -> ComponentShape {
    ComponentShape::builder::<Node>(identity)
        .implements::<dyn Transport>(capability, |node| node)
        .constructor(move |args| {
            Ok(Node {
                name: identity.to_owned(),
                arguments: args.clone(),
            })
        })
        .build()
}

pub fn catalog() -> Catalog {
    Catalog::builder()
        .component(config())
        .component(smtp())
        .component(sendmail())
        .component(mailer())
        .component(node("A", 0))
        .component(node("B", 0))
        .component(node("C", 0))
        .component(node("Z", 0))
        .component(node("Pair", 2))
        .component(transport_node("Relay"))
        .component(implementor("Link1", "Stage1"))
        .component(implementor("Link2", "Stage2"))
        .component(implementor("Link3", "Stage3"))
        .component(ComponentShape::builder::<Node>("Sealed").build())
        .capability("Clock")
        .build()
}

pub fn container() -> Container {
    Container::with_introspector(Arc::new(catalog()))
}
