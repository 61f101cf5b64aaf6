//! Derived components resolved through the global catalog.

use std::sync::Arc;

use kiln::prelude::*;

pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str) -> String;
}

pub trait AuditSink: Send + Sync {}

kiln::capability!(AuditSink);

#[derive(kiln::Component)]
struct MailConfig {
    sender: String,
}

#[derive(kiln::Component)]
#[component(implements(Notifier))]
struct EmailNotifier {
    config: Arc<MailConfig>,
}

impl Notifier for EmailNotifier {
    fn notify(&self, message: &str) -> String {
        format!("mail from {}: {message}", self.config.sender)
    }
}

#[derive(kiln::Component)]
#[component(name = "pager", implements(Notifier))]
struct Pager;

impl Notifier for Pager {
    fn notify(&self, message: &str) -> String {
        format!("page: {message}")
    }
}

#[derive(kiln::Component)]
struct Alerts {
    notifier: Arc<dyn Notifier>,
    #[component(optional, hint = 2)]
    threshold: u32,
}

#[derive(kiln::Component)]
struct Ledger(Arc<MailConfig>, String);

#[derive(kiln::Component)]
struct Auditor {
    #[allow(dead_code)]
    sink: Arc<dyn AuditSink>,
}

#[derive(kiln::Component)]
#[component(name = "primary_store")]
struct RecordStore;

#[derive(kiln::Component)]
struct Reports {
    store: Arc<RecordStore>,
}

#[derive(kiln::Component)]
struct Greeting {
    text: Option<String>,
}

fn mail_stack() -> Container {
    let mut container = Container::new();
    container.set_auto_wiring(true);
    container
        .register("MailConfig", [Hint::text("ops@example.org")])
        .unwrap();
    container.register("EmailNotifier", Hints::new()).unwrap();
    container.register("Alerts", Hints::new()).unwrap();
    container
}

#[test]
fn derived_components_are_auto_wired() {
    let mut container = mail_stack();
    container.build().unwrap();

    let alerts: Arc<Alerts> = container.get("Alerts").unwrap();
    assert_eq!(
        alerts.notifier.notify("disk full"),
        "mail from ops@example.org: disk full"
    );
    assert_eq!(alerts.threshold, 0);
}

#[test]
fn field_hints_apply_with_annotation_support() {
    let mut container = mail_stack();
    container.set_annotation_support(true);
    container.build().unwrap();

    let alerts: Arc<Alerts> = container.get("Alerts").unwrap();
    assert_eq!(alerts.threshold, 2);
}

#[test]
fn second_implementer_makes_capability_ambiguous() {
    let mut container = mail_stack();
    container.register("pager", Hints::new()).unwrap();

    match container.build() {
        Err(KilnError::AmbiguousImplementation(err)) => {
            assert_eq!(err.capability, "Notifier");
            assert_eq!(err.candidates, vec!["EmailNotifier", "pager"]);
        }
        other => panic!("Expected AmbiguousImplementation, got: {other:?}"),
    }
}

#[test]
fn explicit_identity_selects_an_implementer() {
    let mut container = mail_stack();
    container.register("pager", Hints::new()).unwrap();
    container.register("Alerts", [Hint::name("pager")]).unwrap();
    container.build().unwrap();

    let alerts: Arc<Alerts> = container.get("Alerts").unwrap();
    assert_eq!(alerts.notifier.notify("disk full"), "page: disk full");
}

#[test]
fn tuple_struct_takes_positional_hints() {
    let mut container = Container::new();
    container.register("MailConfig", [Hint::text("billing@example.org")]).unwrap();
    container
        .register("Ledger", [Hint::name("MailConfig"), Hint::text("EUR")])
        .unwrap();
    container.build().unwrap();

    let ledger: Arc<Ledger> = container.get("Ledger").unwrap();
    assert_eq!(ledger.0.sender, "billing@example.org");
    assert_eq!(ledger.1, "EUR");
}

#[test]
fn declared_capability_without_implementers() {
    let mut container = Container::new();
    container.set_auto_wiring(true);
    container.register("Auditor", Hints::new()).unwrap();

    match container.build() {
        Err(KilnError::NoImplementation(err)) => {
            assert_eq!(err.capability, "AuditSink");
            assert!(err.auto_wiring);
        }
        other => panic!("Expected NoImplementation, got: {other:?}"),
    }
}

#[test]
fn global_catalog_collects_derived_shapes() {
    let catalog = Catalog::global();

    assert!(catalog.is_component("MailConfig"));
    assert!(catalog.is_component("pager"));
    assert!(!catalog.is_component("Pager"));
    assert!(catalog.is_capability("Notifier"));
    assert!(catalog.is_capability("AuditSink"));
}

#[test]
fn renamed_component_is_wired_by_type() {
    let mut container = Container::new();
    container.set_auto_wiring(true);
    container.register("Reports", Hints::new()).unwrap();
    container.register("primary_store", Hints::new()).unwrap();
    container.build().unwrap();

    let reports: Arc<Reports> = container.get("Reports").unwrap();
    let store: Arc<RecordStore> = container.get("primary_store").unwrap();
    assert!(Arc::ptr_eq(&reports.store, &store));
}

#[test]
fn option_field_without_hint_is_none() {
    let mut container = Container::new();
    container.set_auto_wiring(true);
    container.register("Greeting", Hints::new()).unwrap();
    container.build().unwrap();

    assert_eq!(container.get::<Greeting>("Greeting").unwrap().text, None);

    container.register("Greeting", [Hint::text("hello")]).unwrap();
    container.build().unwrap();
    assert_eq!(
        container.get::<Greeting>("Greeting").unwrap().text.as_deref(),
        Some("hello")
    );
}
