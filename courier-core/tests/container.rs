//! Container: register, resolve, resolve_all order and lifetimes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use courier_core::{ContainerError, Inject, Lifetime, Scope, ServiceCollection, ServiceDescriptor};

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

struct English;
struct French;

impl Greeter for English {
    fn greet(&self) -> String {
        "hello".into()
    }
}

impl Greeter for French {
    fn greet(&self) -> String {
        "bonjour".into()
    }
}

fn greeter<G: Greeter + 'static>(value: G, lifetime: Lifetime) -> ServiceDescriptor {
    let value = Arc::new(value);
    ServiceDescriptor::new::<dyn Greeter, _>(std::any::type_name::<G>(), lifetime, move |_| {
        Ok(Arc::clone(&value) as Arc<dyn Greeter>)
    })
}

#[test]
fn resolve_not_registered() {
    let provider = ServiceCollection::new().build();
    let err = provider.create_scope().resolve::<dyn Greeter>().err().unwrap();
    match err {
        ContainerError::NotRegistered { service } => assert!(service.contains("Greeter")),
        other => panic!("expected NotRegistered, got {other:?}"),
    }
}

#[test]
fn try_add_keeps_first_registration() {
    let mut services = ServiceCollection::new();
    assert!(services.try_add(greeter(English, Lifetime::Singleton)));
    assert!(!services.try_add(greeter(French, Lifetime::Singleton)));
    assert_eq!(services.len(), 1);
    let scope = services.build().create_scope();
    assert_eq!(scope.resolve::<dyn Greeter>().unwrap().greet(), "hello");
}

#[test]
fn resolve_all_preserves_registration_order() {
    let mut services = ServiceCollection::new();
    services
        .add(greeter(French, Lifetime::Transient))
        .add(greeter(English, Lifetime::Transient));
    let scope = services.build().create_scope();
    let all: Vec<String> = scope
        .resolve_all::<dyn Greeter>()
        .unwrap()
        .iter()
        .map(|g| g.greet())
        .collect();
    assert_eq!(all, vec!["bonjour", "hello"]);
    // Single resolution takes the last registration.
    assert_eq!(scope.resolve::<dyn Greeter>().unwrap().greet(), "hello");
}

#[test]
fn resolve_all_empty_when_missing() {
    let scope = ServiceCollection::new().build().create_scope();
    assert!(scope.resolve_all::<dyn Greeter>().unwrap().is_empty());
}

struct Counter {
    id: usize,
}

static CREATED: AtomicUsize = AtomicUsize::new(0);

fn counting(lifetime: Lifetime) -> ServiceDescriptor {
    ServiceDescriptor::new::<Counter, _>("Counter", lifetime, |_| {
        Ok(Arc::new(Counter {
            id: CREATED.fetch_add(1, Ordering::SeqCst),
        }))
    })
}

fn ids(first: &Scope, second: &Scope) -> (usize, usize, usize) {
    (
        first.resolve::<Counter>().unwrap().id,
        first.resolve::<Counter>().unwrap().id,
        second.resolve::<Counter>().unwrap().id,
    )
}

#[test]
fn lifetimes() {
    let mut services = ServiceCollection::new();
    services.add(counting(Lifetime::Transient));
    let provider = services.build();
    let (a, b, c) = ids(&provider.create_scope(), &provider.create_scope());
    assert!(a != b && b != c);

    let mut services = ServiceCollection::new();
    services.add(counting(Lifetime::Scoped));
    let provider = services.build();
    let (a, b, c) = ids(&provider.create_scope(), &provider.create_scope());
    assert_eq!(a, b);
    assert_ne!(b, c);

    let mut services = ServiceCollection::new();
    services.add(counting(Lifetime::Singleton));
    let provider = services.build();
    let (a, b, c) = ids(&provider.create_scope(), &provider.create_scope());
    assert_eq!(a, b);
    assert_eq!(b, c);
}

struct Repository;

struct Service {
    repository: Arc<Repository>,
}

impl Inject for Repository {
    fn inject(_: &Scope) -> Result<Self, ContainerError> {
        Ok(Repository)
    }
}

impl Inject for Service {
    fn inject(scope: &Scope) -> Result<Self, ContainerError> {
        Ok(Service {
            repository: scope.resolve()?,
        })
    }
}

#[test]
fn constructor_injection() {
    let mut services = ServiceCollection::new();
    services
        .add_injected::<Repository>(Lifetime::Singleton)
        .add_injected::<Service>(Lifetime::Scoped);
    let provider = services.build();
    let first = provider.create_scope().resolve::<Service>().unwrap();
    let second = provider.create_scope().resolve::<Service>().unwrap();
    assert!(Arc::ptr_eq(&first.repository, &second.repository));
}

#[test]
fn missing_dependency_surfaces_unchanged() {
    let mut services = ServiceCollection::new();
    services.add_injected::<Service>(Lifetime::Transient);
    let err = services.build().create_scope().resolve::<Service>().err().unwrap();
    assert!(err.to_string().contains("Repository"), "{err}");
}

#[test]
fn lifetime_serde_names() {
    assert_eq!(serde_json::to_string(&Lifetime::Scoped).unwrap(), "\"scoped\"");
    let parsed: Lifetime = serde_json::from_str("\"singleton\"").unwrap();
    assert_eq!(parsed, Lifetime::Singleton);
}

#[test]
fn collection_and_scope_report_registrations() {
    let mut services = ServiceCollection::new();
    assert!(services.is_empty());
    services.add(greeter(English, Lifetime::Transient));

    assert!(!services.is_empty());
    assert!(services.contains::<dyn Greeter>());
    assert!(!services.contains::<Counter>());
    let names: Vec<_> = services.descriptors().map(|d| d.implementation_name()).collect();
    assert_eq!(names, [std::any::type_name::<English>()]);

    let scope = services.build().create_scope();
    assert!(scope.is_registered::<dyn Greeter>());
    assert!(!scope.is_registered::<Counter>());
}

#[derive(Debug)]
struct BadSetting(&'static str);

impl std::fmt::Display for BadSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bad setting {}", self.0)
    }
}

impl std::error::Error for BadSetting {}

struct Mailer;

impl Inject for Mailer {
    fn inject(_: &Scope) -> Result<Self, ContainerError> {
        Err(ContainerError::construction::<Mailer>(BadSetting("smtp_host")))
    }
}

#[test]
fn construction_failure_keeps_source() {
    let mut services = ServiceCollection::new();
    services.add_injected::<Mailer>(Lifetime::Singleton);
    let err = services.build().create_scope().resolve::<Mailer>().err().unwrap();

    match &err {
        ContainerError::Construction { service, .. } => assert!(service.ends_with("Mailer")),
        other => panic!("expected Construction, got {other:?}"),
    }
    let source = std::error::Error::source(&err).unwrap();
    assert_eq!(source.downcast_ref::<BadSetting>().unwrap().0, "smtp_host");
    assert!(err.to_string().contains("bad setting smtp_host"), "{err}");
}
