//! Walks through the observer registry end to end: name patterns registered
//! before classes exist, class and instance observers, group removal, an
//! extension layered under the opt-in, a background observer and the
//! eviction checks at the end.
//!
//! Run with `RUST_LOG=observed=debug` to watch the registry at work.

use std::process;
use std::time::Duration;

use observed::define;
use observed::global;
use observed::observe;
use observed::unregister_group;
use observed::AccessFilter;
use observed::AccessKind;
use observed::Callback;
use observed::Class;
use observed::ClassExtension;
use observed::Error;
use observed::Event;
use observed::Instance;
use observed::Observable;
use observed::ObservedProperty;
use observed::Result;
use tracing::error;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

struct Foobar {
    baz: Option<i64>,
    name: String,
}

impl Observable for Foobar {
    fn observed_name() -> Option<String> {
        Some("foobar".into())
    }
}

fn baz() -> ObservedProperty<Foobar, Option<i64>> {
    ObservedProperty::<Foobar, Option<i64>>::new("baz", |f| f.baz)
        .with_setter(|f, value| f.baz = value)
        .with_deleter(|f| f.baz = None)
}

struct Cheese {
    length: i64,
    name: String,
}

impl Observable for Cheese {
    fn observed_name() -> Option<String> {
        Some("Cheese".into())
    }
}

fn length() -> ObservedProperty<Cheese, i64> {
    ObservedProperty::<Cheese, i64>::new("length", |c| c.length).with_setter(|c, value| c.length = value)
}

/// Stands in for another extension mechanism the class already uses.
struct Describe;

impl ClassExtension<Cheese> for Describe {
    fn on_define(
        &self,
        class: &Class<Cheese>,
    ) -> Result<()> {
        println!("Describe extending {:?}", class.name());
        Ok(())
    }

    fn on_construct(
        &self,
        instance: &Instance<Cheese>,
    ) -> Result<()> {
        instance.write(|c| c.name = "cheese_object".into());
        Ok(())
    }
}

fn subject_name(event: &Event) -> String {
    event
        .instance::<Foobar>()
        .map(|f| f.read(|f| f.name.clone()))
        .or_else(|| event.instance::<Cheese>().map(|c| c.read(|c| c.name.clone())))
        .unwrap_or_else(|| event.target_id().to_string())
}

fn get_observer(event: &Event) -> Result<()> {
    println!("[{} OBSERVED: {} for {}]", subject_name(event), describe(event), event.property());
    Ok(())
}

fn set_observer(event: &Event) -> Result<()> {
    println!("[{} OBSERVED: {} = {}]", subject_name(event), event.property(), describe(event));
    Ok(())
}

fn del_observer(event: &Event) -> Result<()> {
    println!("[{} DELETE: {}]", subject_name(event), event.property());
    Ok(())
}

fn describe(event: &Event) -> String {
    if let Some(value) = event.value::<Option<i64>>() {
        return format!("{value:?}");
    }
    if let Some(value) = event.value::<i64>() {
        return value.to_string();
    }
    "<opaque>".into()
}

fn init_observability() {
    let base_subscriber = tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(base_subscriber).init();
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    init_observability();

    let get = Callback::from_fn(get_observer);
    let set = Callback::from_fn(set_observer);
    let del = Callback::from_fn(del_observer);

    observe("foobar", "baz", get.clone()).group("TEST").register()?;
    observe("foobar", "baz", set.clone())
        .access(AccessKind::Set)
        .group("TEST")
        .register()?;
    observe("foobar", "baz", del.clone())
        .access(AccessKind::Del)
        .group("TEST")
        .register()?;
    observe("Cheese", "length", get.clone()).group("TEST").register()?;
    observe("Cheese", "length", set.clone())
        .access(AccessKind::Set)
        .group("TEST")
        .register()?;

    let foobar = define::<Foobar>()?;
    let f = foobar.construct(Foobar {
        baz: Some(1),
        name: "foobar_object".into(),
    })?;
    println!("BAZ {:?}", f.get(&baz())?);
    f.set(&baz(), Some(10))?;
    println!("BAZ {:?}", f.get(&baz())?);
    f.delete(&baz())?;
    println!("{:?}", f.get(&baz())?);

    observe(&foobar, "baz", set.clone()).group("TEST").register()?;

    println!("--- Monkey Time");
    let monkey = global().class::<Foobar>().named("Monkey").define()?;
    let m = monkey.construct(Foobar {
        baz: Some(2),
        name: "monkey_object".into(),
    })?;
    observe(&m, "baz", get.clone()).group("TEST").register()?;
    f.set(&baz(), Some(12))?;
    println!("{:?}", f.get(&baz())?);
    println!("MONKEY {:?}", m.get(&baz())?);
    println!("REMOVE");
    unregister_group("TEST", AccessFilter::Only(AccessKind::Get))?;
    println!("{:?}", m.get(&baz())?);
    drop(m);
    drop(f);

    let cheese_class = global().class::<Cheese>().extend(Describe).define()?;
    let cheese = cheese_class.construct(Cheese {
        length: 0,
        name: String::new(),
    })?;
    cheese.set(&length(), 3)?;
    println!("my length is {}", cheese.get(&length())?);

    println!("--- Background Time");
    let mut failures = global().subscribe_failures();
    observe(&cheese, "length", Callback::from_fn(|_| Err(Error::callback("too ripe"))))
        .access(AccessKind::Set)
        .group("TEST")
        .in_background()
        .register()?;
    cheese.set(&length(), 4)?;
    match tokio::time::timeout(Duration::from_secs(5), failures.recv()).await {
        Ok(Ok(failure)) => println!("background observer failed: {}", failure.reason),
        other => error!("no background failure reported: {:?}", other),
    }

    println!("--- Cleanup Time");
    unregister_group("TEST", AccessFilter::All)?;
    println!("{}", global().tracked_classes());
    drop(cheese);
    drop(cheese_class);
    drop(monkey);
    drop(foobar);

    // The finished background task may still be releasing its event
    let mut remaining = (global().tracked_classes(), global().tracked_instances());
    for _ in 0..100 {
        if remaining == (0, 0) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        remaining = (global().tracked_classes(), global().tracked_instances());
    }
    let (classes, instances) = remaining;
    if classes != 0 || instances != 0 {
        error!("dangling references: {} classes, {} instances", classes, instances);
        process::exit(1);
    }
    info!("no dangling references left");
    Ok(())
}
