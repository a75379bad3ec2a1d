//! Notification order relative to the accessor, per access kind.
//!
//! Expected Result:
//!
//! - get: the getter runs first; observers see exactly the returned value.
//! - set: observers run before the setter and still see the old state.
//! - del: observers run before the deleter and still see the old state.

use observed::AccessKind;
use observed::Callback;

use crate::common::length;
use crate::common::observatory;
use crate::common::Cheese;
use crate::common::EventLog;

#[test]
fn getter_runs_before_get_observers() {
    let observatory = observatory();
    let log = EventLog::default();
    let cheese = observatory
        .define::<Cheese>()
        .unwrap()
        .construct(Cheese::logged(12, &log))
        .unwrap();
    observatory
        .observe(&cheese, "length", log.observer("observer"))
        .register()
        .unwrap();

    let value = cheese.get(&length()).unwrap();

    assert_eq!(value, 12);
    assert_eq!(log.lines(), vec!["getter", "observer get=12"]);
}

#[test]
fn set_and_del_observers_see_the_old_state() {
    let observatory = observatory();
    let log = EventLog::default();
    let class = observatory.define::<Cheese>().unwrap();
    let cheese = class.construct(Cheese::logged(12, &log)).unwrap();

    for kind in [AccessKind::Set, AccessKind::Del] {
        let log = log.clone();
        observatory
            .observe(
                &cheese,
                "length",
                Callback::from_fn(move |event| {
                    let instance = event.instance::<Cheese>().expect("instance event");
                    let current = instance.read(|c| c.length);
                    log.push(format!("observer {} sees {}", event.kind(), current));
                    Ok(())
                }),
            )
            .access(kind)
            .register()
            .unwrap();
    }

    cheese.set(&length(), 20).unwrap();
    cheese.delete(&length()).unwrap();

    assert_eq!(
        log.lines(),
        vec!["observer set sees 12", "setter", "observer del sees 20", "deleter"]
    );
    assert_eq!(cheese.read(|c| c.length), 0);
}

#[test]
fn every_applicable_observer_fires_exactly_once() {
    let observatory = observatory();
    let log = EventLog::default();
    let shared = log.observer("shared");
    observatory
        .observe("pkg.Foo", "length", shared.clone())
        .access(AccessKind::Set)
        .register()
        .unwrap();
    let class = observatory.define::<Cheese>().unwrap();
    observatory
        .observe(&class, "length", shared.clone())
        .access(AccessKind::Set)
        .register()
        .unwrap();
    let cheese = class.construct(Cheese::new(0)).unwrap();
    observatory
        .observe(&cheese, "length", shared)
        .access(AccessKind::Set)
        .register()
        .unwrap();
    observatory
        .observe(&cheese, "length", log.observer("own"))
        .access(AccessKind::Set)
        .register()
        .unwrap();

    cheese.set(&length(), 4).unwrap();

    let mut lines = log.lines();
    lines.sort();
    assert_eq!(lines, vec!["own set=4", "shared set=4"]);
}
