//! Name registrations made before a class exists are merged into it.
//!
//! Scenario:
//!
//! 1. Register `("pkg.Foo", "length", cb, set, group "G1")`.
//! 2. Define the class named `pkg.Foo` and construct `f`.
//! 3. Write `f.length = 5`.
//!
//! Expected Result:
//!
//! - `cb` is called once with `("length", f, 5)`.
//! - Registrations made after `f` exists do not reach it.

use std::sync::mpsc;

use observed::AccessKind;
use observed::Callback;
use observed::ObjectId;

use crate::common::length;
use crate::common::observatory;
use crate::common::Cheese;
use crate::common::EventLog;

#[test]
fn name_registration_reaches_later_instances() {
    let observatory = observatory();
    let (tx, rx) = mpsc::channel::<(String, ObjectId, Option<i64>)>();
    observatory
        .observe(
            "pkg.Foo",
            "length",
            Callback::from_fn(move |event| {
                let target = event.instance::<Cheese>().map(|f| f.id());
                tx.send((
                    event.property().to_string(),
                    target.expect("instance event"),
                    event.value::<i64>().copied(),
                ))
                .unwrap();
                Ok(())
            }),
        )
        .access(AccessKind::Set)
        .group("G1")
        .register()
        .unwrap();

    let class = observatory.define::<Cheese>().unwrap();
    assert_eq!(class.name(), "pkg.Foo");
    let f = class.construct(Cheese::new(0)).unwrap();
    f.set(&length(), 5).unwrap();

    assert_eq!(rx.try_recv().unwrap(), ("length".to_string(), f.id(), Some(5)));
    assert!(rx.try_recv().is_err());
}

#[test]
fn late_name_registrations_are_not_retroactive() {
    let observatory = observatory();
    let log = EventLog::default();
    let class = observatory.define::<Cheese>().unwrap();
    let existing = class.construct(Cheese::new(1)).unwrap();

    observatory
        .observe("pkg.Foo", "length", log.observer("late"))
        .register()
        .unwrap();
    let fresh = observatory
        .define::<Cheese>()
        .unwrap()
        .construct(Cheese::new(2))
        .unwrap();

    existing.get(&length()).unwrap();
    fresh.get(&length()).unwrap();

    assert_eq!(log.lines(), vec!["late get=2"]);
}
