//! Registry entries never outlive their targets.
//!
//! Scenario:
//!
//! 1. Define `pkg.Foo`, construct an instance and register observers against
//!    both the class and the instance.
//! 2. Drop every external handle of the instance.
//! 3. Drop the class.
//!
//! Expected Result:
//!
//! - The instance entry is gone after step 2, the class entry after step 3.
//! - The observers registered against them are released with the entries.

use std::collections::HashSet;
use std::sync::Arc;

use observed::AccessKind;
use observed::Callback;
use observed::Error;
use observed::Target;

use crate::common::length;
use crate::common::observatory;
use crate::common::Cheese;

#[test]
fn dropped_instances_and_classes_release_their_entries() {
    let observatory = observatory();
    let class = observatory.define::<Cheese>().unwrap();
    let instance = class.construct(Cheese::new(3)).unwrap();

    // Observer state is only reachable through the registry once registered
    let marker = Arc::new(());
    let held = marker.clone();
    observatory
        .observe(
            &instance,
            "length",
            Callback::from_fn(move |_| {
                let _ = &held;
                Ok(())
            }),
        )
        .access(AccessKind::Set)
        .register()
        .unwrap();
    observatory
        .observe(&class, "length", Callback::from_fn(|_| Ok(())))
        .register()
        .unwrap();
    assert_eq!(Arc::strong_count(&marker), 2);
    assert_eq!(observatory.tracked_instances(), 1);

    let target = Target::from(&instance);
    let weak = instance.downgrade();
    drop(instance);

    assert!(weak.upgrade().is_none());
    assert_eq!(observatory.tracked_instances(), 0);
    assert_eq!(Arc::strong_count(&marker), 1);
    assert!(matches!(observatory.entry(target), Err(Error::NotObservable(_))));
    assert_eq!(observatory.tracked_classes(), 1);

    drop(class);
    assert_eq!(observatory.tracked_classes(), 0);
}

#[test]
fn identity_survives_mutation_of_the_observed_attribute() {
    let observatory = observatory();
    let class = observatory.define::<Cheese>().unwrap();
    let cheese = class.construct(Cheese::new(1)).unwrap();
    let mut seen = HashSet::new();
    seen.insert(cheese.clone());

    for value in 2..10 {
        cheese.set(&length(), value).unwrap();
        assert!(seen.contains(&cheese));
    }
    assert_eq!(cheese.get(&length()).unwrap(), 9);
}

#[test]
fn many_short_lived_instances_leave_nothing_behind() {
    let observatory = observatory();
    let class = observatory.define::<Cheese>().unwrap();

    for round in 0..100 {
        let cheese = class.construct(Cheese::new(round)).unwrap();
        observatory
            .observe(&cheese, "length", Callback::from_fn(|_| Ok(())))
            .group("short-lived")
            .register()
            .unwrap();
        cheese.get(&length()).unwrap();
    }

    assert_eq!(observatory.tracked_instances(), 0);
    assert_eq!(observatory.tracked_classes(), 1);
}
