//! Removing one group leaves the others and the anonymous group alone.
//!
//! Scenario:
//!
//! 1. Observer A in group "A" and observer B in group "B" both observe `get`
//!    of the same property.
//! 2. `unregister_group("A", "get")`.
//!
//! Expected Result:
//!
//! - A subsequent read fires only B.

use observed::AccessFilter;
use observed::AccessKind;

use crate::common::length;
use crate::common::observatory;
use crate::common::Cheese;
use crate::common::EventLog;

#[test]
fn removing_a_group_fires_only_the_others() {
    let observatory = observatory();
    let log = EventLog::default();
    let cheese = observatory
        .define::<Cheese>()
        .unwrap()
        .construct(Cheese::new(1))
        .unwrap();
    observatory
        .observe(&cheese, "length", log.observer("A"))
        .group("A")
        .register()
        .unwrap();
    observatory
        .observe(&cheese, "length", log.observer("B"))
        .group("B")
        .register()
        .unwrap();

    let filter: AccessFilter = "get".parse().unwrap();
    assert_eq!(observatory.unregister_group("A", filter).unwrap(), 1);
    cheese.get(&length()).unwrap();

    assert_eq!(log.lines(), vec!["B get=1"]);
}

#[test]
fn anonymous_registrations_survive_every_removal() {
    let observatory = observatory();
    let log = EventLog::default();
    observatory
        .observe("pkg.Foo", "length", log.observer("anonymous"))
        .access(AccessKind::Del)
        .register()
        .unwrap();
    observatory
        .observe("pkg.Foo", "length", log.observer("grouped"))
        .access(AccessKind::Del)
        .group("cleanup")
        .register()
        .unwrap();

    observatory
        .unregister_group("cleanup", AccessFilter::All)
        .unwrap();
    let cheese = observatory
        .define::<Cheese>()
        .unwrap()
        .construct(Cheese::new(1))
        .unwrap();
    cheese.delete(&length()).unwrap();

    assert_eq!(log.lines(), vec!["anonymous del"]);
    assert!(observatory.entry("pkg.Foo").unwrap().unwrap().groups.is_empty());
}
