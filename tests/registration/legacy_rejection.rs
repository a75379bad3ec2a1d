//! Types on the legacy object model can never be observed.

use observed::Error;
use observed::ObjectModel;
use observed::Observable;
use observed::Target;

use crate::common::observatory;

struct Legacy;

impl Observable for Legacy {
    fn object_model() -> ObjectModel {
        ObjectModel::Legacy
    }
}

#[test]
fn legacy_types_fail_opt_in_and_registration() {
    let observatory = observatory();

    let defined = observatory.define::<Legacy>();
    let renamed = observatory.class::<Legacy>().named("pkg.Legacy").define();
    let registered = observatory
        .observe(Target::of_type::<Legacy>(), "anything", observed::Callback::from_fn(|_| Ok(())))
        .register();

    assert!(matches!(defined, Err(Error::UnsupportedTarget(_))));
    assert!(matches!(renamed, Err(Error::UnsupportedTarget(_))));
    assert!(matches!(registered, Err(Error::UnsupportedTarget(_))));
    assert_eq!(observatory.tracked_classes(), 0);
}
