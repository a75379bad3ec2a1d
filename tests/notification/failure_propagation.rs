//! A failing synchronous observer aborts the access with its own error.
//!
//! Expected Result:
//!
//! - read/write/delete return the observer's error unchanged.
//! - Later observers of the same event are not called.
//! - A vetoed write or delete leaves the state untouched.

use std::fmt;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use observed::AccessKind;
use observed::Callback;
use observed::Error;

use crate::common::length;
use crate::common::observatory;
use crate::common::Cheese;

#[derive(Debug)]
struct Veto(&'static str);

impl fmt::Display for Veto {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "vetoed by {}", self.0)
    }
}

impl std::error::Error for Veto {}

fn veto(
    who: &'static str,
    calls: &Arc<AtomicUsize>,
) -> Callback {
    let calls = calls.clone();
    Callback::from_fn(move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::callback(Veto(who)))
    })
}

fn assert_veto(err: Error) {
    match err {
        Error::Callback(inner) => {
            let veto = inner.downcast_ref::<Veto>().expect("observer error type kept");
            assert!(veto.0 == "first" || veto.0 == "second");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn synchronous_failures_abort_every_access_kind() {
    let observatory = observatory();
    let cheese = observatory
        .define::<Cheese>()
        .unwrap()
        .construct(Cheese::new(3))
        .unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    for kind in AccessKind::ALL {
        for who in ["first", "second"] {
            observatory
                .observe(&cheese, "length", veto(who, &calls))
                .access(kind)
                .register()
                .unwrap();
        }
    }

    assert_veto(cheese.get(&length()).unwrap_err());
    assert_veto(cheese.set(&length(), 4).unwrap_err());
    assert_veto(cheese.delete(&length()).unwrap_err());

    // One observer per access, fail-fast
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(cheese.read(|c| c.length), 3);
}

#[test]
fn synchronous_registration_stays_fatal_next_to_background_copy() {
    for _ in 0..50 {
        let observatory = observatory();
        let cheese = observatory
            .define::<Cheese>()
            .unwrap()
            .construct(Cheese::new(3))
            .unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let callback = veto("first", &calls);
        observatory
            .observe(&cheese, "length", callback.clone())
            .group("A")
            .register()
            .unwrap();
        observatory
            .observe(&cheese, "length", callback)
            .group("B")
            .in_background()
            .register()
            .unwrap();

        assert_veto(cheese.get(&length()).unwrap_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
