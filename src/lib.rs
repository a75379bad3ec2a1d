//! Observer registry for observable properties.
//!
//! Callbacks are registered against a qualified class name (before or after
//! the class exists), a class, or a single instance, and fire on `get`, `set`
//! or `del` accesses of an [`ObservedProperty`]. Registrations live exactly
//! as long as their target: dropping the last handle of a class or instance
//! evicts its registry entry.
//!
//! ```ignore
//! use observed::*;
//!
//! struct Cheese {
//!     length: i64,
//! }
//! impl Observable for Cheese {}
//!
//! let length = ObservedProperty::new("length", |c: &Cheese| c.length);
//! let cheese = define::<Cheese>()?.construct(Cheese { length: 3 })?;
//! observe(&cheese, "length", Callback::from_fn(|e| {
//!     println!("read {:?}", e.value::<i64>());
//!     Ok(())
//! }))
//! .register()?;
//! cheese.get(&length)?;
//! ```

mod config;
mod dispatch;
mod errors;
mod observatory;
mod property;
mod registrar;
mod registry;

pub use config::*;
pub use dispatch::*;
pub use errors::*;
pub use observatory::*;
pub use property::*;
pub use registrar::*;
pub use registry::*;

//-----------------------------------------------------------
// Test utils
