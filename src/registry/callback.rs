use std::fmt;
use std::fmt::Display;
use std::hash::Hash;
use std::hash::Hasher;
use std::str::FromStr;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use crate::Error;
use crate::Event;
use crate::Result;

/// The kind of attribute access an observer listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Get,
    Set,
    Del,
}

impl AccessKind {
    pub const ALL: [AccessKind; 3] = [AccessKind::Get, AccessKind::Set, AccessKind::Del];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessKind::Get => "get",
            AccessKind::Set => "set",
            AccessKind::Del => "del",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            AccessKind::Get => 0,
            AccessKind::Set => 1,
            AccessKind::Del => 2,
        }
    }
}

impl Display for AccessKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only the first three characters are significant, so `"delete"` reads as
/// `del`.
impl FromStr for AccessKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.get(..3).unwrap_or(s) {
            "get" => Ok(AccessKind::Get),
            "set" => Ok(AccessKind::Set),
            "del" => Ok(AccessKind::Del),
            _ => Err(Error::Validation(format!(
                "access kind must be one of \"get\", \"set\" or \"del\", not {s:?}"
            ))),
        }
    }
}

/// Access kinds affected by a bulk group removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessFilter {
    #[default]
    All,
    Only(AccessKind),
}

impl AccessFilter {
    pub fn matches(
        &self,
        kind: AccessKind,
    ) -> bool {
        match self {
            AccessFilter::All => true,
            AccessFilter::Only(only) => *only == kind,
        }
    }
}

impl From<AccessKind> for AccessFilter {
    fn from(kind: AccessKind) -> Self {
        AccessFilter::Only(kind)
    }
}

impl FromStr for AccessFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.get(..3).unwrap_or(s) {
            "ALL" | "all" => Ok(AccessFilter::All),
            _ => s.parse::<AccessKind>().map(AccessFilter::Only).map_err(|_| {
                Error::Validation(format!(
                    "access filter must be one of \"get\", \"set\", \"del\" or \"ALL\", not {s:?}"
                ))
            }),
        }
    }
}

/// Registration group. Named groups can be removed in bulk, the anonymous
/// group cannot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Group {
    #[default]
    Anonymous,
    Named(String),
}

impl Group {
    pub fn named(name: impl Into<String>) -> Self {
        Group::Named(name.into())
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Group::Anonymous => None,
            Group::Named(name) => Some(name),
        }
    }
}

/// Watcher of observed property accesses.
///
/// Implemented for every `Fn(&Event) -> Result<()>` closure. Return values
/// carry no data: observers cannot influence the observed value.
#[cfg_attr(test, automock)]
pub trait Observer: Send + Sync + 'static {
    fn notify(
        &self,
        event: &Event,
    ) -> Result<()>;
}

impl<F> Observer for F
where
    F: Fn(&Event) -> Result<()> + Send + Sync + 'static,
{
    fn notify(
        &self,
        event: &Event,
    ) -> Result<()> {
        self(event)
    }
}

/// Shared handle to an [`Observer`].
///
/// Two callbacks are the same callback when they point at the same observer
/// allocation; clone a `Callback` to register one observer several times.
#[derive(Clone)]
pub struct Callback {
    observer: Arc<dyn Observer>,
}

impl Callback {
    pub fn new<O: Observer>(observer: O) -> Self {
        Self {
            observer: Arc::new(observer),
        }
    }

    /// Wraps a closure, inferring its argument and return types.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Event) -> Result<()> + Send + Sync + 'static,
    {
        Self::new(f)
    }

    pub fn from_arc(observer: Arc<dyn Observer>) -> Self {
        Self { observer }
    }

    pub fn notify(
        &self,
        event: &Event,
    ) -> Result<()> {
        self.observer.notify(event)
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.observer) as *const () as usize
    }
}

impl PartialEq for Callback {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Callback {}

impl fmt::Debug for Callback {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "<Callback {:#x}>", self.identity())
    }
}

/// A single watcher registration.
///
/// Equality and hashing only look at the property name and the callback
/// identity; the access kind and background flag do not participate.
#[derive(Clone, Debug)]
pub struct CallbackEntry {
    property: String,
    access: AccessKind,
    use_background_task: bool,
    callback: Callback,
}

impl CallbackEntry {
    pub fn new(
        property: impl Into<String>,
        access: AccessKind,
        use_background_task: bool,
        callback: Callback,
    ) -> Self {
        Self {
            property: property.into(),
            access,
            use_background_task,
            callback,
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn access(&self) -> AccessKind {
        self.access
    }

    pub fn use_background_task(&self) -> bool {
        self.use_background_task
    }

    pub fn callback(&self) -> &Callback {
        &self.callback
    }
}

impl PartialEq for CallbackEntry {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.property == other.property && self.callback == other.callback
    }
}

impl Eq for CallbackEntry {}

impl Hash for CallbackEntry {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.property.hash(state);
        self.callback.identity().hash(state);
    }
}
