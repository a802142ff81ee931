mod listener_entry;
mod registry;

pub(crate) use listener_entry::ListenerEntry;
pub(crate) use registry::{Registry, Snapshot};
