//! Package descriptors, the shared descriptor cache and the asynchronously
//! refreshed list models of the update dialog.

mod cache;
mod descriptor;
mod list_model;
mod session;

pub use cache::PackageDescriptorCache;
pub use descriptor::{
    JsonUpdateServer, PackageDescriptor, PackageError, PackageIndex, PackageTab, UpdateServer,
    ANY_VERSION,
};
pub use list_model::{ListEntry, ListEvent, PackageListModel, PackageNameSource, TabSource};
pub use session::UpdateSession;
