//! Cards as declarative data: records, the catalog, and live instances.

mod catalog;
mod descriptor;
mod instance;

pub use catalog::CardCatalog;
pub use descriptor::{CardDescriptor, CardId};
pub use instance::GameObject;
