//! Photo domain model and the pure selection steps of a backup run:
//! ranking a batch, resolving the best size of each photo, and naming the
//! uploaded file.

pub mod naming;
pub mod select;
pub mod types;

pub use naming::{assign_file_name, NamingPolicy};
pub use select::{rank_and_truncate, select_best_variant, select_photo};
pub use types::{ImageVariant, PhotoRecord, SelectedPhoto};
