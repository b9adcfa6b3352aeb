pub mod queries;
pub mod schema;
pub mod types;
pub mod versions;

pub use queries::*;
pub use schema::{FieldDef, FormSchema, NativeSchema};
pub use types::*;
pub use versions::{FormFamily, group_versions, version_number};
