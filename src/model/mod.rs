/// Tabular Result Model
///
/// The in-memory model every query is materialized into:
/// - **Entry** (`entry.rs`): a single field/value pair with null semantics
/// - **Row** (`row.rs`): ordered, uniquely-named fields and their entries
/// - **ResultSet** (`result_set.rs`): rows plus execution metadata
/// - **Outcome** (`outcome.rs`): the tri-state execution result
///
/// Capabilities shared across these types live in `capability.rs`.
pub mod capability;
pub mod entry;
pub mod outcome;
pub mod result_set;
pub mod row;

pub use capability::{FieldNameValidator, Nullable, NULL_SENTINEL};
pub use entry::Entry;
pub use outcome::Outcome;
pub use result_set::ResultSet;
pub use row::Row;
