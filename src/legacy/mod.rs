//! Legacy tagged serialization.

pub mod serializer;
pub mod value;

pub use serializer::{serialize, serialize_json};
pub use value::LegacyValue;
