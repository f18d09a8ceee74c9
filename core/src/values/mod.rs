pub mod array;
pub mod value;

pub use array::{ArrayItems, ArrayLike, IntegerSequence, ShapeId};
pub use value::{Value, ValueKind};
