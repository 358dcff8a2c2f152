mod quantity;
mod registry;

pub use quantity::{NamedQuantity, QuantityClass};
pub use registry::{ParameterRegistry, Slot};
