pub mod catalog;
pub mod interface;

pub use catalog::{Catalog, DeviceProfile};
pub use interface::{Device, DeviceType};
