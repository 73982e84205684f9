pub mod bus;
pub mod devices;

pub use bus::Bus;
pub use devices::DeviceEvent;
