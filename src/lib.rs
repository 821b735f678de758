pub mod configuration;
pub mod controller;
pub mod device_client;
pub mod error;
pub mod logging;
pub mod relay_state;
pub mod shutter;
