pub mod container;
pub mod controller;
pub mod router;

pub use container::{Container, ContainerConfig, StorageKind};
pub use router::Router;
