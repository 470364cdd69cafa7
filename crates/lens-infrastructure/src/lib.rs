pub mod config_service;
pub mod image_loader;
pub mod paths;
pub mod secret_service;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::image_loader::load_image_file;
pub use crate::paths::LensPaths;
pub use crate::secret_service::SecretServiceImpl;
pub use crate::storage::{FileKeyValueStore, InMemoryKeyValueStore};
