pub mod advisor;
pub mod render;
pub mod sequence;

pub use crate::domain::model::{BuildRequest, BuildResult, Part, PartsQuery, PartsSort};
pub use crate::domain::ports::{AdvisorApi, ConfigProvider, Notifier};
pub use crate::utils::error::Result;
