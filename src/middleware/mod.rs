pub mod auth;
pub mod json;
pub mod path;
pub mod sensor_key;

pub use auth::AuthUser;
pub use json::ValidJson;
pub use path::PathId;
pub use sensor_key::{SensorAuth, XApiKey};
