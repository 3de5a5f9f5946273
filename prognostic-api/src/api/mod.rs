//! HTTP API handlers

pub mod audio;
pub mod audit;
pub mod error;
pub mod health;
pub mod records;

pub use audio::{get_audio, insert_audio};
pub use audit::audit;
pub use error::ApiError;
pub use health::health_routes;
pub use records::{
    delete_user, delete_user_psych, get_user, get_user_one, get_user_psych, get_user_two,
    insert_user, insert_user_one, insert_user_psych, insert_user_two,
};
