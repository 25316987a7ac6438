pub mod health;
pub use self::health::health;

pub mod user_signup;
pub use self::user_signup::signup;

pub mod user_login;
pub use self::user_login::login;

pub mod profile;
pub use self::profile::{profile, update_email};
