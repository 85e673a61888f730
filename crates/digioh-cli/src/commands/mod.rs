//! CLI command implementations.

pub mod doctor;
pub mod policy;
pub mod serve;
pub mod status;
pub mod whoami;

pub use doctor::run_doctor;
pub use policy::run_policy;
pub use serve::run_serve;
pub use status::run_status;
pub use whoami::run_whoami;
