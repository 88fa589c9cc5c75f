pub mod clinic;
pub mod smtp;
pub mod store;

pub use clinic::{ClinicPageClient, ClinicParser, FixtureFileSource};
pub use smtp::SmtpMailer;
pub use store::JsonFileStore;
