mod client;
mod parser;

pub use client::{ClinicPageClient, FixtureFileSource};
pub use parser::{parse_listing, ClinicParser, ParseError};
