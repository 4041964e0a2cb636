pub mod excel;

pub use excel::{default_export_name, export_budget};
