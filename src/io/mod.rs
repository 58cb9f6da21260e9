//! Storage collaborator: reading tabular files

pub mod csv;

pub use self::csv::read_csv;
