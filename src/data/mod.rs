//! Shared tabular data model for taxonomic and metabolite abundances.

mod table;

pub use table::AbundanceTable;
