mod analytics_table;
mod contracts_table;
mod filters;
mod page;
mod summary;

pub use page::ContractSearchPage;
