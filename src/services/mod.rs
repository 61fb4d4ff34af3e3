pub mod aggregator;
pub mod calculations;
pub mod indents;
pub mod items;
pub mod org_context;
pub mod pricing;
pub mod products;
pub mod settings;
