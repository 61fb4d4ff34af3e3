pub mod calculation_definition;
pub mod calculation_line;
pub mod dealer_mapping;
pub mod enterprise_settings;
pub mod indent;
pub mod indent_item;
pub mod org_unit;
pub mod product;
pub mod tcs_rate;
