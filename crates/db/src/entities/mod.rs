//! `SeaORM` entity definitions.

pub mod transaction_line_items;
pub mod transaction_lines;
