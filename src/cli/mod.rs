//! CLI subcommand implementations for the pricewatch binary.

pub mod add_cmd;
pub mod alerts_cmd;
pub mod check_cmd;
pub mod deals_cmd;
pub mod detail_cmd;
pub mod history_cmd;
pub mod list_cmd;
pub mod output;
pub mod remove_cmd;
pub mod update_cmd;
