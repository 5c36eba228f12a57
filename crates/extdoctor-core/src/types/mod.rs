//! Row-level types shared by every extdoctor crate

mod extension_row;
mod update_site;

pub use extension_row::{
    Client, ColumnValue, ExtensionColumn, ExtensionRow, ExtensionType, InstallState,
};
pub use update_site::UpdateSite;
