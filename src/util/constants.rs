/// Build-time constants shared by the crate.
#[derive(Debug, Clone, Copy)]
pub struct Constants {
    pub crate_name: &'static str,
    pub sdk_version: &'static str,
}

/// Values baked in from the Cargo manifest.
pub const CONSTANTS: Constants = Constants {
    crate_name: env!("CARGO_PKG_NAME"),
    sdk_version: env!("CARGO_PKG_VERSION"),
};
