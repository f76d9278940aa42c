pub mod consts;
pub mod logging;
pub mod profile;
