/// UI module exports
pub mod feed;
pub mod icons;
pub mod settings;
