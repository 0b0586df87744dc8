pub mod alerts;
pub mod cache;
pub mod convert;
pub mod history;
pub mod portfolio;
pub mod rates;
pub mod setup;
pub mod ui;
