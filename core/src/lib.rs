pub mod db;
pub mod history;
pub mod merge;
pub mod models;
pub mod recipes;
pub mod recognition;
pub mod reconcile;
pub mod service;
pub mod units;
