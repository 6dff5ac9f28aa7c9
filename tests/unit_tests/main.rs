#[path = "../helpers/mod.rs"]
mod helpers;

mod application;
mod domain;
mod infrastructure;
mod presentation;
