#![forbid(unsafe_code)]

mod create;
mod delete;
mod move_card;
mod query;
mod update;
