#![forbid(unsafe_code)]

mod counters;
mod position_tx;
mod row;
mod schema;
mod time;

pub(super) use counters::next_counter_tx;
pub(super) use position_tx::*;
pub(super) use row::*;
pub(super) use schema::install_schema;
pub(super) use time::now_ms;
