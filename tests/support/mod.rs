#![allow(dead_code)]

pub mod fake_gateway;
pub mod port;
pub mod wait;
