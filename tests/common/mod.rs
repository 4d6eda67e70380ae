#![allow(dead_code)]

pub mod mock_upstream;
pub mod utils;
