pub mod matching_service;
pub mod order_service;
