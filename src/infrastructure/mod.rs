pub mod fabric_repo;
pub mod memory;
pub mod models;
pub mod notifier;
pub mod order_repo;
pub mod tailor_repo;

#[cfg(test)]
pub(crate) mod test_support;
