pub mod datetime;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;
