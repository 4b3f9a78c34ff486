
#[cfg(test)]
mod error_handling;
