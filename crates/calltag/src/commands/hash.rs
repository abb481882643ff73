use libcalltag_core::hash::is_hash_tag;
use libcalltag_core::{hash_tag, CallTagError};
use serde::Serialize;

use crate::cli::Cli;
use crate::output::{output_success, print_human};

#[derive(Serialize)]
struct HashOutput {
    location: String,
    tag: String,
}

pub fn run(cli: &Cli, keys: &[String]) -> Result<(), CallTagError> {
    if keys.iter().any(|k| k.is_empty()) {
        return Err(CallTagError::InvalidArgs("location key must not be empty".to_string()));
    }
    if let Some(tag) = keys.iter().find(|k| is_hash_tag(k)) {
        return Err(CallTagError::InvalidArgs(format!(
            "'{}' is already a hash tag; pass a location key such as 'orders.list:L12'",
            tag
        )));
    }

    let hashes: Vec<HashOutput> = keys
        .iter()
        .map(|key| HashOutput {
            location: key.clone(),
            tag: hash_tag(key),
        })
        .collect();

    for h in &hashes {
        print_human(cli, &format!("{}  {}", h.tag, h.location));
    }
    output_success(cli, hashes);
    Ok(())
}
