use anyhow::Result;
use clap::ArgMatches;
use serde_json::json;

use crate::common::{JSON_ARG, load_registry};

pub fn run_registry(matches: &ArgMatches) -> Result<()> {
    let loaded = load_registry(matches)?;
    let registry = &loaded.registry;
    let list = matches.get_flag("list");

    if matches.get_flag(JSON_ARG) {
        let mut report = json!({
            "registry": loaded.path.display().to_string(),
            "mode": loaded.mode.to_string(),
            "sequences": registry.len(),
        });
        if list {
            report["identifiers"] = registry
                .sorted_names()
                .into_iter()
                .filter_map(|name| registry.get(name).map(|id| (name.to_string(), json!(id))))
                .collect::<serde_json::Map<_, _>>()
                .into();
        }
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} sequence identifiers: {}",
        loaded.mode,
        registry.len(),
        loaded.path.display()
    );
    if list {
        for name in registry.sorted_names() {
            if let Some(id) = registry.get(name) {
                println!("{}\t{}", name, id);
            }
        }
    }

    Ok(())
}
