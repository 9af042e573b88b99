use anyhow::Result;
use colored::Colorize;

use crate::config::ConfigStore;

use super::args::ConfigAction;
use super::util::mask_secret;

pub(crate) fn handle_config(action: ConfigAction, store: &mut ConfigStore) -> Result<()> {
    match action {
        ConfigAction::Get { section, key } => {
            println!("{}", store.require(&section, &key)?);
        }
        ConfigAction::Set {
            section,
            key,
            value,
        } => {
            store.set(&section, &key, &value)?;
            store.save()?;
            println!(
                "✅ Saved [{section}] {key} to {}",
                store.paths().user_file().display()
            );
        }
        ConfigAction::List { section } => {
            let sections = match section {
                Some(section) => vec![section],
                None => store.sections(),
            };
            for section in sections {
                println!("{}", format!("[{section}]").bold());
                for (key, value) in store.entries(&section) {
                    println!("   {key} = {}", display_value(&key, &value));
                }
            }
        }
        ConfigAction::Path => {
            println!("User config:    {}", store.paths().user_file().display());
            match store.paths().default_file() {
                Some(path) => println!("Default config: {}", path.display()),
                None => println!("Default config: (unavailable)"),
            }
        }
    }

    Ok(())
}

fn display_value(key: &str, value: &str) -> String {
    if key.contains("password") {
        mask_secret(value)
    } else {
        value.escape_debug().to_string()
    }
}
