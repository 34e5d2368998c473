//! Init command implementation
//!
//! Writes a starter `tabula.toml`. With `--with-examples` it also writes a
//! sample definition and dataset next to it, so a first export can run
//! right away.

use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "tabula.toml")]
    pub output: PathBuf,

    /// Also write a sample definition and dataset
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

const CONFIG_TEMPLATE: &str = r#"# Tabula configuration

[application]
log_level = "info"

[export]
page_size = 100
definitions_dir = "definitions"
default_export_name = "default"
default_format = "csv"
csv_delimiter = ","
# preference_key = "exportName"

[account]
id = "admin"
display_name = "Administrator"
# UTC offset such as "+02:00" or an IANA name such as "Europe/Berlin"
timezone = "UTC"
locale = "en_US"

[branding]
title = "Tabula"
# weburl = "https://example.com"

# [preferences.Addressbook]
# exportName = "default"

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"
"#;

const SAMPLE_DEFINITION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<config>
    <name>default</name>
    <model>Addressbook_Model_Contact</model>
    <label>Contacts</label>
    <format>csv</format>
    <header>true</header>
    <datetimeFormat>%Y-%m-%d %H:%M</datetimeFormat>
    <columns>
        <column>
            <identifier>n_fn</identifier>
            <header>Name</header>
            <recordProperty>n_fn</recordProperty>
        </column>
        <column>
            <identifier>email</identifier>
            <header>E-Mail</header>
            <recordProperty>email</recordProperty>
        </column>
        <column>
            <identifier>created_by</identifier>
            <type>created_by</type>
            <header>Created by</header>
            <recordProperty>created_by</recordProperty>
        </column>
        <column>
            <identifier>created</identifier>
            <header>Created</header>
            <recordProperty>creation_time</recordProperty>
        </column>
        <column>
            <identifier>greeting</identifier>
            <header>Greeting</header>
            <expression>Dear {{ record.n_fn }}</expression>
        </column>
    </columns>
</config>
"#;

const SAMPLE_DATASET: &str = r#"{
  "model": "Addressbook_Model_Contact",
  "fields": ["id", "n_fn", "email", "created_by", "creation_time"],
  "datetime_fields": ["creation_time"],
  "records": [
    {"id": "1", "n_fn": "Alice Example", "email": "alice@example.com", "created_by": "admin",
     "creation_time": "2024-03-01T10:00:00+00:00"},
    {"id": "2", "n_fn": "Bob Example", "email": "bob@example.com", "created_by": "admin",
     "creation_time": "2024-03-02T16:30:00+00:00"}
  ],
  "users": [{"id": "admin", "display_name": "Administrator"}]
}
"#;

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output.display(), "Initializing configuration file");

        let base = self
            .output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();

        let mut files = vec![(self.output.clone(), CONFIG_TEMPLATE)];
        if self.with_examples {
            files.push((base.join("definitions").join("adb_default.xml"), SAMPLE_DEFINITION));
            files.push((base.join("contacts.json"), SAMPLE_DATASET));
        }

        if !self.force {
            if let Some((existing, _)) = files.iter().find(|(path, _)| path.exists()) {
                println!("❌ File already exists: {}", existing.display());
                println!("   Use --force to overwrite");
                return Ok(2);
            }
        }

        for (path, content) in &files {
            if let Err(e) = write_file(path, content) {
                println!("❌ Failed to write {}", path.display());
                println!("   Error: {e}");
                return Ok(5);
            }
            println!("✅ Created {}", path.display());
        }

        println!();
        println!("Next steps:");
        println!("  1. Edit {} with your settings", self.output.display());
        println!("  2. Check definitions: tabula validate-definition");
        if self.with_examples {
            println!(
                "  3. Run export: tabula export --model Addressbook_Model_Contact --dataset {}",
                base.join("contacts.json").display()
            );
        } else {
            println!("  3. Run export: tabula export --model <Model> --dataset <records.json>");
        }
        Ok(0)
    }
}

fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::dataset::JsonDataset;
    use crate::config::parse_config;
    use crate::definition::Definition;
    use crate::domain::DefinitionId;
    use tempfile::TempDir;

    #[test]
    fn test_config_template_is_valid() {
        let config = parse_config(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.account.id, "admin");
    }

    #[test]
    fn test_samples_parse() {
        let def = Definition::from_xml(
            DefinitionId::new("adb_default").unwrap(),
            SAMPLE_DEFINITION,
            None,
        )
        .unwrap();
        assert_eq!(def.name, "default");
        assert_eq!(JsonDataset::from_json(SAMPLE_DATASET).unwrap().model(), &def.model);
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("tabula.toml");

        let args = InitArgs {
            output: output.clone(),
            with_examples: true,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(temp.path().join("definitions/adb_default.xml").exists());
        assert!(temp.path().join("contacts.json").exists());

        assert_eq!(args.execute().await.unwrap(), 2);

        let forced = InitArgs { force: true, ..args };
        assert_eq!(forced.execute().await.unwrap(), 0);
    }
}
