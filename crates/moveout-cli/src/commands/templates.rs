//! Room template command handler

use anyhow::{anyhow, Result};

use moveout_core::{template_for, RoomType, ROOM_TEMPLATES};

use crate::output::{Output, OutputFormat};

/// List the room templates, or one template's checklist
pub fn show(room_type: Option<RoomType>, output: &Output) -> Result<()> {
    let Some(room_type) = room_type else {
        match output.format {
            OutputFormat::Json => output.json(
                &ROOM_TEMPLATES
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "type": t.room_type,
                            "name": t.name,
                            "icon": t.icon,
                            "defaultItems": t.default_items,
                        })
                    })
                    .collect::<Vec<_>>(),
            ),
            OutputFormat::Quiet => {
                for template in &ROOM_TEMPLATES {
                    println!("{}", template.room_type);
                }
            }
            OutputFormat::Human => {
                for template in &ROOM_TEMPLATES {
                    println!(
                        "{} {:<14} {:<12} {} items",
                        template.icon,
                        template.room_type.as_str(),
                        template.name,
                        template.default_items.len()
                    );
                }
            }
        }
        return Ok(());
    };

    let template =
        template_for(room_type).ok_or_else(|| anyhow!("No template for {}", room_type))?;

    match output.format {
        OutputFormat::Json => output.json(&serde_json::json!({
            "type": template.room_type,
            "name": template.name,
            "icon": template.icon,
            "defaultItems": template.default_items,
        })),
        OutputFormat::Quiet => {
            for item in template.default_items {
                println!("{}", item);
            }
        }
        OutputFormat::Human => {
            println!("{} {}", template.icon, template.name);
            println!();
            for (i, item) in template.default_items.iter().enumerate() {
                println!("{:>2}. {}", i + 1, item);
            }
        }
    }
    Ok(())
}
