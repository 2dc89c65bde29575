use anyhow::{Context, Result};
use markdown_basis_config::{self as config, Config, FormatConfig};
use markdown_basis_engine::{FormatOptions, TaskItemCase, TaskListItemPlacement, format_document};
use std::{env, path::PathBuf, process};

fn placement(placement: config::TaskListItemPlacement) -> TaskListItemPlacement {
    match placement {
        config::TaskListItemPlacement::AsIs => TaskListItemPlacement::AsIs,
        config::TaskListItemPlacement::IncompleteFirst => TaskListItemPlacement::IncompleteFirst,
        config::TaskListItemPlacement::IncompleteNestedFirst => {
            TaskListItemPlacement::IncompleteNestedFirst
        }
        config::TaskListItemPlacement::CompleteToNonTask => {
            TaskListItemPlacement::CompleteToNonTask
        }
        config::TaskListItemPlacement::CompleteNestedToNonTask => {
            TaskListItemPlacement::CompleteNestedToNonTask
        }
    }
}

fn item_case(case: config::TaskItemCase) -> TaskItemCase {
    match case {
        config::TaskItemCase::AsIs => TaskItemCase::AsIs,
        config::TaskItemCase::Lowercase => TaskItemCase::Lowercase,
        config::TaskItemCase::Uppercase => TaskItemCase::Uppercase,
    }
}

fn format_options(format: &FormatConfig) -> FormatOptions {
    let task_item_priorities = format
        .task_item_priorities
        .iter()
        .filter_map(|(marker, priority)| {
            let mut chars = marker.chars();
            match (chars.next(), chars.next()) {
                (Some(marker), None) => Some((marker, *priority)),
                _ => {
                    log::warn!("Ignoring priority for marker {marker:?}: not a single character");
                    None
                }
            }
        })
        .collect();

    FormatOptions {
        task_list_item_placement: placement(format.task_list_item_placement),
        task_list_item_case: item_case(format.task_list_item_case),
        prioritized_task_items: format.prioritized_task_items,
        task_item_priorities,
        default_task_item_priority: format.default_task_item_priority,
        ordered_task_item_priority: format.ordered_task_item_priority,
        max_blank_lines: format.max_blank_lines,
    }
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} <file.md> [--config <path>]");
    process::exit(1);
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("markdown-basis-cli");

    let (document_path, config_path) = match args.get(1..).unwrap_or(&[]) {
        [document] => (PathBuf::from(document), None),
        [document, flag, path] if flag == "--config" => {
            let path = PathBuf::from(path);
            let expanded = Config::expand_path(&path).unwrap_or(path);
            (PathBuf::from(document), Some(expanded))
        }
        _ => usage(program),
    };

    let config_path = config_path.unwrap_or_else(Config::config_path);
    let config = match Config::load_from_path(&config_path) {
        Ok(Some(config)) => {
            log::info!("Loaded config from {}", config_path.display());
            config
        }
        Ok(None) => {
            log::debug!("No config at {}, using defaults", config_path.display());
            Config::default()
        }
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let source = std::fs::read_to_string(&document_path)
        .with_context(|| format!("Failed to read {}", document_path.display()))?;
    let formatted = format_document(&source, &format_options(&config.format))
        .with_context(|| format!("Failed to format {}", document_path.display()))?;
    log::debug!("Formatted {} lines", formatted.lines.len());

    print!("{}", formatted.text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_default_options() {
        assert_eq!(
            format_options(&FormatConfig::default()),
            FormatOptions::default()
        );
    }

    #[test]
    fn test_multi_character_priority_keys_are_dropped() {
        let mut format = FormatConfig::default();
        format.task_item_priorities.insert("++".to_string(), 9);
        format.task_list_item_placement = config::TaskListItemPlacement::CompleteToNonTask;

        let options = format_options(&format);

        assert_eq!(options.task_item_priorities.len(), 3);
        assert_eq!(
            options.task_list_item_placement,
            TaskListItemPlacement::CompleteToNonTask
        );
    }
}
