//! Process and RAM region diagnostics.

use anyhow::Result;
use owo_colors::OwoColorize;
use sunhook_core::memory::layout::ram;
use sunhook_core::process::{name_matches, resolve_ram_base};
use sunhook_core::{NativeProvider, ProcessProvider, TrackerConfig};

/// List every process matching the configured names and where its RAM image is.
pub fn run(config: &TrackerConfig) -> Result<()> {
    let provider = NativeProvider::new();
    let case_insensitive = provider.case_insensitive_names();

    let candidates: Vec<_> = provider
        .enumerate_processes()?
        .into_iter()
        .filter(|process| {
            config
                .process_names
                .iter()
                .any(|target| name_matches(&process.name, target, case_insensitive))
        })
        .collect();

    if candidates.is_empty() {
        println!(
            "{}",
            format!(
                "No emulator process found ({})",
                config.process_names.join(", ")
            )
            .yellow()
        );
        return Ok(());
    }

    for candidate in candidates {
        println!("{} (PID {})", candidate.name.bold(), candidate.pid);

        let process = match provider.open_process(candidate.pid) {
            Ok(process) => process,
            Err(e) => {
                println!("  {}", format!("Failed to open: {}", e).red());
                continue;
            }
        };

        match provider.query_memory_regions(&process) {
            Ok(regions) => {
                for region in regions.iter().filter(|r| r.size == ram::SIZE) {
                    println!("  candidate {:#x}..{:#x}", region.base, region.end());
                }
            }
            Err(e) => println!("  {}", format!("Failed to query regions: {}", e).red()),
        }

        match resolve_ram_base(&provider, &process) {
            Some(base) => println!("  RAM base: {}", format!("{:#x}", base).green()),
            None => println!("  {}", "RAM region not found".yellow()),
        }
    }

    Ok(())
}
