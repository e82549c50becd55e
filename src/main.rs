use anyhow::Result;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wow_static_extract::{
    cli::{Cli, Commands},
    filter::resolve_kinds,
    pipeline::{run_pipeline, PipelineConfig},
    progress::Progress,
    realms::sync_realms,
    schema::{EntityKind, ALL_TABLES, LISTFILE},
    warehouse::{default_expansions, extract_warehouse, Expansions},
    writer::WritePolicy,
};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wow_static_extract=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Extract {
            data,
            interface,
            output,
            include,
            exclude,
            overwrite,
            parallel,
        } => {
            let start = Instant::now();
            let kinds = resolve_kinds(include, exclude)?;

            let config = PipelineConfig {
                data_dir: data,
                interface_dir: interface,
                output_dir: output,
                policy: if overwrite {
                    WritePolicy::Overwrite
                } else {
                    WritePolicy::WriteOnce
                },
                parallel,
            };

            let summary = run_pipeline(&config, &kinds, &Progress::console())?;

            let elapsed = start.elapsed();
            println!(
                "\nExtracted {} records ({} new documents, {} rows skipped) into {:?} in {:.1}s",
                summary.total_records(),
                summary.documents_written(),
                summary.total_skipped(),
                config.output_dir,
                elapsed.as_secs_f64()
            );
        }

        Commands::Warehouse {
            data,
            output,
            expansions,
        } => {
            let expansions: Expansions = if expansions.is_empty() {
                default_expansions()
            } else {
                expansions.into_iter().collect()
            };

            let content = extract_warehouse(&data, &output, &expansions)?;
            println!(
                "Wrote {} arenas, {} dungeons, {} raids, {} encounters to {:?}",
                content.arenas.len(),
                content.dungeons.len(),
                content.raids.len(),
                content.encounters.len(),
                output
            );
        }

        Commands::SyncRealms { realms, db } => {
            let snapshot = sync_realms(&realms, &db)?;
            println!(
                "Synced {} connected realms ({} members) into {:?}",
                snapshot.realms.len(),
                snapshot.members.len(),
                db
            );
        }

        Commands::ListEntities => {
            println!("Available entity kinds:\n");
            for kind in EntityKind::ALL {
                println!("  {:12} -> {}", kind.name(), kind.categories().join(", "));
            }

            println!("\nSource files read from the data directory:\n");
            println!("  {}", LISTFILE);
            for table in ALL_TABLES {
                println!("  {:24} ({})", table.source_file, table.columns.join(", "));
            }
        }
    }

    Ok(())
}
