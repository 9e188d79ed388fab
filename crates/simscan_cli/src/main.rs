use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use simscan_core::cache::AnalysisCache;
use simscan_core::error::CoreError;
use simscan_core::{dbpf, savegame, sgi};
use simscan_core::tray::TrayIndex;
use simscan_render as render;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract sims, households and worlds from a save file
    Analyze {
        #[arg(value_name = "SAVE")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
        /// Reuse analysis results across runs via this cache file
        #[arg(long = "cache-file", value_name = "PATH")]
        cache_file: Option<PathBuf>,
    },
    /// List the index entries of a DBPF archive
    Entries {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Dump one decompressed archive entry to a file
    Extract {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[arg(long = "type", value_name = "HEX", value_parser = parse_hex_u32)]
        resource_type: u32,
        #[arg(long, value_name = "HEX", value_parser = parse_hex_u64)]
        instance: u64,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Index the tray folder's households and portraits
    Tray {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
        #[arg(long)]
        json: bool,
        /// Cross-reference against a save to recover renamed sims
        #[arg(long, value_name = "SAVE")]
        save: Option<PathBuf>,
    },
    /// Decode an SGI portrait file to a JPEG
    Portrait {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            path,
            json,
            cache_file,
        } => run_analyze(&path, json, cache_file.as_deref()),
        Command::Entries { path, json } => run_entries(&path, json),
        Command::Extract {
            path,
            resource_type,
            instance,
            output,
        } => run_extract(&path, resource_type, instance, output),
        Command::Tray { dir, json, save } => run_tray(&dir, json, save.as_deref()),
        Command::Portrait { path, output } => run_portrait(&path, output),
    }
}

fn run_analyze(path: &Path, json: bool, cache_file: Option<&Path>) {
    let analysis = match cache_file {
        Some(cache_path) => {
            let mut cache = AnalysisCache::load(cache_path);
            savegame::analyze_with_cache(path, &mut cache)
        }
        None => savegame::analyze(path),
    }
    .unwrap_or_else(|e| fail(&e));

    if json {
        print_json(&render::render_analysis_json(
            &analysis,
            render::JsonStyle::default(),
        ));
    } else {
        print!("{}", render::render_analysis_text(&analysis));
    }
}

fn run_entries(path: &Path, json: bool) {
    let entries = dbpf::read_entries(path);
    if json {
        print_json(&render::render_entries_json(&entries));
    } else {
        print!("{}", render::render_entries_text(&entries));
    }
}

fn run_extract(path: &Path, resource_type: u32, instance: u64, output: Option<PathBuf>) {
    let entries = dbpf::read_entries(path);
    let Some(entry) = entries
        .iter()
        .find(|e| e.resource_type == resource_type && e.instance == instance)
    else {
        eprintln!(
            "no entry with type 0x{:08x} and instance 0x{:016x} in {}",
            resource_type,
            instance,
            path.display()
        );
        process::exit(1);
    };

    let data = dbpf::read_entry_data(path, entry);
    if data.is_empty() {
        eprintln!("entry data is empty or could not be decompressed");
        process::exit(1);
    }

    let out_path = output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "entry_{:08x}_{:016x}.bin",
            resource_type, instance
        ))
    });
    fs::write(&out_path, &data).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {e}", out_path.display());
        process::exit(1);
    });
    println!("Wrote {} bytes to {}", data.len(), out_path.display());
}

fn run_tray(dir: &Path, json: bool, save: Option<&Path>) {
    let index = TrayIndex::build(dir);

    if json {
        print_json(&render::render_tray_json(&index));
    } else {
        print!("{}", render::render_tray_text(&index));
    }

    if let Some(save_path) = save {
        let analysis = savegame::analyze(save_path).unwrap_or_else(|e| fail(&e));
        let extra = index.match_renamed_sims(&analysis.households);
        if extra.is_empty() {
            println!("No renamed sims recovered.");
        } else {
            println!("Recovered renamed sims:");
            for (name, portrait) in &extra {
                println!("  {} -> {}", name, portrait.display());
            }
        }
    }
}

fn run_portrait(path: &Path, output: Option<PathBuf>) {
    let Some(jpeg) = sgi::decrypt(path) else {
        eprintln!("not a decodable portrait file: {}", path.display());
        process::exit(1);
    };

    let out_path = output.unwrap_or_else(|| path.with_extension("jpg"));
    fs::write(&out_path, &jpeg).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {e}", out_path.display());
        process::exit(1);
    });
    println!("Wrote {} bytes to {}", jpeg.len(), out_path.display());
}

fn print_json(value: &serde_json::Value) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}

fn fail(error: &CoreError) -> ! {
    eprintln!("Error: {error}");
    process::exit(1);
}

fn parse_hex_u32(value: &str) -> Result<u32, String> {
    let trimmed = value.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(trimmed, 16).map_err(|_| format!("invalid hex value '{value}'"))
}

fn parse_hex_u64(value: &str) -> Result<u64, String> {
    let trimmed = value.trim_start_matches("0x").trim_start_matches("0X");
    u64::from_str_radix(trimmed, 16).map_err(|_| format!("invalid hex value '{value}'"))
}
