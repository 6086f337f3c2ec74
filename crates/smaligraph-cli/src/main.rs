use anyhow::{Context, Result};
use clap::Parser;
use smaligraph::serialize::coo;
use smaligraph::{self, OutputFormat, ViewKind};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

/// smaligraph — interprocedural program graph extraction from disassembled
/// Android (smali) applications.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Root directory of the decompiled app (contains AndroidManifest.xml and smali/)
    #[arg(short = 'd', long = "dir")]
    dir: PathBuf,

    /// Which program graph view to assemble
    #[arg(short = 't', long = "type", value_parser = ["cfg", "fcg", "hybrid"])]
    view: String,

    /// Output directory (defaults to the current directory)
    #[arg(short = 'o', long = "outdir")]
    outdir: Option<PathBuf>,

    /// Output serialization format
    #[arg(short = 'f', long = "format", value_parser = ["coo", "dot"], default_value = "dot")]
    format: String,

    /// Expansion-methods file, required when `-t hybrid`
    #[arg(short = 'e', long = "expansion")]
    expansion: Option<PathBuf>,

    /// Feature-vector/output variant
    #[arg(short = 's', long = "variant", value_parser = ["cfgexplainer", "malgraph"])]
    variant: Option<String>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let view_kind = match cli.view.as_str() {
        "cfg" => ViewKind::Cfg,
        "fcg" => ViewKind::Fcg,
        "hybrid" => ViewKind::Hybrid,
        other => anyhow::bail!("unknown view type {other}"),
    };

    if view_kind == ViewKind::Hybrid && cli.expansion.is_none() {
        anyhow::bail!("-e <expansion-file> is required when -t hybrid");
    }

    let expansion_targets = match &cli.expansion {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read expansion file {}", path.display()))?;
            smaligraph::views::hybrid::parse_expansion_file(&text)
        }
        None => Vec::new(),
    };

    let coo_variant = match cli.variant.as_deref() {
        Some("cfgexplainer") => coo::Variant::CfgExplainer,
        _ => coo::Variant::Standard,
    };
    let format = match cli.format.as_str() {
        "coo" => OutputFormat::Coo(coo_variant),
        _ => OutputFormat::Dot,
    };

    let collect_malgraph_counts = cli.variant.as_deref() == Some("malgraph");

    let base_name = cli
        .dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let outdir = cli.outdir.clone().unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&outdir).with_context(|| format!("failed to create {}", outdir.display()))?;

    validate_declared_files(&cli.dir);

    let (view, program, counts) = smaligraph::extract(
        &cli.dir,
        view_kind,
        format,
        &expansion_targets,
        collect_malgraph_counts,
    )?;

    let extension = if cli.format == "coo" { "coo" } else { "dot" };
    let output_path = outdir.join(format!("{base_name}.{extension}"));
    let rendered = smaligraph::render(&view, format);
    fs::write(&output_path, rendered).map_err(|source| {
        smaligraph::errors::GraphError::OutputWrite { path: output_path.display().to_string(), source }
    })?;
    log::info!("wrote {}", output_path.display());

    if let Some(counts) = counts {
        let counts_path = outdir.join(format!("{base_name}.counts.json"));
        smaligraph::malgraph::write_counts_file(&counts_path, &program, &counts)
            .unwrap_or_else(|err| log::warn!("failed to write malgraph counts: {err:#}"));
    }

    Ok(())
}

/// `walkdir`-based sanity pass over the declared app tree: logs a warning
/// for an empty or unreadable `smali/` directory, but never aborts the run
/// (file discovery itself stays invocation-driven, per §10).
fn validate_declared_files(root: &PathBuf) {
    let smali_root = root.join("smali");
    let mut seen_any = false;
    for entry in walkdir::WalkDir::new(&smali_root).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file() {
            seen_any = true;
            break;
        }
    }
    if !seen_any {
        log::warn!("no smali files found under {}", smali_root.display());
    }
}
