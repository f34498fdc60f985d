//! `xisf` - inspect, validate and dump XISF 1.0 units
//!
//! Supports monolithic (`.xisf`) and distributed (`.xish`) units; format is
//! sniffed automatically unless overridden with `--format`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use xisf_io::{facade, FormatHint, ReaderOptions};

#[derive(Parser)]
#[command(name = "xisf", about = "Inspect, validate and dump XISF 1.0 units", version)]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Monolithic,
    Distributed,
}

impl From<FormatArg> for FormatHint {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Monolithic => FormatHint::Monolithic,
            FormatArg::Distributed => FormatHint::Distributed,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary of a unit's header and images
    Info {
        /// `.xisf` or `.xish` file to read
        file: PathBuf,
        /// Skip format sniffing and force monolithic or distributed
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        /// Also materialize and report each image's pixel payload size
        #[arg(long)]
        load_pixels: bool,
        /// Emit the summary as JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Validate a unit's structural invariants without materializing pixel data
    Validate {
        /// `.xisf` or `.xish` file to read
        file: PathBuf,
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Print the unit's XML header, reformatted
    DumpXml {
        /// `.xisf` or `.xish` file to read
        file: PathBuf,
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
        /// Emit compact XML instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();
}

fn run_info(file: PathBuf, format: Option<FormatArg>, load_pixels: bool, json: bool) -> Result<()> {
    let mut carrier = std::fs::File::open(&file).with_context(|| format!("opening {}", file.display()))?;
    let filename = file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

    let mut options = ReaderOptions::default();
    options.load_external_references = load_pixels;
    let read_result = facade::read(&mut carrier, format.map(Into::into), filename, &options)
        .with_context(|| format!("reading {}", file.display()))?;

    if json {
        return print_info_json(&read_result, load_pixels);
    }

    println!("storage model : {:?}", read_result.unit.storage_model);
    println!("creator       : {}", read_result.unit.header.metadata.creator_application);
    println!("creation time : {}", read_result.unit.header.metadata.creation_time);
    println!("images        : {}", read_result.unit.images.len());
    for (i, image) in read_result.unit.images.iter().enumerate() {
        println!(
            "  [{i}] {:?} {:?} {:?}{}",
            image.geometry.dims,
            image.sample_format,
            image.color_space,
            image.image_id.as_deref().map(|id| format!(" id={id}")).unwrap_or_default(),
        );
        if load_pixels {
            let size = read_result.image_payloads.get(i).and_then(|p| p.as_ref()).map(|p| p.len());
            match size {
                Some(n) => println!("       payload: {n} bytes"),
                None => println!("       payload: not materialized (external reference)"),
            }
        }
    }
    Ok(())
}

fn print_info_json(read_result: &facade::UnitRead, load_pixels: bool) -> Result<()> {
    let images: Vec<serde_json::Value> = read_result
        .unit
        .images
        .iter()
        .enumerate()
        .map(|(i, image)| {
            let payload_len = read_result.image_payloads.get(i).and_then(|p| p.as_ref()).map(|p| p.len());
            serde_json::json!({
                "dims": image.geometry.dims,
                "channels": image.geometry.channels,
                "sampleFormat": image.sample_format.as_str(),
                "colorSpace": image.color_space.as_str(),
                "id": image.image_id,
                "payloadBytes": payload_len,
            })
        })
        .collect();

    let summary = serde_json::json!({
        "storageModel": match &read_result.unit.storage_model {
            xisf_model::StorageModel::Monolithic => serde_json::json!({"kind": "monolithic"}),
            xisf_model::StorageModel::Distributed { header_filename, data_block_filenames } => serde_json::json!({
                "kind": "distributed",
                "headerFilename": header_filename,
                "dataBlockFilenames": data_block_filenames,
            }),
        },
        "creator": read_result.unit.header.metadata.creator_application,
        "creationTime": read_result.unit.header.metadata.creation_time.to_rfc3339(),
        "loadPixels": load_pixels,
        "images": images,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_validate(file: PathBuf, format: Option<FormatArg>) -> Result<()> {
    let mut carrier = std::fs::File::open(&file).with_context(|| format!("opening {}", file.display()))?;
    let filename = file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

    let read_result = facade::read(&mut carrier, format.map(Into::into), filename, &ReaderOptions::default());
    match read_result {
        Ok(read_result) => {
            let validation = xisf_model::validate(&read_result.unit);
            for warning in &validation.warnings {
                println!("warning: {warning}");
            }
            if validation.ok {
                println!("ok: {} image(s)", read_result.unit.images.len());
                Ok(())
            } else {
                for error in &validation.errors {
                    println!("error: {error}");
                }
                anyhow::bail!("validation failed with {} error(s)", validation.errors.len());
            }
        }
        Err(xisf_io::Error::Model(xisf_model::Error::ValidationFailed(errors))) => {
            for error in &errors {
                println!("error: {error}");
            }
            anyhow::bail!("validation failed with {} error(s)", errors.len());
        }
        Err(e) => Err(e).context("reading unit"),
    }
}

fn run_dump_xml(file: PathBuf, format: Option<FormatArg>, compact: bool) -> Result<()> {
    let mut carrier = std::fs::File::open(&file).with_context(|| format!("opening {}", file.display()))?;
    let filename = file.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

    let read_result = facade::read(&mut carrier, format.map(Into::into), filename, &ReaderOptions::default())
        .with_context(|| format!("reading {}", file.display()))?;

    let doc = xisf_xml::XisfDocument {
        header: read_result.unit.header,
        images: read_result.unit.images,
        global_properties: read_result.unit.global_properties,
        signature: read_result.unit.signature,
    };
    let xml = xisf_xml::write_document(&doc, !compact)?;
    print!("{xml}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { file, format, load_pixels, json } => run_info(file, format, load_pixels, json),
        Commands::Validate { file, format } => run_validate(file, format),
        Commands::DumpXml { file, format, compact } => run_dump_xml(file, format, compact),
    }
}
