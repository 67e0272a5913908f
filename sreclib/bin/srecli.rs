use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use sreclib::{SrecConfig, SrecEncoder, checksum_from_hex};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Motorola S-record Utility
#[derive(Parser, Debug)]
#[command(name = "srecli", version, about)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a binary file as S-records
    Convert {
        /// Binary input file
        input: PathBuf,
        /// S-record output file, '-' writes to stdout
        output: PathBuf,
        #[command(flatten)]
        encoding: EncodingArgs,
    },
    /// Show how a binary file would be encoded
    Info {
        /// Binary input file
        input: PathBuf,
        #[command(flatten)]
        encoding: EncodingArgs,
    },
    /// Print the checksum of a hex record body (byte count, address and data)
    Checksum {
        /// Hex digits, e.g. 030001
        body: String,
    },
}

#[derive(Args, Debug)]
struct EncodingArgs {
    /// Data bytes per record (default: 32)
    #[arg(long, value_parser = parse_number::<usize>)]
    chunk_size: Option<usize>,
    /// Address width in bits: 16 (S1), 24 (S2) or 32 (S3) (default: 32)
    #[arg(long, value_parser = parse_number::<u32>)]
    address_bits: Option<u32>,
    /// ASCII text of the S0 header record
    #[arg(long)]
    header: Option<String>,
    /// Start address written to the terminating S7/S8/S9 record
    #[arg(long, value_parser = parse_number::<u32>)]
    start_address: Option<u32>,
}

impl From<EncodingArgs> for SrecConfig {
    fn from(args: EncodingArgs) -> Self {
        Self {
            chunk_size: args.chunk_size,
            address_bits: args.address_bits,
            header: args.header,
            start_address: args.start_address,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Dispatch and immediately handle results
    if let Err(e) = run_dispatch(cli.command) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_dispatch(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Convert {
            input,
            output,
            encoding,
        } => {
            // Guard: Input must exist
            let in_abs_path = validate_exists(&input)?;
            run_convert(&in_abs_path, &output, &encoding.into())
        }
        Command::Info { input, encoding } => {
            let in_abs_path = validate_exists(&input)?;
            run_info(&in_abs_path, &encoding.into())
        }
        Command::Checksum { body } => {
            let checksum = checksum_from_hex(body.trim())
                .with_context(|| format!("Invalid record body: {body}"))?;
            println!("0x{checksum:02X}");
            Ok(())
        }
    }
}

fn run_convert(in_path: &Path, out_path: &Path, config: &SrecConfig) -> anyhow::Result<()> {
    let data = std::fs::read(in_path)
        .with_context(|| format!("Failed to read {}", in_path.display()))?;

    let srec = SrecEncoder::new(config)?.encode(&data)?;

    if out_path == Path::new("-") {
        std::io::stdout().lock().write_all(srec.as_bytes())?;
        return Ok(());
    }

    // Ensure the parent directory exists
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(out_path, srec)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    // Validate output file was written
    let out_abs_path = validate_exists(out_path)?;

    println!(
        "Converted {} -> {}",
        in_path.display(),
        out_abs_path.display()
    );
    Ok(())
}

fn run_info(path: &Path, config: &SrecConfig) -> anyhow::Result<()> {
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let encoder = SrecEncoder::new(config)?;
    let records = encoder.records(&data)?;
    let resolved = encoder.config();
    let data_records = records.iter().filter(|r| r.rtype().is_data()).count();

    println!("File Path:     {}", path.display());
    println!("Data Size:     {} bytes", data.len());
    println!(
        "Data Records:  {data_records} x {} ({} bytes each)",
        resolved.data_type, resolved.chunk_size
    );
    if let Some(count) = records.iter().find(|r| r.rtype().is_count()) {
        println!("Count Record:  {}", count.rtype());
    }
    println!("Total Records: {}", records.len());
    Ok(())
}

// =============================== HELPER FUNCTIONS ===============================

/// Parse a string as a decimal number, or as hex when prefixed with 0x
fn parse_number<T: TryFrom<u64>>(s: &str) -> Result<T, String> {
    let s = s.trim();

    // Handle explicit 0x prefix
    let value = if let Some(hex_str) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex_str, 16)
    } else {
        s.parse::<u64>()
    }
    .map_err(|e| format!("invalid number '{s}': {e}"))?;

    T::try_from(value).map_err(|_| format!("number '{s}' is out of range"))
}

/// Validate that a path exists and is a file. Returns absolute path.
fn validate_exists(path: &Path) -> anyhow::Result<PathBuf> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }
    if !path.is_file() {
        bail!("Path is not a file: {}", path.display());
    }
    Ok(std::fs::canonicalize(path)?)
}
