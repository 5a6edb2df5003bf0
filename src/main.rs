// Sun Aug 23 2026 - Alex

use anyhow::{anyhow, bail, Context, Result};
use character_struct_scanner::{
    Address, CharacterScanner, FieldType, FieldValue, Record, ScanConfig, ScanEvent, ScanWorker,
    Severity,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(version = "1.0.0")]
#[command(about = "Scan a running game process for its character struct table", long_about = None)]
struct Args {
    /// JSON scan configuration; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the target process name from the config.
    #[arg(short, long)]
    process: Option<String>,

    #[arg(long)]
    no_progress: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan on a worker thread and print every located record.
    Scan,
    /// Scan synchronously and print the record table.
    List,
    /// Read one field of one record.
    Get {
        /// Record index within the located table.
        index: usize,
        field: String,
    },
    /// Write one field of one record.
    Set {
        index: usize,
        field: String,
        value: String,
    },
    /// Poll for the process until it appears, then scan.
    Watch {
        /// Seconds between attach attempts.
        #[arg(long, default_value_t = 2)]
        interval: u64,
    },
    /// Write the effective configuration to stdout.
    Config,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("{} {}", "[!]".red(), e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ScanConfig::load(path).map_err(|e| anyhow!(e))?,
        None => ScanConfig::default(),
    };
    if let Some(process) = &args.process {
        config.process_name = process.clone();
    }
    config.validate().map_err(|e| anyhow!(e))?;

    match args.command {
        Command::Scan => scan_async(config, args.no_progress),
        Command::List => {
            let scanner = attach(config)?;
            let records = scanner.get_all_records()?;
            print_records(&records);
            Ok(())
        }
        Command::Get { index, field } => {
            let scanner = attach(config)?;
            let address = record_address(&scanner, index)?;
            let value = scanner.read_field(address, &field)?;
            println!("{}", value);
            Ok(())
        }
        Command::Set { index, field, value } => {
            let scanner = attach(config)?;
            let address = record_address(&scanner, index)?;
            let descriptor = scanner
                .config()
                .offsets
                .get(&field)
                .ok_or_else(|| anyhow!("Unknown field: {}", field))?;
            let value = parse_value(descriptor.field_type, &value)?;
            scanner.write_field(address, &field, value)?;
            println!("{} {} = {} written at {}", "[+]".green(), field, value, address);
            Ok(())
        }
        Command::Watch { interval } => {
            let mut scanner = CharacterScanner::new(config.clone());
            println!(
                "{} Waiting for process '{}'...",
                "[*]".blue(),
                config.process_name
            );
            while !scanner.attach() {
                std::thread::sleep(Duration::from_secs(interval));
            }
            println!("{} Attached", "[+]".green());
            let records = scanner.get_all_records()?;
            print_records(&records);
            Ok(())
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn attach(config: ScanConfig) -> Result<CharacterScanner> {
    let name = config.process_name.clone();
    let mut scanner = CharacterScanner::new(config);
    if !scanner.attach() {
        bail!("Could not attach to process '{}'. Is it running?", name);
    }
    println!("{} Attached to '{}'", "[+]".green(), name);
    Ok(scanner)
}

fn record_address(scanner: &CharacterScanner, index: usize) -> Result<Address> {
    let addresses = scanner.record_addresses()?;
    if addresses.is_empty() {
        bail!("No record table found in the target process");
    }
    addresses
        .get(index)
        .copied()
        .ok_or_else(|| anyhow!("Record index {} out of range (table has {})", index, addresses.len()))
}

fn parse_value(field_type: FieldType, text: &str) -> Result<FieldValue> {
    let value = match field_type {
        FieldType::Byte => FieldValue::Byte(
            text.parse().with_context(|| format!("'{}' is not a byte (0-255)", text))?,
        ),
        FieldType::Bool => match text {
            "true" | "1" | "on" => FieldValue::Bool(true),
            "false" | "0" | "off" => FieldValue::Bool(false),
            _ => bail!("'{}' is not a boolean (true/false)", text),
        },
        FieldType::Int32 => FieldValue::Int32(
            text.parse().with_context(|| format!("'{}' is not a 32-bit integer", text))?,
        ),
    };
    Ok(value)
}

fn scan_async(config: ScanConfig, no_progress: bool) -> Result<()> {
    let mut scanner = CharacterScanner::new(config.clone());
    if !scanner.attach() {
        bail!(
            "Could not attach to process '{}'. Is it running?",
            config.process_name
        );
    }
    println!("{} Attached to '{}'", "[+]".green(), config.process_name);

    let backend = scanner.handle().backend()?.clone();
    let (sender, receiver) = mpsc::channel();
    let mut worker = ScanWorker::new(config, sender);
    worker.start(backend);

    let progress = if no_progress {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Scanning...");
        Some(pb)
    };

    let mut records: Option<Vec<Record>> = None;
    while let Ok(event) = receiver.recv() {
        match event {
            ScanEvent::Status { message, severity } => {
                let line = match severity {
                    Severity::Info => format!("{} {}", "[*]".blue(), message),
                    Severity::Error => format!("{} {}", "[!]".red(), message),
                };
                match &progress {
                    Some(pb) => pb.println(line),
                    None => println!("{}", line),
                }
            }
            ScanEvent::Finished(result) => {
                records = Some(result);
                break;
            }
            ScanEvent::Error(message) => {
                if let Some(pb) = &progress {
                    pb.finish_and_clear();
                }
                bail!(message);
            }
        }
    }
    worker.stop();
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    match records {
        Some(records) => print_records(&records),
        None => println!("{} Scan ended without a result", "[!]".red()),
    }
    Ok(())
}

fn print_records(records: &[Record]) {
    if records.is_empty() {
        println!("{} No character records found", "[!]".yellow());
        return;
    }
    println!("{} Found {} character records", "[+]".green(), records.len());
    for (index, record) in records.iter().enumerate() {
        println!();
        println!("{} record {} @ {}", "[*]".blue(), index, record.address);
        for (name, value) in &record.fields {
            println!("    {:<16} {}", name.cyan(), value);
        }
    }
}
