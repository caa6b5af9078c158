//! bootscr CLI
//!
//! Inspect, extract, build and edit U-Boot legacy uImage boot scripts.

use clap::{Args, Parser, Subcommand};
use bootscr::{output, BootScript, HeaderDefaults};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bootscr")]
#[command(about = "Inspect and edit U-Boot legacy uImage boot scripts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print container header information
    Info {
        /// Input boot.scr file
        input: PathBuf,

        /// Emit JSON instead of the text listing
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Extract the script text from a container
    Extract {
        /// Input boot.scr file
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Wrap a plain-text script into a fresh container
    Build {
        /// Input script text file
        input: PathBuf,

        /// Output boot.scr file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        header: HeaderArgs,
    },

    /// Replace the script inside an existing container, keeping its metadata
    Replace {
        /// Existing boot.scr file
        image: PathBuf,

        /// Replacement script text file
        script: PathBuf,

        /// Output file (rewrites the input image if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct HeaderArgs {
    /// Image name stored in the header (32 bytes max)
    #[arg(long, default_value = "boot script")]
    name: String,

    /// Load address
    #[arg(long, value_parser = parse_u32, default_value = "0")]
    load_addr: u32,

    /// Entry point address
    #[arg(long, value_parser = parse_u32, default_value = "0")]
    entry_point: u32,
}

impl HeaderArgs {
    fn to_defaults(&self) -> HeaderDefaults {
        HeaderDefaults {
            name: self.name.clone(),
            load_address: self.load_addr,
            entry_point: self.entry_point,
        }
    }
}

/// Accept both decimal and 0x-prefixed hex addresses.
fn parse_u32(s: &str) -> Result<u32, String> {
    let result = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    result.map_err(|e| format!("invalid address '{}': {}", s, e))
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Command::Info { input, json, pretty } => {
            let script = load(cli, input)?;
            if *json {
                let stdout = std::io::stdout();
                output::write_json(&script, stdout.lock(), *pretty)?;
                println!();
            } else if let Some(header) = script.header() {
                let stdout = std::io::stdout();
                output::write_info(header, stdout.lock())?;
            }
        }

        Command::Extract { input, output } => {
            let script = load(cli, input)?;
            match output {
                Some(path) => {
                    let file = File::create(path)?;
                    let mut writer = BufWriter::new(file);
                    writer.write_all(script.text().as_bytes())?;
                    writer.flush()?;
                    if cli.verbose {
                        eprintln!("  -> {}", path.display());
                    }
                }
                None => print!("{}", script.text()),
            }
        }

        Command::Build { input, output, header } => {
            let text = std::fs::read_to_string(input)?;
            let script = BootScript::new(text);
            script.write_to(output, &header.to_defaults())?;
            if cli.verbose {
                eprintln!("  -> {}", output.display());
            }
        }

        Command::Replace { image, script, output } => {
            let mut doc = load(cli, image)?;
            let text = std::fs::read_to_string(script)?;
            doc.set_text(text);

            let target = output.as_ref().unwrap_or(image);
            doc.write_to(target, &HeaderDefaults::default())?;
            if cli.verbose {
                eprintln!("  -> {}", target.display());
            }
        }
    }

    Ok(())
}

/// Parse a container file and report any checksum warnings on stderr.
fn load(cli: &Cli, path: &PathBuf) -> Result<BootScript, Box<dyn std::error::Error>> {
    if cli.verbose {
        eprintln!("Processing: {}", path.display());
    }

    let script = BootScript::from_file(path)?;
    for warning in script.warnings() {
        eprintln!("Warning: {}", warning);
    }

    Ok(script)
}
