use protolink::{greet, logging, Config, NativeLibrary, Person};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
struct CliConfig {
    library: Option<PathBuf>,
    config_file: Option<PathBuf>,
    in_process: bool,
    name: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            library: None,
            config_file: None,
            in_process: false,
            name: "Mike".to_string(),
        }
    }
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} [OPTIONS] [NAME]\n\nOptions:\n  \
         --library PATH  Native library to load\n  \
         --config FILE   Configuration file (default: ./protolink.toml)\n  \
         --in-process    Use the exports linked into this binary\n  \
         -h, --help      Show this message",
        program
    )
}

fn parse_args() -> Result<Option<CliConfig>, String> {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("protolink");

    let mut config = CliConfig::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                println!("{}", usage(program));
                return Ok(None);
            }
            "--in-process" => config.in_process = true,
            "--library" => {
                i += 1;
                let path = args.get(i).ok_or("--library requires an argument")?;
                config.library = Some(PathBuf::from(path));
            }
            "--config" => {
                i += 1;
                let path = args.get(i).ok_or("--config requires an argument")?;
                config.config_file = Some(PathBuf::from(path));
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}\n\n{}", arg, usage(program)));
            }
            name => config.name = name.to_string(),
        }
        i += 1;
    }

    Ok(Some(config))
}

fn load_library(cli: &CliConfig, config: &Config) -> Result<NativeLibrary, Box<dyn std::error::Error>> {
    if cli.in_process {
        return Ok(NativeLibrary::in_process());
    }

    let path = match &cli.library {
        Some(path) => path.clone(),
        None => config.library.resolve()?,
    };
    // SAFETY: the library at `path` is expected to export the protolink ABI.
    let library = unsafe { NativeLibrary::open(&path)? };
    Ok(library)
}

fn run(cli: CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config_file {
        Some(path) => Config::load(path)?.with_env_overrides(),
        None => Config::discover(".")?,
    };
    let _guard = logging::init_with_config(config.logging.to_log_config()?.merge_env());
    let _perf = logging::perf::track("protolink_cli");

    let library = Arc::new(load_library(&cli, &config)?);
    info!(path = ?library.path(), "native library ready");

    println!("{}", greet(&library, &cli.name)?);

    let person = Person::new(&library, "Alice", 30)?;
    println!("{}", person.greet(&cli.name)?);
    person.dispose()?;

    NativeLibrary::close(library)?;
    Ok(())
}

fn main() {
    let cli = match parse_args() {
        Ok(Some(cli)) => cli,
        Ok(None) => return,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
