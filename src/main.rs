use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use log::debug;

use sword::{
    load_module_file, LibraryConfig, ModuleLibrary, ModuleType, SearchMode, SwordModule,
};

#[derive(Parser)]
#[command(name = "sword", version, about = "Read SWORD Bible and dictionary modules")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (can be used multiple times: -v, -vv)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the text of references (bibles) or headwords (dictionaries)
    Render {
        /// Module archive
        archive: PathBuf,
        /// References such as `John.3:16-18` or dictionary headwords
        #[arg(required = true)]
        references: Vec<String>,
        #[arg(short = 't', long = "type", value_enum, default_value_t = Kind::Bible)]
        kind: Kind,
    },
    /// Search a dictionary's headwords
    Search {
        /// Module archive
        archive: PathBuf,
        query: String,
        /// Match headwords or entry text containing the query instead of a prefix
        #[arg(long)]
        substring: bool,
        #[arg(short = 't', long = "type", value_enum, default_value_t = Kind::Dictionary)]
        kind: Kind,
    },
    /// Show a module's metadata as JSON
    Info {
        /// Module archive
        archive: PathBuf,
        #[arg(short = 't', long = "type", value_enum, default_value_t = Kind::Bible)]
        kind: Kind,
    },
    /// List the modules of a library configuration
    Library {
        /// JSON library configuration
        config: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum, Debug)]
enum Kind {
    Bible,
    Dictionary,
    Morphology,
}

impl From<Kind> for ModuleType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Bible => ModuleType::Bible,
            Kind::Dictionary => ModuleType::Dictionary,
            Kind::Morphology => ModuleType::Morphology,
        }
    }
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
}

fn open(archive: &Path, kind: Kind) -> sword::Result<SwordModule> {
    let module = load_module_file(archive, kind.into())?;
    debug!("{} loaded from {}", module.modname, archive.display());
    Ok(module)
}

fn print_texts(texts: &indexmap::IndexMap<String, String>) {
    for (key, text) in texts {
        println!("{}\t{}", key, text.trim_end());
    }
}

fn run(cli: Cli) -> sword::Result<()> {
    match cli.command {
        Commands::Render { archive, references, kind } => {
            let module = open(&archive, kind)?;
            print_texts(&module.render_texts(references.as_slice())?);
        }
        Commands::Search { archive, query, substring, kind } => {
            let module = open(&archive, kind)?;
            let mode = if substring { SearchMode::Substring } else { SearchMode::Prefix };
            print_texts(&module.search_dictionary(&query, mode)?);
        }
        Commands::Info { archive, kind } => {
            let module = open(&archive, kind)?;
            println!("{}", serde_json::to_string_pretty(&module.info())?);
        }
        Commands::Library { config } => {
            let config = LibraryConfig::from_json_file(&config)?;
            let library = ModuleLibrary::load(&config, None)?;
            println!("{}", serde_json::to_string_pretty(&library.infos())?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
