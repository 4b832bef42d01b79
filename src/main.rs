use anyhow::{anyhow, bail, Context, Result};
use clap::{App, Arg};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{info, Level};

use sol2move::config::TranspilerConfig;
use sol2move::plugin::{Erc20MappingPlugin, PluginRegistry};
use sol2move::{Transpiled, Transpiler};

fn main() -> Result<()> {
    let matches = App::new("sol2move")
        .version("0.1.0")
        .about("Converts Solidity ABI or solc AST JSON into Move modules")
        .arg(
            Arg::with_name("INPUT")
                .help("ABI JSON array or solc --ast-compact-json output")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("name")
                .short("n")
                .long("name")
                .value_name("CONTRACT")
                .help("Contract name (ABI input) or contract to select (AST input)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("target")
                .short("t")
                .long("target")
                .value_name("TARGET")
                .help("Move dialect: sui or aptos")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("strict")
                .long("strict")
                .help("Fail on unsupported types and statements"),
        )
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("Config file, defaults to ./solidity-to-move.config.json")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .value_name("DIR")
                .help("Output directory for Move files")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("erc20")
                .long("erc20")
                .help("Map IERC20 onto the Sui coin module"),
        )
        .arg(
            Arg::with_name("dry-run")
                .long("dry-run")
                .help("Print the module instead of writing it"),
        )
        .arg(
            Arg::with_name("force")
                .long("force")
                .help("Overwrite existing output files"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Enable debug logging"),
        )
        .get_matches();

    let mut config = TranspilerConfig::load(matches.value_of("config").map(Path::new))
        .with_context(|| "Failed to load configuration")?;
    if let Some(target) = matches.value_of("target") {
        config.target = Some(target.to_string());
    }
    if matches.is_present("strict") {
        config.strict_mode = true;
    }
    if matches.is_present("verbose") {
        config.verbose = true;
    }

    tracing_subscriber::fmt()
        .with_max_level(if config.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    let input_file = matches
        .value_of("INPUT")
        .ok_or_else(|| anyhow!("INPUT is required"))?;
    let input_path = Path::new(input_file);
    if input_path.extension().and_then(|e| e.to_str()) == Some("sol") {
        bail!(
            "{} is Solidity source; produce an AST first with `solc --ast-compact-json {}`",
            input_file,
            input_file
        );
    }

    let source = fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read input file: {}", input_file))?;
    let json: Value = serde_json::from_str(&source)
        .with_context(|| format!("{} is not valid JSON", input_file))?;

    let mut plugins = PluginRegistry::with_defaults();
    if matches.is_present("erc20") {
        plugins.add(Box::new(Erc20MappingPlugin));
    }
    let transpiler = Transpiler::new(config).with_plugins(plugins);
    let name = matches.value_of("name");

    let transpiled = if json.is_array() {
        let contract_name = name
            .map(str::to_string)
            .unwrap_or_else(|| file_stem(input_path));
        transpiler
            .transpile_abi(&source, &contract_name)
            .with_context(|| format!("Failed to transpile ABI {}", input_file))?
    } else {
        transpiler
            .transpile_source_ast(&source, name)
            .with_context(|| format!("Failed to transpile AST {}", input_file))?
    };

    for diagnostic in transpiled.diagnostics.iter() {
        eprintln!("{}", diagnostic);
    }

    if matches.is_present("dry-run") {
        print!("{}", transpiled.source);
        return Ok(());
    }

    write_module(
        &transpiled,
        Path::new(matches.value_of("output").unwrap_or(".")),
        matches.is_present("force"),
    )
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Contract")
        .to_string()
}

fn write_module(transpiled: &Transpiled, output_dir: &Path, force: bool) -> Result<()> {
    fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;

    let output_file = output_dir.join(format!("{}.move", transpiled.module_name));
    if output_file.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite",
            output_file.display()
        );
    }

    fs::write(&output_file, &transpiled.source)
        .with_context(|| format!("Failed to write output file: {}", output_file.display()))?;

    info!(
        "Successfully converted {} to {}",
        transpiled.module_name,
        output_file.display()
    );
    Ok(())
}
